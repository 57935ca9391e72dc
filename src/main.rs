//! scholarbib - Google Scholar to BibTeX Citation Service
//!
//! A Rust microservice that fetches an author's publications from the SerpAPI
//! Google Scholar Author engine and maintains a BibTeX citations file.
//!
//! ## Usage
//!
//! ### CLI Mode
//! ```bash
//! scholarbib update
//! ```
//!
//! ### HTTP Server Mode
//! ```bash
//! scholarbib serve --port 5000
//! ```

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use clap::{Parser, Subcommand};
use scholarbib::config::Config;
use scholarbib::updater::CitationUpdater;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Google Scholar to BibTeX Citation Service - Rust Microservice
#[derive(Parser)]
#[command(name = "scholarbib")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one citation update and print the result
    Update,

    /// Run as HTTP server
    Serve {
        /// Port to listen on (overrides PORT from the environment)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides HOST from the environment)
        #[arg(long)]
        host: Option<String>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // .env is optional; deployed environments set variables directly
    dotenvy::dotenv().ok();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    // Required variables missing means the process refuses to start
    let config = Config::from_env().context("Invalid configuration")?;

    match cli.command {
        Commands::Update => run_update(config).await,
        Commands::Serve { port, host } => run_server(config, host, port).await,
    }
}

// ============================================================================
// One-Shot Update
// ============================================================================

async fn run_update(config: Config) -> Result<()> {
    let updater = CitationUpdater::new(&config)?;
    let report = updater.update().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

// ============================================================================
// HTTP Server
// ============================================================================

async fn run_server(config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.host.clone());
    let port = port.unwrap_or(config.port);

    info!(host = %host, port = port, user_id = %config.user_id, "Starting HTTP server");

    let updater = CitationUpdater::new(&config)?;
    let app_state = Arc::new(AppState { config, updater });

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/update", post(update_handler))
        .route("/config", get(config_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid host:port")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

struct AppState {
    config: Config,
    updater: CitationUpdater,
}

/// Health check endpoint
async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "scholarbib",
    }))
}

/// Update endpoint handler
async fn update_handler(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    info!(user_id = %state.config.user_id, "Citation update requested");

    match state.updater.update().await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Citations updated successfully",
                "details": report,
            })),
        ),
        Err(e) => {
            error!(error = %e, "Citation update failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": "Failed to update citations",
                    "error": e.to_string(),
                    "timestamp": Local::now().to_rfc3339(),
                })),
            )
        }
    }
}

/// Non-secret configuration echo
async fn config_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "scholar_url": state.config.scholar_url,
        "user_id": state.config.user_id,
        "output_dir": state.config.output_dir.display().to_string(),
    }))
}

/// JSON 404 fallback
async fn not_found_handler() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status": "error",
            "message": "Resource not found",
        })),
    )
}
