//! # scholarbib
//!
//! Google Scholar to BibTeX Citation Service - Rust Microservice
//!
//! ## Modules
//!
//! - [`serpapi`] - SerpAPI Google Scholar Author client with pagination
//! - [`bibtex`] - Citation entry formatting and key derivation
//! - [`updater`] - Fetch-format-write orchestration
//! - [`config`] - Environment-sourced immutable configuration
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scholarbib::{serpapi::SerpApiClient, bibtex};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SerpApiClient::new("api-key".to_string())?;
//!     let publications = client.fetch_all_publications("AbC123").await?;
//!     let bibliography = bibtex::render_bibliography(&publications)?;
//!     println!("{}", bibliography);
//!     Ok(())
//! }
//! ```

pub mod bibtex;
pub mod config;
pub mod error;
pub mod serpapi;
pub mod updater;

pub use error::{Result, ScholarbibError};
