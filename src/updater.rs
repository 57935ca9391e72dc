//! Update orchestration: fetch, format, write.
//!
//! Sequences the publication fetcher and the citation formatter, then
//! overwrites the citations file in one pass. One run is one best-effort
//! all-or-nothing attempt: any upstream or data fault aborts before the file
//! is touched, and a zero-publication result leaves the previous file intact.

use crate::bibtex;
use crate::config::Config;
use crate::error::Result;
use crate::serpapi::SerpApiClient;
use chrono::Local;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Name of the citations artifact inside the output directory
const CITATIONS_FILE: &str = "citations.bib";

/// Outcome of a single update run.
///
/// Faults are not part of this set; they propagate as
/// [`ScholarbibError`](crate::ScholarbibError) values.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UpdateReport {
    /// Citations were fetched and the file was rewritten
    Success {
        message: String,
        timestamp: String,
        file_path: String,
    },
    /// The author has no publications; the existing file is left untouched
    Warning { message: String },
}

/// Runs the fetch-format-write pipeline against one author profile.
pub struct CitationUpdater {
    client: SerpApiClient,
    user_id: String,
    output_dir: PathBuf,
}

impl CitationUpdater {
    /// Build an updater from the process configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_client(
            SerpApiClient::new(config.serpapi_key.clone())?,
            config.user_id.clone(),
            config.output_dir.clone(),
        ))
    }

    /// Build an updater around an existing client (used with mock servers).
    pub fn with_client(client: SerpApiClient, user_id: String, output_dir: PathBuf) -> Self {
        Self {
            client,
            user_id,
            output_dir,
        }
    }

    /// Run one update: fetch all publications, format them, rewrite the file.
    ///
    /// Concurrent runs are not synchronized; two overlapping updates may
    /// interleave their writes to the same file.
    ///
    /// # Errors
    ///
    /// Upstream, data and IO faults abort the run. The file keeps whatever a
    /// previous successful run wrote.
    pub async fn update(&self) -> Result<UpdateReport> {
        std::fs::create_dir_all(&self.output_dir)?;

        let publications = self.client.fetch_all_publications(&self.user_id).await?;

        if publications.is_empty() {
            warn!(user_id = %self.user_id, "No publications found, leaving citations file untouched");
            return Ok(UpdateReport::Warning {
                message: "No publications found".to_string(),
            });
        }

        // Formatting the whole batch before the write keeps a malformed
        // record from truncating the previous file.
        let bibliography = bibtex::render_bibliography(&publications)?;

        let output_file = self.output_dir.join(CITATIONS_FILE);
        std::fs::write(&output_file, &bibliography)?;

        info!(
            count = publications.len(),
            path = %output_file.display(),
            "Citations file updated"
        );

        Ok(UpdateReport::Success {
            message: format!("Updated {} citations", publications.len()),
            timestamp: Local::now().to_rfc3339(),
            file_path: output_file.display().to_string(),
        })
    }
}
