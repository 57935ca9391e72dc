//! SerpAPI Google Scholar Author client.
//!
//! Fetches an author's full publication list via offset pagination.
//!
//! API Details:
//! - Endpoint: GET /search.json with engine=google_scholar_author
//! - Page size: 100 articles per request (maximum the engine allows)
//! - Results sorted by publication date (sort=pubdate, source-determined)
//! - An empty `articles` page marks the end of the list

use crate::error::{Result, ScholarbibError};
use futures::pin_mut;
use futures::stream::{self, Stream, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// SerpAPI base URL
pub const DEFAULT_API_BASE: &str = "https://serpapi.com";

/// Articles requested per page
pub const PAGE_SIZE: usize = 100;

/// Safety bound on pagination; a source that never returns an empty page
/// must not hang the process
pub const MAX_PAGES: usize = 50;

/// One raw publication record as returned by the search API.
///
/// All fields are optional at the wire level; the formatter enforces which
/// ones a convertible record must carry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Publication {
    /// Article title
    pub title: Option<String>,
    /// Comma-separated author names, first entry is the primary author
    pub authors: Option<String>,
    /// Publication year
    pub year: Option<String>,
    /// Journal/venue name
    pub publication: Option<String>,
    /// Citation count wrapper
    pub cited_by: Option<CitedBy>,
    /// URL of the article page
    pub link: Option<String>,
}

/// Citation count as nested by the API
#[derive(Debug, Clone, Deserialize)]
pub struct CitedBy {
    /// Number of citing works
    pub value: u64,
}

#[derive(Debug, Deserialize)]
struct AuthorResponse {
    #[serde(default)]
    articles: Vec<Publication>,
    /// SerpAPI reports failures as an `error` string in the body
    #[serde(default)]
    error: Option<String>,
}

/// SerpAPI client bound to one credential.
pub struct SerpApiClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl SerpApiClient {
    /// Create a client against the production SerpAPI endpoint.
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_API_BASE.to_string())
    }

    /// Create a client against a custom base URL (mirrors, test servers).
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ScholarbibError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Lazily paginate through an author's publications.
    ///
    /// Yields one page of records at a time, in API order, and terminates on
    /// the first empty page. After [`MAX_PAGES`] non-empty pages the stream
    /// yields a [`ScholarbibError::PaginationLimit`] and ends. The stream is
    /// finite and restartable per call.
    pub fn page_stream<'a>(
        &'a self,
        author_id: &'a str,
    ) -> impl Stream<Item = Result<Vec<Publication>>> + 'a {
        stream::unfold(Some(0usize), move |state| async move {
            let start = state?;

            if start / PAGE_SIZE >= MAX_PAGES {
                warn!(author_id, pages = MAX_PAGES, "Pagination safety bound hit");
                return Some((Err(ScholarbibError::PaginationLimit(MAX_PAGES)), None));
            }

            match self.fetch_page(author_id, start).await {
                Ok(page) if page.is_empty() => None,
                Ok(page) => Some((Ok(page), Some(start + PAGE_SIZE))),
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    /// Fetch the author's complete publication list, in API order.
    ///
    /// # Errors
    ///
    /// Any failed page request aborts the whole run; no partial result is
    /// returned.
    pub async fn fetch_all_publications(&self, author_id: &str) -> Result<Vec<Publication>> {
        info!(author_id, "Starting publication fetch");

        let mut all_publications = Vec::new();
        let pages = self.page_stream(author_id);
        pin_mut!(pages);

        while let Some(page) = pages.next().await {
            all_publications.extend(page?);
            info!(total = all_publications.len(), "Fetched publications");
        }

        info!(total = all_publications.len(), "Publication fetch complete");
        Ok(all_publications)
    }

    /// Fetch a single page of publications at the given offset.
    async fn fetch_page(&self, author_id: &str, start: usize) -> Result<Vec<Publication>> {
        let url = format!("{}/search.json", self.base_url);
        let start_param = start.to_string();
        let num_param = PAGE_SIZE.to_string();

        debug!(author_id, start, "Requesting publication page");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("engine", "google_scholar_author"),
                ("author_id", author_id),
                ("start", start_param.as_str()),
                ("num", num_param.as_str()),
                ("sort", "pubdate"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ScholarbibError::RateLimited(60));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), error = %error_text, "SerpAPI error");
            return Err(ScholarbibError::Api {
                code: status.as_u16() as i32,
                message: format!("SerpAPI error: {} - {}", status, error_text),
            });
        }

        let body: AuthorResponse = response.json().await?;

        if let Some(message) = body.error {
            warn!(author_id, error = %message, "SerpAPI rejected the query");
            return Err(ScholarbibError::Api {
                code: status.as_u16() as i32,
                message,
            });
        }

        debug!(start, count = body.articles.len(), "Page received");
        Ok(body.articles)
    }
}
