//! # Open Library Search
//!
//! Public catalog search against `openlibrary.org`. Unrelated to the
//! bookstore backend: no credential is sent and a 401 here means nothing to
//! the session.

use std::fmt;

use tracing::{debug, error, instrument};
use url::Url;

use pageturner_core::validation::validate_search_query;

use crate::api::schema::{error_message, OpenLibraryDoc, OpenLibraryResponse};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Client for `search.json`.
#[derive(Clone)]
pub struct OpenLibraryClient {
    http: reqwest::Client,
    base_url: Url,
    covers_url: String,
}

impl fmt::Debug for OpenLibraryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenLibraryClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl OpenLibraryClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base_url = Url::parse(&config.open_library.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.open_library.base_url.clone()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(OpenLibraryClient {
            http,
            base_url,
            covers_url: config.open_library.covers_url.clone(),
        })
    }

    /// Searches by free text. Blank queries are rejected before sending.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> ClientResult<Vec<OpenLibraryDoc>> {
        let query = validate_search_query(query)?;

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("search.json");

        let response = self.http.get(url).query(&[("q", query.as_str())]).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = error_message(&body);
            error!(status = status.as_u16(), ?message, "Open Library search failed");
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: OpenLibraryResponse =
            serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
        debug!(found = parsed.num_found, returned = parsed.docs.len(), "Open Library search done");
        Ok(parsed.docs)
    }

    /// Medium cover URL for a search hit.
    pub fn cover_url(&self, doc: &OpenLibraryDoc) -> Option<String> {
        doc.cover_url(&self.covers_url)
    }
}
