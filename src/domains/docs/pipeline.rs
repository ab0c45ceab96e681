//! Retrieval pipeline.
//!
//! `search` queries the external endpoint, fetches the top hit and enriches
//! it with its highlights, falling back to a multi-hit summary when the page
//! cannot be fetched. `fetch_by_path` delegates to the fetcher. Neither call
//! fails: every failure becomes a sentinel [`DocResult`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::ACCEPT;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::error::SearchError;
use super::fetcher::{DocumentSource, HttpDocumentFetcher};
use super::normalize;
use super::types::{DocFilter, Outcome, Retrieval, SearchHit, SearchResponse};
use crate::core::config::DocsConfig;
use crate::core::{Error, Result};

/// The documentation retrieval pipeline.
#[derive(Clone)]
pub struct DocsPipeline {
    client: reqwest::Client,
    search_url: Url,
    site_url: Url,
    docs_root: Url,
    fetcher: Arc<dyn DocumentSource>,
}

impl std::fmt::Debug for DocsPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocsPipeline")
            .field("search_url", &self.search_url.as_str())
            .field("site_url", &self.site_url.as_str())
            .field("docs_root", &self.docs_root.as_str())
            .finish()
    }
}

/// Parse a configured URL, naming the setting on failure.
fn parse_url(name: &str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| Error::config(format!("invalid {} '{}': {}", name, value, e)))
}

/// Make sure `url` joins as a directory.
fn as_directory(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

impl DocsPipeline {
    /// Build the pipeline and its HTTP fetcher from configuration.
    pub fn from_config(config: &DocsConfig) -> Result<Self> {
        let docs_root = as_directory(parse_url("docs base URL", &config.base_url)?);
        let site_url = parse_url("docs site URL", &config.site_url)?;
        let search_url = parse_url("search URL", &config.search_url)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        let fetcher = Arc::new(HttpDocumentFetcher::new(client.clone(), docs_root.clone()));

        Ok(Self::new(client, search_url, site_url, docs_root, fetcher))
    }

    /// Build a pipeline around an arbitrary document source.
    pub fn new(
        client: reqwest::Client,
        search_url: Url,
        site_url: Url,
        docs_root: Url,
        fetcher: Arc<dyn DocumentSource>,
    ) -> Self {
        Self {
            client,
            search_url,
            site_url,
            docs_root,
            fetcher,
        }
    }

    pub fn docs_root(&self) -> &Url {
        &self.docs_root
    }

    /// The search endpoint URL used for `query`.
    pub fn search_url_for(&self, query: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut().append_pair("q", query);
        url
    }

    /// Absolute form of a hit URL. Relative URLs are prefixed with the site.
    pub fn resolve_hit_url(&self, url: &str) -> Option<Url> {
        match Url::parse(url) {
            Ok(absolute) if matches!(absolute.scheme(), "http" | "https") => Some(absolute),
            _ => self.site_url.join(url).ok(),
        }
    }

    async fn query_endpoint(&self, url: &Url) -> std::result::Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.into_hits())
    }

    /// Search the documentation.
    #[instrument(skip(self, filter))]
    pub async fn search(&self, query: &str, filter: Option<&DocFilter>) -> Retrieval {
        let url = self.search_url_for(query);
        info!("Searching Kestra docs for: {}", query);

        let hits = match self.query_endpoint(&url).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Search endpoint failed: {}", e);
                return Retrieval::new(
                    Outcome::Error,
                    normalize::search_failed(query, url.as_str(), &e),
                );
            }
        };

        let Some(top) = hits.first() else {
            info!("No search hits for: {}", query);
            return Retrieval::new(
                Outcome::NoMatches,
                normalize::no_matches(query, url.as_str(), self.docs_root.as_str(), filter),
            );
        };

        debug!(hits = hits.len(), "Search returned hits");

        if let Some(page_url) = top.url().and_then(|u| self.resolve_hit_url(u)) {
            match self.fetcher.fetch(page_url.as_str()).await {
                Ok(doc) => {
                    return Retrieval::new(Outcome::Document, normalize::with_search_matches(doc, top));
                }
                Err(e) => warn!("Fetching top hit {} failed, summarizing hits: {}", page_url, e),
            }
        } else {
            warn!("Top hit has no usable URL, summarizing hits");
        }

        let summary = normalize::search_summary(query, &hits, url.as_str(), filter, |u| {
            self.resolve_hit_url(u).map(String::from)
        });
        Retrieval::new(Outcome::Summary, summary)
    }

    /// Retrieve one documentation page by path or URL.
    #[instrument(skip(self))]
    pub async fn fetch_by_path(&self, locator: &str) -> Retrieval {
        info!("Fetching Kestra docs by path: {}", locator);

        match self.fetcher.fetch(locator).await {
            Ok(doc) => Retrieval::new(Outcome::Document, doc),
            Err(e) => {
                warn!("Failed to fetch {}: {}", locator, e);
                Retrieval::new(Outcome::Error, normalize::path_not_found(locator, &e))
            }
        }
    }
}
