//! Data model shared by the fetcher, the pipeline and the tool layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Category used when nothing more specific is known.
pub const DEFAULT_CATEGORY: &str = "general";

/// Category carried by every error sentinel.
pub const ERROR_CATEGORY: &str = "error";

/// The fetcher has no notion of versioned docs.
pub const LATEST_VERSION: &str = "latest";

/// Title carried by not-found sentinels.
pub const NOT_FOUND_TITLE: &str = "Not Found";

// ============================================================================
// Tool input
// ============================================================================

/// Input of both documentation tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DocQuery {
    /// Free text for `docs-search`, a path or URL for `docs-by-path`.
    #[schemars(description = "The search query or document path to find in the Kestra docs")]
    pub query: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Optional filters to narrow down search results")]
    pub filter: Option<DocFilter>,
}

/// Optional metadata hints. They only shape sentinel and summary metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DocFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Optional category to filter docs by")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Optional version to filter docs by")]
    pub version: Option<String>,
}

impl DocFilter {
    /// Requested category, or [`DEFAULT_CATEGORY`].
    pub fn category_or_default(filter: Option<&Self>) -> String {
        filter
            .and_then(|f| f.category.clone())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
    }

    /// Requested version, or [`LATEST_VERSION`].
    pub fn version_or_default(filter: Option<&Self>) -> String {
        filter
            .and_then(|f| f.version.clone())
            .unwrap_or_else(|| LATEST_VERSION.to_string())
    }
}

// ============================================================================
// Tool output
// ============================================================================

/// Metadata about a documentation page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// RFC 3339 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// A normalized documentation record.
///
/// Always fully populated: a missing document is represented by a sentinel
/// whose category is [`ERROR_CATEGORY`] or whose title is [`NOT_FOUND_TITLE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DocResult {
    /// The content of the documentation.
    pub content: String,

    /// Canonical URL or logical path of the documentation.
    pub path: String,

    /// Metadata about the documentation.
    pub metadata: DocumentMetadata,
}

impl DocResult {
    pub fn category(&self) -> Option<&str> {
        self.metadata.category.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.category() == Some(ERROR_CATEGORY)
    }
}

// ============================================================================
// Search endpoint payload
// ============================================================================

/// One hit returned by the search endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    /// HTML fragments, most relevant first.
    #[serde(default)]
    pub highlights: Option<Vec<String>>,
}

impl SearchHit {
    /// The hit URL, if it carries a non-blank one.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// The hit title, if it carries a non-blank one.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn highlights(&self) -> &[String] {
        self.highlights.as_deref().unwrap_or_default()
    }
}

/// Accepted shapes of a search response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Hits(Vec<SearchHit>),
    Results { results: Vec<SearchHit> },
    Wrapped { hits: Vec<SearchHit> },
}

impl SearchResponse {
    pub fn into_hits(self) -> Vec<SearchHit> {
        match self {
            Self::Hits(hits) | Self::Results { results: hits } | Self::Wrapped { hits } => hits,
        }
    }
}

// ============================================================================
// Pipeline outcome
// ============================================================================

/// How the pipeline arrived at its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A fetched page, possibly enriched with search matches.
    Document,
    /// A multi-hit summary built from search results.
    Summary,
    /// The search endpoint returned no hits.
    NoMatches,
    /// A backend failure turned into an error sentinel.
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Summary => "summary",
            Self::NoMatches => "no_matches",
            Self::Error => "error",
        }
    }
}

/// Result of a pipeline call: always a well-formed [`DocResult`], tagged.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub outcome: Outcome,
    pub result: DocResult,
}

impl Retrieval {
    pub fn new(outcome: Outcome, result: DocResult) -> Self {
        Self { outcome, result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_query_filter_optional() {
        let query: DocQuery = serde_json::from_str(r#"{"query": "workflow"}"#).unwrap();
        assert_eq!(query.query, "workflow");
        assert!(query.filter.is_none());
    }

    #[test]
    fn test_doc_query_with_filter() {
        let json = r#"{"query": "flows", "filter": {"category": "workflows"}}"#;
        let query: DocQuery = serde_json::from_str(json).unwrap();
        let filter = query.filter.unwrap();
        assert_eq!(filter.category.as_deref(), Some("workflows"));
        assert!(filter.version.is_none());
    }

    #[test]
    fn test_filter_defaults() {
        assert_eq!(DocFilter::category_or_default(None), "general");
        assert_eq!(DocFilter::version_or_default(None), "latest");

        let filter = DocFilter {
            category: Some("plugins".to_string()),
            version: Some("0.19".to_string()),
        };
        assert_eq!(DocFilter::category_or_default(Some(&filter)), "plugins");
        assert_eq!(DocFilter::version_or_default(Some(&filter)), "0.19");
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let result = DocResult {
            content: "body".to_string(),
            path: "https://kestra.io/docs/x".to_string(),
            metadata: DocumentMetadata {
                last_updated: Some("2024-01-01T00:00:00Z".to_string()),
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["metadata"]["lastUpdated"], "2024-01-01T00:00:00Z");
        assert!(value["metadata"].get("title").is_none());
    }

    #[test]
    fn test_search_response_shapes() {
        let bare = r#"[{"url": "/docs/a", "type": "DOCS", "title": "A", "highlights": ["x"]}]"#;
        let hits = serde_json::from_str::<SearchResponse>(bare).unwrap().into_hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind.as_deref(), Some("DOCS"));

        let wrapped = r#"{"results": [{"url": "/docs/a"}, {"url": "/docs/b"}]}"#;
        let hits = serde_json::from_str::<SearchResponse>(wrapped).unwrap().into_hits();
        assert_eq!(hits.len(), 2);
        assert!(hits[1].highlights().is_empty());
    }

    #[test]
    fn test_search_hit_blank_fields() {
        let hit: SearchHit =
            serde_json::from_str(r#"{"url": "  ", "title": "", "highlights": null}"#).unwrap();
        assert!(hit.url().is_none());
        assert!(hit.title().is_none());
        assert!(hit.highlights().is_empty());
    }

    #[test]
    fn test_malformed_search_response_rejected() {
        assert!(serde_json::from_str::<SearchResponse>(r#"{"message": "oops"}"#).is_err());
    }
}
