//! Shapes pages, search hits and failures into [`DocResult`]s.
//!
//! Every constructor here produces a record with a non-empty `path` and a
//! category, which is what lets the tool layer skip any "no answer" case.

use chrono::Utc;

use super::types::{
    DEFAULT_CATEGORY, DocFilter, DocResult, DocumentMetadata, ERROR_CATEGORY, LATEST_VERSION,
    NOT_FOUND_TITLE, SearchHit,
};

/// Placeholder content when a page has no recognizable content region.
pub const NO_CONTENT_PLACEHOLDER: &str = "No content extracted";

/// Heading of the section appended to a fetched page.
pub const SEARCH_MATCHES_HEADING: &str = "## Search Matches";

/// Maximum number of hits rendered by [`search_summary`].
pub const MAX_SUMMARY_HITS: usize = 5;

/// Markers standing in for the search endpoint's inline highlight markup.
const EMPHASIS: &str = "**";


fn now() -> String {
    Utc::now().to_rfc3339()
}

/// A page extracted by the fetcher.
pub fn page(
    url: &str,
    title: Option<String>,
    content: String,
    category: Option<String>,
) -> DocResult {
    let content = if content.trim().is_empty() {
        NO_CONTENT_PLACEHOLDER.to_string()
    } else {
        content
    };

    DocResult {
        content,
        path: url.to_string(),
        metadata: DocumentMetadata {
            title,
            category: Some(category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string())),
            version: Some(LATEST_VERSION.to_string()),
            last_updated: Some(now()),
        },
    }
}

/// Rewrite one highlight fragment into plain Markdown text.
///
/// Emphasis and line-break tags are matched case-insensitively; any other
/// markup is left as is.
pub fn normalize_highlight(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut rest = fragment;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find('>') else {
            out.push_str(tail);
            rest = "";
            break;
        };
        // A stray '<' in running text.
        if tail[1..end].contains('<') {
            out.push('<');
            rest = &tail[1..];
            continue;
        }
        let tag = &tail[..=end];
        out.push_str(tag_replacement(tag).unwrap_or(tag));
        rest = &tail[end + 1..];
    }
    out.push_str(rest);

    out.replace("\r\n", "\n").trim().to_string()
}

fn tag_replacement(tag: &str) -> Option<&'static str> {
    let name: String = tag[1..tag.len() - 1]
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    match name.as_str() {
        "mark" | "/mark" | "em" | "/em" => Some(EMPHASIS),
        "br" | "br/" => Some("\n"),
        _ => None,
    }
}

fn rendered_highlights(hit: &SearchHit) -> Vec<String> {
    hit.highlights()
        .iter()
        .map(|h| normalize_highlight(h))
        .filter(|h| !h.is_empty())
        .collect()
}

/// Append a "Search Matches" section built from the hit's highlights.
///
/// The document is returned unchanged when the hit has no highlights.
pub fn with_search_matches(mut doc: DocResult, hit: &SearchHit) -> DocResult {
    let highlights = rendered_highlights(hit);
    if highlights.is_empty() {
        return doc;
    }

    doc.content.push_str("\n\n");
    doc.content.push_str(SEARCH_MATCHES_HEADING);
    doc.content.push_str("\n\n");
    doc.content.push_str(&highlights.join("\n\n"));
    doc
}

/// Render up to [`MAX_SUMMARY_HITS`] hits into one synthetic document.
///
/// `resolve` turns a hit URL into its absolute form; hits whose URL cannot
/// be resolved get no link.
pub fn search_summary<F>(
    query: &str,
    hits: &[SearchHit],
    search_url: &str,
    filter: Option<&DocFilter>,
    resolve: F,
) -> DocResult
where
    F: Fn(&str) -> Option<String>,
{
    let title = format!("Search Results for \"{}\"", query);
    let mut content = format!("# {}\n", title);

    for hit in hits.iter().take(MAX_SUMMARY_HITS) {
        content.push_str("\n## ");
        content.push_str(hit.title().unwrap_or("Untitled"));
        content.push('\n');

        for highlight in rendered_highlights(hit) {
            content.push('\n');
            content.push_str(&highlight);
            content.push('\n');
        }

        if let Some(link) = hit.url().and_then(&resolve) {
            content.push_str(&format!("\n[Read more]({})\n", link));
        }
    }

    DocResult {
        content,
        path: search_url.to_string(),
        metadata: DocumentMetadata {
            title: Some(title),
            category: Some(DocFilter::category_or_default(filter)),
            version: Some(DocFilter::version_or_default(filter)),
            last_updated: Some(now()),
        },
    }
}

/// Sentinel for a search that matched nothing.
pub fn no_matches(
    query: &str,
    search_url: &str,
    docs_root: &str,
    filter: Option<&DocFilter>,
) -> DocResult {
    DocResult {
        content: format!(
            "No documentation found for query: {}. Browse the documentation at {}",
            query, docs_root
        ),
        path: search_url.to_string(),
        metadata: DocumentMetadata {
            title: Some(NOT_FOUND_TITLE.to_string()),
            category: Some(DocFilter::category_or_default(filter)),
            version: Some(DocFilter::version_or_default(filter)),
            last_updated: Some(now()),
        },
    }
}

/// Sentinel for a failed search call.
pub fn search_failed(query: &str, search_url: &str, error: &dyn std::fmt::Display) -> DocResult {
    DocResult {
        content: format!(
            "Error fetching documentation for query \"{}\": {}",
            query, error
        ),
        path: search_url.to_string(),
        metadata: DocumentMetadata {
            title: Some("Error".to_string()),
            category: Some(ERROR_CATEGORY.to_string()),
            version: Some(LATEST_VERSION.to_string()),
            last_updated: Some(now()),
        },
    }
}

/// Sentinel for a failed path lookup. `path` is the caller's locator.
pub fn path_not_found(locator: &str, error: &dyn std::fmt::Display) -> DocResult {
    let path = if locator.trim().is_empty() {
        "not-found".to_string()
    } else {
        locator.to_string()
    };

    DocResult {
        content: format!(
            "No documentation found at path: {}. Error: {}",
            locator, error
        ),
        path,
        metadata: DocumentMetadata {
            title: Some(NOT_FOUND_TITLE.to_string()),
            category: Some(ERROR_CATEGORY.to_string()),
            version: Some(LATEST_VERSION.to_string()),
            last_updated: Some(now()),
        },
    }
}
