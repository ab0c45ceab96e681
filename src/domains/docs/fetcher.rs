//! Document fetcher.
//!
//! Resolves a locator against the documentation base URL, downloads the page
//! once and extracts its title, body and category.

use std::io::Cursor;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use super::error::FetchError;
use super::normalize;
use super::types::DocResult;

/// Content containers, tried in order. The first match wins.
const CONTENT_SELECTORS: [&str; 4] = ["article", "main", "[role=\"main\"]", ".docs-content"];

const SKIP_TAGS: [&str; 11] = [
    "script", "style", "nav", "header", "footer", "noscript", "svg", "aside", "form", "iframe",
    "button",
];

/// Wrap width for extracted text.
const TEXT_WIDTH: usize = 120;

/// Anything able to turn a locator into a document.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch and normalize the document behind `locator`.
    async fn fetch(&self, locator: &str) -> Result<DocResult, FetchError>;
}

/// Fetches documentation pages over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDocumentFetcher {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpDocumentFetcher {
    /// Create a fetcher. `base_url` should end with `/`.
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn resolve(&self, locator: &str) -> Result<Url, FetchError> {
        resolve_locator(&self.base_url, locator)
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentFetcher {
    #[instrument(skip(self), fields(url))]
    async fn fetch(&self, locator: &str) -> Result<DocResult, FetchError> {
        let url = self.resolve(locator)?;
        tracing::Span::current().record("url", url.as_str());
        debug!("Fetching documentation page");

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "text/html")
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

        // `Html` is !Send; keep it out of any await point.
        let page = extract_page(&body);
        debug!(title = ?page.title, bytes = body.len(), "Extracted page");

        Ok(normalize::page(
            url.as_str(),
            page.title,
            page.content.unwrap_or_default(),
            infer_category(&self.base_url, &url),
        ))
    }
}

// ============================================================================
// Locator resolution
// ============================================================================

/// Resolve `locator` to an absolute URL.
///
/// Absolute `http(s)` URLs pass through. Anything else is joined onto `base`
/// with leading slashes stripped, so `/a/b.md` and `a/b.md` agree.
pub fn resolve_locator(base: &Url, locator: &str) -> Result<Url, FetchError> {
    let locator = locator.trim();
    if locator.is_empty() {
        return Err(FetchError::invalid_locator(locator, "empty locator"));
    }

    if let Ok(url) = Url::parse(locator) {
        if matches!(url.scheme(), "http" | "https") {
            return Ok(url);
        }
    }

    // "./" keeps scheme-like text such as "a:b" relative to the base.
    base.join(&format!("./{}", locator.trim_start_matches('/')))
        .map_err(|e| FetchError::invalid_locator(locator, e))
}

/// First non-empty path segment of `url`, relative to `base` when `url`
/// lives under it.
pub fn infer_category(base: &Url, url: &Url) -> Option<String> {
    let path = url.path();
    let relative = if url.origin() == base.origin() {
        path.strip_prefix(base.path()).unwrap_or(path)
    } else {
        path
    };

    relative
        .split('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

// ============================================================================
// HTML extraction
// ============================================================================

/// Title and body extracted from an HTML page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: Option<String>,
    /// `None` when no content container matched.
    pub content: Option<String>,
}

/// Extract the first `h1` and the main content container from `html`.
pub fn extract_page(html: &str) -> ExtractedPage {
    let doc = Html::parse_document(html);

    let title = Selector::parse("h1").ok().and_then(|sel| {
        doc.select(&sel)
            .next()
            .map(|h1| collapse_inline(&h1.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    });

    let region = CONTENT_SELECTORS.iter().find_map(|s| {
        let sel = Selector::parse(s).ok()?;
        doc.select(&sel).next()
    });

    let content = region.map(region_text);

    ExtractedPage { title, content }
}

fn collapse_inline(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Render `region` as text, leaving out [`SKIP_TAGS`] subtrees.
fn region_text(region: ElementRef<'_>) -> String {
    let mut html = region.html();
    for tag in SKIP_TAGS {
        let Ok(sel) = Selector::parse(tag) else {
            continue;
        };
        for skipped in region.select(&sel) {
            html = html.replacen(&skipped.html(), "", 1);
        }
    }

    match html2text::from_read(Cursor::new(html.as_bytes()), TEXT_WIDTH) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            debug!("html2text failed, using bare text: {}", e);
            collapse_inline(&region.text().collect::<String>())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://kestra.io/docs/").unwrap()
    }

    #[test]
    fn test_resolve_relative_paths_agree() {
        let a = resolve_locator(&base(), "/plugins/overview.md").unwrap();
        let b = resolve_locator(&base(), "plugins/overview.md").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "https://kestra.io/docs/plugins/overview.md");
        assert!(!a.as_str()["https://".len()..].contains("//"));
    }

    #[test]
    fn test_resolve_absolute_passthrough() {
        let url = resolve_locator(&base(), "https://example.com/a/b").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a/b");
    }

    #[test]
    fn test_resolve_rejects_empty() {
        assert!(matches!(
            resolve_locator(&base(), "   "),
            Err(FetchError::InvalidLocator { .. })
        ));
    }

    #[test]
    fn test_resolve_non_http_scheme_is_relative() {
        let url = resolve_locator(&base(), "workflow:basics").unwrap();
        assert!(url.as_str().starts_with("https://kestra.io/docs/"));
    }

    #[test]
    fn test_infer_category() {
        let base = base();
        let url = Url::parse("https://kestra.io/docs/plugins/overview.md").unwrap();
        assert_eq!(infer_category(&base, &url).as_deref(), Some("plugins"));

        let root = Url::parse("https://kestra.io/docs/").unwrap();
        assert_eq!(infer_category(&base, &root), None);

        let outside = Url::parse("https://example.com/blog/post").unwrap();
        assert_eq!(infer_category(&base, &outside).as_deref(), Some("blog"));
    }

    #[test]
    fn test_extract_page_article() {
        let html = r#"
            <html><head><title>ignored</title></head><body>
              <nav>Menu</nav>
              <h1>  Workflow
                 Basics </h1>
              <article>
                <h2>Flows</h2>
                <p>A flow is <strong>declarative</strong>.</p>
                <ul><li>one</li><li>two</li></ul>
                <pre>id: hello
namespace: dev</pre>
                <script>var x = 1;</script>
              </article>
            </body></html>"#;
        let page = extract_page(html);

        assert_eq!(page.title.as_deref(), Some("Workflow Basics"));
        let content = page.content.unwrap();
        assert!(content.starts_with("## Flows"));
        assert!(content.contains("declarative"));
        let one = content.find("one").unwrap();
        let two = content.find("two").unwrap();
        assert!(one < two);
        assert!(content.contains("id: hello\nnamespace: dev"));
        assert!(!content.contains("var x"));
        assert!(!content.contains("Menu"));
    }

    #[test]
    fn test_extract_page_drops_chrome_inside_region() {
        let html = r#"<body><main>
            <nav>Previous | Next</nav>
            <p>Tasks run in order.</p>
            <form><button>Copy</button></form>
            <style>p { color: red }</style>
        </main></body>"#;
        let content = extract_page(html).content.unwrap();
        assert_eq!(content, "Tasks run in order.");
    }

    #[test]
    fn test_extract_page_falls_back_to_main() {
        let page = extract_page("<body><main><p>Hello</p></main></body>");
        assert_eq!(page.content.as_deref(), Some("Hello"));
        assert!(page.title.is_none());
    }

    #[test]
    fn test_extract_page_without_region() {
        let page = extract_page("<body><div>loose text</div></body>");
        assert!(page.content.is_none());
    }
}
