//! Documentation domain.
//!
//! - `types` - queries, results and the search payload
//! - `normalize` - builds every [`DocResult`], sentinels included
//! - `fetcher` - HTTP page download and HTML extraction
//! - `pipeline` - search, enrichment and graceful degradation

mod error;
pub mod fetcher;
pub mod normalize;
pub mod pipeline;
pub mod types;

pub use error::{FetchError, SearchError};
pub use fetcher::{DocumentSource, HttpDocumentFetcher};
pub use pipeline::DocsPipeline;
pub use types::{DocFilter, DocQuery, DocResult, DocumentMetadata, Outcome, Retrieval, SearchHit};
