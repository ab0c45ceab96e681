//! Kestra documentation tools.

mod by_path;
mod search;

pub use by_path::DocsByPathTool;
pub use search::DocsSearchTool;
