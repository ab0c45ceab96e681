//! Tool definitions module.
//!
//! Each tool is defined in its own file and exposes `NAME`, `DESCRIPTION`,
//! `to_tool()`, `execute()` and `create_route()`.

pub mod common;
pub mod docs;

pub use docs::{DocsByPathTool, DocsSearchTool};
