//! Tools domain module.
//!
//! Tools are the operations MCP clients can call. This server has two, both
//! backed by the documentation pipeline in `domains::docs`.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `router.rs` - rmcp ToolRouter builder
//! - `registry.rs` - Tool metadata and the single dispatch point
//! - `error.rs` - Tool-specific error types

pub mod definitions;
mod error;
mod registry;
pub mod router;

pub use error::ToolError;
pub use registry::ToolRegistry;
pub use router::build_tool_router;
