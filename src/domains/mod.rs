//! Domains module containing business logic organized by bounded contexts.
//!
//! - `docs`: documentation retrieval, independent of MCP
//! - `tools`: MCP tools built on top of `docs`

pub mod docs;
pub mod tools;
