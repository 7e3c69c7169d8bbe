//! MCP tool modules.
//!
//! Tools are grouped by domain: query search across sources, and
//! per-document operations (identifier resolution, snippets, metadata).

pub mod documents;
pub mod search;
