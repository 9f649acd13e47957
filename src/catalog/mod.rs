//! Operation catalog and tool registry.
//!
//! ## Architecture
//!
//! - `slack_web_api.json` - The built-in operation table
//! - `loader.rs` - Catalog parsing and registration-time validation
//! - `registry.rs` - One tool per operation, name-based dispatch
//! - `router.rs` - Dynamic ToolRouter builder for the rmcp server handler
//! - `error.rs` - Tool lookup errors
//!
//! ## Adding a New Operation
//!
//! Add an entry to `slack_web_api.json` (or to the file named by
//! `MCP_CATALOG_PATH`). No Rust code changes are needed.

mod error;
mod loader;
mod registry;
pub mod router;

pub use error::ToolError;
pub use loader::{Catalog, CatalogError};
pub use registry::ToolRegistry;
pub use router::build_tool_router;
