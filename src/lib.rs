//! Slack Web API MCP Server Library
//!
//! This crate exposes Slack Web API methods as Model Context Protocol tools.
//! Each operation is described once, as data, and a single generic dispatch
//! engine turns any tool call into the matching HTTP request.
//!
//! # Architecture
//!
//! - **core**: Configuration, error handling, the MCP server and its transports
//! - **engine**: Operation descriptors, argument routing, request building,
//!   HTTP execution and response normalization
//! - **catalog**: The operation table (built-in or loaded from JSON) and the
//!   tool registry built from it
//!
//! # Example
//!
//! ```rust,no_run
//! use slack_web_api_mcp::core::{Config, McpServer};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config)?;
//!     println!("{} tools", server.registry().len());
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod core;
pub mod engine;

// Re-export commonly used types for convenience
pub use catalog::{Catalog, ToolRegistry};
pub use core::{Config, Error, McpServer, Result};
pub use engine::{Dispatcher, OperationDescriptor};
