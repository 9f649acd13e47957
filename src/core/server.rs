//! MCP Server implementation and lifecycle management.
//!
//! The server owns the tool registry built from the operation catalog and
//! hands tool calls to it. Tools, not resources or prompts, are the only
//! capability.

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::config::Config;
use super::error::Result as CoreResult;
use crate::catalog::{Catalog, ToolError, ToolRegistry, build_tool_router};
use crate::engine::{Dispatcher, HttpExecutor, ReqwestExecutor};

const INSTRUCTIONS: &str = "Each tool calls one Slack Web API method. Tool names are the HTTP verb \
     followed by the method name (e.g. get_conversations.replies, post_chat.postMessage). \
     Results are the API's JSON response, pretty-printed.";

/// The main MCP server handler.
///
/// This struct implements the `ServerHandler` trait from rmcp. Cloning is
/// cheap: everything behind it is shared and read-only.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// All tools produced from the catalog.
    registry: Arc<ToolRegistry>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    ///
    /// Loads the catalog and builds one pooled HTTP client shared by every
    /// tool.
    pub fn new(config: Config) -> CoreResult<Self> {
        let executor = ReqwestExecutor::with_timeout(config.api.request_timeout())?;
        Self::with_executor(config, Arc::new(executor))
    }

    /// Create a server with a custom executor.
    pub fn with_executor(config: Config, executor: Arc<dyn HttpExecutor>) -> CoreResult<Self> {
        let catalog = Catalog::load(&config.api)?;
        Ok(Self::with_catalog(config, catalog, executor))
    }

    /// Create a server from an already loaded catalog.
    pub fn with_catalog(config: Config, catalog: Catalog, executor: Arc<dyn HttpExecutor>) -> Self {
        let config = Arc::new(config);
        let dispatcher = Arc::new(Dispatcher::new(config.dispatch_settings(), executor));
        let registry = Arc::new(ToolRegistry::new(catalog, dispatcher));

        info!(
            "Registered {} tool(s) against {}",
            registry.len(),
            config.api.base_url
        );

        Self {
            tool_router: build_tool_router::<Self>(&registry),
            config,
            registry,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Get the tool registry.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Usage notes reported to clients on initialize.
    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.registry
            .list_tools()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let result = self
            .registry
            .call_tool(name, arguments, CancellationToken::new())
            .await?;

        Ok(serde_json::json!({
            "content": result.content,
            "isError": result.is_error.unwrap_or(false)
        }))
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
