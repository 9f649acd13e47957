//! Tool Registry - every catalog operation bound to the dispatch engine.
//!
//! This module provides:
//! - The list of available tools (metadata for `tools/list`)
//! - Name-based dispatch for transports that do not go through rmcp's router

use std::collections::HashMap;
use std::sync::Arc;

use rmcp::model::{CallToolResult, Tool};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::error::ToolError;
use super::loader::Catalog;
use crate::engine::{Dispatcher, OperationTool};

/// Registry of all tools produced from a catalog.
pub struct ToolRegistry {
    tools: Vec<OperationTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Turn every catalog operation into a tool sharing one dispatcher.
    pub fn new(catalog: Catalog, dispatcher: Arc<Dispatcher>) -> Self {
        let tools: Vec<OperationTool> = catalog
            .into_iter()
            .map(|descriptor| OperationTool::new(Arc::new(descriptor), dispatcher.clone()))
            .collect();

        let index = tools
            .iter()
            .enumerate()
            .map(|(i, tool)| (tool.name().to_string(), i))
            .collect();

        Self { tools, index }
    }

    /// Get all tool names, in catalog order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(OperationTool::name).collect()
    }

    /// Get all tools as Tool models (metadata).
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools.iter().map(OperationTool::to_tool).collect()
    }

    pub fn tools(&self) -> &[OperationTool] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&OperationTool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch a tool call by name.
    ///
    /// Only an unknown tool name is an error; everything that goes wrong
    /// inside the invocation is reported in the returned result.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
        cancellation: CancellationToken,
    ) -> Result<CallToolResult, ToolError> {
        let Some(tool) = self.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return Err(ToolError::not_found(name));
        };

        Ok(tool
            .invoke(arguments, cancellation)
            .await
            .into_call_tool_result())
    }
}
