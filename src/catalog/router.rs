//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! Every registered operation contributes one dynamic route, so the router
//! always mirrors whatever catalog was loaded at startup.

use rmcp::handler::server::tool::ToolRouter;

use super::registry::ToolRegistry;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(registry: &ToolRegistry) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    registry
        .tools()
        .iter()
        .fold(ToolRouter::new(), |router, tool| {
            router.with_route(tool.create_route())
        })
}
