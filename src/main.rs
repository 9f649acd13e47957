//! MCP Server Entry Point
//!
//! Initializes logging, loads configuration and the operation catalog, then
//! serves the Slack Web API tools on the configured transport.

use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use slack_web_api_mcp::core::config::LoggingConfig;
use slack_web_api_mcp::core::{Config, McpServer, TransportService};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging first: loading the rest of the config reports what it found.
    init_logging(&LoggingConfig::from_env().level);

    let config = Config::from_env();

    info!("Starting {} v{}", config.server.name, config.server.version);

    config.validate()?;

    let server = McpServer::new(config.clone())?;

    info!("Server initialized");

    let transport = TransportService::new(config.transport);
    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr: stdout belongs to the STDIO transport.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
