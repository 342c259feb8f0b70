//! MCP server entry point for documentation-augmented prompts.
//!
//! Loads prompt templates and resources from disk, then serves them to an
//! MCP client over stdio.
//!
//! # Usage
//!
//! ```bash
//! mcp-insight --prompts-dir static/prompts --resources-dir static/insights
//! ```
//!
//! Or configure in `~/.config/claude/mcp.json`:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "insight": {
//!       "command": "mcp-insight",
//!       "args": ["--config", "/path/to/config.toml"]
//!     }
//!   }
//! }
//! ```

use anyhow::Result;
use clap::{Parser, ValueEnum};
use mcp_insight_core::{NameSource, Registry};
use mcp_insight_server::config::{LOG_FORMATS, LOG_LEVELS};
use mcp_insight_server::tools::synthesize_tools;
use mcp_insight_server::{InsightService, ServerConfig};
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Serve prompt templates and documentation resources over MCP stdio.
#[derive(Parser, Debug)]
#[command(name = "mcp-insight")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, env = "MCP_INSIGHT_CONFIG")]
    config: Option<PathBuf>,

    /// Directory of prompt template files
    #[arg(long)]
    prompts_dir: Option<PathBuf>,

    /// Directory of resource files
    #[arg(long)]
    resources_dir: Option<PathBuf>,

    /// How templates are named
    #[arg(long, value_enum)]
    name_source: Option<NameSourceArg>,

    /// Log level
    #[arg(long, value_parser = LOG_LEVELS)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_parser = LOG_FORMATS)]
    log_format: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum NameSourceArg {
    FileStem,
    FirstLine,
}

impl From<NameSourceArg> for NameSource {
    fn from(arg: NameSourceArg) -> Self {
        match arg {
            NameSourceArg::FileStem => Self::FileStem,
            NameSourceArg::FirstLine => Self::FirstLine,
        }
    }
}

impl Cli {
    /// Applies command-line values on top of the file configuration.
    fn apply(self, config: &mut ServerConfig) {
        if let Some(dir) = self.prompts_dir {
            config.registry.prompts_dir = dir;
        }
        if let Some(dir) = self.resources_dir {
            config.registry.resources_dir = dir;
        }
        if let Some(source) = self.name_source {
            config.registry.name_source = source.into();
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

fn init_tracing(config: &ServerConfig) {
    // Logs go to stderr; stdout carries the MCP protocol
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let json = config.logging.format == "json";
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
    });
    let text_layer = (!json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn build_registry(config: &ServerConfig) -> Registry {
    let registry_config = &config.registry;
    let mut builder = Registry::builder().name_source(registry_config.name_source);

    // Load failures are not fatal; the server runs with whatever was committed
    match builder.load_resources(&registry_config.resources_dir) {
        Ok(count) => tracing::info!(
            count,
            dir = %registry_config.resources_dir.display(),
            "Loaded resources"
        ),
        Err(e) => tracing::warn!("Failed to load resources: {e}"),
    }
    match builder.load_templates(&registry_config.prompts_dir) {
        Ok(count) => tracing::info!(
            count,
            dir = %registry_config.prompts_dir.display(),
            "Loaded prompts"
        ),
        Err(e) => tracing::warn!("Failed to load prompts: {e}"),
    }

    builder.build()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    init_tracing(&config);
    tracing::info!("Starting mcp-insight v{}", env!("CARGO_PKG_VERSION"));

    let registry = Arc::new(build_registry(&config));
    let mut tools = synthesize_tools(&registry);
    tools.extend(config.insight_tools());

    let service = InsightService::new(registry, tools).serve(stdio()).await?;
    service.waiting().await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
