//! MCP server for documentation-augmented prompts.
//!
//! This crate turns a [`mcp_insight_core::Registry`] into an MCP server.
//! Every prompt template becomes a tool whose parameters are the template's
//! variables, and every resource is readable as `insight://<name>`.
//!
//! # Architecture
//!
//! - [`tools`] - template tools, insight tools and argument coercion
//! - [`service`] - the rmcp `ServerHandler` dispatching tools, prompts and resources
//! - [`config`] - TOML configuration with command-line overrides
//!
//! # Examples
//!
//! ```no_run
//! use mcp_insight_core::Registry;
//! use mcp_insight_server::{InsightService, ServerConfig};
//! use mcp_insight_server::tools::synthesize_tools;
//! use rmcp::ServiceExt;
//! use rmcp::transport::stdio;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::load(None)?;
//!
//! let mut builder = Registry::builder().name_source(config.registry.name_source);
//! builder.load_resources(&config.registry.resources_dir)?;
//! builder.load_templates(&config.registry.prompts_dir)?;
//! let registry = Arc::new(builder.build());
//!
//! let mut tools = synthesize_tools(&registry);
//! tools.extend(config.insight_tools());
//!
//! let service = InsightService::new(registry, tools).serve(stdio()).await?;
//! service.waiting().await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod config;
pub mod service;
pub mod tools;

pub use config::ServerConfig;
pub use service::InsightService;
pub use tools::{InsightTool, TemplateTool, ToolBase, ToolKind};
