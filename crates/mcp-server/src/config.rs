//! Server configuration.
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/mcp-insight/config.toml`
//! - macOS: `~/Library/Application Support/mcp-insight/config.toml`
//! - Windows: `%APPDATA%\mcp-insight\config.toml`
//!
//! A missing file yields the defaults. Command-line flags override values
//! read from the file.

use crate::tools::{InsightTool, ToolKind};
use anyhow::{Context, Result};
use mcp_insight_core::NameSource;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "mcp-insight";
const CONFIG_FILE: &str = "config.toml";

/// Accepted values for `logging.level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Accepted values for `logging.format`.
pub const LOG_FORMATS: [&str; 2] = ["text", "json"];

/// Server configuration.
///
/// # Examples
///
/// ```toml
/// [registry]
/// prompts_dir = "static/prompts"
/// resources_dir = "static/insights"
/// name_source = "file_stem"
///
/// [logging]
/// level = "info"
/// format = "text"
///
/// [[insights]]
/// name = "model_insight"
/// description = "Answer questions using the model documentation"
/// resource = "model"
/// topic = "model"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ServerConfig {
    /// Where prompts and resources are loaded from
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Resource-backed insight tools
    #[serde(default)]
    pub insights: Vec<InsightConfig>,
}

/// Registry loading settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Directory of prompt template files
    pub prompts_dir: PathBuf,

    /// Directory of resource files
    pub resources_dir: PathBuf,

    /// How templates are named
    pub name_source: NameSource,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level (trace, debug, info, warn, error); `RUST_LOG` wins
    pub level: String,

    /// Output format (text, json)
    pub format: String,
}

/// One insight tool entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InsightConfig {
    /// Tool name
    pub name: String,

    /// Tool description
    pub description: String,

    /// Resource embedded into every request
    pub resource: String,

    /// Topic label; defaults to the resource name
    #[serde(default)]
    pub topic: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            prompts_dir: PathBuf::from("static/prompts"),
            resources_dir: PathBuf::from("static/insights"),
            name_source: NameSource::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl InsightConfig {
    /// Topic label, falling back to the resource name.
    #[must_use]
    pub fn topic(&self) -> &str {
        self.topic.as_deref().unwrap_or(&self.resource)
    }

    /// Builds the configured tool.
    #[must_use]
    pub fn to_tool(&self) -> ToolKind {
        InsightTool::new(
            self.name.as_str(),
            self.description.as_str(),
            self.resource.as_str(),
            self.topic(),
        )
        .into()
    }
}

impl ServerConfig {
    /// Parses configuration from TOML text and validates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema or if
    /// validation fails.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from `path`, or from the default location when
    /// `path` is `None`.
    ///
    /// A missing file at the default location yields the defaults. A missing
    /// file at an explicit path is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if
    /// validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !config_path.exists() {
            tracing::debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config file {}", config_path.display()))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "invalid logging.level '{}', must be one of: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            );
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            anyhow::bail!(
                "invalid logging.format '{}', must be one of: {}",
                self.logging.format,
                LOG_FORMATS.join(", ")
            );
        }

        let mut names = HashSet::new();
        for insight in &self.insights {
            if insight.name.trim().is_empty() {
                anyhow::bail!("insights.name must not be empty");
            }
            if insight.resource.trim().is_empty() {
                anyhow::bail!("insights.resource must not be empty for '{}'", insight.name);
            }
            // Both values are spliced into the generated template body
            let spliced = [("resource", insight.resource.as_str()), ("topic", insight.topic())];
            for (field, value) in spliced {
                if contains_delimiter(value) {
                    anyhow::bail!(
                        "insights.{field} must not contain '{{{{' or '}}}}' for '{}'",
                        insight.name
                    );
                }
            }
            if !names.insert(insight.name.as_str()) {
                anyhow::bail!("duplicate insight name '{}'", insight.name);
            }
        }

        Ok(())
    }

    /// Builds every configured insight tool.
    #[must_use]
    pub fn insight_tools(&self) -> Vec<ToolKind> {
        self.insights.iter().map(InsightConfig::to_tool).collect()
    }
}

fn contains_delimiter(value: &str) -> bool {
    value.contains("{{") || value.contains("}}")
}

/// Default configuration file path, if the platform has a config directory.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
