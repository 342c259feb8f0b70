//! Callable tools synthesized from the registry.
//!
//! Every prompt template becomes a [`TemplateTool`] whose parameters mirror
//! the template's variables. Configured insight entries become
//! [`InsightTool`]s that pair one resource with a free-form `prompt`.
//! Both kinds render through the same [`Registry`], and render failures are
//! reported as tool error results rather than protocol errors.

use mcp_insight_core::{PromptTemplate, Registry};
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

/// Parameter name accepted by insight tools.
pub const PROMPT_PARAM: &str = "prompt";

/// Name and description shared by every tool kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolBase {
    /// Tool name exposed to clients
    pub name: String,

    /// Tool description exposed to clients
    pub description: String,
}

impl ToolBase {
    /// Creates a tool base.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Tool backed by a registered prompt template.
#[derive(Debug, Clone)]
pub struct TemplateTool {
    base: ToolBase,
    parameters: Vec<String>,
}

impl TemplateTool {
    /// Builds a tool mirroring `template`.
    #[must_use]
    pub fn from_template(template: &PromptTemplate) -> Self {
        Self {
            base: ToolBase::new(template.name(), template.description()),
            parameters: template.variables().to_vec(),
        }
    }

    /// Required parameter names, in template declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    fn input_schema(&self) -> JsonObject {
        let properties: serde_json::Map<String, Value> = self
            .parameters
            .iter()
            .map(|param| {
                let schema = json!({
                    "type": "string",
                    "description": format!("Parameter {param} for {}", self.base.name),
                });
                (param.clone(), schema)
            })
            .collect();

        object_schema(properties, &self.parameters)
    }

    fn execute(&self, registry: &Registry, arguments: Option<&JsonObject>) -> CallToolResult {
        let vars = coerce_arguments(arguments);
        render_result(&self.base.name, registry.render(&self.base.name, &vars))
    }
}

/// Tool that answers a free-form request against one fixed resource.
#[derive(Debug, Clone)]
pub struct InsightTool {
    base: ToolBase,
    resource: String,
    topic: String,
    template: PromptTemplate,
}

impl InsightTool {
    /// Creates an insight tool that embeds `resource` and labels it with `topic`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mcp_insight_server::tools::InsightTool;
    ///
    /// let tool = InsightTool::new("model_insight", "Ask about models", "model", "model");
    /// assert!(tool.template().template().contains("{{@model}}"));
    /// assert_eq!(tool.template().variables(), ["prompt"]);
    /// ```
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        resource: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        let base = ToolBase::new(name, description);
        let resource = resource.into();
        let topic = topic.into();
        let body = format!(
            "Using the {topic} documentation below, please help with the following request:\n\n\
             {{{{{PROMPT_PARAM}}}}}\n\n\
             --- {} DOCUMENTATION ---\n\n\
             {{{{@{resource}}}}}",
            topic.to_uppercase()
        );
        let template = PromptTemplate::new(base.name.clone(), base.description.clone(), body);

        Self {
            base,
            resource,
            topic,
            template,
        }
    }

    /// Name of the embedded resource.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Topic label used in the rendered text.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The built-in two-slot template this tool renders.
    #[must_use]
    pub const fn template(&self) -> &PromptTemplate {
        &self.template
    }

    fn input_schema(&self) -> JsonObject {
        let mut properties = serde_json::Map::new();
        properties.insert(
            PROMPT_PARAM.to_string(),
            json!({
                "type": "string",
                "description": format!("Your request about the {} documentation", self.topic),
            }),
        );
        object_schema(properties, &[PROMPT_PARAM.to_string()])
    }

    fn execute(&self, registry: &Registry, arguments: Option<&JsonObject>) -> CallToolResult {
        let Some(prompt) = arguments
            .and_then(|args| args.get(PROMPT_PARAM))
            .and_then(Value::as_str)
        else {
            tracing::warn!(tool = %self.base.name, "Insight tool called without a string prompt");
            return CallToolResult::error(vec![Content::text("prompt must be a string")]);
        };

        let vars = HashMap::from([(PROMPT_PARAM.to_string(), prompt.to_string())]);
        render_result(
            &self.base.name,
            registry.render_template(&self.template, &vars),
        )
    }
}

/// Any tool the server can dispatch.
#[derive(Debug, Clone)]
pub enum ToolKind {
    /// Renders a registered template
    Template(TemplateTool),
    /// Renders a fixed resource around a caller prompt
    Insight(InsightTool),
}

impl ToolKind {
    /// Shared name and description.
    #[must_use]
    pub const fn base(&self) -> &ToolBase {
        match self {
            Self::Template(tool) => &tool.base,
            Self::Insight(tool) => &tool.base,
        }
    }

    /// Tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.base().name
    }

    /// Tool description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.base().description
    }

    /// Builds the protocol definition, with every parameter a required string.
    #[must_use]
    pub fn definition(&self) -> Tool {
        let schema = match self {
            Self::Template(tool) => tool.input_schema(),
            Self::Insight(tool) => tool.input_schema(),
        };
        Tool::new(
            self.name().to_string(),
            self.description().to_string(),
            Arc::new(schema),
        )
    }

    /// Invokes the tool against `registry`.
    ///
    /// Never fails at the protocol level: render errors are returned as a
    /// result with `is_error` set.
    #[must_use]
    pub fn execute(&self, registry: &Registry, arguments: Option<&JsonObject>) -> CallToolResult {
        match self {
            Self::Template(tool) => tool.execute(registry, arguments),
            Self::Insight(tool) => tool.execute(registry, arguments),
        }
    }
}

impl From<TemplateTool> for ToolKind {
    fn from(tool: TemplateTool) -> Self {
        Self::Template(tool)
    }
}

impl From<InsightTool> for ToolKind {
    fn from(tool: InsightTool) -> Self {
        Self::Insight(tool)
    }
}

/// Creates one template tool per registered template, in name order.
#[must_use]
pub fn synthesize_tools(registry: &Registry) -> Vec<ToolKind> {
    registry
        .templates()
        .map(|template| {
            tracing::debug!(
                tool = template.name(),
                params = template.variables().len(),
                "Registered prompt tool"
            );
            TemplateTool::from_template(template).into()
        })
        .collect()
}

/// Converts tool arguments to template variables.
///
/// Strings are taken verbatim. Any other JSON value is converted to its JSON
/// text, so `42` becomes `"42"` and `true` becomes `"true"`.
///
/// # Examples
///
/// ```
/// use mcp_insight_server::tools::coerce_arguments;
/// use serde_json::json;
///
/// let args = json!({"name": "Ada", "count": 3}).as_object().cloned().unwrap();
/// let vars = coerce_arguments(Some(&args));
/// assert_eq!(vars["name"], "Ada");
/// assert_eq!(vars["count"], "3");
/// ```
#[must_use]
pub fn coerce_arguments(arguments: Option<&JsonObject>) -> HashMap<String, String> {
    arguments
        .into_iter()
        .flatten()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}

fn object_schema(properties: serde_json::Map<String, Value>, required: &[String]) -> JsonObject {
    let mut schema = JsonObject::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    schema.insert("required".to_string(), json!(required));
    schema
}

fn render_result(tool: &str, rendered: mcp_insight_core::Result<String>) -> CallToolResult {
    match rendered {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => {
            tracing::warn!(tool, "Failed to render prompt: {e}");
            CallToolResult::error(vec![Content::text(format!(
                "Failed to render prompt: {e}"
            ))])
        }
    }
}
