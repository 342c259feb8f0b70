//! MCP service exposing the registry as tools, prompts and resources.
//!
//! `InsightService` serves three views of one frozen [`Registry`]:
//! 1. tools - one per template plus configured insight tools
//! 2. prompts - every template, rendered into a single user message
//! 3. resources - every loaded resource as `insight://<name>`

use crate::tools::ToolKind;
use mcp_insight_core::Registry;
use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    AnnotateAble, Annotations, CallToolRequestParam, CallToolResult, GetPromptRequestParam,
    GetPromptResult, Implementation, JsonObject, ListPromptsResult, ListResourcesResult,
    ListToolsResult, PaginatedRequestParam, Prompt, PromptArgument, PromptMessage,
    PromptMessageRole, ProtocolVersion, RawResource, ReadResourceRequestParam,
    ReadResourceResult, Resource, ResourceContents, Role, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::ErrorData as McpError;
use rmcp::service::{RequestContext, RoleServer};
use std::collections::BTreeMap;
use std::sync::Arc;

/// URI scheme of exposed resources.
pub const RESOURCE_SCHEME: &str = "insight://";

const RESOURCE_MIME_TYPE: &str = "text/plain";

/// Priority advertised for every resource.
const RESOURCE_PRIORITY: f32 = 0.8;

/// MCP server over a frozen prompt and resource registry.
///
/// # Examples
///
/// ```no_run
/// use mcp_insight_core::Registry;
/// use mcp_insight_server::InsightService;
/// use mcp_insight_server::tools::synthesize_tools;
/// use rmcp::ServiceExt;
/// use rmcp::transport::stdio;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let registry = Arc::new(Registry::builder().build());
/// let tools = synthesize_tools(&registry);
/// let service = InsightService::new(registry, tools).serve(stdio()).await?;
/// service.waiting().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct InsightService {
    /// Shared read-only registry
    registry: Arc<Registry>,

    /// Tools by name
    tools: Arc<BTreeMap<String, ToolKind>>,
}

impl InsightService {
    /// Creates a service dispatching `tools` against `registry`.
    ///
    /// When two tools share a name the later one replaces the earlier one.
    #[must_use]
    pub fn new(registry: Arc<Registry>, tools: impl IntoIterator<Item = ToolKind>) -> Self {
        let mut by_name = BTreeMap::new();
        for tool in tools {
            let name = tool.name().to_string();
            if let Some(previous) = by_name.insert(name, tool) {
                tracing::warn!(tool = previous.name(), "Tool name registered twice, replacing");
            }
        }

        tracing::info!(tools = by_name.len(), "Tools registered");
        Self {
            registry,
            tools: Arc::new(by_name),
        }
    }

    /// The registry served by this instance.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Looks up a tool by name.
    #[must_use]
    pub fn tool(&self, name: &str) -> Option<&ToolKind> {
        self.tools.get(name)
    }

    /// Protocol definitions of every tool, in name order.
    #[must_use]
    pub fn tool_definitions(&self) -> Vec<Tool> {
        self.tools.values().map(ToolKind::definition).collect()
    }

    /// Invokes the named tool.
    ///
    /// # Errors
    ///
    /// Returns `invalid_params` if no tool has that name. Render failures
    /// are successful responses carrying an error result.
    pub fn call(&self, name: &str, arguments: Option<&JsonObject>) -> Result<CallToolResult, McpError> {
        let tool = self.tools.get(name).ok_or_else(|| {
            tracing::warn!(tool = name, "Unknown tool called");
            McpError::invalid_params(format!("unknown tool '{name}'"), None)
        })?;

        tracing::debug!(tool = name, "Calling tool");
        Ok(tool.execute(&self.registry, arguments))
    }

    /// Prompt listing built from the registry's templates.
    #[must_use]
    pub fn prompt_list(&self) -> Vec<Prompt> {
        self.registry
            .prompt_descriptors()
            .into_iter()
            .map(|descriptor| {
                let arguments = descriptor
                    .arguments
                    .iter()
                    .map(|arg| PromptArgument {
                        name: arg.clone(),
                        title: None,
                        description: Some(format!("Parameter {arg} for {}", descriptor.name)),
                        required: Some(true),
                    })
                    .collect();
                Prompt::new(descriptor.name, Some(descriptor.description), Some(arguments))
            })
            .collect()
    }

    /// Renders the named prompt into a single user message.
    ///
    /// # Errors
    ///
    /// Returns `invalid_params` for an unknown prompt or a missing argument.
    pub fn prompt(
        &self,
        name: &str,
        arguments: Option<&JsonObject>,
    ) -> Result<GetPromptResult, McpError> {
        let template = self.registry.get_template(name).ok_or_else(|| {
            McpError::invalid_params(format!("prompt '{name}' not found"), None)
        })?;

        let vars = crate::tools::coerce_arguments(arguments);
        let text = self
            .registry
            .render_template(template, &vars)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        Ok(GetPromptResult {
            description: Some(template.description().to_string()),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }

    /// Resource listing built from the registry's resources.
    #[must_use]
    pub fn resource_list(&self) -> Vec<Resource> {
        self.registry
            .resources()
            .map(|resource| {
                let mut raw = RawResource::new(resource_uri(&resource.name), resource.name.clone());
                raw.description = Some(format!("Resource for {}", resource.name));
                raw.mime_type = Some(RESOURCE_MIME_TYPE.to_string());
                raw.size = u32::try_from(resource.content.len()).ok();
                raw.annotate(Annotations {
                    audience: Some(vec![Role::Assistant]),
                    priority: Some(RESOURCE_PRIORITY),
                    ..Annotations::default()
                })
            })
            .collect()
    }

    /// Reads a resource by `insight://<name>` URI or bare name.
    ///
    /// # Errors
    ///
    /// Returns `resource_not_found` if no resource matches.
    pub fn read(&self, uri: &str) -> Result<ReadResourceResult, McpError> {
        let name = uri.strip_prefix(RESOURCE_SCHEME).unwrap_or(uri);
        let resource = self.registry.get_resource(name).ok_or_else(|| {
            McpError::resource_not_found(format!("resource '{uri}' not found"), None)
        })?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(
                resource.content.clone(),
                resource_uri(&resource.name),
            )],
        })
    }
}

/// URI under which a resource is exposed.
#[must_use]
pub fn resource_uri(name: &str) -> String {
    format!("{RESOURCE_SCHEME}{name}")
}

impl ServerHandler for InsightService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_prompts()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Documentation-augmented prompts. Call a prompt tool with its named \
                 parameters, or an insight tool with a free-form prompt, to get a \
                 ready-to-use request that embeds the relevant documentation."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tool_definitions()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call(&request.name, request.arguments.as_ref())
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult::with_all_items(self.prompt_list()))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        self.prompt(&request.name, request.arguments.as_ref())
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(self.resource_list()))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        self.read(&request.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{InsightTool, synthesize_tools};
    use mcp_insight_core::{PromptTemplate, Resource as InsightResource};

    fn service() -> InsightService {
        let mut builder = Registry::builder();
        builder
            .insert_resource(InsightResource::new("model", "field docs"))
            .insert_template(PromptTemplate::new("greet", "Says hello", "Hello {{name}}!"));
        let registry = Arc::new(builder.build());
        let tools = synthesize_tools(&registry);
        InsightService::new(registry, tools)
    }

    #[test]
    fn test_get_info_capabilities() {
        let info = service().get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.prompts.is_some());
        assert!(info.capabilities.resources.is_some());
        assert!(info.instructions.is_some());
    }

    #[test]
    fn test_unknown_tool_is_invalid_params() {
        let err = service().call("nope", None).unwrap_err();
        assert!(err.message.contains("unknown tool 'nope'"));
    }

    #[test]
    fn test_later_tool_replaces_earlier() {
        let registry = Arc::new(Registry::builder().build());
        let tools = vec![
            InsightTool::new("dup", "first", "model", "model").into(),
            InsightTool::new("dup", "second", "model", "model").into(),
        ];
        let service = InsightService::new(registry, tools);

        assert_eq!(service.tool_definitions().len(), 1);
        assert_eq!(service.tool("dup").unwrap().description(), "second");
    }

    #[test]
    fn test_prompt_list_arguments_required() {
        let prompts = service().prompt_list();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].name, "greet");

        let arguments = prompts[0].arguments.as_ref().unwrap();
        assert_eq!(arguments.len(), 1);
        assert_eq!(arguments[0].name, "name");
        assert_eq!(arguments[0].required, Some(true));
    }

    #[test]
    fn test_read_resource_by_uri_and_bare_name() {
        let service = service();
        for uri in ["insight://model", "model"] {
            let result = service.read(uri).unwrap();
            match &result.contents[0] {
                ResourceContents::TextResourceContents { uri, text, .. } => {
                    assert_eq!(uri, "insight://model");
                    assert_eq!(text, "field docs");
                }
                other => panic!("unexpected contents: {other:?}"),
            }
        }
    }

    #[test]
    fn test_resource_list_annotated_for_assistant() {
        let resources = service().resource_list();
        assert_eq!(resources.len(), 1);

        let annotations = resources[0].annotations.as_ref().unwrap();
        assert_eq!(annotations.audience, Some(vec![Role::Assistant]));
        assert_eq!(annotations.priority, Some(RESOURCE_PRIORITY));
        assert!(annotations.last_modified.is_none());
    }

    #[test]
    fn test_read_unknown_resource() {
        assert!(service().read("insight://missing").is_err());
    }
}
