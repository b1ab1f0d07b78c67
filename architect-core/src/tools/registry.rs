use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::api::ArchitectApi;
use crate::config::Config;
use crate::tools::r#trait::{SharedTool, ToolDefinition, ToolOutput, ToolRequest};
use crate::tools::{GetCodeTemplate, GetRecommendation, ListModels};

/// Name-keyed dispatcher for the server's tools.
pub struct ToolRegistry {
    tools: BTreeMap<String, SharedTool>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<SharedTool>) -> Self {
        let mut registry = Self {
            tools: BTreeMap::new(),
        };

        for tool in tools {
            registry.register_tool(tool);
        }

        registry
    }

    /// The three ArchitectGBT tools sharing one config snapshot and API client
    pub fn with_defaults(config: Arc<Config>, api: Arc<dyn ArchitectApi>) -> Self {
        info!(api = api.name(), base_url = %config.base_url(), "Registering default tools");
        Self::new(vec![
            Arc::new(GetRecommendation::new(config.clone(), api.clone())) as SharedTool,
            Arc::new(GetCodeTemplate::new(config.clone())) as SharedTool,
            Arc::new(ListModels::new(config, api)) as SharedTool,
        ])
    }

    pub fn register_tool(&mut self, tool: SharedTool) {
        let name = tool.name().to_string();
        debug!(tool_name = %name, "Registering tool");
        self.tools.insert(name, tool);
    }

    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
            })
            .collect()
    }

    /// Invoke a tool by name. Never fails: unknown tools and handler errors
    /// come back as error outputs.
    pub async fn call(&self, name: &str, arguments: Value) -> ToolOutput {
        let Some(tool) = self.tools.get(name) else {
            error!(tool_name = %name, "Unknown tool");
            return ToolOutput::error(format!("Unknown tool: {name}"));
        };

        let request = ToolRequest::new(arguments);
        match tool.execute(&request).await {
            Ok(output) => {
                info!(tool_name = %name, is_error = output.is_error, "Tool call finished");
                output
            }
            Err(e) => {
                error!(?e, tool_name = %name, "Tool processing failed");
                ToolOutput::error(format!("Error: {e}"))
            }
        }
    }

    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}
