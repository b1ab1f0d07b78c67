use std::sync::Arc;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Request passed to tool execution
#[derive(Debug, Clone)]
pub struct ToolRequest {
    /// The arguments for the tool, always a JSON object
    pub arguments: Value,
}

impl ToolRequest {
    /// Create a new tool request; absent (`null`) arguments become `{}`
    pub fn new(arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        Self { arguments }
    }

    /// Deserialize the arguments into the tool's parameter struct
    pub fn parse<T: DeserializeOwned>(&self, tool_name: &str) -> Result<T> {
        serde_json::from_value(self.arguments.clone())
            .map_err(|e| anyhow::anyhow!("Invalid arguments for {tool_name}: {e}"))
    }
}

/// Textual result of a tool, as returned to the MCP host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub content: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// Descriptor advertised through `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[async_trait::async_trait]
pub trait ToolExecutor: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> Value;

    /// Run the tool. Validation failures are returned as `Err`; every
    /// failure after validation is rendered into the returned output.
    async fn execute(&self, request: &ToolRequest) -> Result<ToolOutput>;
}

pub type SharedTool = Arc<dyn ToolExecutor>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Params {
        #[serde(default)]
        limit: Option<u32>,
    }

    #[test]
    fn test_null_arguments_become_empty_object() {
        let request = ToolRequest::new(Value::Null);
        assert_eq!(request.arguments, json!({}));
        let params: Params = request.parse("demo").unwrap();
        assert!(params.limit.is_none());
    }

    #[test]
    fn test_parse_error_names_tool() {
        let request = ToolRequest::new(json!({"limit": "ten"}));
        let err = request.parse::<Params>("demo").unwrap_err();
        assert!(err.to_string().starts_with("Invalid arguments for demo:"));
    }

    #[test]
    fn test_definition_serializes_camel_case_schema() {
        let def = ToolDefinition {
            name: "t".into(),
            description: "d".into(),
            input_schema: json!({"type": "object"}),
        };
        let value = serde_json::to_value(def).unwrap();
        assert!(value.get("inputSchema").is_some());
    }
}
