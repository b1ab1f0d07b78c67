pub mod list_models;
pub mod recommendation;
pub mod registry;
pub mod template;
pub mod r#trait;

pub use list_models::ListModels;
pub use recommendation::GetRecommendation;
pub use registry::ToolRegistry;
pub use template::GetCodeTemplate;
pub use r#trait::{SharedTool, ToolDefinition, ToolExecutor, ToolOutput, ToolRequest};
