pub mod api;
pub mod config;
pub mod format;
pub mod mcp;
pub mod templates;
pub mod tools;

pub use config::Config;
pub use tools::ToolRegistry;
