//! MCP stdio server
//!
//! Manual implementation of the Model Context Protocol over newline-delimited
//! JSON-RPC on stdin/stdout.

pub mod server;
pub mod types;

pub use server::run;
