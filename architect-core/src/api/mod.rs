pub mod error;
pub mod http;
pub mod mock;
pub mod provider;
pub mod types;

pub use error::ApiError;
pub use http::HttpArchitectApi;
pub use provider::ArchitectApi;
pub use types::*;
