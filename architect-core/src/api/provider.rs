use crate::api::{error::ApiError, types::*};

/// Transport to the ArchitectGBT service.
///
/// Implementations perform exactly one HTTP exchange per call and hand back
/// the raw status and body; interpreting status codes is left to the tools.
#[async_trait::async_trait]
pub trait ArchitectApi: Send + Sync {
    fn name(&self) -> &'static str;

    async fn recommend(&self, request: &RecommendRequest) -> Result<ApiReply, ApiError>;

    async fn list_models(&self) -> Result<ApiReply, ApiError>;
}
