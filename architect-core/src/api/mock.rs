use std::sync::{Arc, Mutex};

use crate::api::{error::ApiError, provider::ArchitectApi, types::*};

/// Canned behavior for one endpoint of the mock service
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Reply with this status and body
    Reply(ApiReply),
    /// Fail before any response is received
    Unreachable(String),
}

impl MockBehavior {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self::Reply(ApiReply::new(status, body.to_string()))
    }

    pub fn status(status: u16) -> Self {
        Self::Reply(ApiReply::new(status, ""))
    }

    fn produce(&self) -> Result<ApiReply, ApiError> {
        match self {
            Self::Reply(reply) => Ok(reply.clone()),
            Self::Unreachable(reason) => Err(ApiError::Connection(reason.clone())),
        }
    }
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self::status(200)
    }
}

/// In-memory stand-in for the ArchitectGBT service.
///
/// Every call returns the configured behavior and is recorded, so tests can
/// assert both on the rendered output and on whether the network was touched.
#[derive(Clone, Default)]
pub struct MockApi {
    recommend_behavior: Arc<Mutex<MockBehavior>>,
    models_behavior: Arc<Mutex<MockBehavior>>,
    captured_requests: Arc<Mutex<Vec<RecommendRequest>>>,
    models_calls: Arc<Mutex<usize>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recommend(self, behavior: MockBehavior) -> Self {
        self.set_recommend_behavior(behavior);
        self
    }

    pub fn with_models(self, behavior: MockBehavior) -> Self {
        self.set_models_behavior(behavior);
        self
    }

    pub fn set_recommend_behavior(&self, behavior: MockBehavior) {
        *self.recommend_behavior.lock().unwrap_or_else(|e| e.into_inner()) = behavior;
    }

    pub fn set_models_behavior(&self, behavior: MockBehavior) {
        *self.models_behavior.lock().unwrap_or_else(|e| e.into_inner()) = behavior;
    }

    pub fn get_captured_requests(&self) -> Vec<RecommendRequest> {
        self.captured_requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn recommend_calls(&self) -> usize {
        self.captured_requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn models_calls(&self) -> usize {
        *self.models_calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Total outbound calls across both endpoints
    pub fn total_calls(&self) -> usize {
        self.recommend_calls() + self.models_calls()
    }
}

#[async_trait::async_trait]
impl ArchitectApi for MockApi {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn recommend(&self, request: &RecommendRequest) -> Result<ApiReply, ApiError> {
        self.captured_requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        let behavior = self
            .recommend_behavior
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        behavior.produce()
    }

    async fn list_models(&self) -> Result<ApiReply, ApiError> {
        *self.models_calls.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        let behavior = self
            .models_behavior
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        behavior.produce()
    }
}
