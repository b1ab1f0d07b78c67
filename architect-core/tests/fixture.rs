use std::sync::Arc;

use architect_core::api::mock::{MockApi, MockBehavior};
use architect_core::tools::ToolOutput;
use architect_core::{Config, ToolRegistry};
use serde_json::Value;

pub struct Fixture {
    pub registry: Arc<ToolRegistry>,
    pub mock: MockApi,
}

impl Fixture {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    #[allow(dead_code)]
    pub fn with_api_key(key: &str) -> Self {
        Self::with_config(Config::default().with_api_key(key))
    }

    #[allow(dead_code)]
    pub fn with_config(config: Config) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        // Clones share the same recorded calls and behaviors
        let mock = MockApi::new();
        let registry = Arc::new(ToolRegistry::with_defaults(
            Arc::new(config),
            Arc::new(mock.clone()),
        ));

        Fixture { registry, mock }
    }

    #[allow(dead_code)]
    pub fn recommend_returns(&self, behavior: MockBehavior) -> &Self {
        self.mock.set_recommend_behavior(behavior);
        self
    }

    #[allow(dead_code)]
    pub fn models_return(&self, behavior: MockBehavior) -> &Self {
        self.mock.set_models_behavior(behavior);
        self
    }

    pub async fn call(&self, tool: &str, arguments: Value) -> ToolOutput {
        self.registry.call(tool, arguments).await
    }
}
