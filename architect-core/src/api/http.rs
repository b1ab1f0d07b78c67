use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use crate::api::{error::ApiError, provider::ArchitectApi, types::*};
use crate::config::{Config, CONNECT_TIMEOUT_SECS, USER_AGENT};

const RESET_HEADERS: [&str; 2] = ["x-ratelimit-reset", "retry-after"];

/// reqwest-backed client for the ArchitectGBT HTTP API.
#[derive(Clone)]
pub struct HttpArchitectApi {
    client: Client,
    config: Arc<Config>,
}

impl HttpArchitectApi {
    pub fn new(config: Arc<Config>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { client, config })
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn into_reply(response: Response) -> Result<ApiReply, ApiError> {
        let status = response.status().as_u16();
        let reset_header = reset_header(response.headers());
        let body = response.text().await?;
        debug!(status, body_len = body.len(), "ArchitectGBT API replied");

        Ok(ApiReply {
            status,
            body,
            reset_header,
        })
    }
}

fn reset_header(headers: &HeaderMap) -> Option<String> {
    RESET_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

#[async_trait::async_trait]
impl ArchitectApi for HttpArchitectApi {
    fn name(&self) -> &'static str {
        "ArchitectGBT"
    }

    async fn recommend(&self, request: &RecommendRequest) -> Result<ApiReply, ApiError> {
        let url = self.config.recommend_url();
        debug!(%url, authenticated = self.config.has_api_key(), "Requesting recommendation");

        let response = self
            .authorize(self.client.post(&url))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                debug!(?e, "Recommendation request failed");
                ApiError::from(e)
            })?;

        Self::into_reply(response).await
    }

    async fn list_models(&self) -> Result<ApiReply, ApiError> {
        let url = self.config.models_url();
        debug!(%url, "Fetching model catalog");

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| {
                debug!(?e, "Catalog request failed");
                ApiError::from(e)
            })?;

        Self::into_reply(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_client_creation() {
        let api = HttpArchitectApi::new(Arc::new(Config::default()));
        assert!(api.is_ok());
    }

    #[test]
    fn test_reset_header_prefers_ratelimit_reset() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("3600"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("2026-01-01T00:00:00Z"));
        assert_eq!(reset_header(&headers).as_deref(), Some("2026-01-01T00:00:00Z"));
    }

    #[test]
    fn test_reset_header_absent() {
        assert_eq!(reset_header(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let config = Config::default().with_api_url("http://127.0.0.1:1");
        let api = HttpArchitectApi::new(Arc::new(config)).unwrap();
        let result = api.list_models().await;
        assert!(matches!(result, Err(ApiError::Network(_))));
    }
}
