use std::sync::Arc;
use std::time::Duration;

use architect_core::api::{ApiError, ArchitectApi, HttpArchitectApi, RecommendRequest};
use architect_core::{Config, ToolRegistry};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// One-shot HTTP server returning a canned response and handing back the raw request.
struct StubServer {
    url: String,
    request: JoinHandle<String>,
}

impl StubServer {
    async fn reply(status: u16, headers: &[(&str, &str)], body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let mut response = format!(
            "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n",
            body.len()
        );
        for (name, value) in headers {
            response.push_str(&format!("{name}: {value}\r\n"));
        }
        response.push_str("\r\n");
        response.push_str(body);

        let request = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            request
        });

        Self { url, request }
    }

    /// Accept a connection and never answer.
    async fn silent() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let request = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            tokio::time::sleep(Duration::from_secs(5)).await;
            request
        });
        Self { url, request }
    }

    async fn received(self) -> String {
        self.request.await.unwrap()
    }
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn client(config: Config) -> HttpArchitectApi {
    HttpArchitectApi::new(Arc::new(config)).unwrap()
}

fn request(prompt: &str) -> RecommendRequest {
    RecommendRequest {
        prompt: prompt.into(),
        budget: None,
        priority: None,
    }
}

#[tokio::test]
async fn test_public_recommend_path_without_key() {
    let stub = StubServer::reply(200, &[], r#"{"recommendations": []}"#).await;
    let api = client(Config::default().with_api_url(&stub.url));

    let reply = api.recommend(&request("ocr pipeline")).await.unwrap();
    assert_eq!(reply.status, 200);

    let raw = stub.received().await;
    assert!(raw.starts_with("POST /api/recommend/public HTTP/1.1"), "{raw}");
    assert!(!raw.to_lowercase().contains("authorization:"));
    assert!(raw.ends_with(r#"{"prompt":"ocr pipeline"}"#));
}

#[tokio::test]
async fn test_authenticated_recommend_sends_bearer() {
    let stub = StubServer::reply(200, &[], r#"{"recommendations": []}"#).await;
    let api = client(
        Config::default()
            .with_api_url(format!("{}/", stub.url))
            .with_api_key("agbt_live"),
    );

    api.recommend(&request("chatbot")).await.unwrap();

    let raw = stub.received().await;
    assert!(raw.starts_with("POST /api/mcp/recommend HTTP/1.1"), "{raw}");
    assert!(raw.to_lowercase().contains("authorization: bearer agbt_live"));
}

#[tokio::test]
async fn test_rate_limit_header_is_captured() {
    let stub = StubServer::reply(
        429,
        &[("retry-after", "120"), ("x-ratelimit-reset", "2026-10-19T00:00:00Z")],
        r#"{"error": "Too many requests"}"#,
    )
    .await;
    let api = client(Config::default().with_api_url(&stub.url));

    let reply = api.recommend(&request("chatbot")).await.unwrap();
    assert_eq!(reply.status, 429);
    assert_eq!(reply.reset_header.as_deref(), Some("2026-10-19T00:00:00Z"));
    assert_eq!(reply.body, r#"{"error": "Too many requests"}"#);
}

#[tokio::test]
async fn test_catalog_is_a_get() {
    let stub = StubServer::reply(200, &[], "[]").await;
    let api = client(Config::default().with_api_url(&stub.url));

    let reply = api.list_models().await.unwrap();
    assert_eq!(reply.body, "[]");

    let raw = stub.received().await;
    assert!(raw.starts_with("GET /api/models HTTP/1.1"), "{raw}");
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let stub = StubServer::silent().await;
    let api = client(Config {
        request_timeout: Duration::from_millis(200),
        ..Config::default().with_api_url(&stub.url)
    });

    let err = api.list_models().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(err.to_string(), "Request timed out");
}

#[tokio::test]
async fn test_list_models_tool_over_http() {
    let stub = StubServer::reply(
        200,
        &[],
        &json!({"success": true, "data": [
            {"name": "Claude Haiku", "provider": "Anthropic",
             "input_cost_per_1k": 0.0008, "output_cost_per_1k": 0.004}
        ]})
        .to_string(),
    )
    .await;
    let config = Arc::new(Config::default().with_api_url(&stub.url));
    let api = Arc::new(HttpArchitectApi::new(config.clone()).unwrap());
    let registry = ToolRegistry::with_defaults(config, api);

    let output = registry.call("list_models", json!({"provider": "Anthropic"})).await;
    assert!(!output.is_error, "{}", output.content);
    assert!(output.content.contains("| Claude Haiku | Anthropic | $0.80 | $4.00 |"));
}
