use architect_core::api::mock::MockBehavior;
use architect_core::mcp::{self, types::JsonRpcResponse};
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;

mod fixture;

use fixture::Fixture;

/// Feed `input` to the server and collect every response line.
async fn exchange(fixture: &Fixture, input: &str) -> Vec<JsonRpcResponse> {
    exchange_bytes(fixture, input.as_bytes()).await
}

async fn exchange_bytes(fixture: &Fixture, input: &[u8]) -> Vec<JsonRpcResponse> {
    let (server_out, mut client_in) = tokio::io::duplex(1 << 20);

    mcp::run(fixture.registry.clone(), input, server_out)
        .await
        .unwrap();

    let mut output = String::new();
    client_in.read_to_string(&mut output).await.unwrap();
    output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn by_id(responses: &[JsonRpcResponse], id: Value) -> &JsonRpcResponse {
    responses
        .iter()
        .find(|r| r.id.as_ref() == Some(&id))
        .unwrap_or_else(|| panic!("no response for id {id}"))
}

#[tokio::test]
async fn test_handshake_and_tool_listing() {
    let fixture = Fixture::new();
    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize",
               "params": {"protocolVersion": "2024-11-05", "capabilities": {},
                          "clientInfo": {"name": "test", "version": "1"}}}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}),
    ]
    .iter()
    .map(Value::to_string)
    .collect::<Vec<_>>()
    .join("\n");

    let responses = exchange(&fixture, &input).await;
    assert_eq!(responses.len(), 3);

    let init = by_id(&responses, json!(1)).result.clone().unwrap();
    assert_eq!(init["protocolVersion"], "2024-11-05");
    assert_eq!(init["capabilities"], json!({"tools": {}}));

    let tools = by_id(&responses, json!(2)).result.clone().unwrap();
    let names: Vec<&str> = tools["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["get_ai_recommendation", "get_code_template", "list_models"]);
    assert_eq!(tools["tools"][0]["inputSchema"]["required"], json!(["prompt"]));

    assert_eq!(by_id(&responses, json!(3)).result, Some(json!({})));
}

#[tokio::test]
async fn test_tool_call_round_trip() {
    let fixture = Fixture::new();
    fixture.models_return(MockBehavior::json(
        200,
        json!([{"name": "GPT-4o", "provider": "OpenAI", "input_cost_per_1k": 0.0025}]),
    ));

    let input = format!(
        "{}\n{}\n",
        json!({"jsonrpc": "2.0", "id": "a", "method": "tools/call",
               "params": {"name": "list_models", "arguments": {}}}),
        json!({"jsonrpc": "2.0", "id": "b", "method": "tools/call",
               "params": {"name": "get_code_template", "arguments": {"model": "nope"}}}),
    );

    let responses = exchange(&fixture, &input).await;
    assert_eq!(responses.len(), 2);

    let listing = by_id(&responses, json!("a")).result.clone().unwrap();
    assert_eq!(listing["content"][0]["type"], "text");
    assert!(listing["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("| GPT-4o | OpenAI | $2.50 | $? |"));
    assert!(listing.get("isError").is_none());

    let template = by_id(&responses, json!("b")).result.clone().unwrap();
    assert!(template["content"][0]["text"]
        .as_str()
        .unwrap()
        .starts_with("No template found"));
}

#[tokio::test]
async fn test_tool_errors_are_results() {
    let fixture = Fixture::new();
    let input = json!({"jsonrpc": "2.0", "id": 7, "method": "tools/call",
                       "params": {"name": "get_ai_recommendation", "arguments": {}}})
    .to_string();

    let responses = exchange(&fixture, &input).await;
    let result = responses[0].result.clone().unwrap();
    assert_eq!(result["isError"], true);
    assert_eq!(fixture.mock.total_calls(), 0);
}

#[tokio::test]
async fn test_protocol_errors() {
    let fixture = Fixture::new();
    let input = format!(
        "this is not json\n\n{}\n{}\n",
        json!({"jsonrpc": "2.0", "id": 1, "method": "prompts/list"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"arguments": {}}}),
    );

    let responses = exchange(&fixture, &input).await;
    assert_eq!(responses.len(), 3);

    let parse_error = responses.iter().find(|r| r.id.is_none()).unwrap();
    assert_eq!(parse_error.error.as_ref().unwrap().code, -32700);
    assert_eq!(by_id(&responses, json!(1)).error.as_ref().unwrap().code, -32601);
    assert_eq!(by_id(&responses, json!(2)).error.as_ref().unwrap().code, -32602);
}

#[tokio::test]
async fn test_empty_input_exits_cleanly() {
    let fixture = Fixture::new();
    assert!(exchange(&fixture, "").await.is_empty());
}

#[tokio::test]
async fn test_invalid_utf8_line_keeps_serving() {
    let fixture = Fixture::new();
    let mut input = b"\xff\xfe garbage\n".to_vec();
    input.extend_from_slice(br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#);
    input.push(b'\n');

    let responses = exchange_bytes(&fixture, &input).await;
    assert_eq!(responses.len(), 2);

    let parse_error = responses.iter().find(|r| r.id.is_none()).unwrap();
    assert_eq!(parse_error.error.as_ref().unwrap().code, -32700);
    assert_eq!(by_id(&responses, json!(1)).result, Some(json!({})));
}

#[tokio::test]
async fn test_last_line_without_newline_is_served() {
    let fixture = Fixture::new();
    let responses = exchange(&fixture, r#"{"jsonrpc":"2.0","id":9,"method":"ping"}"#).await;
    assert_eq!(responses.len(), 1);
    assert_eq!(by_id(&responses, json!(9)).result, Some(json!({})));
}

#[tokio::test]
async fn test_null_id_request_is_answered() {
    let fixture = Fixture::new();
    let responses = exchange(&fixture, r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].id, None);
    assert_eq!(responses[0].result, Some(json!({})));
}
