//! MCP stdio server
//!
//! Reads one JSON-RPC message per line, handles each request on its own
//! task and funnels responses through a single writer task. Responses may
//! leave out of order; each carries its request id.

use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::types::{
    JsonRpcRequest, JsonRpcResponse, ToolCallParams, ToolResult, DEFAULT_PROTOCOL_VERSION,
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
use crate::tools::ToolRegistry;

pub const SERVER_NAME: &str = "architectgbt-mcp";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Serve requests from `reader` until EOF, writing responses to `writer`.
///
/// In-flight requests are drained before returning.
pub async fn run<R, W>(registry: Arc<ToolRegistry>, reader: R, writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
    let writer_task = tokio::spawn(write_responses(writer, rx));

    let mut in_flight: JoinSet<()> = JoinSet::new();
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        tokio::select! {
            read = reader.read_until(b'\n', &mut buf) => {
                if read? == 0 {
                    break;
                }

                let request = match decode_line(std::mem::take(&mut buf)) {
                    Some(Ok(request)) => request,
                    Some(Err(response)) => {
                        let _ = tx.send(response);
                        continue;
                    }
                    None => continue,
                };

                let registry = registry.clone();
                let tx = tx.clone();
                in_flight.spawn(async move {
                    if let Some(response) = handle_request(&registry, request).await {
                        let _ = tx.send(response);
                    }
                });
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                log_join(joined);
            }
        }
    }

    debug!(pending = in_flight.len(), "Input closed, draining in-flight requests");
    while let Some(joined) = in_flight.join_next().await {
        log_join(joined);
    }

    drop(tx);
    writer_task.await??;
    info!("MCP server stopped");
    Ok(())
}

fn log_join(joined: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        error!(?e, "Request task failed");
    }
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_vec(&response)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    Ok(())
}

/// Decode one raw input line; `None` for blank lines. Input that is not
/// UTF-8 is answered with a parse error like any other unparseable line.
fn decode_line(bytes: Vec<u8>) -> Option<std::result::Result<JsonRpcRequest, JsonRpcResponse>> {
    let line = match String::from_utf8(bytes) {
        Ok(line) => line,
        Err(e) => {
            warn!(error = %e, "Input line is not valid UTF-8");
            return Some(Err(JsonRpcResponse::error(
                None,
                PARSE_ERROR,
                format!("Parse error: {e}"),
            )));
        }
    };
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(parse_request(line))
}

/// Decode one line. Undecodable input becomes the error response to send.
pub fn parse_request(line: &str) -> std::result::Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        warn!(error = %e, "Unparseable JSON-RPC line");
        JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}"))
    })?;

    let id = value.get("id").cloned();
    serde_json::from_value(value).map_err(|e| {
        warn!(error = %e, "Invalid JSON-RPC request");
        JsonRpcResponse::error(id, INVALID_REQUEST, format!("Invalid request: {e}"))
    })
}

/// Produce the response for one request, or `None` for notifications.
pub async fn handle_request(registry: &ToolRegistry, req: JsonRpcRequest) -> Option<JsonRpcResponse> {
    if req.is_notification() {
        debug!(method = %req.method, "Notification received");
        return None;
    }

    let id = req.id.clone();
    let response = match req.method.as_str() {
        "initialize" => handle_initialize(id, &req.params),
        "ping" => JsonRpcResponse::success(id, json!({})),
        "tools/list" => handle_tools_list(id, registry),
        "tools/call" => handle_tools_call(id, req.params, registry).await,
        other => {
            warn!(method = %other, "Unknown method");
            JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Unknown method: {other}"))
        }
    };
    Some(response)
}

fn handle_initialize(id: Option<Value>, params: &Value) -> JsonRpcResponse {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);
    info!(protocol_version, "Client initialized");

    JsonRpcResponse::success(
        id,
        json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            }
        }),
    )
}

fn handle_tools_list(id: Option<Value>, registry: &ToolRegistry) -> JsonRpcResponse {
    match serde_json::to_value(registry.get_tool_definitions()) {
        Ok(tools) => JsonRpcResponse::success(id, json!({ "tools": tools })),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
    }
}

async fn handle_tools_call(id: Option<Value>, params: Value, registry: &ToolRegistry) -> JsonRpcResponse {
    let call_params: ToolCallParams = match serde_json::from_value(params) {
        Ok(p) => p,
        Err(e) => {
            return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}"));
        }
    };

    debug!(tool_name = %call_params.name, "Tool call");
    let result = ToolResult::from(registry.call(&call_params.name, call_params.arguments).await);

    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
    }
}
