//! HTTP front-end: JSON-RPC over POST `/mcp` with unary-or-stream
//! responses, plus `/health` and `/` service endpoints.
//!
//! [`serve`] wires the vault, tool registry, and router into a running
//! axum server with graceful ctrl-c shutdown. Request handling is split
//! out of the endpoint so tests can drive it without a socket.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::config::VaultgateConfig;
use crate::protocol::{
    self, JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND,
    PARSE_ERROR, PROTOCOL_VERSION,
};
use crate::resources;
use crate::stream;
use crate::tools::VaultTools;
use crate::vault::Vault;

const SERVER_NAME: &str = "vaultgate";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone)]
pub struct GatewayState {
    pub tools: Arc<VaultTools>,
}

pub fn router(tools: Arc<VaultTools>) -> Router {
    Router::new()
        .route("/mcp", post(mcp_endpoint))
        .route("/health", get(health))
        .route("/", get(root_info))
        .with_state(GatewayState { tools })
}

/// Start the gateway on the configured address.
pub async fn serve(config: VaultgateConfig) -> anyhow::Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    let vault = Arc::new(Vault::new(config)?);
    let tools = Arc::new(VaultTools::new(vault));
    let app = router(tools);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "{SERVER_NAME} listening at http://{bind_addr}/mcp");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to listen for ctrl-c");
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}

async fn root_info() -> Json<Value> {
    Json(json!({
        "name": SERVER_NAME,
        "version": SERVER_VERSION,
        "endpoints": { "mcp": "/mcp", "health": "/health" },
    }))
}

async fn health(State(state): State<GatewayState>) -> Json<Value> {
    let upstream_connected = state.tools.vault().health_check().await;
    Json(json!({
        "status": "healthy",
        "service": SERVER_NAME,
        "upstream_connected": upstream_connected,
    }))
}

fn accepts_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(|accept| accept.contains("text/event-stream"))
        .unwrap_or(false)
}

/// HTTP status for a JSON-RPC outcome, matching code severity.
fn http_status(response: &JsonRpcResponse) -> StatusCode {
    match response.error.as_ref().map(|e| e.code) {
        None => StatusCode::OK,
        Some(METHOD_NOT_FOUND) => StatusCode::NOT_FOUND,
        Some(INTERNAL_ERROR) => StatusCode::INTERNAL_SERVER_ERROR,
        Some(_) => StatusCode::BAD_REQUEST,
    }
}

async fn mcp_endpoint(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let parsed: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            let response = JsonRpcResponse::error_with_data(
                Value::Null,
                PARSE_ERROR,
                "Parse error",
                Some(Value::String(e.to_string())),
            );
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        }
    };

    let request = match protocol::validate_request(parsed) {
        Ok(request) => request,
        Err(response) => return (StatusCode::BAD_REQUEST, Json(response)).into_response(),
    };

    tracing::debug!(method = %request.method, "mcp request");

    // Notifications get an acknowledgment without a response body.
    if request.method.starts_with("notifications/") {
        return StatusCode::NO_CONTENT.into_response();
    }

    let wants_stream = accepts_event_stream(&headers);
    let response = handle_request(&state, request).await;
    let status = http_status(&response);

    if status == StatusCode::OK && wants_stream {
        if let Some(payload) = response.result.as_ref().and_then(stream::stream_payload) {
            let sse = stream::encode_sse(&stream::frames(&payload));
            return (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/event-stream"),
                    (header::CACHE_CONTROL, "no-cache"),
                ],
                sse,
            )
                .into_response();
        }
    }

    (status, Json(response)).into_response()
}

/// Route a validated request to its handler. Every arm produces a full
/// JSON-RPC response; only the transport layer above decides unary vs
/// stream.
pub async fn handle_request(state: &GatewayState, request: JsonRpcRequest) -> JsonRpcResponse {
    let JsonRpcRequest {
        id, method, params, ..
    } = request;

    match method.as_str() {
        "initialize" => handle_initialize(state, id),
        "ping" => match state.tools.dispatch("ping", json!({})).await {
            Ok(envelope) => JsonRpcResponse::success(
                id,
                serde_json::to_value(envelope).unwrap_or_default(),
            ),
            Err(error) => protocol::tool_error_response(id, error),
        },
        "tools/list" => {
            JsonRpcResponse::success(id, json!({ "tools": state.tools.definitions() }))
        }
        "tools/call" => handle_tools_call(state, id, params).await,
        "resources/list" => {
            let resources = resources::list_resources(state.tools.vault()).await;
            JsonRpcResponse::success(id, json!({ "resources": resources }))
        }
        "resources/read" => handle_resources_read(state, id, params).await,
        other => JsonRpcResponse::error(
            id,
            METHOD_NOT_FOUND,
            format!("Method not found: {other}"),
        ),
    }
}

fn handle_initialize(state: &GatewayState, id: Value) -> JsonRpcResponse {
    let tool_count = state.tools.definitions().len();
    // Resource count only when a fresh structure is at hand; initialize
    // itself never touches the upstream.
    let resource_count = state
        .tools
        .vault()
        .cached_structure()
        .map(|s| 1 + s.total_folders + s.total_notes);

    JsonRpcResponse::success(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": true },
                "resources": { "subscribe": false, "listChanged": true },
                "logging": {},
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION,
            },
            "toolCount": tool_count,
            "resourceCount": resource_count,
        }),
    )
}

async fn handle_tools_call(state: &GatewayState, id: Value, params: Value) -> JsonRpcResponse {
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::error(
            id,
            INVALID_PARAMS,
            "Invalid params: missing 'name' in tools/call params",
        );
    };
    let arguments = params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| json!({}));

    match state.tools.dispatch(name, arguments).await {
        Ok(envelope) => {
            JsonRpcResponse::success(id, serde_json::to_value(envelope).unwrap_or_default())
        }
        Err(error) => {
            tracing::debug!(tool = %name, %error, "tool call failed");
            protocol::tool_error_response(id, error)
        }
    }
}

async fn handle_resources_read(
    state: &GatewayState,
    id: Value,
    params: Value,
) -> JsonRpcResponse {
    let Some(uri) = params.get("uri").and_then(Value::as_str) else {
        return JsonRpcResponse::error(
            id,
            INVALID_PARAMS,
            "Invalid params: missing 'uri' in resources/read params",
        );
    };

    match resources::read_resource(state.tools.vault(), uri).await {
        Ok(content) => JsonRpcResponse::success(id, json!({ "contents": [content] })),
        Err(error) => {
            tracing::debug!(uri = %uri, %error, "resource read failed");
            protocol::resource_error_response(id, error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_code(code: i32) -> JsonRpcResponse {
        JsonRpcResponse::error(Value::Null, code, "x")
    }

    #[test]
    fn status_mapping_follows_code_severity() {
        assert_eq!(
            http_status(&JsonRpcResponse::success(json!(1), json!({}))),
            StatusCode::OK
        );
        assert_eq!(http_status(&response_with_code(PARSE_ERROR)), StatusCode::BAD_REQUEST);
        assert_eq!(
            http_status(&response_with_code(METHOD_NOT_FOUND)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            http_status(&response_with_code(INVALID_PARAMS)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            http_status(&response_with_code(INTERNAL_ERROR)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn accept_header_detection() {
        let mut headers = HeaderMap::new();
        assert!(!accepts_event_stream(&headers));
        headers.insert(header::ACCEPT, "application/json".parse().unwrap());
        assert!(!accepts_event_stream(&headers));
        headers.insert(
            header::ACCEPT,
            "application/json, text/event-stream".parse().unwrap(),
        );
        assert!(accepts_event_stream(&headers));
    }
}
