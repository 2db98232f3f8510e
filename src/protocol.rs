//! JSON-RPC 2.0 envelope types and error-code mapping.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resources::ResourceError;
use crate::tools::ToolError;

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self::error_with_data(id, code, message, None)
    }

    pub fn error_with_data(
        id: Value,
        code: i32,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data,
            }),
        }
    }
}

/// Validate the JSON-RPC envelope of an already-parsed body. Returns the
/// request, or the `-32600` response to send back.
pub fn validate_request(body: Value) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let id = body.get("id").cloned().unwrap_or(Value::Null);

    let Some(object) = body.as_object() else {
        return Err(JsonRpcResponse::error(
            Value::Null,
            INVALID_REQUEST,
            "request must be a JSON object",
        ));
    };

    if object.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return Err(JsonRpcResponse::error_with_data(
            id,
            INVALID_REQUEST,
            "Invalid Request",
            Some(Value::String("invalid or missing jsonrpc version".into())),
        ));
    }

    match object.get("method").and_then(Value::as_str) {
        Some(_) => {}
        None => {
            return Err(JsonRpcResponse::error_with_data(
                id,
                INVALID_REQUEST,
                "Invalid Request",
                Some(Value::String("missing or non-string method field".into())),
            ))
        }
    }

    serde_json::from_value(body).map_err(|e| {
        JsonRpcResponse::error_with_data(
            Value::Null,
            INVALID_REQUEST,
            "Invalid Request",
            Some(Value::String(e.to_string())),
        )
    })
}

/// Map a tool failure onto the wire: unknown name and bad arguments get
/// their dedicated codes, vault failures are internal errors carrying a
/// machine-readable `data` block.
pub fn tool_error_response(id: Value, error: ToolError) -> JsonRpcResponse {
    match error {
        ToolError::UnknownTool(name) => JsonRpcResponse::error(
            id,
            METHOD_NOT_FOUND,
            format!("Tool not found: {name}"),
        ),
        ToolError::InvalidArgs(message) => {
            JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {message}"))
        }
        ToolError::Vault(error) => {
            let data = serde_json::json!({
                "kind": error.kind(),
                "status_code": error.status_code(),
            });
            JsonRpcResponse::error_with_data(id, INTERNAL_ERROR, error.to_string(), Some(data))
        }
    }
}

/// Map a resource failure onto the wire: a malformed URI is an
/// invalid-params error, everything else follows the vault mapping.
pub fn resource_error_response(id: Value, error: ResourceError) -> JsonRpcResponse {
    match error {
        ResourceError::BadUri(message) => {
            JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {message}"))
        }
        ResourceError::Vault(error) => {
            let data = serde_json::json!({
                "kind": error.kind(),
                "status_code": error.status_code(),
            });
            JsonRpcResponse::error_with_data(id, INTERNAL_ERROR, error.to_string(), Some(data))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VaultError;
    use serde_json::json;

    #[test]
    fn validates_good_request() {
        let request = validate_request(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/list"
        }))
        .unwrap();
        assert_eq!(request.method, "tools/list");
        assert_eq!(request.id, json!(1));
        assert!(request.params.is_null());
    }

    #[test]
    fn rejects_wrong_version() {
        let response = validate_request(json!({
            "jsonrpc": "1.0",
            "id": 5,
            "method": "ping"
        }))
        .unwrap_err();
        assert_eq!(response.error.unwrap().code, INVALID_REQUEST);
        assert_eq!(response.id, json!(5));
    }

    #[test]
    fn rejects_missing_method() {
        let response = validate_request(json!({"jsonrpc": "2.0", "id": 1})).unwrap_err();
        assert_eq!(response.error.unwrap().code, INVALID_REQUEST);
    }

    #[test]
    fn rejects_non_object() {
        let response = validate_request(json!([1, 2, 3])).unwrap_err();
        assert_eq!(response.error.unwrap().code, INVALID_REQUEST);
    }

    #[test]
    fn unknown_tool_maps_to_method_not_found() {
        let response =
            tool_error_response(json!(1), ToolError::UnknownTool("obs_nope".into()));
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[test]
    fn invalid_args_map_to_invalid_params() {
        let response = tool_error_response(json!(1), ToolError::InvalidArgs("bad".into()));
        assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
    }

    #[test]
    fn vault_errors_are_internal_with_data() {
        let response = tool_error_response(
            json!(1),
            ToolError::Vault(VaultError::NotFound("a.md".into())),
        );
        let error = response.error.unwrap();
        assert_eq!(error.code, INTERNAL_ERROR);
        let data = error.data.unwrap();
        assert_eq!(data["kind"], "not_found");
        assert_eq!(data["status_code"], 404);
    }

    #[test]
    fn success_and_error_are_exclusive() {
        let ok = JsonRpcResponse::success(json!(1), json!({"pong": true}));
        assert!(ok.result.is_some() && ok.error.is_none());
        let err = JsonRpcResponse::error(json!(1), PARSE_ERROR, "parse error");
        assert!(err.result.is_none() && err.error.is_some());
    }
}
