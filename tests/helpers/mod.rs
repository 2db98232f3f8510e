#![allow(dead_code)]

//! Shared test fixtures: an in-process mock of the upstream note-plugin
//! REST API, and a gateway wired against it.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use vaultgate::config::VaultgateConfig;
use vaultgate::protocol::{JsonRpcRequest, JsonRpcResponse};
use vaultgate::server::{self, GatewayState};
use vaultgate::tools::VaultTools;
use vaultgate::vault::Vault;

pub const TEST_API_KEY: &str = "test-key";

#[derive(Clone, Default)]
struct MockState {
    notes: Arc<Mutex<BTreeMap<String, String>>>,
    fail_reads: Arc<Mutex<HashSet<String>>>,
    fs_root: Option<PathBuf>,
}

impl MockState {
    fn mirror_write(&self, path: &str, content: &str) {
        if let Some(root) = &self.fs_root {
            let full = root.join(path);
            if let Some(parent) = full.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = std::fs::write(full, content);
        }
    }

    fn mirror_delete(&self, path: &str) {
        if let Some(root) = &self.fs_root {
            let _ = std::fs::remove_file(root.join(path));
        }
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {TEST_API_KEY}"))
        .unwrap_or(false)
}

async fn list_root(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "missing credential").into_response();
    }
    let notes = state.notes.lock().unwrap();
    let mut entries: BTreeSet<String> = BTreeSet::new();
    for path in notes.keys() {
        match path.split_once('/') {
            Some((top, _)) => entries.insert(format!("{top}/")),
            None => entries.insert(path.clone()),
        };
    }
    Json(json!({ "files": entries })).into_response()
}

async fn get_path(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(path): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "missing credential").into_response();
    }

    if let Some(folder) = path.strip_suffix('/') {
        let prefix = format!("{folder}/");
        let notes = state.notes.lock().unwrap();
        let mut entries: BTreeSet<String> = BTreeSet::new();
        for note_path in notes.keys() {
            if let Some(rest) = note_path.strip_prefix(&prefix) {
                match rest.split_once('/') {
                    Some((sub, _)) => entries.insert(format!("{sub}/")),
                    None => entries.insert(rest.to_string()),
                };
            }
        }
        return Json(json!({ "files": entries })).into_response();
    }

    if state.fail_reads.lock().unwrap().contains(&path) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "injected read failure").into_response();
    }
    match state.notes.lock().unwrap().get(&path) {
        Some(content) => (StatusCode::OK, content.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, format!("not found: {path}")).into_response(),
    }
}

async fn put_path(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(path): Path<String>,
    Query(_query): Query<std::collections::HashMap<String, String>>,
    body: String,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "missing credential").into_response();
    }
    state.notes.lock().unwrap().insert(path.clone(), body.clone());
    state.mirror_write(&path, &body);
    StatusCode::OK.into_response()
}

async fn delete_path(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(path): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "missing credential").into_response();
    }
    let removed = state.notes.lock().unwrap().remove(&path);
    state.mirror_delete(&path);
    match removed {
        Some(_) => StatusCode::OK.into_response(),
        None => (StatusCode::NOT_FOUND, format!("not found: {path}")).into_response(),
    }
}

async fn search_simple(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "missing credential").into_response();
    }
    let Some(query) = body.get("query").and_then(Value::as_str) else {
        return (StatusCode::BAD_REQUEST, "missing query").into_response();
    };
    let folder = body.get("folder").and_then(Value::as_str);
    let needle = query.to_lowercase();

    let notes = state.notes.lock().unwrap();
    let hits: Vec<Value> = notes
        .iter()
        .filter(|(path, _)| match folder {
            Some(folder) => path.starts_with(&format!("{folder}/")),
            None => true,
        })
        .filter(|(_, content)| content.to_lowercase().contains(&needle))
        .map(|(path, content)| {
            let snippet: String = content.chars().take(60).collect();
            json!({ "path": path, "snippet": snippet })
        })
        .collect();
    Json(json!(hits)).into_response()
}

async fn command(
    State(_state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "missing credential").into_response();
    }
    Json(json!({
        "status": "executed",
        "name": body.get("name").cloned().unwrap_or(Value::Null),
    }))
    .into_response()
}

/// A running mock upstream plus handles to poke its state.
pub struct MockUpstream {
    pub base_url: String,
    notes: Arc<Mutex<BTreeMap<String, String>>>,
    fail_reads: Arc<Mutex<HashSet<String>>>,
    root: Option<tempfile::TempDir>,
    fs_root: Option<PathBuf>,
}

impl MockUpstream {
    /// Seed a note directly, bypassing the gateway.
    pub fn seed_note(&self, path: &str, content: &str) {
        self.notes
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        if let Some(root) = &self.fs_root {
            let full = root.join(path);
            if let Some(parent) = full.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = std::fs::write(full, content);
        }
    }

    /// Make reads of `path` fail with a 500 from now on.
    pub fn fail_reads_of(&self, path: &str) {
        self.fail_reads.lock().unwrap().insert(path.to_string());
    }

    pub fn note_body(&self, path: &str) -> Option<String> {
        self.notes.lock().unwrap().get(path).cloned()
    }

    pub fn root_path(&self) -> Option<&PathBuf> {
        self.fs_root.as_ref()
    }
}

/// Start the mock upstream on an ephemeral port. `with_fs` mirrors every
/// note to a tempdir so filesystem stat lookups work.
pub async fn start_mock(with_fs: bool) -> MockUpstream {
    let root = with_fs.then(|| tempfile::tempdir().unwrap());
    let fs_root = root.as_ref().map(|dir| dir.path().to_path_buf());

    let state = MockState {
        notes: Arc::default(),
        fail_reads: Arc::default(),
        fs_root: fs_root.clone(),
    };

    let app = Router::new()
        .route("/vault/", get(list_root))
        .route(
            "/vault/{*path}",
            get(get_path).put(put_path).delete(delete_path),
        )
        .route("/search/simple/", post(search_simple))
        .route("/command/", post(command))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream {
        base_url: format!("http://{addr}"),
        notes: state.notes,
        fail_reads: state.fail_reads,
        root,
        fs_root,
    }
}

/// A gateway wired against a mock upstream.
pub struct TestGateway {
    pub mock: MockUpstream,
    pub state: GatewayState,
}

impl TestGateway {
    pub async fn rpc(&self, method: &str, params: Value) -> JsonRpcResponse {
        server::handle_request(
            &self.state,
            JsonRpcRequest {
                jsonrpc: "2.0".into(),
                id: json!(1),
                method: method.into(),
                params,
            },
        )
        .await
    }

    /// `tools/call` round trip; returns the full JSON-RPC response.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> JsonRpcResponse {
        self.rpc("tools/call", json!({ "name": name, "arguments": arguments }))
            .await
    }

    /// Unwrap a successful tool result.
    pub async fn call_tool_ok(&self, name: &str, arguments: Value) -> Value {
        let response = self.call_tool(name, arguments).await;
        assert!(
            response.error.is_none(),
            "tool {name} failed: {:?}",
            response.error
        );
        response.result.unwrap()
    }

    pub fn vault(&self) -> &Arc<Vault> {
        self.state.tools.vault()
    }
}

/// Build a gateway against a fresh mock upstream.
pub async fn gateway(with_fs: bool) -> TestGateway {
    let mock = start_mock(with_fs).await;

    let mut config = VaultgateConfig::default();
    config.upstream.base_url = mock.base_url.clone();
    config.upstream.api_key = TEST_API_KEY.into();
    if let Some(root) = mock.root_path() {
        config.vault.root_path = root.to_string_lossy().into_owned();
    }

    let vault = Arc::new(Vault::new(config).unwrap());
    let tools = Arc::new(VaultTools::new(vault));
    TestGateway {
        mock,
        state: GatewayState { tools },
    }
}

/// First text content part of a tool result.
pub fn result_text(result: &Value) -> &str {
    result["content"]
        .as_array()
        .and_then(|parts| {
            parts
                .iter()
                .find(|p| p["type"] == "text")
                .and_then(|p| p["text"].as_str())
        })
        .unwrap_or("")
}
