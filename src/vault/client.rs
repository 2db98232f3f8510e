//! Typed client for the upstream note-plugin REST surface.
//!
//! Wraps the plugin's five endpoints (`GET/PUT/DELETE /vault/{path}`,
//! `GET /vault/`, `POST /search/simple/`, `POST /command/`) behind vault
//! semantics: validated paths, mapped errors, a 30 s per-call timeout, and
//! no retries — retry policy belongs to callers. `note_stat` is the one
//! hybrid operation: the REST surface exposes no stat endpoint, so it reads
//! filesystem metadata under the configured vault root.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::config::VaultgateConfig;
use crate::error::{VaultError, VaultResult};
use crate::vault::paths;
use crate::vault::types::{NoteStat, SearchHit};

/// Upper bound on a note body accepted for writing.
pub const MAX_NOTE_BYTES: usize = 50 * 1024 * 1024;

/// Listing returned by `GET /vault/` and `GET /vault/{folder}/`. Entries
/// ending in `/` are folders.
#[derive(Debug, Deserialize)]
struct VaultListing {
    #[serde(default)]
    files: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawSearchHit {
    #[serde(alias = "filename")]
    path: String,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    vault_root: Option<PathBuf>,
}

impl UpstreamClient {
    pub fn new(config: &VaultgateConfig) -> VaultResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout())
            .build()
            .map_err(|e| VaultError::transport("building http client", e))?;
        Ok(Self {
            http,
            base_url: config.upstream.base_url.trim_end_matches('/').to_string(),
            api_key: config.upstream.api_key.clone(),
            vault_root: config.resolved_vault_root(),
        })
    }

    fn vault_url(&self, encoded_path: &str) -> String {
        format!("{}/vault/{}", self.base_url, encoded_path)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.bearer_auth(&self.api_key)
    }

    /// Read a note body. 404 maps to [`VaultError::NotFound`].
    pub async fn get_note(&self, path: &str) -> VaultResult<String> {
        let path = paths::normalize_note(path)?;
        let url = self.vault_url(&paths::encode(&path));

        let response = self
            .authorized(self.http.get(&url))
            .send()
            .await
            .map_err(|e| VaultError::transport(&path, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VaultError::from_status(status.as_u16(), &path, body));
        }
        response
            .text()
            .await
            .map_err(|e| VaultError::transport(&path, e))
    }

    /// Create or overwrite a note. Idempotent; intermediate folders are
    /// created when `create_folders` is set.
    pub async fn put_note(&self, path: &str, body: &str, create_folders: bool) -> VaultResult<()> {
        let path = paths::normalize_note(path)?;
        if body.len() > MAX_NOTE_BYTES {
            return Err(VaultError::Client {
                status: 413,
                message: format!("{path}: note body exceeds {MAX_NOTE_BYTES} bytes"),
            });
        }

        let mut url = self.vault_url(&paths::encode(&path));
        if create_folders {
            url.push_str("?createDirectories=true");
        }

        let response = self
            .authorized(self.http.put(&url))
            .header(reqwest::header::CONTENT_TYPE, "text/markdown; charset=utf-8")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| VaultError::transport(&path, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VaultError::from_status(status.as_u16(), &path, body));
        }
        tracing::debug!(path = %path, bytes = body.len(), "note written upstream");
        Ok(())
    }

    /// Delete a note. 404 maps to [`VaultError::NotFound`].
    pub async fn delete_note(&self, path: &str) -> VaultResult<()> {
        let path = paths::normalize_note(path)?;
        let url = self.vault_url(&paths::encode(&path));

        let response = self
            .authorized(self.http.delete(&url))
            .send()
            .await
            .map_err(|e| VaultError::transport(&path, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VaultError::from_status(status.as_u16(), &path, body));
        }
        tracing::debug!(path = %path, "note deleted upstream");
        Ok(())
    }

    /// List the entries of a folder (or the vault root). Folder entries
    /// keep their trailing `/`; paths are relative to the queried folder.
    pub async fn list_files(&self, folder: Option<&str>) -> VaultResult<Vec<String>> {
        let url = match folder {
            Some(folder) => {
                let folder = paths::normalize(folder)?;
                format!("{}/", self.vault_url(&paths::encode(&folder)))
            }
            None => format!("{}/vault/", self.base_url),
        };

        let response = self
            .authorized(self.http.get(&url))
            .send()
            .await
            .map_err(|e| VaultError::transport("vault listing", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VaultError::from_status(status.as_u16(), "vault listing", body));
        }
        let text = response
            .text()
            .await
            .map_err(|e| VaultError::transport("vault listing", e))?;
        // The plugin replies 200 with an empty body for an empty vault.
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let listing: VaultListing = serde_json::from_str(&text)
            .map_err(|e| VaultError::transport("vault listing", format!("bad payload: {e}")))?;
        Ok(listing.files)
    }

    /// Upstream full-text search. Hits carry whatever snippet/score the
    /// plugin produced; metadata enrichment happens elsewhere.
    pub async fn search_simple(
        &self,
        query: &str,
        folder: Option<&str>,
    ) -> VaultResult<Vec<SearchHit>> {
        let mut body = json!({ "query": query });
        if let Some(folder) = folder {
            body["folder"] = json!(paths::normalize(folder)?);
        }

        let response = self
            .authorized(self.http.post(format!("{}/search/simple/", self.base_url)))
            .json(&body)
            .send()
            .await
            .map_err(|e| VaultError::transport("search", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VaultError::from_status(status.as_u16(), "search", body));
        }

        let text = response
            .text()
            .await
            .map_err(|e| VaultError::transport("search", e))?;
        // The plugin replies with an empty body when nothing matches.
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<RawSearchHit> = serde_json::from_str(&text)
            .map_err(|e| VaultError::transport("search", format!("bad payload: {e}")))?;

        Ok(raw
            .into_iter()
            .map(|hit| {
                let name = hit.path.rsplit('/').next().unwrap_or(&hit.path).to_string();
                SearchHit {
                    path: hit.path,
                    name,
                    snippet: hit.snippet,
                    score: hit.score,
                    metadata: None,
                }
            })
            .collect())
    }

    /// Stat a note from the local vault root. `NotFound` when the root is
    /// not configured or the file is missing.
    pub async fn note_stat(&self, path: &str) -> VaultResult<NoteStat> {
        let path = paths::normalize_note(path)?;
        let Some(root) = self.vault_root.as_ref() else {
            return Err(VaultError::NotFound(format!(
                "{path} (no vault root configured for stat lookups)"
            )));
        };

        let full = root.join(&path);
        let meta = tokio::fs::metadata(&full).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VaultError::NotFound(path.clone())
            } else {
                VaultError::transport(&path, e)
            }
        })?;

        let modified_at: DateTime<Utc> = meta
            .modified()
            .map_err(|e| VaultError::transport(&path, e))?
            .into();
        let created_at: Option<DateTime<Utc>> = meta.created().ok().map(Into::into);

        Ok(NoteStat {
            size_bytes: meta.len(),
            modified_at,
            created_at,
        })
    }

    /// Execute an upstream command by name. The result shape is up to the
    /// plugin; non-JSON replies are wrapped as `{"result": <text>}`.
    pub async fn execute_command(
        &self,
        name: &str,
        params: Option<&serde_json::Value>,
    ) -> VaultResult<serde_json::Value> {
        if name.trim().is_empty() {
            return Err(VaultError::Client {
                status: 400,
                message: "command name is empty".into(),
            });
        }

        let body = json!({
            "name": name,
            "params": params.cloned().unwrap_or_else(|| json!({})),
        });

        let response = self
            .authorized(self.http.post(format!("{}/command/", self.base_url)))
            .json(&body)
            .send()
            .await
            .map_err(|e| VaultError::transport(name, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VaultError::from_status(status.as_u16(), name, body));
        }

        let text = response
            .text()
            .await
            .map_err(|e| VaultError::transport(name, e))?;
        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(_) => Ok(json!({ "result": text })),
        }
    }

    /// Connectivity probe: one authenticated round trip to the vault root.
    pub async fn health_check(&self) -> bool {
        self.list_files(None).await.is_ok()
    }

    /// The configured vault root, when filesystem fallback is available.
    pub fn vault_root(&self) -> Option<&PathBuf> {
        self.vault_root.as_ref()
    }
}
