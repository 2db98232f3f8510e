//! The vault access layer.
//!
//! [`Vault`] composes the upstream client, the TTL caches, and the
//! discovery pipeline behind one interface. Every mutating operation goes
//! through [`Vault::invalidating`]: a write cannot complete, with success
//! or failure, without both caches being dropped first. Failed writes may
//! have partial upstream side effects, so they invalidate too.

pub mod client;
pub mod discovery;
pub mod paths;
pub mod types;

use std::future::Future;
use std::sync::Arc;

use crate::cache::VaultCaches;
use crate::config::VaultgateConfig;
use crate::error::{VaultError, VaultResult};
use client::UpstreamClient;
use types::{KeywordMatch, NoteMetadata, NoteStat, SearchHit, VaultStructure};

pub struct Vault {
    client: UpstreamClient,
    caches: VaultCaches,
    config: VaultgateConfig,
}

impl Vault {
    pub fn new(config: VaultgateConfig) -> VaultResult<Self> {
        let client = UpstreamClient::new(&config)?;
        let caches = VaultCaches::new(config.structure_ttl(), config.notes_ttl());
        Ok(Self {
            client,
            caches,
            config,
        })
    }

    pub fn config(&self) -> &VaultgateConfig {
        &self.config
    }

    /// Run a mutating upstream operation and invalidate both caches no
    /// matter how it went.
    async fn invalidating<T>(&self, op: impl Future<Output = VaultResult<T>>) -> VaultResult<T> {
        let result = op.await;
        self.caches.invalidate();
        result
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    pub async fn read_note(&self, path: &str) -> VaultResult<String> {
        self.client.get_note(path).await
    }

    pub async fn note_stat(&self, path: &str) -> VaultResult<NoteStat> {
        self.client.note_stat(path).await
    }

    /// Existence check via the upstream read endpoint. Only a clean 404
    /// maps to `false`; other failures propagate.
    pub async fn note_exists(&self, path: &str) -> VaultResult<bool> {
        match self.client.get_note(path).await {
            Ok(_) => Ok(true),
            Err(error) if error.is_not_found() => Ok(false),
            Err(error) => Err(error),
        }
    }

    pub async fn health_check(&self) -> bool {
        self.client.health_check().await
    }

    // ── Writes ────────────────────────────────────────────────────────────────

    /// Create a note; fails with [`VaultError::Conflict`] when the path is
    /// already taken.
    pub async fn create_note(
        &self,
        path: &str,
        content: &str,
        create_folders: bool,
    ) -> VaultResult<()> {
        match self.client.get_note(path).await {
            Ok(_) => return Err(VaultError::Conflict(path.to_string())),
            Err(error) if error.is_not_found() => {}
            Err(error) => return Err(error),
        }

        self.invalidating(self.client.put_note(path, content, create_folders))
            .await?;
        tracing::info!(path = %path, bytes = content.len(), "note created");
        Ok(())
    }

    /// Replace an existing note's content. The note must already exist.
    pub async fn update_note(&self, path: &str, content: &str) -> VaultResult<()> {
        // Will raise NotFound for a missing note before anything is written.
        self.client.get_note(path).await?;

        self.invalidating(self.client.put_note(path, content, false))
            .await?;
        tracing::info!(path = %path, bytes = content.len(), "note updated");
        Ok(())
    }

    /// Append to an existing note: previous body, separator, new content.
    pub async fn append_note(
        &self,
        path: &str,
        content: &str,
        separator: &str,
    ) -> VaultResult<()> {
        let existing = self.client.get_note(path).await?;
        let combined = format!("{existing}{separator}{content}");

        self.invalidating(self.client.put_note(path, &combined, false))
            .await?;
        tracing::info!(path = %path, appended = content.len(), "note appended");
        Ok(())
    }

    pub async fn delete_note(&self, path: &str) -> VaultResult<()> {
        self.invalidating(self.client.delete_note(path)).await?;
        tracing::info!(path = %path, "note deleted");
        Ok(())
    }

    /// Run an upstream command. Commands may mutate the vault, so the
    /// caches are dropped like for any other write.
    pub async fn execute_command(
        &self,
        name: &str,
        params: Option<&serde_json::Value>,
    ) -> VaultResult<serde_json::Value> {
        self.invalidating(self.client.execute_command(name, params))
            .await
    }

    // ── Discovery ─────────────────────────────────────────────────────────────

    /// List notes, optionally filtered to a folder subtree and optionally
    /// enriched with headers. The notes cache is consulted unless
    /// `use_cache` is off; a cached snapshot without headers does not
    /// satisfy a headers request.
    pub async fn list_notes(
        &self,
        folder: Option<&str>,
        with_headers: bool,
        use_cache: bool,
    ) -> VaultResult<Vec<NoteMetadata>> {
        let snapshot = match use_cache.then(|| self.caches.fresh_notes(with_headers)).flatten() {
            Some(snapshot) => snapshot.notes,
            None => {
                let scanned = discovery::scan(&self.client, self.config.search.batch_size).await?;
                let notes = if with_headers {
                    discovery::enrich_headers(
                        &self.client,
                        scanned.notes,
                        self.config.search.batch_size,
                    )
                    .await
                } else {
                    scanned.notes
                };
                self.caches.store_notes(notes.clone(), with_headers);
                Arc::new(notes)
            }
        };

        let filtered = match folder {
            Some(folder) if !folder.trim_matches('/').is_empty() => {
                let folder = paths::normalize(folder)?;
                let prefix = format!("{folder}/");
                snapshot
                    .iter()
                    .filter(|n| n.path().starts_with(&prefix))
                    .cloned()
                    .collect()
            }
            _ => snapshot.as_ref().clone(),
        };
        Ok(filtered)
    }

    /// The full vault tree. Cached for `cache.structure_ttl_secs`; pass
    /// `use_cache = false` to force a re-scan.
    pub async fn structure(&self, use_cache: bool) -> VaultResult<Arc<VaultStructure>> {
        if use_cache {
            if let Some(cached) = self.caches.fresh_structure() {
                return Ok(cached);
            }
        }

        let scanned = discovery::scan(&self.client, self.config.search.batch_size).await?;
        let root_path = if self.config.vault.root_path.is_empty() {
            self.config.upstream.base_url.clone()
        } else {
            self.config.vault.root_path.clone()
        };
        let structure = Arc::new(VaultStructure::assemble(
            root_path,
            scanned.notes,
            scanned.folders,
        ));
        self.caches.store_structure(Arc::clone(&structure));
        Ok(structure)
    }

    // ── Search ────────────────────────────────────────────────────────────────

    /// Upstream full-text search with concurrent stat enrichment.
    pub async fn search_notes(
        &self,
        query: &str,
        folder: Option<&str>,
    ) -> VaultResult<Vec<SearchHit>> {
        let hits = self.client.search_simple(query, folder).await?;
        Ok(discovery::enrich_search_hits(&self.client, hits).await)
    }

    /// Linear keyword scan over the discovered notes. `limit == Some(0)`
    /// short-circuits without touching the vault.
    pub async fn keyword_search(
        &self,
        keyword: &str,
        folder: Option<&str>,
        case_sensitive: bool,
        limit: Option<usize>,
    ) -> VaultResult<Vec<KeywordMatch>> {
        if limit == Some(0) {
            return Ok(Vec::new());
        }
        let notes = self.list_notes(folder, false, true).await?;
        Ok(discovery::keyword_search(
            &self.client,
            notes,
            keyword,
            case_sensitive,
            limit,
            self.config.search.batch_size,
            self.config.search.snippet_radius,
        )
        .await)
    }

    /// The cached structure if one is fresh, without touching the vault.
    pub fn cached_structure(&self) -> Option<Arc<VaultStructure>> {
        self.caches.fresh_structure()
    }

    /// Drop both caches. Exposed for operational tooling; the write paths
    /// invalidate on their own.
    pub fn invalidate_caches(&self) {
        self.caches.invalidate();
    }
}
