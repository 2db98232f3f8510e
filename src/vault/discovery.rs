//! Note discovery and lazy metadata enrichment.
//!
//! Stage 1 (scan) enumerates `.md` files: the upstream listing endpoint is
//! preferred, following folder entries until the tree is covered; when the
//! listing fails or comes back empty, a recursive filesystem walk of the
//! configured vault root takes over. Either way the result is ordered lexicographically by
//! path and carries no headers.
//!
//! Stage 2 (enrich) runs only when the caller asked for headers: the first
//! 500 bytes of each note are read and tokenized in bounded-parallel
//! batches. A note that cannot be read or parsed gets empty headers — the
//! scan itself never fails on a single file.

use std::path::{Path, PathBuf};

use tokio::io::AsyncReadExt;
use walkdir::WalkDir;

use crate::error::{VaultError, VaultResult};
use crate::fanout;
use crate::frontmatter;
use crate::vault::client::UpstreamClient;
use crate::vault::types::{KeywordMatch, NoteMetadata, NoteStat, SearchHit};

/// How much of a note the header extractor reads.
const HEADER_PROBE_BYTES: usize = 500;

/// Everything stage 1 learned about the vault.
pub struct ScanResult {
    pub notes: Vec<NoteMetadata>,
    /// Folder paths reported by the upstream listing (possibly empty ones
    /// that contain no notes).
    pub folders: Vec<String>,
}

/// Stage 1: enumerate notes, upstream listing first, filesystem second.
pub async fn scan(client: &UpstreamClient, batch_size: usize) -> VaultResult<ScanResult> {
    match scan_upstream(client, batch_size).await {
        Ok(result) if !result.notes.is_empty() || !result.folders.is_empty() => {
            return Ok(result)
        }
        Ok(_) => {}
        Err(error) => {
            tracing::debug!(%error, "upstream listing unavailable, falling back to filesystem scan");
        }
    }

    let Some(root) = client.vault_root().cloned() else {
        // No listing and no local root: the vault is observably empty.
        return Ok(ScanResult {
            notes: Vec::new(),
            folders: Vec::new(),
        });
    };

    let mut notes = tokio::task::spawn_blocking(move || scan_filesystem(&root))
        .await
        .map_err(|e| VaultError::transport("filesystem scan", e))?;
    notes.sort_by(|a, b| a.path().cmp(b.path()));
    Ok(ScanResult {
        notes,
        folders: Vec::new(),
    })
}

/// Walk the upstream listing folder by folder. Folder entries end in `/`.
async fn scan_upstream(client: &UpstreamClient, batch_size: usize) -> VaultResult<ScanResult> {
    let mut note_paths: Vec<String> = Vec::new();
    let mut folders: Vec<String> = Vec::new();
    let mut visited: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut queue: Vec<String> = vec![String::new()];

    while let Some(folder) = queue.pop() {
        if !visited.insert(folder.clone()) {
            continue;
        }
        let entries = if folder.is_empty() {
            client.list_files(None).await?
        } else {
            match client.list_files(Some(&folder)).await {
                Ok(entries) => entries,
                // One unreadable folder does not abort the scan.
                Err(error) => {
                    tracing::debug!(folder = %folder, %error, "skipping unlistable folder");
                    continue;
                }
            }
        };

        for entry in entries {
            let entry = entry.trim_start_matches('/');
            if entry.is_empty() || entry == "/" {
                continue;
            }
            let full = if folder.is_empty() {
                entry.to_string()
            } else {
                format!("{folder}/{entry}")
            };
            if let Some(subfolder) = full.strip_suffix('/') {
                folders.push(subfolder.to_string());
                queue.push(subfolder.to_string());
            } else if full.ends_with(".md") {
                note_paths.push(full);
            }
        }
    }

    note_paths.sort();

    // Stat each discovered path. Without a local root, listing-only
    // deployments still get entries, just with placeholder stats.
    let notes: Vec<NoteMetadata> = if client.vault_root().is_some() {
        fanout::batched_map(note_paths, batch_size, |path| async move {
            let stat = client.note_stat(&path).await?;
            Ok(NoteMetadata::new(path, stat))
        })
        .await
        .into_iter()
        .flatten()
        .collect()
    } else {
        note_paths
            .into_iter()
            .map(|path| {
                NoteMetadata::new(
                    path,
                    NoteStat {
                        size_bytes: 0,
                        modified_at: chrono::Utc::now(),
                        created_at: None,
                    },
                )
            })
            .collect()
    };

    Ok(ScanResult { notes, folders })
}

/// Recursive `.md` walk below `root`. Hidden directories (`.obsidian` and
/// friends) are skipped; files that cannot be statted are dropped.
fn scan_filesystem(root: &Path) -> Vec<NoteMetadata> {
    let mut notes = Vec::new();

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        entry.depth() == 0
            || !entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with('.'))
                .unwrap_or(false)
    });

    for entry in walker.flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");

        let Ok(meta) = entry.metadata() else { continue };
        let Ok(modified) = meta.modified() else { continue };

        notes.push(NoteMetadata::new(
            relative,
            NoteStat {
                size_bytes: meta.len(),
                modified_at: modified.into(),
                created_at: meta.created().ok().map(Into::into),
            },
        ));
    }

    notes
}

/// Stage 2: populate `headers` for every note, in batches of `batch_size`.
/// Per-note failures yield empty headers; siblings are unaffected.
pub async fn enrich_headers(
    client: &UpstreamClient,
    notes: Vec<NoteMetadata>,
    batch_size: usize,
) -> Vec<NoteMetadata> {
    fanout::batched_map(notes, batch_size, |mut note| async move {
        let headers = match read_header_probe(client, note.path()).await {
            Ok(probe) => {
                let (header, _) = frontmatter::parse(&probe);
                header
                    .map(|h| h.to_json_map())
                    .unwrap_or_default()
            }
            Err(_) => serde_json::Map::new(),
        };
        note.headers = Some(headers);
        Ok::<_, VaultError>(note)
    })
    .await
    .into_iter()
    .flatten()
    .collect()
}

/// First [`HEADER_PROBE_BYTES`] of a note: straight from disk when a vault
/// root is configured, otherwise via the upstream read endpoint.
async fn read_header_probe(client: &UpstreamClient, path: &str) -> VaultResult<String> {
    if let Some(root) = client.vault_root() {
        let full: PathBuf = root.join(path);
        let mut file = tokio::fs::File::open(&full)
            .await
            .map_err(|e| VaultError::transport(path, e))?;
        let mut buf = vec![0u8; HEADER_PROBE_BYTES];
        let mut filled = 0;
        loop {
            let n = file
                .read(&mut buf[filled..])
                .await
                .map_err(|e| VaultError::transport(path, e))?;
            if n == 0 {
                break;
            }
            filled += n;
            if filled == buf.len() {
                break;
            }
        }
        buf.truncate(filled);
        Ok(String::from_utf8_lossy(&buf).into_owned())
    } else {
        let body = client.get_note(path).await?;
        Ok(body)
    }
}

/// Enrich upstream search hits with stat metadata, all lookups in flight at
/// once. Hits whose lookup fails are filtered out; the survivors keep
/// their input order.
pub async fn enrich_search_hits(
    client: &UpstreamClient,
    hits: Vec<SearchHit>,
) -> Vec<SearchHit> {
    fanout::gather_map(hits, |mut hit| async move {
        let stat = client.note_stat(&hit.path).await?;
        hit.metadata = Some(stat);
        Ok::<_, VaultError>(hit)
    })
    .await
    .into_iter()
    .flatten()
    .collect()
}

/// Linear keyword scan over discovered notes. Bodies are fetched through
/// the upstream read endpoint in batches; an unreadable note counts as a
/// non-match. Stops at the first batch boundary once `limit` is reached.
pub async fn keyword_search(
    client: &UpstreamClient,
    notes: Vec<NoteMetadata>,
    keyword: &str,
    case_sensitive: bool,
    limit: Option<usize>,
    batch_size: usize,
    snippet_radius: usize,
) -> Vec<KeywordMatch> {
    fanout::batched_filter_map(notes, batch_size, limit, |note| async move {
        let body = client.get_note(note.path()).await?;
        let Some(context) = extract_context(&body, keyword, case_sensitive, snippet_radius)
        else {
            return Ok(None);
        };
        Ok(Some(KeywordMatch {
            folder: {
                let parent = note.reference.parent();
                if parent.is_empty() {
                    "root".to_string()
                } else {
                    parent.to_string()
                }
            },
            path: note.reference.path,
            name: note.reference.name,
            size_bytes: note.size_bytes,
            modified_at: note.modified_at,
            context,
        }))
    })
    .await
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    idx = idx.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(s: &str, mut idx: usize) -> usize {
    idx = idx.min(s.len());
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// A ±`radius`-character window around the first occurrence of `keyword`,
/// with ellipses marking truncation. `None` when the keyword is absent.
pub fn extract_context(
    content: &str,
    keyword: &str,
    case_sensitive: bool,
    radius: usize,
) -> Option<String> {
    let (haystack, needle) = if case_sensitive {
        (content.to_string(), keyword.to_string())
    } else {
        (content.to_lowercase(), keyword.to_lowercase())
    };
    let index = haystack.find(&needle)?;

    let start = floor_char_boundary(content, index.saturating_sub(radius));
    let end = ceil_char_boundary(content, index + needle.len() + radius);

    let mut context = content[start..end].trim().to_string();
    if start > 0 {
        context = format!("...{context}");
    }
    if end < content.len() {
        context = format!("{context}...");
    }
    Some(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_finds_case_insensitive() {
        let content = "Alpha beta GAMMA delta";
        let ctx = extract_context(content, "gamma", false, 80).unwrap();
        assert_eq!(ctx, "Alpha beta GAMMA delta");
    }

    #[test]
    fn context_respects_case_sensitivity() {
        let content = "Alpha beta GAMMA delta";
        assert!(extract_context(content, "gamma", true, 80).is_none());
        assert!(extract_context(content, "GAMMA", true, 80).is_some());
    }

    #[test]
    fn context_window_is_bounded_with_ellipses() {
        let content = format!("{}needle{}", "a".repeat(200), "b".repeat(200));
        let ctx = extract_context(&content, "needle", false, 10).unwrap();
        assert!(ctx.starts_with("..."));
        assert!(ctx.ends_with("..."));
        assert!(ctx.contains("needle"));
        // 10 chars each side + keyword + two ellipses
        assert!(ctx.len() <= 6 + 20 + 6);
    }

    #[test]
    fn context_at_start_has_no_leading_ellipsis() {
        let ctx = extract_context("needle in the middle of it all", "needle", false, 5).unwrap();
        assert!(!ctx.starts_with("..."));
        assert!(ctx.ends_with("..."));
    }

    #[test]
    fn context_absent_keyword() {
        assert!(extract_context("nothing here", "needle", false, 80).is_none());
    }

    #[test]
    fn filesystem_scan_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("b")).unwrap();
        std::fs::create_dir_all(root.join(".obsidian")).unwrap();
        std::fs::write(root.join("z.md"), "z").unwrap();
        std::fs::write(root.join("b/a.md"), "a").unwrap();
        std::fs::write(root.join("b/skip.txt"), "not a note").unwrap();
        std::fs::write(root.join(".obsidian/config.md"), "hidden").unwrap();

        let mut notes = scan_filesystem(root);
        notes.sort_by(|a, b| a.path().cmp(b.path()));
        let paths: Vec<&str> = notes.iter().map(|n| n.path()).collect();
        assert_eq!(paths, vec!["b/a.md", "z.md"]);
        assert!(notes.iter().all(|n| n.headers.is_none()));
        assert_eq!(notes[1].size_bytes, 1);
    }
}
