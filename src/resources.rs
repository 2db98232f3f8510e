//! The read-only, URI-addressed view of the vault.
//!
//! URIs follow `vault://notes/<path>`: a path ending in `/` (or the bare
//! root) is a folder listing served as JSON, anything else is a note body
//! served as Markdown. Segments are percent-decoded on the way in and
//! encoded on the way out. The router holds no cache of its own — it reads
//! through the vault layer's.

use percent_encoding::percent_decode_str;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::error::VaultError;
use crate::frontmatter;
use crate::vault::{paths, Vault};

pub const URI_PREFIX: &str = "vault://notes/";

#[derive(Error, Debug)]
pub enum ResourceError {
    /// Wrong scheme/authority, undecodable escapes, or a path outside the
    /// vault root.
    #[error("invalid resource URI: {0}")]
    BadUri(String),

    #[error(transparent)]
    Vault(#[from] VaultError),
}

/// A parsed resource URI.
#[derive(Debug, PartialEq)]
pub enum ResourcePath {
    /// Folder listing; `""` is the vault root.
    Folder(String),
    /// A single note body.
    Note(String),
}

/// One entry in the `resources/list` enumeration.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceDefinition {
    pub uri: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// The payload of a `resources/read`.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceContent {
    pub uri: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Parse and validate a `vault://notes/...` URI.
pub fn parse_uri(uri: &str) -> Result<ResourcePath, ResourceError> {
    let rest = uri
        .strip_prefix(URI_PREFIX)
        .or_else(|| (uri == URI_PREFIX.trim_end_matches('/')).then_some(""))
        .ok_or_else(|| ResourceError::BadUri(format!("expected {URI_PREFIX}..., got {uri}")))?;

    let decoded = percent_decode_str(rest)
        .decode_utf8()
        .map_err(|_| ResourceError::BadUri(format!("undecodable percent escapes in {uri}")))?
        .into_owned();

    let is_folder = decoded.is_empty() || decoded.ends_with('/');
    let trimmed = decoded.trim_matches('/');
    if trimmed.is_empty() {
        return if is_folder {
            Ok(ResourcePath::Folder(String::new()))
        } else {
            Err(ResourceError::BadUri(uri.to_string()))
        };
    }

    // The path policy rejects traversal out of the vault root.
    let normalized = paths::normalize(trimmed)
        .map_err(|e| ResourceError::BadUri(format!("{uri}: {e}")))?;

    if is_folder {
        Ok(ResourcePath::Folder(normalized))
    } else {
        Ok(ResourcePath::Note(normalized))
    }
}

/// Build the URI for a vault path. Folder URIs carry a trailing slash.
pub fn build_uri(path: &str, is_folder: bool) -> String {
    let encoded = paths::encode(path.trim_matches('/'));
    if is_folder {
        if encoded.is_empty() {
            URI_PREFIX.to_string()
        } else {
            format!("{URI_PREFIX}{encoded}/")
        }
    } else {
        format!("{URI_PREFIX}{encoded}")
    }
}

/// Enumerate the vault as resources: the root, one entry per folder, one
/// per note. When discovery fails only the root entry is offered — the
/// vault may still become reachable later.
pub async fn list_resources(vault: &Vault) -> Vec<ResourceDefinition> {
    let mut resources = vec![ResourceDefinition {
        uri: URI_PREFIX.to_string(),
        name: "Vault Root".into(),
        description: "Browse all notes and folders in the vault".into(),
        mime_type: "application/json".into(),
    }];

    let structure = match vault.structure(true).await {
        Ok(structure) => structure,
        Err(error) => {
            tracing::warn!(%error, "resource discovery failed, offering root only");
            return resources;
        }
    };

    for folder in &structure.folders {
        resources.push(ResourceDefinition {
            uri: build_uri(&folder.path, true),
            name: folder.name.clone(),
            description: format!(
                "Folder with {} notes and {} subfolders",
                folder.notes_count, folder.subfolders_count
            ),
            mime_type: "application/json".into(),
        });
    }
    for note in &structure.notes {
        resources.push(ResourceDefinition {
            uri: build_uri(note.path(), false),
            name: note.name().to_string(),
            description: format!(
                "Note ({} bytes, modified {})",
                note.size_bytes,
                note.modified_at.format("%Y-%m-%d")
            ),
            mime_type: "text/markdown".into(),
        });
    }

    resources
}

/// Read one resource: a JSON folder listing or a Markdown note body.
pub async fn read_resource(vault: &Vault, uri: &str) -> Result<ResourceContent, ResourceError> {
    match parse_uri(uri)? {
        ResourcePath::Folder(folder) => read_folder(vault, uri, &folder).await,
        ResourcePath::Note(path) => read_note(vault, uri, &path).await,
    }
}

async fn read_folder(
    vault: &Vault,
    uri: &str,
    folder: &str,
) -> Result<ResourceContent, ResourceError> {
    let structure = vault.structure(true).await?;

    if !folder.is_empty() && structure.find_folder(folder).is_none() {
        return Err(VaultError::NotFound(format!("folder: {folder}")).into());
    }

    let folders: Vec<serde_json::Value> = structure
        .folders_in(folder)
        .into_iter()
        .map(|f| {
            json!({
                "type": "folder",
                "name": &f.name,
                "path": &f.path,
                "uri": build_uri(&f.path, true),
                "notes_count": f.notes_count,
                "subfolders_count": f.subfolders_count,
            })
        })
        .collect();
    let notes: Vec<serde_json::Value> = structure
        .notes_in(folder)
        .into_iter()
        .map(|n| {
            json!({
                "type": "note",
                "name": n.name(),
                "path": n.path(),
                "uri": build_uri(n.path(), false),
                "size": n.size_bytes,
                "modified": n.modified_at.to_rfc3339(),
            })
        })
        .collect();

    let listing = json!({
        "folder_path": if folder.is_empty() { "/" } else { folder },
        "total_items": folders.len() + notes.len(),
        "folders": folders,
        "notes": notes,
    });

    Ok(ResourceContent {
        uri: uri.to_string(),
        mime_type: "application/json".into(),
        text: serde_json::to_string_pretty(&listing)
            .map_err(|e| VaultError::transport(folder, e))?,
        metadata: Some(json!({
            "resource_type": "folder",
            "item_count": listing["total_items"],
        })),
    })
}

async fn read_note(vault: &Vault, uri: &str, path: &str) -> Result<ResourceContent, ResourceError> {
    let body = vault.read_note(path).await?;

    let (header, _) = frontmatter::parse(&body);
    let mut metadata = json!({
        "resource_type": "note",
        "path": path,
        "content_length": body.len(),
    });
    if let Some(header) = header {
        metadata["headers"] = serde_json::Value::Object(header.to_json_map());
    }
    if let Ok(stat) = vault.note_stat(path).await {
        metadata["size"] = json!(stat.size_bytes);
        metadata["modified"] = json!(stat.modified_at.to_rfc3339());
    }

    Ok(ResourceContent {
        uri: uri.to_string(),
        mime_type: "text/markdown".into(),
        text: body,
        metadata: Some(metadata),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_root_listing() {
        assert_eq!(
            parse_uri("vault://notes/").unwrap(),
            ResourcePath::Folder(String::new())
        );
        assert_eq!(
            parse_uri("vault://notes").unwrap(),
            ResourcePath::Folder(String::new())
        );
    }

    #[test]
    fn parse_folder_and_note() {
        assert_eq!(
            parse_uri("vault://notes/projects/").unwrap(),
            ResourcePath::Folder("projects".into())
        );
        assert_eq!(
            parse_uri("vault://notes/projects/alpha.md").unwrap(),
            ResourcePath::Note("projects/alpha.md".into())
        );
    }

    #[test]
    fn parse_decodes_percent_escapes() {
        assert_eq!(
            parse_uri("vault://notes/daily%20notes/2025.md").unwrap(),
            ResourcePath::Note("daily notes/2025.md".into())
        );
    }

    #[test]
    fn parse_rejects_wrong_scheme() {
        assert!(matches!(
            parse_uri("obsidian://notes/a.md"),
            Err(ResourceError::BadUri(_))
        ));
        assert!(matches!(
            parse_uri("vault://other/a.md"),
            Err(ResourceError::BadUri(_))
        ));
    }

    #[test]
    fn parse_rejects_traversal() {
        assert!(matches!(
            parse_uri("vault://notes/../outside.md"),
            Err(ResourceError::BadUri(_))
        ));
        assert!(matches!(
            parse_uri("vault://notes/a/%2e%2e/b.md"),
            Err(ResourceError::BadUri(_))
        ));
    }

    #[test]
    fn build_uri_round_trips() {
        let uri = build_uri("daily notes/2025-02-04.md", false);
        assert_eq!(uri, "vault://notes/daily%20notes/2025-02-04.md");
        assert_eq!(
            parse_uri(&uri).unwrap(),
            ResourcePath::Note("daily notes/2025-02-04.md".into())
        );

        let folder_uri = build_uri("projects", true);
        assert_eq!(folder_uri, "vault://notes/projects/");
        assert_eq!(
            parse_uri(&folder_uri).unwrap(),
            ResourcePath::Folder("projects".into())
        );
    }
}
