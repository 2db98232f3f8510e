//! Core vault data types.
//!
//! Defines [`NoteRef`] (path + derived name), [`NoteMetadata`] (a discovered
//! note with optional lazily-extracted headers), [`FolderInfo`] and
//! [`VaultStructure`] (the browsable tree), and [`SearchHit`] (one upstream
//! search result, optionally enriched with stat metadata).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A vault-relative note reference. `path` uses forward slashes, carries no
/// leading slash, and ends in `.md`; `name` is always the final segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRef {
    pub path: String,
    pub name: String,
}

impl NoteRef {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self { path, name }
    }

    /// The parent folder path, or `""` for a root-level note.
    pub fn parent(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..idx],
            None => "",
        }
    }
}

/// Filesystem-level facts about a single note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteStat {
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A discovered note with stat data and optional structured headers.
///
/// `headers == None` means "not yet extracted" — the enrichment stage fills
/// it in on request. An extracted-but-empty (or unparseable) header block is
/// `Some(empty map)`, never `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteMetadata {
    #[serde(flatten)]
    pub reference: NoteRef,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<serde_json::Map<String, serde_json::Value>>,
}

impl NoteMetadata {
    pub fn new(path: impl Into<String>, stat: NoteStat) -> Self {
        Self {
            reference: NoteRef::new(path),
            size_bytes: stat.size_bytes,
            modified_at: stat.modified_at,
            created_at: stat.created_at,
            headers: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.reference.path
    }

    pub fn name(&self) -> &str {
        &self.reference.name
    }
}

/// A folder in the vault tree. Counts cover *direct* children only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderInfo {
    pub path: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub notes_count: usize,
    pub subfolders_count: usize,
}

/// The complete vault tree: every folder, every note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultStructure {
    pub root_path: String,
    pub folders: Vec<FolderInfo>,
    pub notes: Vec<NoteMetadata>,
    pub total_notes: usize,
    pub total_folders: usize,
}

impl VaultStructure {
    /// Build a structure from discovered notes. Folders are derived from the
    /// note paths (every ancestor of every note, plus any extra folders the
    /// upstream listing reported), so each note's parent chain is always
    /// present in `folders`. Totals are set from the collection lengths.
    pub fn assemble(
        root_path: impl Into<String>,
        mut notes: Vec<NoteMetadata>,
        extra_folders: impl IntoIterator<Item = String>,
    ) -> Self {
        use std::collections::BTreeSet;

        notes.sort_by(|a, b| a.path().cmp(b.path()));

        let mut folder_paths: BTreeSet<String> = BTreeSet::new();
        for folder in extra_folders {
            let folder = folder.trim_matches('/').to_string();
            if !folder.is_empty() {
                folder_paths.insert(folder);
            }
        }
        for note in &notes {
            let mut parent = note.reference.parent();
            while !parent.is_empty() {
                folder_paths.insert(parent.to_string());
                parent = match parent.rfind('/') {
                    Some(idx) => &parent[..idx],
                    None => "",
                };
            }
        }
        // Ancestors of upstream-reported folders must be present too.
        let reported: Vec<String> = folder_paths.iter().cloned().collect();
        for folder in reported {
            let mut parent = folder.as_str();
            while let Some(idx) = parent.rfind('/') {
                parent = &parent[..idx];
                folder_paths.insert(parent.to_string());
            }
        }

        let folders: Vec<FolderInfo> = folder_paths
            .iter()
            .map(|path| {
                let name = path.rsplit('/').next().unwrap_or(path).to_string();
                let parent = path.rfind('/').map(|idx| path[..idx].to_string());
                let notes_count = notes
                    .iter()
                    .filter(|n| n.reference.parent() == path.as_str())
                    .count();
                let subfolders_count = folder_paths
                    .iter()
                    .filter(|other| match other.rfind('/') {
                        Some(idx) => &other[..idx] == path.as_str(),
                        None => false,
                    })
                    .count();
                FolderInfo {
                    path: path.clone(),
                    name,
                    parent,
                    notes_count,
                    subfolders_count,
                }
            })
            .collect();

        let total_notes = notes.len();
        let total_folders = folders.len();
        Self {
            root_path: root_path.into(),
            folders,
            notes,
            total_notes,
            total_folders,
        }
    }

    /// Notes that are direct children of `folder` (`""` for the root).
    pub fn notes_in(&self, folder: &str) -> Vec<&NoteMetadata> {
        self.notes
            .iter()
            .filter(|n| n.reference.parent() == folder)
            .collect()
    }

    /// Folders that are direct children of `folder` (`""` for the root).
    pub fn folders_in(&self, folder: &str) -> Vec<&FolderInfo> {
        self.folders
            .iter()
            .filter(|f| match (&f.parent, folder.is_empty()) {
                (None, true) => true,
                (Some(parent), false) => parent == folder,
                _ => false,
            })
            .collect()
    }

    pub fn find_folder(&self, path: &str) -> Option<&FolderInfo> {
        self.folders.iter().find(|f| f.path == path)
    }
}

/// One hit from upstream full-text search. `metadata` is filled by the
/// concurrent enrichment pass when the stat lookup succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub path: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NoteStat>,
}

/// One match from the linear keyword scan, with a ±N-character context
/// window around the first occurrence.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordMatch {
    pub path: String,
    pub name: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    pub context: String,
    pub folder: String,
}
