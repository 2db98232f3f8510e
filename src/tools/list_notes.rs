//! `list_notes` — list notes with metadata, optionally enriched with
//! structured headers.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::envelope::Envelope;
use crate::tools::ToolError;
use crate::vault::Vault;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListNotesParams {
    /// Optional folder to list notes from. Empty for the whole vault.
    #[schemars(description = "Optional folder to list notes from. Empty for the whole vault.")]
    pub folder: Option<String>,

    /// Whether to extract structured headers for each note (slower).
    /// Defaults to false.
    #[schemars(
        description = "Whether to extract structured headers for each note. Defaults to false."
    )]
    pub include_headers: Option<bool>,
}

pub async fn run(vault: &Vault, params: ListNotesParams) -> Result<Envelope, ToolError> {
    let include_headers = params.include_headers.unwrap_or(false);
    let folder = params
        .folder
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty());

    let notes = vault.list_notes(folder, include_headers, true).await?;

    let mut text = format!("Found {} notes", notes.len());
    if let Some(folder) = folder {
        text.push_str(&format!(" in folder '{folder}'"));
    }
    text.push_str(":\n\n");
    for note in &notes {
        text.push_str(&format!(
            "- {} ({} bytes, modified {})\n",
            note.path(),
            note.size_bytes,
            note.modified_at.format("%Y-%m-%d %H:%M"),
        ));
    }

    Ok(Envelope::text(text).with_metadata(json!({
        "total_notes": notes.len(),
        "folder": folder,
        "include_headers": include_headers,
        "notes": notes,
    })))
}
