//! `read_note` — fetch a note body with stat metadata.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::envelope::Envelope;
use crate::tools::ToolError;
use crate::vault::Vault;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ReadNoteParams {
    /// Path to the note relative to the vault root (e.g. `projects/alpha.md`).
    #[schemars(description = "Path to the note relative to the vault root")]
    pub path: String,
}

pub async fn run(vault: &Vault, params: ReadNoteParams) -> Result<Envelope, ToolError> {
    let body = vault.read_note(&params.path).await?;

    // Stat enrichment is best-effort; a note readable upstream but absent
    // from the local root still reads fine.
    let mut metadata = json!({
        "path": &params.path,
        "content_length": body.len(),
    });
    if let Ok(stat) = vault.note_stat(&params.path).await {
        metadata["size"] = json!(stat.size_bytes);
        metadata["modified"] = json!(stat.modified_at.to_rfc3339());
        if let Some(created) = stat.created_at {
            metadata["created"] = json!(created.to_rfc3339());
        }
    }

    Ok(Envelope::text(body).with_metadata(metadata))
}
