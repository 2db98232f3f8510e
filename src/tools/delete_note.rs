//! `delete_note` — delete a note from the vault.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::envelope::Envelope;
use crate::tools::ToolError;
use crate::vault::Vault;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DeleteNoteParams {
    /// Path to the note to delete.
    #[schemars(description = "Path to the note to delete")]
    pub path: String,
}

pub async fn run(vault: &Vault, params: DeleteNoteParams) -> Result<Envelope, ToolError> {
    vault.delete_note(&params.path).await?;

    Ok(
        Envelope::text(format!("Deleted note: {}", params.path)).with_metadata(json!({
            "path": params.path,
        })),
    )
}
