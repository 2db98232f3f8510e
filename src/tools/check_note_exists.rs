//! `check_note_exists` — existence probe with best-effort mtime.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::envelope::{ContentPart, Envelope};
use crate::tools::ToolError;
use crate::vault::Vault;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CheckNoteExistsParams {
    /// Path to check.
    #[schemars(description = "Path to check for an existing note")]
    pub path: String,
}

pub async fn run(vault: &Vault, params: CheckNoteExistsParams) -> Result<Envelope, ToolError> {
    let exists = vault.note_exists(&params.path).await?;

    let modified = if exists {
        vault
            .note_stat(&params.path)
            .await
            .ok()
            .map(|stat| stat.modified_at.to_rfc3339())
    } else {
        None
    };

    let mut envelope = Envelope::text(if exists {
        format!("Note exists: {}", params.path)
    } else {
        format!("Note does not exist: {}", params.path)
    })
    .with_metadata(json!({ "path": params.path }));
    envelope.content.push(ContentPart::Json {
        data: json!({ "exists": exists, "modified": modified }),
    });
    Ok(envelope)
}
