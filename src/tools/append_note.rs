//! `append_note` — append content to an existing note.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::envelope::Envelope;
use crate::tools::ToolError;
use crate::vault::Vault;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AppendNoteParams {
    /// Path to the note to append to.
    #[schemars(description = "Path to the note to append to")]
    pub path: String,

    /// Content to append.
    #[schemars(description = "Content to append to the note")]
    pub content: String,

    /// Separator between existing and new content. Defaults to a blank line.
    #[schemars(
        description = "Separator between existing and new content. Defaults to a blank line."
    )]
    pub separator: Option<String>,
}

pub async fn run(vault: &Vault, params: AppendNoteParams) -> Result<Envelope, ToolError> {
    let separator = params.separator.as_deref().unwrap_or("\n\n");

    vault
        .append_note(&params.path, &params.content, separator)
        .await?;

    Ok(
        Envelope::text(format!("Appended to note: {}", params.path)).with_metadata(json!({
            "path": params.path,
            "appended_length": params.content.len(),
            "separator": separator,
        })),
    )
}
