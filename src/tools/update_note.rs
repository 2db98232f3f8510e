//! `update_note` — replace a note's content, optionally preserving its
//! existing header block, with an advisory date-consistency check for
//! daily notes.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::envelope::Envelope;
use crate::template;
use crate::tools::ToolError;
use crate::vault::Vault;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateNoteParams {
    /// Path to the note to update.
    #[schemars(description = "Path to the note to update")]
    pub path: String,

    /// New content that replaces the note body.
    #[schemars(description = "New content that replaces the note body")]
    pub content: String,

    /// Whether to merge the existing header block into the new content.
    /// Defaults to true.
    #[schemars(
        description = "Whether to merge the existing header block into the new content. Defaults to true."
    )]
    pub preserve_format: Option<bool>,
}

pub async fn run(vault: &Vault, params: UpdateNoteParams) -> Result<Envelope, ToolError> {
    let preserve_format = params.preserve_format.unwrap_or(true);

    let warnings =
        template::daily_date_warnings(&params.path, &params.content, &vault.config().templates);

    let (content, format_preserved) = if preserve_format {
        // The existing read doubles as the exists check; a missing note
        // fails here before anything is written.
        let existing = vault.read_note(&params.path).await?;
        (
            template::merge_preserving_format(&existing, &params.content),
            true,
        )
    } else {
        (params.content.clone(), false)
    };

    vault.update_note(&params.path, &content).await?;

    let mut text = format!("Updated note: {}", params.path);
    if format_preserved {
        text.push_str(" (existing format preserved)");
    }
    for warning in &warnings {
        tracing::warn!(path = %params.path, warning = %warning, "date mismatch on daily note");
    }

    Ok(Envelope::text(text)
        .with_metadata(json!({
            "path": params.path,
            "content_length": content.len(),
            "format_preserved": format_preserved,
        }))
        .with_warnings(warnings))
}
