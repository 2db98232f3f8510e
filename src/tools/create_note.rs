//! `create_note` — create a note, applying a folder template when one
//! matches the path.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::envelope::Envelope;
use crate::template;
use crate::tools::ToolError;
use crate::vault::Vault;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateNoteParams {
    /// Path where the note should be created (e.g. `ideas/new-idea.md`).
    #[schemars(description = "Path where the note should be created")]
    pub path: String,

    /// Content of the new note in Markdown.
    #[schemars(description = "Content of the new note in Markdown")]
    pub content: String,

    /// Whether to apply the folder template (daily-notes, projects, areas).
    /// Defaults to true.
    #[schemars(description = "Whether to apply the matching folder template. Defaults to true.")]
    pub use_template: Option<bool>,

    /// Whether to create missing parent folders. Defaults to true.
    #[schemars(description = "Whether to create missing parent folders. Defaults to true.")]
    pub create_folders: Option<bool>,
}

pub async fn run(vault: &Vault, params: CreateNoteParams) -> Result<Envelope, ToolError> {
    let use_template = params.use_template.unwrap_or(true);
    let create_folders = params.create_folders.unwrap_or(true);

    let (content, applied) = if use_template {
        let outcome = template::apply_create_template(
            &params.path,
            &params.content,
            &chrono::Local::now(),
            &vault.config().templates,
        );
        (outcome.content, outcome.applied)
    } else {
        (params.content.clone(), None)
    };

    vault
        .create_note(&params.path, &content, create_folders)
        .await?;

    let mut text = format!("Created note: {}", params.path);
    if let Some(kind) = applied {
        text.push_str(&format!(" (applied {kind} template)"));
    }

    Ok(Envelope::text(text).with_metadata(json!({
        "path": params.path,
        "content_length": content.len(),
        "template_applied": applied.is_some(),
        "note_type": applied.map(|k| k.as_str()),
        "folders_created": create_folders,
    })))
}
