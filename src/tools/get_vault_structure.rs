//! `get_vault_structure` — the complete folder and note tree.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::envelope::Envelope;
use crate::tools::ToolError;
use crate::vault::Vault;

/// How many notes the human-readable overview lists before eliding.
const OVERVIEW_LIMIT: usize = 20;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetVaultStructureParams {
    /// Whether to serve a cached structure if one is fresh. Defaults to true.
    #[schemars(description = "Whether to serve a cached structure if fresh. Defaults to true.")]
    pub use_cache: Option<bool>,
}

pub async fn run(vault: &Vault, params: GetVaultStructureParams) -> Result<Envelope, ToolError> {
    let use_cache = params.use_cache.unwrap_or(true);
    let structure = vault.structure(use_cache).await?;

    let mut text = format!(
        "# Vault Structure\n\nRoot: {}\nTotal notes: {}\nTotal folders: {}\n\n## Folders\n\n",
        structure.root_path, structure.total_notes, structure.total_folders,
    );
    for folder in &structure.folders {
        let indent = "  ".repeat(folder.path.matches('/').count());
        text.push_str(&format!(
            "{indent}{}/ ({} notes, {} subfolders)\n",
            folder.name, folder.notes_count, folder.subfolders_count,
        ));
    }
    text.push_str("\n## Notes\n\n");
    for note in structure.notes.iter().take(OVERVIEW_LIMIT) {
        text.push_str(&format!("- {} ({} bytes)\n", note.path(), note.size_bytes));
    }
    if structure.notes.len() > OVERVIEW_LIMIT {
        text.push_str(&format!(
            "\n... and {} more notes\n",
            structure.notes.len() - OVERVIEW_LIMIT
        ));
    }

    Ok(Envelope::text(text).with_metadata(json!({
        "root_path": &structure.root_path,
        "total_notes": structure.total_notes,
        "total_folders": structure.total_folders,
        "folders": &structure.folders,
        "notes": &structure.notes,
        "cached": use_cache,
    })))
}
