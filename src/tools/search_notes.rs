//! `search_notes` — upstream full-text search with metadata enrichment.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::envelope::Envelope;
use crate::tools::ToolError;
use crate::vault::Vault;

/// How many hits the human-readable summary lists before eliding.
const SUMMARY_LIMIT: usize = 10;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchNotesParams {
    /// Search query string to find in notes.
    #[schemars(description = "Search query string to find in notes")]
    pub query: String,

    /// Optional folder to limit search scope (e.g. `projects`).
    #[schemars(description = "Optional folder to limit search scope")]
    pub folder: Option<String>,
}

pub async fn run(vault: &Vault, params: SearchNotesParams) -> Result<Envelope, ToolError> {
    if params.query.trim().is_empty() {
        return Err(ToolError::InvalidArgs("query must not be empty".into()));
    }
    let folder = params
        .folder
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty());

    let hits = vault.search_notes(&params.query, folder).await?;

    let mut text = format!("Found {} results for '{}'", hits.len(), params.query);
    if let Some(folder) = folder {
        text.push_str(&format!(" in folder '{folder}'"));
    }
    text.push_str(":\n\n");
    for (i, hit) in hits.iter().take(SUMMARY_LIMIT).enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, hit.path));
        if let Some(snippet) = &hit.snippet {
            text.push_str(&format!("   {snippet}\n"));
        }
    }
    if hits.len() > SUMMARY_LIMIT {
        text.push_str(&format!("... and {} more results\n", hits.len() - SUMMARY_LIMIT));
    }

    Ok(Envelope::text(text).with_metadata(json!({
        "total_results": hits.len(),
        "query": params.query,
        "folder": folder,
        "results": hits,
    })))
}
