//! `keyword_search` — linear scan for a keyword with ±N-character context.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::envelope::Envelope;
use crate::tools::ToolError;
use crate::vault::Vault;

const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct KeywordSearchParams {
    /// Keyword or phrase to search for in note content.
    #[schemars(description = "Keyword or phrase to search for in note content")]
    pub keyword: String,

    /// Optional folder to limit search scope.
    #[schemars(description = "Optional folder to limit search scope")]
    pub folder: Option<String>,

    /// Whether the match is case-sensitive. Defaults to false.
    #[schemars(description = "Whether the match is case-sensitive. Defaults to false.")]
    pub case_sensitive: Option<bool>,

    /// Maximum number of notes to return. Defaults to 20.
    #[schemars(description = "Maximum number of notes to return. Defaults to 20.")]
    pub limit: Option<usize>,
}

pub async fn run(vault: &Vault, params: KeywordSearchParams) -> Result<Envelope, ToolError> {
    if params.keyword.trim().is_empty() {
        return Err(ToolError::InvalidArgs("keyword must not be empty".into()));
    }
    let case_sensitive = params.case_sensitive.unwrap_or(false);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let folder = params
        .folder
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty());

    let matches = vault
        .keyword_search(&params.keyword, folder, case_sensitive, Some(limit))
        .await?;

    let mut text = format!(
        "Found {} notes containing '{}'",
        matches.len(),
        params.keyword
    );
    if let Some(folder) = folder {
        text.push_str(&format!(" in folder '{folder}'"));
    }
    text.push_str(":\n\n");
    for (i, hit) in matches.iter().enumerate() {
        text.push_str(&format!("{}. {}\n   {}\n", i + 1, hit.path, hit.context));
    }

    Ok(Envelope::text(text).with_metadata(json!({
        "keyword": params.keyword,
        "folder": folder,
        "case_sensitive": case_sensitive,
        "limit": limit,
        "total_found": matches.len(),
        "matches": matches,
    })))
}
