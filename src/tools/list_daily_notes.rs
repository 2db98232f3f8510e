//! `list_daily_notes` — daily notes whose filename date falls in a range.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::envelope::Envelope;
use crate::template::{self, TemplateKind};
use crate::tools::ToolError;
use crate::vault::Vault;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListDailyNotesParams {
    /// Start of the date range, inclusive (`YYYY-MM-DD`).
    #[schemars(description = "Start of the date range, inclusive (YYYY-MM-DD)")]
    pub start_date: String,

    /// End of the date range, inclusive (`YYYY-MM-DD`).
    #[schemars(description = "End of the date range, inclusive (YYYY-MM-DD)")]
    pub end_date: String,
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ToolError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ToolError::InvalidArgs(format!("{field} must be YYYY-MM-DD, got '{value}'")))
}

pub async fn run(vault: &Vault, params: ListDailyNotesParams) -> Result<Envelope, ToolError> {
    let start = parse_date("start_date", &params.start_date)?;
    let end = parse_date("end_date", &params.end_date)?;
    if start > end {
        return Err(ToolError::InvalidArgs(
            "start_date must not be after end_date".into(),
        ));
    }

    let templates = &vault.config().templates;
    let notes = vault.list_notes(None, false, true).await?;

    let daily: Vec<_> = notes
        .into_iter()
        .filter(|note| template::detect(note.path(), templates) == Some(TemplateKind::Daily))
        .filter(|note| {
            let stem = note.name().trim_end_matches(".md");
            NaiveDate::parse_from_str(stem, "%Y-%m-%d")
                .map(|date| date >= start && date <= end)
                .unwrap_or(false)
        })
        .collect();

    let mut text = format!(
        "Found {} daily notes between {start} and {end}:\n\n",
        daily.len()
    );
    for note in &daily {
        text.push_str(&format!("- {}\n", note.path()));
    }

    Ok(Envelope::text(text).with_metadata(json!({
        "start_date": params.start_date,
        "end_date": params.end_date,
        "total_notes": daily.len(),
        "notes": daily,
    })))
}
