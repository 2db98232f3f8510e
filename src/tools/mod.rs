//! The tool registry and dispatcher.
//!
//! Thirteen tools make up the catalogue: system-level `ping` plus twelve
//! vault tools that carry the configured namespace prefix (`obs_` by
//! default). Each tool lives in its own file with a parameter struct; the
//! struct's `schemars` derive produces the advertised JSON schema, and the
//! same struct binds incoming arguments, so the schema can never drift
//! from what the handler actually accepts.

pub mod append_note;
pub mod check_note_exists;
pub mod create_note;
pub mod delete_note;
pub mod execute_command;
pub mod get_vault_structure;
pub mod keyword_search;
pub mod list_daily_notes;
pub mod list_notes;
pub mod read_note;
pub mod search_notes;
pub mod update_note;

use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::envelope::Envelope;
use crate::error::VaultError;
use crate::vault::Vault;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error(transparent)]
    Vault(#[from] VaultError),
}

/// One catalogue entry as advertised by `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

fn schema_of<P: JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(P)).unwrap_or_else(|_| json!({"type": "object"}))
}

/// Bind a raw arguments object against a tool's parameter struct. Unknown
/// keys, missing required keys, and type mismatches all land here.
fn bind<P: DeserializeOwned>(tool: &str, arguments: serde_json::Value) -> Result<P, ToolError> {
    serde_json::from_value(arguments)
        .map_err(|e| ToolError::InvalidArgs(format!("{tool}: {e}")))
}

/// The tool handler: shared vault plus the configured namespace prefix.
pub struct VaultTools {
    vault: Arc<Vault>,
    prefix: String,
}

impl VaultTools {
    pub fn new(vault: Arc<Vault>) -> Self {
        let prefix = vault.config().tools.prefix.clone();
        Self { vault, prefix }
    }

    pub fn vault(&self) -> &Arc<Vault> {
        &self.vault
    }

    /// Every tool in the catalogue, prefix applied, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let p = &self.prefix;
        vec![
            ToolDefinition {
                name: "ping".into(),
                description: "Test connectivity to the gateway".into(),
                input_schema: json!({
                    "type": "object",
                    "properties": {},
                    "additionalProperties": false
                }),
            },
            ToolDefinition {
                name: format!("{p}search_notes"),
                description: "Search notes in the vault using full-text search".into(),
                input_schema: schema_of::<search_notes::SearchNotesParams>(),
            },
            ToolDefinition {
                name: format!("{p}read_note"),
                description: "Read the complete content of a specific note".into(),
                input_schema: schema_of::<read_note::ReadNoteParams>(),
            },
            ToolDefinition {
                name: format!("{p}create_note"),
                description: "Create a new note, applying a folder template when one matches"
                    .into(),
                input_schema: schema_of::<create_note::CreateNoteParams>(),
            },
            ToolDefinition {
                name: format!("{p}update_note"),
                description: "Replace a note's content with optional format preservation".into(),
                input_schema: schema_of::<update_note::UpdateNoteParams>(),
            },
            ToolDefinition {
                name: format!("{p}append_note"),
                description: "Append content to an existing note".into(),
                input_schema: schema_of::<append_note::AppendNoteParams>(),
            },
            ToolDefinition {
                name: format!("{p}delete_note"),
                description: "Delete a note from the vault".into(),
                input_schema: schema_of::<delete_note::DeleteNoteParams>(),
            },
            ToolDefinition {
                name: format!("{p}list_notes"),
                description: "List notes in the vault or a folder, with metadata".into(),
                input_schema: schema_of::<list_notes::ListNotesParams>(),
            },
            ToolDefinition {
                name: format!("{p}get_vault_structure"),
                description: "Get the complete folder and note structure of the vault".into(),
                input_schema: schema_of::<get_vault_structure::GetVaultStructureParams>(),
            },
            ToolDefinition {
                name: format!("{p}execute_command"),
                description: "Execute an upstream plugin command".into(),
                input_schema: schema_of::<execute_command::ExecuteCommandParams>(),
            },
            ToolDefinition {
                name: format!("{p}keyword_search"),
                description: "Find notes containing a keyword, with surrounding context".into(),
                input_schema: schema_of::<keyword_search::KeywordSearchParams>(),
            },
            ToolDefinition {
                name: format!("{p}check_note_exists"),
                description: "Check whether a note exists at a path".into(),
                input_schema: schema_of::<check_note_exists::CheckNoteExistsParams>(),
            },
            ToolDefinition {
                name: format!("{p}list_daily_notes"),
                description: "List daily notes whose date falls inside a range".into(),
                input_schema: schema_of::<list_daily_notes::ListDailyNotesParams>(),
            },
        ]
    }

    /// Route a call by exact name. `ping` is the only unprefixed tool.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<Envelope, ToolError> {
        if name == "ping" {
            return Ok(Envelope::text("pong").with_metadata(json!({
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })));
        }

        let Some(suffix) = name.strip_prefix(&self.prefix) else {
            return Err(ToolError::UnknownTool(name.to_string()));
        };

        let vault = self.vault.as_ref();
        match suffix {
            "search_notes" => search_notes::run(vault, bind(name, arguments)?).await,
            "read_note" => read_note::run(vault, bind(name, arguments)?).await,
            "create_note" => create_note::run(vault, bind(name, arguments)?).await,
            "update_note" => update_note::run(vault, bind(name, arguments)?).await,
            "append_note" => append_note::run(vault, bind(name, arguments)?).await,
            "delete_note" => delete_note::run(vault, bind(name, arguments)?).await,
            "list_notes" => list_notes::run(vault, bind(name, arguments)?).await,
            "get_vault_structure" => {
                get_vault_structure::run(vault, bind(name, arguments)?).await
            }
            "execute_command" => execute_command::run(vault, bind(name, arguments)?).await,
            "keyword_search" => keyword_search::run(vault, bind(name, arguments)?).await,
            "check_note_exists" => check_note_exists::run(vault, bind(name, arguments)?).await,
            "list_daily_notes" => list_daily_notes::run(vault, bind(name, arguments)?).await,
            _ => Err(ToolError::UnknownTool(name.to_string())),
        }
    }
}
