//! `execute_command` — run an upstream plugin command by name.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::envelope::Envelope;
use crate::tools::ToolError;
use crate::vault::Vault;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ExecuteCommandParams {
    /// Name of the upstream command to execute (e.g. `app:reload`).
    #[schemars(description = "Name of the upstream command to execute")]
    pub command: String,

    /// Optional parameters for the command.
    #[schemars(description = "Optional parameters for the command")]
    pub parameters: Option<serde_json::Value>,
}

pub async fn run(vault: &Vault, params: ExecuteCommandParams) -> Result<Envelope, ToolError> {
    if params.command.trim().is_empty() {
        return Err(ToolError::InvalidArgs("command must not be empty".into()));
    }

    let result = vault
        .execute_command(&params.command, params.parameters.as_ref())
        .await?;

    Ok(
        Envelope::text(format!("Executed command: {}", params.command)).with_metadata(json!({
            "command": params.command,
            "parameters": params.parameters,
            "result": result,
        })),
    )
}
