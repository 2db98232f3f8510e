use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct VaultgateConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub vault: VaultConfig,
    pub cache: CacheConfig,
    pub search: SearchConfig,
    pub tools: ToolsConfig,
    pub templates: TemplatesConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the note-plugin REST API.
    pub base_url: String,
    /// Bearer credential for every upstream call.
    pub api_key: String,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct VaultConfig {
    /// Local vault root, used for filesystem-fallback discovery and note
    /// stat lookups. Empty disables the filesystem paths.
    pub root_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub structure_ttl_secs: u64,
    pub notes_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Concurrent reads per enrichment / keyword-scan batch.
    pub batch_size: usize,
    /// Characters of context on each side of a keyword match.
    pub snippet_radius: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ToolsConfig {
    /// Namespace prefix for every tool except `ping`.
    pub prefix: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Folder names (bare, without a `NN_` number prefix) that select each
    /// template kind.
    pub daily_folders: Vec<String>,
    pub project_folders: Vec<String>,
    pub area_folders: Vec<String>,
}

impl Default for VaultgateConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            vault: VaultConfig::default(),
            cache: CacheConfig::default(),
            search: SearchConfig::default(),
            tools: ToolsConfig::default(),
            templates: TemplatesConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8888,
            log_level: "info".into(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:27123".into(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root_path: String::new(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            structure_ttl_secs: 300,
            notes_ttl_secs: 180,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            batch_size: 15,
            snippet_radius: 80,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            prefix: "obs_".into(),
        }
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            daily_folders: vec!["daily-notes".into()],
            project_folders: vec!["projects".into()],
            area_folders: vec!["areas".into()],
        }
    }
}

/// Returns `~/.vaultgate/`
pub fn default_vaultgate_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".vaultgate")
}

/// Returns the default config file path: `~/.vaultgate/config.toml`
pub fn default_config_path() -> PathBuf {
    default_vaultgate_dir().join("config.toml")
}

impl VaultgateConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            VaultgateConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (VAULTGATE_UPSTREAM_URL,
    /// VAULTGATE_API_KEY, VAULTGATE_VAULT_ROOT, VAULTGATE_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("VAULTGATE_UPSTREAM_URL") {
            self.upstream.base_url = val;
        }
        if let Ok(val) = std::env::var("VAULTGATE_API_KEY") {
            self.upstream.api_key = val;
        }
        if let Ok(val) = std::env::var("VAULTGATE_VAULT_ROOT") {
            self.vault.root_path = val;
        }
        if let Ok(val) = std::env::var("VAULTGATE_LOG_LEVEL") {
            self.server.log_level = val;
        }
    }

    /// Resolve the vault root, expanding `~` if needed. `None` when no root
    /// is configured.
    pub fn resolved_vault_root(&self) -> Option<PathBuf> {
        if self.vault.root_path.is_empty() {
            None
        } else {
            Some(expand_tilde(&self.vault.root_path))
        }
    }

    pub fn structure_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.structure_ttl_secs)
    }

    pub fn notes_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.notes_ttl_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.timeout_secs)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = VaultgateConfig::default();
        assert_eq!(config.server.port, 8888);
        assert_eq!(config.upstream.timeout_secs, 30);
        assert_eq!(config.cache.structure_ttl_secs, 300);
        assert_eq!(config.cache.notes_ttl_secs, 180);
        assert_eq!(config.search.batch_size, 15);
        assert_eq!(config.search.snippet_radius, 80);
        assert_eq!(config.tools.prefix, "obs_");
        assert!(config.resolved_vault_root().is_none());
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
port = 9000
log_level = "debug"

[upstream]
base_url = "http://localhost:36961"
api_key = "secret"

[vault]
root_path = "/tmp/vault"

[search]
batch_size = 5
"#;
        let config: VaultgateConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.upstream.base_url, "http://localhost:36961");
        assert_eq!(config.upstream.api_key, "secret");
        assert_eq!(config.vault.root_path, "/tmp/vault");
        assert_eq!(config.search.batch_size, 5);
        // defaults still apply for unset fields
        assert_eq!(config.search.snippet_radius, 80);
        assert_eq!(config.cache.structure_ttl_secs, 300);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = VaultgateConfig::default();
        std::env::set_var("VAULTGATE_UPSTREAM_URL", "http://10.0.0.2:27123");
        std::env::set_var("VAULTGATE_API_KEY", "from-env");
        std::env::set_var("VAULTGATE_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.upstream.base_url, "http://10.0.0.2:27123");
        assert_eq!(config.upstream.api_key, "from-env");
        assert_eq!(config.server.log_level, "trace");

        // Clean up
        std::env::remove_var("VAULTGATE_UPSTREAM_URL");
        std::env::remove_var("VAULTGATE_API_KEY");
        std::env::remove_var("VAULTGATE_LOG_LEVEL");
    }

    #[test]
    fn tilde_expansion() {
        let expanded = expand_tilde("~/vault");
        assert!(expanded.is_absolute());
        assert!(expanded.ends_with("vault"));
        assert_eq!(expand_tilde("/abs/vault"), PathBuf::from("/abs/vault"));
    }
}
