//! Path resolution for the registry, install root, and LLM config file.
//!
//! Uses env vars when set, otherwise defaults under the home directory.

use std::path::{Path, PathBuf};

pub const REGISTRY_PATH_VAR: &str = "MCP_REGISTRY_PATH";
pub const SETTINGS_PATH_VAR: &str = "MCP_SETTINGS_PATH";
pub const SERVERS_DIR_VAR: &str = "MCP_SERVERS_DIR";

/// Resolved paths used by every operation.
#[derive(Debug, Clone)]
pub struct Paths {
    pub registry: PathBuf,
    pub servers_dir: PathBuf,
    pub external_config: Option<PathBuf>,
}

impl Paths {
    /// Resolve paths from environment, falling back to home-directory defaults.
    pub fn resolve() -> Self {
        let registry = resolve_path(
            REGISTRY_PATH_VAR,
            dirs::home_dir().map(|p| p.join("mcp").join("mcp-registry.json")),
            "~/mcp/mcp-registry.json",
        );
        let servers_dir = resolve_path(
            SERVERS_DIR_VAR,
            dirs::home_dir().map(|p| p.join(".mcp").join("servers")),
            "~/.mcp/servers",
        );
        let external_config = env_path(SETTINGS_PATH_VAR);

        Self {
            registry,
            servers_dir,
            external_config,
        }
    }

    /// Build paths explicitly, bypassing the environment.
    pub fn new(
        registry: impl Into<PathBuf>,
        servers_dir: impl Into<PathBuf>,
        external_config: Option<PathBuf>,
    ) -> Self {
        Self {
            registry: registry.into(),
            servers_dir: servers_dir.into(),
            external_config,
        }
    }

    /// Registry JSON file.
    pub fn registry_path(&self) -> &Path {
        &self.registry
    }

    /// Directory that receives cloned server repositories.
    pub fn servers_dir(&self) -> &Path {
        &self.servers_dir
    }

    /// LLM client config file, if configured.
    pub fn external_config_path(&self) -> Option<&Path> {
        self.external_config.as_deref()
    }

    /// Log where state lives and warn when the LLM config file is not configured.
    /// Returns whether the external config path is set.
    pub fn check_settings(&self) -> bool {
        match self.external_config_path() {
            Some(path) => {
                tracing::info!(registry = %self.registry.display(), "using registry");
                tracing::info!(config = %path.display(), "using LLM config file");
                true
            }
            None => {
                tracing::warn!(
                    "{} is not set; commands cannot be saved to your LLM client config. \
                     Example: export {}=\"$HOME/Library/Application Support/Claude/claude_desktop_config.json\"",
                    SETTINGS_PATH_VAR,
                    SETTINGS_PATH_VAR
                );
                false
            }
        }
    }
}

fn env_path(env_var: &str) -> Option<PathBuf> {
    let val = std::env::var(env_var).ok()?;
    let trimmed = val.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(expand_tilde(trimmed))
    }
}

fn resolve_path(env_var: &str, home_default: Option<PathBuf>, fallback: &str) -> PathBuf {
    env_path(env_var).unwrap_or_else(|| home_default.unwrap_or_else(|| expand_tilde(fallback)))
}

fn expand_tilde(path: &str) -> PathBuf {
    let expanded = shellexpand::tilde(path);
    PathBuf::from(expanded.as_ref())
}
