use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Scope used when neither `--scope` nor `default_scope` is given
pub const DEFAULT_SCOPE: &str = "default";

/// Get the config directory path (~/.config/converge)
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("converge"))
}

/// Get the default state directory (~/.local/state/converge)
pub fn default_state_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".local").join("state").join("converge"))
}

// ============================================================================
// Config File
// ============================================================================

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the example platform API
    pub api_url: Option<String>,

    /// Scope used when `--scope` is not given
    pub default_scope: Option<String>,

    /// Where scopes are persisted (`~` is expanded)
    pub state_dir: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Path of the config file
    pub fn path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load the config file, or defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load a config file from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Combine the file with command-line values into the effective settings
    ///
    /// Flags and environment variables (already merged by clap) win over the
    /// file, which wins over built-in defaults.
    pub fn resolve(
        self,
        api_url: Option<String>,
        state_dir: Option<PathBuf>,
    ) -> Result<Settings> {
        let state_dir = match (state_dir, self.state_dir) {
            (Some(dir), _) => dir,
            (None, Some(dir)) => expand_path(&dir),
            (None, None) => default_state_dir()?,
        };

        Ok(Settings {
            api_url: api_url.or(self.api_url),
            default_scope: self
                .default_scope
                .unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            state_dir,
            timeout: self.timeout_secs.map(Duration::from_secs),
        })
    }
}

/// Effective settings after applying precedence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// API URL override; `None` lets the client fall back to its default
    pub api_url: Option<String>,
    pub default_scope: String,
    pub state_dir: PathBuf,
    pub timeout: Option<Duration>,
}

impl Settings {
    /// Pick the scope name for a command
    pub fn scope_name(&self, requested: Option<&str>) -> String {
        requested.map_or_else(|| self.default_scope.clone(), str::to_string)
    }
}

/// Expand `~` and environment variables in a path
fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(path).as_ref()),
    }
}
