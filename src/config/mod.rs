// ABOUTME: Configuration loaded from ~/.config/ws/config.toml
// Holds the history policy knobs, picker command and logging settings

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable pointing at an alternative config file
pub const CONFIG_ENV: &str = "WS_CONFIG";

const APP_DIR: &str = "ws";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub history: HistoryConfig,
    pub picker: PickerConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// History file location; defaults to the platform data dir
    pub file: Option<PathBuf>,
    /// Maximum number of entries kept for "back"
    pub max_depth: usize,
    /// How long to wait for another invocation to release the history lock
    pub lock_timeout_ms: u64,
    pub lock_poll_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            file: None,
            max_depth: 10,
            lock_timeout_ms: 500,
            lock_poll_ms: 20,
        }
    }
}

impl HistoryConfig {
    pub fn path(&self) -> PathBuf {
        self.file
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(|| data_dir().join("history.json"))
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn lock_poll(&self) -> Duration {
        Duration::from_millis(self.lock_poll_ms)
    }
}

/// Which fuzzy finder runs `pick` and `kill`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickerBackend {
    /// Built-in skim finder
    #[default]
    Skim,
    /// External finder speaking fzf's stdin/stdout protocol
    Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    pub backend: PickerBackend,
    /// Screen height used by the built-in finder
    pub height: String,
    /// External finder, used with `backend = "command"`
    pub command: String,
    pub args: Vec<String>,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            backend: PickerBackend::Skim,
            height: "100%".to_string(),
            command: "fzf".to_string(),
            args: vec!["--reverse".to_string(), "--no-multi".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            filter: "tmux_ws=info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn path(&self) -> PathBuf {
        self.file
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(|| data_dir().join("logs").join("ws.log"))
    }
}

impl AppConfig {
    /// Loads from `$WS_CONFIG` or the default location. A missing file
    /// yields the defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_path);
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR)
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.history.max_depth == 0 {
            bail!("history.max_depth must be at least 1");
        }
        if self.picker.backend == PickerBackend::Command && self.picker.command.trim().is_empty() {
            bail!("picker.command must not be empty");
        }
        Ok(())
    }
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

fn expand_tilde(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
