//! Application configuration loaded from a TOML file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::fs::preview::DEFAULT_TEXT_EXTENSIONS;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "RAPYD_CONFIG";

/// Top-level application configuration.
///
/// All fields have sensible defaults so the browser works without a config
/// file. Call [`Config::load`] to read from a TOML path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> CoreResult<Self> {
        match Self::load(path) {
            Err(CoreError::NotFound(_)) => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// `$RAPYD_CONFIG` if set, otherwise `~/.config/rapyd/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        match std::env::var_os(CONFIG_ENV) {
            Some(p) if !p.is_empty() => Some(PathBuf::from(p)),
            _ => config_dir().map(|d| d.join("config.toml")),
        }
    }

    /// Returns a copy pointing at another server.
    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        Self {
            server: ServerConfig {
                base_url: base_url.into(),
                ..self.server
            },
            ..self
        }
    }
}

/// `~/.config/rapyd`, or `None` when `HOME` is unset.
pub fn config_dir() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".config").join("rapyd"))
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix('~'), home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(path),
    }
}

/// Where the file service lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Browsing behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Clear the filter query whenever a different directory is opened.
    #[serde(default)]
    pub clear_query_on_navigate: bool,
}

/// Preview overlay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    #[serde(default = "default_text_extensions")]
    pub text_extensions: Vec<String>,
    #[serde(default = "default_max_text_lines")]
    pub max_text_lines: usize,
    #[serde(default = "default_syntax_theme")]
    pub syntax_theme: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            text_extensions: default_text_extensions(),
            max_text_lines: default_max_text_lines(),
            syntax_theme: default_syntax_theme(),
        }
    }
}

/// Download destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_download_dir")]
    pub dir: String,
}

impl DownloadConfig {
    /// The destination directory with `~` expanded.
    pub fn resolved_dir(&self) -> PathBuf {
        expand_home(&self.dir)
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            dir: default_download_dir(),
        }
    }
}

/// Display preferences that are not toggled at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_icons: bool,
    /// Optional TOML theme file replacing the built-in dark palette.
    #[serde(default)]
    pub theme_file: Option<String>,
    /// `strftime` pattern for modification dates in detail view.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_icons: true,
            theme_file: None,
            date_format: default_date_format(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_text_extensions() -> Vec<String> {
    DEFAULT_TEXT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_max_text_lines() -> usize {
    500
}

fn default_syntax_theme() -> String {
    "base16-eighties.dark".to_string()
}

fn default_download_dir() -> String {
    "~/Downloads".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}
