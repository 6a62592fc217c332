//! `portaria.toml` settings
//!
//! Every section is optional; a missing file behaves like an empty one.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use portaria_core::{DocumentTemplate, DEFAULT_FILENAME};
use portaria_data::{SheetLayout, SheetsAuth, SheetsConfig, DEFAULT_SHEETS_URL};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settings file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "portaria.toml";

/// Where rows come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Google Sheets API
    #[default]
    Google,
    /// Local CSV export
    Csv,
    /// Local Excel workbook
    Xlsx,
}

/// Top-level settings structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub layout: SheetLayout,
    pub output: OutputSettings,
    pub document: DocumentTemplate,
}

/// Row source settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub kind: SourceKind,
    /// Sheets API endpoint
    pub base_url: String,
    /// Environment variable holding an API key
    pub api_key_env: String,
    /// Environment variable holding an OAuth bearer token (wins over the key)
    pub token_env: String,
    pub timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: SourceKind::Google,
            base_url: DEFAULT_SHEETS_URL.to_string(),
            api_key_env: "PORTARIA_SHEETS_API_KEY".to_string(),
            token_env: "PORTARIA_SHEETS_TOKEN".to_string(),
            timeout_secs: 30,
        }
    }
}

impl SourceSettings {
    /// Credentials read from the configured environment variables
    pub fn auth(&self) -> SheetsAuth {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(token) = read(&self.token_env) {
            SheetsAuth::BearerToken(token)
        } else if let Some(key) = read(&self.api_key_env) {
            SheetsAuth::ApiKey(key)
        } else {
            SheetsAuth::Anonymous
        }
    }

    /// Sheets client configuration for the given layout
    pub fn sheets_config(&self, layout: &SheetLayout) -> SheetsConfig {
        SheetsConfig {
            base_url: self.base_url.clone(),
            auth: self.auth(),
            timeout: Duration::from_secs(self.timeout_secs),
            layout: layout.clone(),
        }
    }
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// File name used when `--output` is absent or names a directory
    pub filename: String,
    /// DOCX/DOTX whose styles, headers and footers are reused
    pub base_template: Option<PathBuf>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            base_template: None,
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings from `path`, or from [`DEFAULT_CONFIG_FILE`] when it exists.
    ///
    /// An explicit path must exist. Relative `base_template` paths are resolved
    /// against the directory of the settings file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut settings = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        if let Some(base) = settings.output.base_template.take() {
            let base = match path.parent() {
                Some(dir) if base.is_relative() => dir.join(base),
                _ => base,
            };
            settings.output.base_template = Some(base);
        }

        debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }
}
