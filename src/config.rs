use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{CategoryRule, KeyCode, QualificationTable};
use crate::pipeline::EngineConfig;

pub const FACTORY_CONFIG: &str = include_str!("../bundles/config.toml");

// Scalars come before tables so the file serializes in a valid TOML order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_null_threshold")]
    pub null_threshold: usize,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_key")]
    pub default_key: KeyCode,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub exclusions: BTreeSet<String>,
    #[serde(default)]
    pub statement: StatementConfig,
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
    #[serde(default)]
    pub qualification: BTreeMap<String, bool>,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub rules: Vec<CategoryRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementConfig {
    pub dir: String,
    pub pattern: String,
    pub skip_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
}

impl Default for StatementConfig {
    fn default() -> Self {
        Self {
            dir: "~/Downloads".to_string(),
            pattern: "CC_TXN_History_*.xls".to_string(),
            skip_rows: 9,
            sheet: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Key codes rendered as their own sections, in this order.
    pub categories: Vec<KeyCode>,
    /// Row table columns; empty means the default set.
    pub columns: Vec<String>,
    pub alerts: Vec<Alert>,
}

/// Banner shown when a category's subtotal goes above a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub key: KeyCode,
    pub above: Decimal,
    pub label: String,
}

fn default_null_threshold() -> usize {
    3
}

fn default_date_format() -> String {
    "%d %b %Y".to_string()
}

fn default_key() -> KeyCode {
    1
}

fn default_top_n() -> usize {
    10
}

impl Config {
    pub fn factory() -> Result<Self> {
        Ok(toml::from_str(FACTORY_CONFIG)?)
    }

    /// Typed view of the settings the classification engine needs.
    pub fn engine(&self) -> Result<EngineConfig> {
        Ok(EngineConfig {
            column_map: self.columns.clone(),
            null_threshold: self.null_threshold,
            rules: self.rules.clone(),
            qualification: QualificationTable::from_raw(&self.qualification)?,
            date_format: self.date_format.clone(),
            default_key: self.default_key,
        })
    }

    pub fn statement_dir(&self) -> PathBuf {
        expand_home(&self.statement.dir)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("ccc")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path)
}

/// Load the user config, or the factory default when none has been written.
/// A file that exists but does not parse is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!("no config at {}; using factory defaults", path.display());
        return Config::factory();
    }
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    debug!("config loaded from {}", path.display());
    Ok(config)
}

pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(config)?;
    std::fs::write(path, text)?;
    info!("configuration file written {}", path.display());
    Ok(())
}

/// Overwrite `path` with the factory config. An existing file is first
/// copied aside; the backup path is returned.
pub fn reset_config(path: &Path) -> Result<Option<PathBuf>> {
    let backup = if path.exists() {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let mut name = path.as_os_str().to_os_string();
        name.push(format!(".bak-{stamp}"));
        let backup = PathBuf::from(name);
        std::fs::copy(path, &backup)?;
        info!("backup done {}", backup.display());
        Some(backup)
    } else {
        None
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, FACTORY_CONFIG)?;
    info!("configuration file written {}", path.display());
    Ok(backup)
}

pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches(&['/', '\\'][..]));
        }
    }
    PathBuf::from(path)
}
