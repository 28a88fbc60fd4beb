use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::filename::DEFAULT_TEMPLATE;

/// Capture source: the directory the recording proxy auto-saves HAR
/// archives into, plus the environment tag and its host groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Directory watched/scanned for `.har` files.
    pub har_dir: PathBuf,
    /// Environment tag (e.g. "stg", "uat", "prod"); selects a host group
    /// and is embedded in run directory names.
    pub env: String,
    /// Map of environment tag to host substrings. When the current env
    /// has a group, it overrides `filter.include_host`.
    pub host_groups: BTreeMap<String, Vec<String>>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            har_dir: PathBuf::from("har"),
            env: "uat".to_string(),
            host_groups: BTreeMap::new(),
        }
    }
}

/// Allow-list filters applied to each HAR entry. An empty list means
/// "no filtering on this dimension".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// URL path must contain at least one of these substrings.
    pub include_path: Vec<String>,
    /// Host must contain at least one of these substrings (case-insensitive).
    pub include_host: Vec<String>,
    /// HTTP method must equal one of these (case-insensitive).
    pub include_method: Vec<String>,
}

/// Where artifacts land and how their filenames are rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for run directories.
    pub data_dir: PathBuf,
    /// Filename template; placeholders: {{method}} {{host}} {{path}} {{ts}}.
    pub file_name_template: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            file_name_template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Report output location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub out_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("reports"),
        }
    }
}

/// Continuous-capture tuning: write-stability window and graceful stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// A file is "stabilized" once its size and mtime are unchanged for
    /// this long after the last change event.
    pub stability_ms: u64,
    /// Poll granularity for the stability check and shutdown flag.
    pub poll_ms: u64,
    /// How long `stop` waits for in-flight extractions before giving up.
    pub graceful_wait_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            stability_ms: 1500,
            poll_ms: 150,
            graceful_wait_ms: 8000,
        }
    }
}

/// Run-level overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Fixed run name; when unset, a fresh `YYYY-MM-DD_HH-MM` name is
    /// generated per session.
    pub run_name: Option<String>,
    /// Free-form device label shown in report metadata.
    pub device_model: Option<String>,
}

/// Global configuration loaded from `~/.config/harcap/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarcapConfig {
    pub capture: CaptureConfig,
    pub filter: FilterConfig,
    pub storage: StorageConfig,
    pub report: ReportConfig,
    pub watch: WatchConfig,
    pub runtime: RuntimeConfig,
}

impl HarcapConfig {
    /// Host allow-list in effect: the host group for the current env
    /// when one exists, otherwise the explicit `filter.include_host`.
    /// An explicitly empty group is honored and disables host filtering.
    pub fn effective_hosts(&self) -> Vec<String> {
        let env = self.capture.env.to_lowercase();
        match self.capture.host_groups.get(&env) {
            Some(group) => group.clone(),
            None => self.filter.include_host.clone(),
        }
    }

    /// Operator-facing diagnostics for configuration defects. These are
    /// the only errors meant to surface to the operator; the pipeline
    /// itself degrades instead of failing.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.capture.har_dir.as_os_str().is_empty() {
            issues.push("capture.har_dir is not set".to_string());
        } else {
            match fs::metadata(&self.capture.har_dir) {
                Ok(meta) if !meta.is_dir() => issues.push(format!(
                    "capture.har_dir is not a directory: {}",
                    self.capture.har_dir.display()
                )),
                Err(_) => issues.push(format!(
                    "HAR directory is not accessible: {}",
                    self.capture.har_dir.display()
                )),
                _ => {}
            }
        }

        if self.storage.data_dir.as_os_str().is_empty() {
            issues.push("storage.data_dir is not set".to_string());
        }

        if let Err(e) = crate::filename::validate_template(&self.storage.file_name_template) {
            issues.push(e.to_string());
        }

        if !self.capture.host_groups.is_empty() {
            let env = self.capture.env.to_lowercase();
            if !self.capture.host_groups.contains_key(&env) {
                let known: Vec<String> = self
                    .capture
                    .host_groups
                    .keys()
                    .map(|k| k.to_uppercase())
                    .collect();
                issues.push(format!(
                    "capture.env \"{}\" has no host group; known: {}",
                    env.to_uppercase(),
                    known.join("/")
                ));
            }
        }

        issues
    }
}

/// Run directory name: `<run>__<ENV>` with the env tag uppercased.
pub fn run_dir_name(run_name: &str, env: &str) -> String {
    format!("{}__{}", run_name, env.to_uppercase())
}

/// Default run name from local time, filesystem-safe (no colons).
pub fn default_run_name(now: chrono::DateTime<chrono::Local>) -> String {
    now.format("%Y-%m-%d_%H-%M").to_string()
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("harcap")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<HarcapConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = HarcapConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: HarcapConfig = toml::from_str(&data)?;
    Ok(cfg)
}
