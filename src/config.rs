//! Configuration loading
//!
//! Settings come from an optional config file (TOML, YAML or JSON, picked
//! by extension), overridable per flag on the command line. Unknown keys
//! are rejected so a typo fails loudly instead of silently using defaults.

use miette::{miette, Context, IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Files probed in the project root when `--config` is not given
const DEFAULT_CONFIG_FILES: &[&str] = &[
    "searchunusedassets.toml",
    ".searchunusedassets.yml",
    ".searchunusedassets.json",
];

/// Step budget matching a 30 fps editor frame
pub const DEFAULT_STEP_BUDGET_MS: u64 = 33;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding managed assets, relative to the project root
    pub content_root: PathBuf,

    /// Substring patterns; a candidate path containing one is skipped
    pub exclude: Vec<String>,

    /// Scene paths treated as roots in addition to the build settings
    pub roots: Vec<PathBuf>,

    /// Time budget per cooperative step, in milliseconds
    pub step_budget_ms: u64,

    /// Where removed assets are parked, relative to the project root
    pub recovery_dir: PathBuf,

    /// Snapshot location; `None` means the default file in the project root
    pub snapshot_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("Assets"),
            exclude: Vec::new(),
            roots: Vec::new(),
            step_budget_ms: DEFAULT_STEP_BUDGET_MS,
            recovery_dir: PathBuf::from(".recovery"),
            snapshot_path: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot read config {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let config = match extension.as_str() {
            "toml" => toml::from_str(&text).into_diagnostic(),
            "yml" | "yaml" => serde_yaml::from_str(&text).into_diagnostic(),
            "json" => serde_json::from_str(&text).into_diagnostic(),
            other => Err(miette!("unsupported config format: .{}", other)),
        }
        .wrap_err_with(|| format!("invalid config {}", path.display()))?;

        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Probe the project root for a config file; defaults when none exists
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        for name in DEFAULT_CONFIG_FILES {
            let candidate = project_root.join(name);
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
        }
        Ok(Self::default())
    }
}
