//! Reachability roots
//!
//! A root is a scene the build actually ships: everything transitively
//! referenced from one is alive. The canonical source is the project's
//! build settings manifest; extra roots can be supplied explicitly (on the
//! command line, or in tests).

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const BUILD_SETTINGS_RELATIVE: &str = "ProjectSettings/EditorBuildSettings.asset";
const ENABLED_KEY: &str = "- enabled:";
const PATH_KEY: &str = "path:";

/// Supplies the scene paths reachability starts from
pub trait RootProvider {
    fn root_scenes(&self) -> Vec<PathBuf>;
}

/// Fixed root list, used for explicit `--root` flags and in tests
#[derive(Debug, Clone, Default)]
pub struct StaticRoots {
    scenes: Vec<PathBuf>,
}

impl StaticRoots {
    pub fn new(scenes: Vec<PathBuf>) -> Self {
        Self { scenes }
    }
}

impl RootProvider for StaticRoots {
    fn root_scenes(&self) -> Vec<PathBuf> {
        self.scenes.clone()
    }
}

/// Roots parsed from `ProjectSettings/EditorBuildSettings.asset`
///
/// The manifest is text-serialized YAML of the shape:
///
/// ```text
/// m_Scenes:
/// - enabled: 1
///   path: Assets/Scenes/Main.unity
///   guid: ...
/// ```
///
/// Only enabled entries count. Scene paths are stored relative to the
/// project root and are resolved against it here.
#[derive(Debug, Clone)]
pub struct BuildSettingsRoots {
    project_root: PathBuf,
    extra: Vec<PathBuf>,
}

impl BuildSettingsRoots {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            extra: Vec::new(),
        }
    }

    /// Additional roots merged after the build settings scenes
    pub fn with_extra_roots(mut self, extra: Vec<PathBuf>) -> Self {
        self.extra = extra;
        self
    }

    fn parse_manifest(&self, text: &str) -> Vec<PathBuf> {
        let mut scenes = Vec::new();
        let mut entry_enabled = false;

        for line in text.lines() {
            let trimmed = line.trim();

            if let Some(value) = trimmed.strip_prefix(ENABLED_KEY) {
                entry_enabled = value.trim() == "1";
            } else if let Some(value) = trimmed.strip_prefix(PATH_KEY) {
                if entry_enabled {
                    scenes.push(self.project_root.join(value.trim()));
                }
                entry_enabled = false;
            }
        }

        scenes
    }
}

impl RootProvider for BuildSettingsRoots {
    fn root_scenes(&self) -> Vec<PathBuf> {
        let manifest = self.project_root.join(BUILD_SETTINGS_RELATIVE);
        let mut scenes = match fs::read_to_string(&manifest) {
            Ok(text) => self.parse_manifest(&text),
            Err(err) => {
                warn!(
                    "cannot read build settings {}: {}; only explicit roots apply",
                    manifest.display(),
                    err
                );
                Vec::new()
            }
        };

        for path in &self.extra {
            let resolved = resolve_extra_root(&self.project_root, path);
            if !scenes.contains(&resolved) {
                scenes.push(resolved);
            }
        }

        debug!("{} root scene(s)", scenes.len());
        scenes
    }
}

fn resolve_extra_root(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
