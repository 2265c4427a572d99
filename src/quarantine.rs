//! Asset quarantine
//!
//! Removal never deletes: an asset and its `.meta` side-car move into a
//! recovery directory, preserving their layout relative to the project
//! root, so a wrongly flagged asset can be moved back wholesale. Restore
//! walks the recovery directory and puts everything back; the caller is
//! expected to re-run the analysis afterwards.

use crate::analysis::AnalysisState;
use crate::identity::{meta_path_for, AssetId};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

pub struct Quarantine {
    project_root: PathBuf,
    recovery_dir: PathBuf,
    dry_run: bool,
}

impl Quarantine {
    pub fn new(project_root: impl Into<PathBuf>, recovery_dir: &Path) -> Self {
        let project_root = project_root.into();
        let recovery_dir = if recovery_dir.is_absolute() {
            recovery_dir.to_path_buf()
        } else {
            project_root.join(recovery_dir)
        };

        Self {
            project_root,
            recovery_dir,
            dry_run: false,
        }
    }

    /// Report what would move without touching the filesystem
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn recovery_dir(&self) -> &Path {
        &self.recovery_dir
    }

    pub fn has_recoverable(&self) -> bool {
        WalkDir::new(&self.recovery_dir)
            .into_iter()
            .filter_map(Result::ok)
            .any(|entry| entry.file_type().is_file())
    }

    /// Quarantine the given assets, dropping each from the analysis tables
    /// first so the in-memory state never points at a moved file. Returns
    /// how many assets actually moved.
    pub fn remove_assets(&self, state: &mut AnalysisState, ids: &[AssetId]) -> Result<usize> {
        let mut moved = 0;

        for id in ids {
            let Some(record) = state.index.get(id) else {
                warn!("asset {} is not in the index, skipping", id);
                continue;
            };
            let path = record.path.clone();

            if self.dry_run {
                info!("would quarantine {}", path.display());
                moved += 1;
                continue;
            }

            state.remove_asset(id);
            self.park(&path)?;
            self.park(&meta_path_for(&path))?;
            moved += 1;
        }

        Ok(moved)
    }

    /// Move everything in the recovery directory back where it came from.
    /// Returns how many files were restored.
    pub fn restore(&self) -> Result<usize> {
        if !self.recovery_dir.is_dir() {
            return Ok(0);
        }

        let files: Vec<PathBuf> = WalkDir::new(&self.recovery_dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect();

        let mut restored = 0;
        for parked in &files {
            let relative = parked
                .strip_prefix(&self.recovery_dir)
                .context("recovery entry escaped the recovery directory")?;
            let destination = self.project_root.join(relative);

            move_file(parked, &destination)?;
            restored += 1;
        }

        // drop the now-empty tree; leftovers are harmless
        if fs::remove_dir_all(&self.recovery_dir).is_err() {
            warn!("could not clean up {}", self.recovery_dir.display());
        }

        info!("restored {} file(s)", restored);
        Ok(restored)
    }

    fn park(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            warn!("{} is already gone, skipping", path.display());
            return Ok(());
        }

        let relative = path
            .strip_prefix(&self.project_root)
            .with_context(|| format!("{} lies outside the project", path.display()))?;

        move_file(path, &self.recovery_dir.join(relative))
    }
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }

    // rename fails across filesystems; fall back to copy + remove
    if fs::rename(from, to).is_err() {
        fs::copy(from, to).with_context(|| format!("cannot copy {}", from.display()))?;
        fs::remove_file(from).with_context(|| format!("cannot remove {}", from.display()))?;
    }
    Ok(())
}
