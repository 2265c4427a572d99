//! Candidate discovery
//!
//! Walks the content root and produces the ordered list of paths the
//! indexing phase will consume. The walk honors ignore files the way the
//! surrounding tooling does, skips side-car `.meta` files (they are read
//! on demand during identity resolution) and stays out of the recovery
//! directory where quarantined assets are parked.
//!
//! Output is sorted so two walks over the same tree hand the scheduler the
//! same work list in the same order.

use crate::config::Config;
use ignore::WalkBuilder;
use miette::{miette, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const META_EXTENSION: &str = "meta";

pub struct FileFinder<'a> {
    config: &'a Config,
}

impl<'a> FileFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn find_candidates(&self, content_root: &Path) -> Result<Vec<PathBuf>> {
        if !content_root.is_dir() {
            return Err(miette!(
                "content root {} does not exist or is not a directory",
                content_root.display()
            ));
        }

        let mut candidates = Vec::new();

        for entry in WalkBuilder::new(content_root).build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("skipping unreadable entry: {}", err);
                    continue;
                }
            };

            if !entry.file_type().map_or(false, |ft| ft.is_file()) {
                continue;
            }

            let path = entry.into_path();
            if self.is_candidate(&path) {
                candidates.push(path);
            }
        }

        candidates.sort();
        debug!(
            "{} candidate(s) under {}",
            candidates.len(),
            content_root.display()
        );
        Ok(candidates)
    }

    fn is_candidate(&self, path: &Path) -> bool {
        match path.extension() {
            None => return false,
            Some(ext) if ext.eq_ignore_ascii_case(META_EXTENSION) => return false,
            Some(ext) if ext.is_empty() => return false,
            Some(_) => {}
        }

        if path
            .components()
            .any(|component| component.as_os_str() == self.config.recovery_dir.as_os_str())
        {
            return false;
        }

        let text = path.to_string_lossy();
        !self.config.exclude.iter().any(|pattern| text.contains(pattern))
    }
}
