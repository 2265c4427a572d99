//! Result reporting
//!
//! Reporters consume a flat list of [`AssetEntry`] rows, built either from
//! a live analysis or from a persisted snapshot, so the same output paths
//! serve both. Terminal output goes to stdout; JSON goes to stdout or a
//! file.

mod json;
mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::analysis::AnalysisState;
use crate::classify::AssetKind;
use crate::graph::GraphKey;
use crate::identity::AssetId;
use crate::snapshot::Snapshot;
use miette::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

/// One asset as the report sees it
#[derive(Debug, Clone, Serialize)]
pub struct AssetEntry {
    pub guid: AssetId,
    pub path: PathBuf,
    pub kind: AssetKind,
    pub reachable: bool,
    /// Display names of everything referencing this asset: paths where the
    /// source is a known asset, the tag name otherwise
    pub referenced_by: Vec<String>,
}

/// Flatten a live analysis into report rows, in indexing order
pub fn entries_from_state(state: &AnalysisState) -> Vec<AssetEntry> {
    state
        .index
        .records()
        .map(|(id, record)| {
            let sources = state.graph.sources_of(&GraphKey::Asset(id.clone()));
            AssetEntry {
                guid: id.clone(),
                path: record.path.clone(),
                kind: record.kind,
                reachable: state.is_reachable(id),
                referenced_by: sources
                    .iter()
                    .map(|key| display_source(key, |sid| {
                        state.index.get(sid).map(|r| r.path.clone())
                    }))
                    .collect(),
            }
        })
        .collect()
}

/// Flatten a loaded snapshot into the same rows
pub fn entries_from_snapshot(snapshot: &Snapshot) -> Vec<AssetEntry> {
    let paths: HashMap<&AssetId, &PathBuf> = snapshot
        .records
        .iter()
        .map(|(id, record)| (id, &record.path))
        .collect();

    snapshot
        .records
        .iter()
        .map(|(id, record)| AssetEntry {
            guid: id.clone(),
            path: record.path.clone(),
            kind: record.kind,
            reachable: snapshot.is_reachable(id),
            referenced_by: snapshot
                .sources
                .get(id)
                .map(Vec::as_slice)
                .unwrap_or(&[])
                .iter()
                .map(|key| display_source(key, |sid| paths.get(sid).map(|p| (*p).clone())))
                .collect(),
        })
        .collect()
}

fn display_source(key: &GraphKey, path_of: impl Fn(&AssetId) -> Option<PathBuf>) -> String {
    match key {
        GraphKey::Tag(name) => name.clone(),
        GraphKey::Asset(id) => path_of(id)
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| id.to_string()),
    }
}

/// Reporter facade dispatching on format
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
    show_used: bool,
    base_path: Option<PathBuf>,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            output_path,
            show_used: false,
            base_path: None,
        }
    }

    /// Also list assets that are in use, with their referencers
    pub fn with_used_assets(mut self, show: bool) -> Self {
        self.show_used = show;
        self
    }

    /// Strip this prefix from displayed paths
    pub fn with_base_path(mut self, base: impl Into<PathBuf>) -> Self {
        self.base_path = Some(base.into());
        self
    }

    pub fn report(&self, entries: &[AssetEntry]) -> Result<()> {
        let entries = self.shortened(entries);
        match self.format {
            ReportFormat::Terminal => {
                TerminalReporter::new()
                    .with_used_assets(self.show_used)
                    .report(&entries);
                Ok(())
            }
            ReportFormat::Json => {
                JsonReporter::new(self.output_path.clone()).report(&entries)
            }
        }
    }

    fn shortened(&self, entries: &[AssetEntry]) -> Vec<AssetEntry> {
        let Some(base) = &self.base_path else {
            return entries.to_vec();
        };

        entries
            .iter()
            .map(|entry| AssetEntry {
                path: shorten(&entry.path, base),
                ..entry.clone()
            })
            .collect()
    }
}

fn shorten(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base).unwrap_or(path).to_path_buf()
}
