//! Persisted analysis snapshots
//!
//! A finished analysis flattens three tables into parallel arrays: asset
//! records, reverse references, and reachability statuses, all keyed by
//! guid in indexing order. Parallel arrays keep the file diff-friendly and
//! make truncation obvious: loading refuses any file whose arrays disagree
//! in length rather than guessing which rows line up.
//!
//! The snapshot is a report cache, not a resumable session: it carries
//! enough to list unused assets and who references what, not the forward
//! adjacency or symbol tables.

use crate::analysis::AnalysisState;
use crate::classify::AssetKind;
use crate::graph::GraphKey;
use crate::identity::AssetId;
use crate::index::AssetRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default snapshot location, relative to the project root
pub const DEFAULT_SNAPSHOT_FILE: &str = ".searchunusedassets-cache.json";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot access snapshot file: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),

    #[error("snapshot {table} table is torn: {keys} key(s) but {values} value row(s)")]
    TornTable {
        table: &'static str,
        keys: usize,
        values: usize,
    },
}

/// On-disk layout: three tables as parallel arrays
#[derive(Debug, Serialize, Deserialize)]
struct FlatSnapshot {
    guids: Vec<AssetId>,
    paths: Vec<PathBuf>,
    kinds: Vec<AssetKind>,
    source_guids: Vec<AssetId>,
    sources: Vec<Vec<GraphKey>>,
    status_guids: Vec<AssetId>,
    statuses: Vec<bool>,
}

/// Reconstructed snapshot tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub records: Vec<(AssetId, AssetRecord)>,
    pub sources: HashMap<AssetId, Vec<GraphKey>>,
    pub statuses: HashMap<AssetId, bool>,
}

impl Snapshot {
    pub fn is_reachable(&self, id: &AssetId) -> bool {
        self.statuses.get(id).copied().unwrap_or(false)
    }
}

/// Flatten a finished analysis and write it as JSON
pub fn save(path: &Path, state: &AnalysisState) -> Result<(), SnapshotError> {
    let mut flat = FlatSnapshot {
        guids: Vec::new(),
        paths: Vec::new(),
        kinds: Vec::new(),
        source_guids: Vec::new(),
        sources: Vec::new(),
        status_guids: Vec::new(),
        statuses: Vec::new(),
    };

    for (id, record) in state.index.records() {
        flat.guids.push(id.clone());
        flat.paths.push(record.path.clone());
        flat.kinds.push(record.kind);

        let sources = state.graph.sources_of(&GraphKey::Asset(id.clone()));
        if !sources.is_empty() {
            flat.source_guids.push(id.clone());
            flat.sources.push(sources.to_vec());
        }

        flat.status_guids.push(id.clone());
        flat.statuses.push(state.is_reachable(id));
    }

    fs::write(path, serde_json::to_vec_pretty(&flat)?)?;
    debug!("snapshot of {} asset(s) written to {}", flat.guids.len(), path.display());
    Ok(())
}

/// Load and reconstruct a snapshot, strictly
pub fn load(path: &Path) -> Result<Snapshot, SnapshotError> {
    let flat: FlatSnapshot = serde_json::from_slice(&fs::read(path)?)?;

    check_parallel(&flat)?;

    let records = flat
        .guids
        .into_iter()
        .zip(flat.paths)
        .zip(flat.kinds)
        .map(|((id, path), kind)| (id, AssetRecord { path, kind }))
        .collect();

    let sources = flat.source_guids.into_iter().zip(flat.sources).collect();
    let statuses = flat.status_guids.into_iter().zip(flat.statuses).collect();

    Ok(Snapshot {
        records,
        sources,
        statuses,
    })
}

fn check_parallel(flat: &FlatSnapshot) -> Result<(), SnapshotError> {
    let checks: [(&'static str, usize, usize); 4] = [
        ("record path", flat.guids.len(), flat.paths.len()),
        ("record kind", flat.guids.len(), flat.kinds.len()),
        ("reference", flat.source_guids.len(), flat.sources.len()),
        ("status", flat.status_guids.len(), flat.statuses.len()),
    ];

    for (table, keys, values) in checks {
        if keys != values {
            return Err(SnapshotError::TornTable { table, keys, values });
        }
    }
    Ok(())
}
