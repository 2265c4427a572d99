//! Analysis state and the phase pipeline
//!
//! An analysis is three tables built in three phases: the asset index
//! (indexing), the reference graph (extraction) and the reachability
//! statuses (propagation). [`AnalysisState`] owns the tables plus the
//! cursor the scheduler resumes from; it is a plain value, cheap to
//! compare, so a time-sliced run can be checked byte for byte against a
//! blocking one.

mod reachability;
mod scheduler;

pub use reachability::ReachabilityAnalyzer;
pub use scheduler::{CancelToken, PhaseStatus, Session};

use crate::graph::{GraphKey, ReferenceGraph};
use crate::identity::AssetId;
use crate::index::AssetIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where a session currently stands in the pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    Indexing,
    Extracting,
    Propagating,
    Done,
    /// Cancelled mid-run; the partial state is not trustworthy
    Interrupted,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Indexing => "indexing assets",
            Phase::Extracting => "extracting references",
            Phase::Propagating => "propagating reachability",
            Phase::Done => "done",
            Phase::Interrupted => "interrupted",
        }
    }
}

/// Everything an analysis knows, independent of how it was driven
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisState {
    pub index: AssetIndex,
    pub graph: ReferenceGraph,
    /// guid → reachable-from-a-root; populated during propagation
    pub reachability: HashMap<AssetId, bool>,
    pub phase: Phase,
    /// Next item within the current phase's work list
    pub cursor: usize,
    /// Propagation work list; doubles as the visited set, entries are
    /// never removed
    pub frontier: Vec<GraphKey>,
}

impl AnalysisState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_reachable(&self, id: &AssetId) -> bool {
        self.reachability.get(id).copied().unwrap_or(false)
    }

    /// Ids of assets propagation never reached, in indexing order
    pub fn unused_ids(&self) -> Vec<AssetId> {
        self.index
            .ids()
            .iter()
            .filter(|id| !self.is_reachable(id))
            .cloned()
            .collect()
    }

    /// Drop one asset from every table
    ///
    /// Adjacency is repaired locally; statuses computed through the removed
    /// asset are stale until reachability is recomputed.
    pub fn remove_asset(&mut self, id: &AssetId) {
        self.index.remove_asset(id);
        self.graph.remove_key(&GraphKey::Asset(id.clone()));
        self.reachability.remove(id);
        self.frontier.retain(|key| key.as_asset() != Some(id));
    }

    /// Recompute statuses from scratch against the current graph
    pub fn refresh_reachability(&mut self, root_scene_ids: &[AssetId]) {
        let analyzer = ReachabilityAnalyzer::new();
        self.reachability = analyzer.compute(&self.index, &self.graph, root_scene_ids);
    }
}
