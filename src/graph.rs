//! Bidirectional asset reference graph
//!
//! Forward adjacency answers "what does this asset reference", reverse
//! adjacency answers "who references this asset". The two sides are kept
//! mutually consistent by construction: every mutation goes through
//! [`ReferenceGraph::add_edge`] or [`ReferenceGraph::remove_key`].
//!
//! Besides real assets the graph holds synthetic tag nodes: root-like
//! concepts with no backing file, such as the build settings scene list or
//! an asset bundle. Tags only ever appear as edge sources.

use crate::identity::AssetId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Synthetic tag naming the build settings scene list
pub const BUILD_SETTINGS_TAG: &str = "BuildSettings";

/// Synthetic tag for membership in a named asset bundle
pub fn bundle_tag(name: &str) -> String {
    format!("bundle:{}", name)
}

/// A node in the reference graph: a real asset or a synthetic root tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GraphKey {
    Asset(AssetId),
    Tag(String),
}

impl GraphKey {
    pub fn asset(id: impl Into<AssetId>) -> Self {
        GraphKey::Asset(id.into())
    }

    pub fn tag(name: impl Into<String>) -> Self {
        GraphKey::Tag(name.into())
    }

    pub fn as_asset(&self) -> Option<&AssetId> {
        match self {
            GraphKey::Asset(id) => Some(id),
            GraphKey::Tag(_) => None,
        }
    }

    pub fn is_bundle_tag(&self) -> bool {
        matches!(self, GraphKey::Tag(name) if name.starts_with("bundle:"))
    }
}

impl From<AssetId> for GraphKey {
    fn from(id: AssetId) -> Self {
        GraphKey::Asset(id)
    }
}

/// Ordered, duplicate-free forward and reverse adjacency
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceGraph {
    forward: HashMap<GraphKey, Vec<GraphKey>>,
    reverse: HashMap<GraphKey, Vec<GraphKey>>,
    /// Fast dedup check so `add_edge` stays amortized O(1)
    edges: HashSet<(GraphKey, GraphKey)>,
}

impl ReferenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edge `from → to`, ignoring exact duplicates
    pub fn add_edge(&mut self, from: GraphKey, to: GraphKey) {
        if !self.edges.insert((from.clone(), to.clone())) {
            return;
        }

        self.forward.entry(from.clone()).or_default().push(to.clone());
        self.reverse.entry(to).or_default().push(from);
    }

    /// Everything `key` references, in insertion order
    pub fn targets_of(&self, key: &GraphKey) -> &[GraphKey] {
        self.forward.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Everything referencing `key`, in insertion order
    pub fn sources_of(&self, key: &GraphKey) -> &[GraphKey] {
        self.reverse.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_edge(&self, from: &GraphKey, to: &GraphKey) -> bool {
        self.edges.contains(&(from.clone(), to.clone()))
    }

    /// All synthetic bundle tags present in the graph
    pub fn bundle_tags(&self) -> impl Iterator<Item = &GraphKey> {
        self.forward.keys().filter(|key| key.is_bundle_tag())
    }

    /// Keys appearing as a source or a target anywhere in the graph
    pub fn keys(&self) -> impl Iterator<Item = &GraphKey> {
        self.forward.keys().chain(self.reverse.keys())
    }

    /// Purge a key completely: as adjacency key and as a member of every
    /// other key's list. Local repair only; reachability computed against
    /// the old graph is stale after this.
    pub fn remove_key(&mut self, key: &GraphKey) {
        self.forward.remove(key);
        self.reverse.remove(key);

        for list in self.forward.values_mut() {
            list.retain(|entry| entry != key);
        }
        for list in self.reverse.values_mut() {
            list.retain(|entry| entry != key);
        }

        self.edges
            .retain(|(from, to)| from != key && to != key);
    }
}
