//! Reachability propagation
//!
//! Breadth-first flood from the root set over forward adjacency. The
//! frontier list is both queue and visited set: a key is appended at most
//! once and never removed, so a cursor into it is a complete record of
//! propagation progress and the scheduler can stop after any element.
//!
//! Roots are the build-settings scenes plus every bundle tag: bundles ship
//! with the build whether or not a scene mentions their members. Bundle
//! tags are seeded in sorted order so two runs over the same project
//! produce identical frontiers.

use crate::graph::{GraphKey, ReferenceGraph};
use crate::identity::AssetId;
use crate::index::AssetIndex;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReachabilityAnalyzer;

impl ReachabilityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Status table with every indexed asset initially unreached
    pub fn blank_status(&self, index: &AssetIndex) -> HashMap<AssetId, bool> {
        index.ids().iter().map(|id| (id.clone(), false)).collect()
    }

    /// Initial frontier: root scenes known to the index, then bundle tags
    pub fn seed_frontier(
        &self,
        index: &AssetIndex,
        graph: &ReferenceGraph,
        root_scene_ids: &[AssetId],
    ) -> Vec<GraphKey> {
        let mut frontier = Vec::new();

        for id in root_scene_ids {
            if !index.contains(id) {
                continue;
            }
            let key = GraphKey::Asset(id.clone());
            if !frontier.contains(&key) {
                frontier.push(key);
            }
        }

        let mut bundles: Vec<GraphKey> = graph.bundle_tags().cloned().collect();
        bundles.sort();
        for key in bundles {
            if !frontier.contains(&key) {
                frontier.push(key);
            }
        }

        frontier
    }

    /// Process one frontier entry: mark it reached and append its unseen
    /// targets. The caller owns the cursor and advances it afterwards.
    pub fn visit(
        &self,
        graph: &ReferenceGraph,
        frontier: &mut Vec<GraphKey>,
        cursor: usize,
        status: &mut HashMap<AssetId, bool>,
    ) {
        let key = frontier[cursor].clone();

        if let Some(id) = key.as_asset() {
            status.insert(id.clone(), true);
        }

        for target in graph.targets_of(&key) {
            if !frontier.contains(target) {
                frontier.push(target.clone());
            }
        }
    }

    /// Full propagation in one call
    pub fn compute(
        &self,
        index: &AssetIndex,
        graph: &ReferenceGraph,
        root_scene_ids: &[AssetId],
    ) -> HashMap<AssetId, bool> {
        let mut status = self.blank_status(index);
        let mut frontier = self.seed_frontier(index, graph, root_scene_ids);

        let mut cursor = 0;
        while cursor < frontier.len() {
            self.visit(graph, &mut frontier, cursor, &mut status);
            cursor += 1;
        }

        status
    }
}
