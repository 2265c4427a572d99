//! Asset bundle membership scanner
//!
//! Bundle membership lives in the asset's `.meta` side-car, not the asset
//! itself. A non-empty `assetBundleName` makes the bundle a root-like
//! source pointing at the asset: bundles ship with the build, so their
//! members are reachable by definition.

use crate::graph::{bundle_tag, GraphKey, ReferenceGraph};
use crate::identity::{meta_path_for, AssetId};
use std::fs;
use std::path::Path;
use tracing::warn;

const BUNDLE_KEY: &str = "assetBundleName:";

pub fn scan(graph: &mut ReferenceGraph, id: &AssetId, path: &Path) {
    let meta_path = meta_path_for(path);
    let text = match fs::read_to_string(&meta_path) {
        Ok(text) => text,
        Err(_) => {
            warn!("missing companion metadata for {}", path.display());
            return;
        }
    };

    for line in text.lines() {
        let Some(value) = line.trim().strip_prefix(BUNDLE_KEY) else {
            continue;
        };

        let name = value.trim();
        if !name.is_empty() {
            graph.add_edge(GraphKey::tag(bundle_tag(name)), GraphKey::Asset(id.clone()));
        }
        break;
    }
}
