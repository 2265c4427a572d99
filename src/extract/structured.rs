//! Structured key-value scanner
//!
//! Handles Unity's text-serialized formats (scenes, prefabs, materials,
//! scriptable objects, ...). These are YAML-ish but the scanner only cares
//! about one shape: lines carrying a `guid:` identity reference, e.g.
//!
//! ```text
//! m_Material: {fileID: 2100000, guid: 1f4c2d3e..., type: 2}
//! ```

use crate::graph::{GraphKey, ReferenceGraph, BUILD_SETTINGS_TAG};
use crate::identity::AssetId;
use crate::index::{AssetIndex, AssetRecord};
use std::fs;
use std::path::Path;
use tracing::warn;

use super::ExtractContext;

const GUID_MARKER: &str = "guid:";

/// Scan any text-serialized asset for guid references
pub fn scan_lines(graph: &mut ReferenceGraph, index: &AssetIndex, id: &AssetId, path: &Path) {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!("cannot read {}: {}", path.display(), err);
            return;
        }
    };

    for line in text.lines() {
        let Some(referenced) = guid_token(line) else {
            continue;
        };

        let referenced = AssetId::new(referenced);
        if index.contains(&referenced) {
            graph.add_edge(GraphKey::Asset(id.clone()), GraphKey::Asset(referenced));
        }
    }
}

/// Scene scan: guid lines plus the synthetic build-settings root edge
pub fn scan_scene(
    graph: &mut ReferenceGraph,
    ctx: &ExtractContext<'_>,
    id: &AssetId,
    record: &AssetRecord,
) {
    if ctx.root_scenes.iter().any(|root| root == &record.path) {
        graph.add_edge(GraphKey::tag(BUILD_SETTINGS_TAG), GraphKey::Asset(id.clone()));
    }

    scan_lines(graph, ctx.index, id, &record.path);
}

/// Extract the guid token from a line, if it carries the marker
///
/// The token runs from the marker to the first non-hex character; anything
/// that is not exactly 32 hex digits is a malformed line and is skipped.
fn guid_token(line: &str) -> Option<String> {
    let start = line.find(GUID_MARKER)? + GUID_MARKER.len();
    let token: String = line[start..]
        .trim_start()
        .chars()
        .take_while(|ch| ch.is_ascii_hexdigit())
        .collect();

    if token.len() == 32 {
        Some(token.to_ascii_lowercase())
    } else {
        None
    }
}
