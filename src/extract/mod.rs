//! Reference extraction
//!
//! One scanning strategy per file format family, dispatched on the asset's
//! kind. All scanners are heuristic line scanners: they may miss a
//! reference in exotic formatting and very rarely invent one near a
//! comment boundary, and that trade is accepted in exchange for linear,
//! grammar-free scanning. Finding nothing is a normal outcome, not an
//! error.

mod bundle;
mod manifest;
mod source;
mod structured;

use crate::classify::{AssetKind, FONT_SETTINGS_EXTENSION};
use crate::graph::ReferenceGraph;
use crate::identity::{AssetId, IdentityResolver};
use crate::index::{AssetIndex, AssetRecord};
use std::path::PathBuf;

/// Everything the scanners need besides the graph they write into
pub struct ExtractContext<'a> {
    pub index: &'a AssetIndex,
    pub resolver: &'a dyn IdentityResolver,
    /// Scene paths listed in the root manifest (build settings)
    pub root_scenes: &'a [PathBuf],
}

/// Run every applicable scanner for one asset, committing edges to `graph`
pub fn extract_into(
    graph: &mut ReferenceGraph,
    ctx: &ExtractContext<'_>,
    id: &AssetId,
    record: &AssetRecord,
) {
    // bundle membership applies to every kind
    bundle::scan(graph, id, &record.path);

    match record.kind {
        AssetKind::Scene => structured::scan_scene(graph, ctx, id, record),
        AssetKind::Assembly => manifest::scan(graph, ctx, id, record),
        kind if kind.is_source_code() => source::scan(graph, ctx.index, id, &record.path),
        kind if kind.uses_text_serialization() => {
            // fonts are binary except the .fontsettings wrapper
            let is_binary_font = kind == AssetKind::Font
                && record
                    .path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map_or(true, |ext| {
                        !ext.eq_ignore_ascii_case(FONT_SETTINGS_EXTENSION)
                    });

            if !is_binary_font {
                structured::scan_lines(graph, ctx.index, id, &record.path);
            }
        }
        _ => {}
    }
}
