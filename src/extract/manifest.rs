//! Assembly definition (manifest) scanner
//!
//! An `.asmdef` references other assemblies through `GUID:`-prefixed
//! identifiers, and implicitly owns every script in its directory subtree
//! up to the next assembly boundary. Ownership is modeled in reverse: each
//! owned script references its manifest (a script cannot compile without
//! its assembly), so a used script keeps its manifest alive, not the other
//! way around.

use crate::graph::{GraphKey, ReferenceGraph};
use crate::identity::AssetId;
use crate::index::AssetRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, warn};
use walkdir::WalkDir;

use super::ExtractContext;

/// Case-variant identity marker used inside asmdef JSON
const GUID_MARKER_UPPER: &str = "GUID:";

const MANIFEST_EXTENSION: &str = "asmdef";
const SCRIPT_EXTENSION: &str = "cs";

pub fn scan(
    graph: &mut ReferenceGraph,
    ctx: &ExtractContext<'_>,
    id: &AssetId,
    record: &AssetRecord,
) {
    scan_assembly_references(graph, ctx, id, &record.path);
    link_owned_scripts(graph, ctx, id, &record.path);
}

/// Explicit `GUID:` references to other assemblies
fn scan_assembly_references(
    graph: &mut ReferenceGraph,
    ctx: &ExtractContext<'_>,
    id: &AssetId,
    path: &Path,
) {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!("cannot read manifest {}: {}", path.display(), err);
            return;
        }
    };

    for line in text.lines() {
        let mut rest = line;
        while let Some(start) = rest.find(GUID_MARKER_UPPER) {
            rest = &rest[start + GUID_MARKER_UPPER.len()..];
            let token: String = rest.chars().take_while(|ch| ch.is_ascii_hexdigit()).collect();

            if token.len() == 32 {
                let referenced = AssetId::new(token.to_ascii_lowercase());
                if ctx.index.contains(&referenced) {
                    graph.add_edge(GraphKey::Asset(id.clone()), GraphKey::Asset(referenced));
                }
            }
        }
    }
}

/// Emit script → manifest edges for every script this manifest owns
///
/// Every owned script must already be indexed; one that is not signals an
/// inconsistency between indexing and extraction and is reported loudly,
/// but the run continues.
fn link_owned_scripts(
    graph: &mut ReferenceGraph,
    ctx: &ExtractContext<'_>,
    id: &AssetId,
    manifest_path: &Path,
) {
    let Some(base_dir) = manifest_path.parent() else {
        return;
    };

    for script in owned_scripts(base_dir, manifest_path) {
        let script_id = ctx.resolver.resolve(&script).filter(|sid| ctx.index.contains(sid));

        match script_id {
            Some(script_id) => {
                graph.add_edge(GraphKey::Asset(script_id), GraphKey::Asset(id.clone()));
            }
            None => {
                error!(
                    "script {} was not indexed but sits inside assembly {}; \
                     reference graph may be incomplete",
                    script.display(),
                    manifest_path.display()
                );
            }
        }
    }
}

/// Scripts in the subtree, pruned at directories owned by another manifest
fn owned_scripts(base_dir: &Path, manifest_path: &Path) -> Vec<PathBuf> {
    WalkDir::new(base_dir)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && entry.depth() > 0
                && holds_foreign_manifest(entry.path(), manifest_path))
        })
        .filter_map(Result::ok)
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map_or(false, |ext| ext.eq_ignore_ascii_case(SCRIPT_EXTENSION))
        })
        .map(|entry| entry.into_path())
        .collect()
}

fn holds_foreign_manifest(dir: &Path, manifest_path: &Path) -> bool {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return false,
    };

    entries.filter_map(Result::ok).any(|entry| {
        let path = entry.path();
        path.extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case(MANIFEST_EXTENSION))
            && path != manifest_path
    })
}
