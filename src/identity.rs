//! Stable asset identity
//!
//! Every asset is keyed by the GUID Unity records in its side-car `.meta`
//! file. The GUID outlives renames and moves, which is what makes the
//! reference graph survive a reimport. Resolution goes through a trait so
//! tests can substitute a fixed table for real `.meta` files.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Suffix of the side-car metadata file carrying the guid and import settings
pub const META_SUFFIX: &str = ".meta";

const GUID_KEY: &str = "guid:";

/// Opaque stable identifier for one physical asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(guid: impl Into<String>) -> Self {
        Self(guid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps an asset path to its stable identity
///
/// Returns `None` when the asset has no resolvable identity; callers skip
/// the asset and keep going.
pub trait IdentityResolver {
    fn resolve(&self, path: &Path) -> Option<AssetId>;
}

/// Resolver backed by Unity `.meta` side-car files
#[derive(Debug, Default)]
pub struct MetaFileResolver;

impl MetaFileResolver {
    pub fn new() -> Self {
        Self
    }
}

fn guid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9a-fA-F]{32}$").unwrap())
}

impl IdentityResolver for MetaFileResolver {
    fn resolve(&self, path: &Path) -> Option<AssetId> {
        let meta_path = meta_path_for(path);
        let text = fs::read_to_string(&meta_path).ok()?;

        for line in text.lines() {
            let Some(value) = line.trim().strip_prefix(GUID_KEY) else {
                continue;
            };
            let guid = value.trim();
            if guid_pattern().is_match(guid) {
                return Some(AssetId::new(guid.to_ascii_lowercase()));
            }
        }

        None
    }
}

/// Path of the side-car metadata file for an asset
pub fn meta_path_for(path: &Path) -> std::path::PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(META_SUFFIX);
    std::path::PathBuf::from(raw)
}

/// Fixed path→id table, for tests and embedding hosts with their own
/// asset database
#[derive(Debug, Default)]
pub struct StaticResolver {
    entries: std::collections::HashMap<std::path::PathBuf, AssetId>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<std::path::PathBuf>, id: AssetId) {
        self.entries.insert(path.into(), id);
    }
}

impl IdentityResolver for StaticResolver {
    fn resolve(&self, path: &Path) -> Option<AssetId> {
        self.entries.get(path).cloned()
    }
}
