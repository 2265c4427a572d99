//! SearchUnusedAssets - unused asset detection for Unity projects
//!
//! This library finds assets a Unity project ships with but never uses:
//! nothing reachable from a built scene or an asset bundle references
//! them.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **Discovery** - Walk the content root for candidate asset files
//! 2. **Indexing** - Resolve stable identities, classify kinds, collect
//!    declared script symbols
//! 3. **Extraction** - Scan each asset with a format-specific heuristic
//!    scanner, building the bidirectional reference graph
//! 4. **Propagation** - Flood reachability from the build settings scenes
//!    and bundle tags
//! 5. **Reporting** - List the assets nothing reached
//!
//! Phases 2-4 run under a cooperative scheduler: work is cut into
//! per-asset items so a caller can interleave the analysis with other
//! work, pause it, or cancel it.

pub mod analysis;
pub mod classify;
pub mod config;
pub mod discovery;
pub mod extract;
pub mod graph;
pub mod identity;
pub mod index;
pub mod quarantine;
pub mod report;
pub mod roots;
pub mod snapshot;

pub use analysis::{
    AnalysisState, CancelToken, Phase, PhaseStatus, ReachabilityAnalyzer, Session,
};
pub use classify::{classify_path, classify_suffix, AssetKind};
pub use config::Config;
pub use discovery::FileFinder;
pub use graph::{GraphKey, ReferenceGraph};
pub use identity::{AssetId, IdentityResolver, MetaFileResolver};
pub use index::{AssetIndex, AssetRecord};
pub use quarantine::Quarantine;
pub use report::{ReportFormat, Reporter};
pub use roots::{BuildSettingsRoots, RootProvider, StaticRoots};
