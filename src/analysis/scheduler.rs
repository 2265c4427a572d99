//! Cooperative phase scheduler
//!
//! A [`Session`] drives the three analysis phases over a single work loop.
//! Each [`Session::step`] call consumes a time budget but always finishes
//! at least one work item, so a caller handing out zero-length budgets
//! still makes progress. The same loop serves blocking runs: [`Session::run`]
//! is a step with no deadline.
//!
//! Cancellation is observed at item boundaries only; an interrupted
//! session stays interrupted and its partial state is meant to be thrown
//! away, not resumed.

use super::{AnalysisState, Phase, ReachabilityAnalyzer};
use crate::extract::{extract_into, ExtractContext};
use crate::identity::{AssetId, IdentityResolver};
use crate::roots::RootProvider;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Shared cancellation flag, checked between work items
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// What one scheduler step accomplished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseStatus {
    /// Budget ran out mid-phase; call `step` again to continue
    InProgress {
        phase: Phase,
        completed: usize,
        total: usize,
    },
    Finished,
    Interrupted,
}

/// One analysis run over one project
///
/// The session owns the evolving [`AnalysisState`]; collaborators (identity
/// resolution, root discovery) are borrowed so tests can swap them out.
pub struct Session<'a> {
    state: AnalysisState,
    content_root: PathBuf,
    candidates: Vec<PathBuf>,
    resolver: &'a dyn IdentityResolver,
    roots: &'a dyn RootProvider,
    /// Root scene paths, fetched when extraction starts
    root_scenes: Vec<PathBuf>,
    analyzer: ReachabilityAnalyzer,
    cancel: CancelToken,
    snapshot_path: Option<PathBuf>,
}

impl<'a> Session<'a> {
    pub fn new(
        content_root: impl Into<PathBuf>,
        candidates: Vec<PathBuf>,
        resolver: &'a dyn IdentityResolver,
        roots: &'a dyn RootProvider,
    ) -> Self {
        Self {
            state: AnalysisState::new(),
            content_root: content_root.into(),
            candidates,
            resolver,
            roots,
            root_scenes: Vec::new(),
            analyzer: ReachabilityAnalyzer::new(),
            cancel: CancelToken::new(),
            snapshot_path: None,
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Persist the finished analysis here when the session completes
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn into_state(self) -> AnalysisState {
        self.state
    }

    /// Run until done or cancelled, never yielding
    pub fn run(&mut self) -> PhaseStatus {
        self.step(Duration::MAX)
    }

    /// Run until done or cancelled, reporting after every work item
    ///
    /// Blocking like [`Session::run`], but each item goes through the
    /// shared `step` logic with a zero budget, so the callback sees one
    /// [`PhaseStatus::InProgress`] per completed unit and cancellation
    /// still lands at item boundaries.
    pub fn run_with_progress<F>(&mut self, mut progress: F) -> PhaseStatus
    where
        F: FnMut(&PhaseStatus),
    {
        loop {
            match self.step(Duration::ZERO) {
                status @ PhaseStatus::InProgress { .. } => progress(&status),
                status => return status,
            }
        }
    }

    /// Advance the pipeline for roughly `budget`
    ///
    /// At least one work item completes per call regardless of the budget;
    /// the clock is checked after each item, never before the first.
    pub fn step(&mut self, budget: Duration) -> PhaseStatus {
        // Duration::MAX overflows Instant, which reads as "no deadline"
        let deadline = Instant::now().checked_add(budget);

        loop {
            if self.cancel.is_cancelled() && self.state.phase != Phase::Done {
                info!("analysis cancelled during {}", self.state.phase.label());
                self.state.phase = Phase::Interrupted;
                return PhaseStatus::Interrupted;
            }

            let worked = match self.state.phase {
                Phase::Idle => {
                    debug!("indexing {} candidate path(s)", self.candidates.len());
                    self.state.phase = Phase::Indexing;
                    self.state.cursor = 0;
                    false
                }
                Phase::Indexing => self.index_one(),
                Phase::Extracting => self.extract_one(),
                Phase::Propagating => self.propagate_one(),
                Phase::Done => return PhaseStatus::Finished,
                Phase::Interrupted => return PhaseStatus::Interrupted,
            };

            if self.state.phase == Phase::Done {
                self.persist_snapshot();
                return PhaseStatus::Finished;
            }

            if worked {
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        return self.progress();
                    }
                }
            }
        }
    }

    /// Index the candidate under the cursor; phase rolls over when the
    /// candidate list is exhausted
    fn index_one(&mut self) -> bool {
        if self.state.cursor >= self.candidates.len() {
            debug!("indexed {} asset(s)", self.state.index.len());
            self.root_scenes = self.roots.root_scenes();
            self.state.phase = Phase::Extracting;
            self.state.cursor = 0;
            return false;
        }

        let path = self.candidates[self.state.cursor].clone();
        self.state
            .index
            .index_path(&path, &self.content_root, self.resolver);
        self.state.cursor += 1;
        true
    }

    fn extract_one(&mut self) -> bool {
        if self.state.cursor >= self.state.index.len() {
            self.enter_propagation();
            return false;
        }

        let state = &mut self.state;
        let id = state.index.ids()[state.cursor].clone();
        if let Some(record) = state.index.get(&id).cloned() {
            let ctx = ExtractContext {
                index: &state.index,
                resolver: self.resolver,
                root_scenes: &self.root_scenes,
            };
            extract_into(&mut state.graph, &ctx, &id, &record);
        }
        state.cursor += 1;
        true
    }

    fn enter_propagation(&mut self) {
        let root_ids = self.resolve_root_ids();
        let state = &mut self.state;

        state.reachability = self.analyzer.blank_status(&state.index);
        state.frontier = self
            .analyzer
            .seed_frontier(&state.index, &state.graph, &root_ids);
        state.phase = Phase::Propagating;
        state.cursor = 0;

        debug!(
            "propagating from {} root(s) over {} asset(s)",
            state.frontier.len(),
            state.index.len()
        );
    }

    fn propagate_one(&mut self) -> bool {
        let state = &mut self.state;
        if state.cursor >= state.frontier.len() {
            state.phase = Phase::Done;
            info!(
                "analysis complete: {} of {} asset(s) unreachable",
                state.reachability.values().filter(|r| !**r).count(),
                state.index.len()
            );
            return false;
        }

        self.analyzer.visit(
            &state.graph,
            &mut state.frontier,
            state.cursor,
            &mut state.reachability,
        );
        state.cursor += 1;
        true
    }

    /// Scene ids for the root scenes the provider named, in provider order
    fn resolve_root_ids(&self) -> Vec<AssetId> {
        self.root_scenes
            .iter()
            .filter_map(|path| self.state.index.id_for_path(path))
            .cloned()
            .collect()
    }

    fn progress(&self) -> PhaseStatus {
        let total = match self.state.phase {
            Phase::Indexing => self.candidates.len(),
            Phase::Extracting => self.state.index.len(),
            Phase::Propagating => self.state.frontier.len(),
            _ => 0,
        };

        PhaseStatus::InProgress {
            phase: self.state.phase,
            completed: self.state.cursor,
            total,
        }
    }

    fn persist_snapshot(&self) {
        let Some(path) = &self.snapshot_path else {
            return;
        };

        if let Err(err) = crate::snapshot::save(path, &self.state) {
            warn!("could not persist analysis snapshot: {}", err);
        }
    }
}
