//! The reclamation strategies: fixed, ordered phase sequences.
//!
//! A phase is a label plus the actions executed before the probe takes
//! the phase's sample. Sequences are fully determined before execution;
//! nothing branches on runtime state, which is what makes the
//! between-phase deltas comparable across runs. Phase order must not be
//! reordered.

use crate::probe::SampleMode;

/// Record count of the small retained / rebuilt container.
pub const SMALL_COUNT: usize = 100;

/// One container mutation or explicit runtime request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Build the full workload into the (empty) container.
    Populate,
    /// Delete every key individually.
    DeleteAll,
    /// Delete every key `>= K`, in place.
    DeleteExceptFirst(usize),
    /// Copy survivors into freshly sized storage, dropping the old
    /// container.
    CompactByCopy,
    /// Drop the owning reference. No-op if already dropped.
    DropReference,
    /// Issue a synchronous collection-cycle request.
    RequestCollection,
    /// Issue an explicit OS-release request.
    RequestOsRelease,
    /// Build a fresh container pre-sized to `n` and populate it.
    RebuildSmall(usize),
}

/// A labeled step: actions, then one probe sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub label: &'static str,
    pub actions: &'static [Action],
}

/// Which optional report columns a strategy's history makes meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportColumns {
    /// Heap-released is tracked by strategies that issue (or observe the
    /// absence of) OS-release requests.
    pub released: bool,
    /// Resident-set-size, where the oracle is present.
    pub rss: bool,
}

/// The canonical reclamation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Drop the whole container, collect, rebuild small. Measures whether
    /// drop-and-recreate alone shrinks the in-use heap.
    ResetAndRebuild,
    /// Delete in place down to a small survivor set, then copy survivors
    /// into freshly sized storage. In-place deletion alone does not
    /// compact; the copy does.
    CompactionByCopy,
    /// Drop, observe, collect, observe, release, observe. Isolates the
    /// marginal effect of the explicit OS-release request.
    ForcedOsRelease,
    /// Per-key deletion, drop, collection, release: the finest-grained
    /// trace across all reclamation levers.
    FullCycle,
    /// Observation only: delete everything, drop, never request release.
    /// Sampled collect-first so successive numbers stay comparable.
    DeleteAndAbandon,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::ResetAndRebuild,
        Strategy::CompactionByCopy,
        Strategy::ForcedOsRelease,
        Strategy::FullCycle,
        Strategy::DeleteAndAbandon,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Strategy::ResetAndRebuild => "Reset-and-Rebuild",
            Strategy::CompactionByCopy => "Compaction-by-Copy",
            Strategy::ForcedOsRelease => "Forced OS Release",
            Strategy::FullCycle => "Full Cycle",
            Strategy::DeleteAndAbandon => "Delete-and-Abandon",
        }
    }

    /// The fixed phase sequence. The probe samples once after each phase,
    /// and once for the baseline before any of them.
    pub const fn phases(self) -> &'static [Phase] {
        match self {
            Strategy::ResetAndRebuild => RESET_AND_REBUILD,
            Strategy::CompactionByCopy => COMPACTION_BY_COPY,
            Strategy::ForcedOsRelease => FORCED_OS_RELEASE,
            Strategy::FullCycle => FULL_CYCLE,
            Strategy::DeleteAndAbandon => DELETE_AND_ABANDON,
        }
    }

    /// The documented, fixed sampling choice for this scenario.
    pub const fn sample_mode(self) -> SampleMode {
        match self {
            Strategy::DeleteAndAbandon => SampleMode::CollectFirst,
            _ => SampleMode::Raw,
        }
    }

    pub const fn columns(self) -> ReportColumns {
        match self {
            Strategy::ResetAndRebuild | Strategy::CompactionByCopy => {
                ReportColumns { released: false, rss: false }
            }
            Strategy::ForcedOsRelease | Strategy::DeleteAndAbandon => {
                ReportColumns { released: true, rss: false }
            }
            Strategy::FullCycle => ReportColumns { released: true, rss: true },
        }
    }
}

const RESET_AND_REBUILD: &[Phase] = &[
    Phase { label: "After Adding Full Workload", actions: &[Action::Populate] },
    Phase {
        label: "After Drop + Collection",
        actions: &[Action::DropReference, Action::RequestCollection],
    },
    Phase {
        label: "After Rebuild (Small)",
        actions: &[Action::RebuildSmall(SMALL_COUNT)],
    },
];

const COMPACTION_BY_COPY: &[Phase] = &[
    Phase { label: "After Adding Full Workload", actions: &[Action::Populate] },
    Phase {
        label: "After In-Place Retain + Collection",
        actions: &[Action::DeleteExceptFirst(SMALL_COUNT), Action::RequestCollection],
    },
    Phase {
        label: "After Compaction (Copy) + Collection",
        actions: &[Action::CompactByCopy, Action::RequestCollection],
    },
];

const FORCED_OS_RELEASE: &[Phase] = &[
    Phase { label: "After Adding Full Workload", actions: &[Action::Populate] },
    Phase { label: "After Drop (Before Collection)", actions: &[Action::DropReference] },
    Phase { label: "After Collection", actions: &[Action::RequestCollection] },
    Phase { label: "After Release To OS", actions: &[Action::RequestOsRelease] },
];

// The release phase re-drops (a no-op) and collects once more before
// releasing, the way a free-OS-memory hook runs a final cycle of its own.
const FULL_CYCLE: &[Phase] = &[
    Phase { label: "After Adding Full Workload", actions: &[Action::Populate] },
    Phase { label: "After Deleting All Keys", actions: &[Action::DeleteAll] },
    Phase { label: "After Drop (Before Collection)", actions: &[Action::DropReference] },
    Phase { label: "After Collection", actions: &[Action::RequestCollection] },
    Phase {
        label: "After Release To OS",
        actions: &[Action::DropReference, Action::RequestCollection, Action::RequestOsRelease],
    },
];

const DELETE_AND_ABANDON: &[Phase] = &[
    Phase { label: "After Adding Full Workload", actions: &[Action::Populate] },
    Phase { label: "After Deleting All Keys", actions: &[Action::DeleteAll] },
    Phase { label: "After Drop Reference", actions: &[Action::DropReference] },
];
