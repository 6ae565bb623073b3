//! Runs one scenario: baseline sample, workload build, strategy phases,
//! report.
//!
//! The container is a single owned value threaded through the phase loop
//! as an `Option`; dropping the reference really is `Option::take`, so
//! the single-owner invariant holds by construction. The snapshot vector
//! is sized up front so that appending samples never reallocates under
//! the meter.

use std::fmt;

use crate::probe::{HeapRuntime, MemorySnapshot, Probe};
use crate::strategy::{Action, ReportColumns, Strategy};
use crate::workload::{Container, Record, RecordKind, Slot};
use crate::os;

const LABEL_WIDTH: usize = 36;

/// The ordered, labeled outcome of one scenario run.
#[derive(Debug)]
pub struct Report {
    pub strategy: Strategy,
    pub kind: RecordKind,
    pub count: usize,
    pub snapshots: Vec<MemorySnapshot>,
}

/// Run `strategy` over a container of `count` records stored as `S`.
pub fn run<S: Slot, H: HeapRuntime>(heap: &H, count: usize, strategy: Strategy) -> Report {
    let probe = Probe::new(heap, strategy.sample_mode());
    run_with_probe::<S, H>(&probe, count, strategy)
}

/// As [`run`], with a caller-built probe (tests plug stub oracles here).
pub fn run_with_probe<S: Slot, H: HeapRuntime>(
    probe: &Probe<'_, H>,
    count: usize,
    strategy: Strategy,
) -> Report {
    let phases = strategy.phases();
    let mut snapshots = Vec::with_capacity(phases.len() + 1);

    snapshots.push(probe.sample("Initial State"));

    let mut container: Option<Container<S>> = Some(Container::new());

    for phase in phases {
        for action in phase.actions {
            apply(&mut container, *action, count, probe);
        }
        snapshots.push(probe.sample(phase.label));
    }

    Report { strategy, kind: S::KIND, count, snapshots }
}

/// Run under `kind` chosen at runtime.
pub fn run_kind<H: HeapRuntime>(
    heap: &H,
    count: usize,
    kind: RecordKind,
    strategy: Strategy,
) -> Report {
    match kind {
        RecordKind::Value => run::<Record, H>(heap, count, strategy),
        RecordKind::Boxed => run::<Box<Record>, H>(heap, count, strategy),
    }
}

fn apply<S: Slot, H: HeapRuntime>(
    container: &mut Option<Container<S>>,
    action: Action,
    count: usize,
    probe: &Probe<'_, H>,
) {
    match action {
        Action::Populate => {
            live(container).populate(count);
        }
        Action::DeleteAll => {
            live(container).delete_all();
        }
        Action::DeleteExceptFirst(keep) => {
            live(container).retain_first(keep);
        }
        Action::CompactByCopy => {
            let old = container.take().expect("compaction requires a live container");
            *container = Some(old.compact());
        }
        Action::DropReference => {
            // no-op if already dropped
            drop(container.take());
        }
        Action::RequestCollection => {
            probe.heap().request_collection();
        }
        Action::RequestOsRelease => {
            probe.heap().request_os_release();
        }
        Action::RebuildSmall(small) => {
            assert!(container.is_none(), "rebuild requires the old container to be dropped");
            let mut fresh = Container::with_capacity(small);
            fresh.populate(small);
            *container = Some(fresh);
        }
    }
}

fn live<S: Slot>(container: &mut Option<Container<S>>) -> &mut Container<S> {
    container.as_mut().expect("phase requires a live container")
}

impl Report {
    fn columns(&self) -> ReportColumns {
        let columns = self.strategy.columns();
        ReportColumns { released: columns.released, rss: columns.rss && os::oracle_supported() }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.columns();

        writeln!(
            f,
            "=== {} ({} records, {} x {} B) ===",
            self.strategy.name(),
            self.kind.name(),
            self.count,
            crate::workload::RECORD_BYTES,
        )?;

        for snapshot in &self.snapshots {
            write!(
                f,
                "[{:<width$}] Alloc: {:8} KB  |  HeapInuse: {:8} KB",
                snapshot.label,
                snapshot.allocated_bytes / 1024,
                snapshot.heap_in_use_bytes / 1024,
                width = LABEL_WIDTH,
            )?;

            if columns.released {
                write!(f, "  |  HeapReleased: {:8} KB", snapshot.heap_released_bytes / 1024)?;
            }

            write!(f, "  |  Sys: {:8} KB", snapshot.system_reserved_bytes / 1024)?;

            if columns.rss {
                write!(f, "  |  RSS: {:8} KB", snapshot.resident_set_size_bytes / 1024)?;
            }

            writeln!(f)?;
        }

        Ok(())
    }
}
