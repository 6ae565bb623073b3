//! End-to-end scenario runs under the metered global allocator.
//!
//! Everything lives in one `#[test]` function: the harness reads
//! process-wide counters, so concurrently running test threads would
//! bleed into each other's readings.

use std::alloc::System;

use reclaim::{
    os, runner, MemorySnapshot, Probe, Record, RecordKind, SampleMode, SpinMeter, Strategy,
    RECORD_BYTES, SMALL_COUNT,
};

#[global_allocator]
static METER: SpinMeter = SpinMeter::new(System);

const FULL_COUNT: usize = 1_000_000;
const MEDIUM_COUNT: usize = 250_000;

// Sampling and bookkeeping may shift the counters by transient
// allocations, never by more than this.
const JITTER: usize = 64 * 1024;

fn close(a: usize, b: usize) -> bool {
    a.abs_diff(b) <= JITTER
}

#[test]
fn test_scenarios_end_to_end() {
    probe_is_idempotent();
    reset_and_rebuild_shrinks_in_use();
    in_place_deletion_does_not_compact_but_copy_does();
    release_is_monotonic_over_collection();
    full_cycle_traces_six_snapshots();
    boxed_records_free_individually();
}

fn probe_is_idempotent() {
    let probe = Probe::new(&METER, SampleMode::Raw);

    let first = probe.sample("first");
    let second = probe.sample("second");

    assert!(close(first.allocated_bytes, second.allocated_bytes));
    assert!(close(first.heap_in_use_bytes, second.heap_in_use_bytes));
    assert_eq!(first.heap_released_bytes, second.heap_released_bytes);
}

fn reset_and_rebuild_shrinks_in_use() {
    let report = runner::run::<Record, _>(&METER, MEDIUM_COUNT, Strategy::ResetAndRebuild);
    let [baseline, populated, collected, rebuilt] = &report.snapshots[..] else {
        panic!("unexpected snapshot count");
    };

    assert!(baseline.allocated_bytes < populated.allocated_bytes);
    assert!(populated.allocated_bytes >= MEDIUM_COUNT * RECORD_BYTES);

    // drop + collection sweeps the workload out of the in-use heap
    assert!(collected.heap_in_use_bytes < populated.heap_in_use_bytes / 10);

    // the rebuilt container is two orders of magnitude below the full
    // workload; no OS release was requested, so nothing was released
    assert!(rebuilt.heap_in_use_bytes < populated.heap_in_use_bytes / 10);
    assert!(rebuilt.allocated_bytes >= SMALL_COUNT * RECORD_BYTES);
    assert_eq!(rebuilt.heap_released_bytes, baseline.heap_released_bytes);
}

fn in_place_deletion_does_not_compact_but_copy_does() {
    let report = runner::run::<Record, _>(&METER, MEDIUM_COUNT, Strategy::CompactionByCopy);
    let [baseline, populated, retained, compacted] = &report.snapshots[..] else {
        panic!("unexpected snapshot count");
    };

    // deleting all but SMALL_COUNT keys in place frees nothing: the
    // inline backing storage keeps its full-workload size
    assert!(close(retained.allocated_bytes, populated.allocated_bytes));
    assert!(retained.heap_in_use_bytes >= populated.allocated_bytes - JITTER);

    // only the copy into freshly sized storage compacts
    assert!(compacted.heap_in_use_bytes < populated.heap_in_use_bytes / 100);
    assert!(compacted.allocated_bytes < baseline.allocated_bytes + MEDIUM_COUNT * RECORD_BYTES / 100);
    assert!(compacted.allocated_bytes >= SMALL_COUNT * RECORD_BYTES);
}

fn release_is_monotonic_over_collection() {
    let report = runner::run::<Record, _>(&METER, MEDIUM_COUNT, Strategy::ForcedOsRelease);
    let [_, populated, dropped, collected, released] = &report.snapshots[..] else {
        panic!("unexpected snapshot count");
    };

    // dropping the reference frees the live set but not the in-use heap
    assert!(dropped.allocated_bytes < populated.allocated_bytes / 10);
    assert!(close(dropped.heap_in_use_bytes, populated.heap_in_use_bytes));

    // collection alone shrinks in-use without releasing anything further
    assert!(collected.heap_in_use_bytes < dropped.heap_in_use_bytes / 10);
    assert_eq!(collected.heap_released_bytes, dropped.heap_released_bytes);

    // the explicit request releases at least as much as collection did
    assert!(released.heap_released_bytes >= collected.heap_released_bytes);
    assert!(
        released.heap_released_bytes - collected.heap_released_bytes
            >= MEDIUM_COUNT * RECORD_BYTES
    );
}

fn full_cycle_traces_six_snapshots() {
    let report = runner::run::<Record, _>(&METER, FULL_COUNT, Strategy::FullCycle);

    let labels: Vec<&str> = report.snapshots.iter().map(|s| s.label).collect();
    assert_eq!(
        labels,
        [
            "Initial State",
            "After Adding Full Workload",
            "After Deleting All Keys",
            "After Drop (Before Collection)",
            "After Collection",
            "After Release To OS",
        ]
    );

    let [baseline, populated, deleted, dropped, collected, released] = &report.snapshots[..]
    else {
        panic!("unexpected snapshot count");
    };

    assert!(baseline.allocated_bytes < populated.allocated_bytes);
    assert!(populated.allocated_bytes >= FULL_COUNT * RECORD_BYTES);

    // per-key deletion of inline records frees no backing storage
    assert!(close(deleted.allocated_bytes, populated.allocated_bytes));
    assert!(close(deleted.heap_in_use_bytes, populated.heap_in_use_bytes));

    // the drop is visible to the live set immediately, to in-use only
    // after the collection request
    assert!(dropped.allocated_bytes < populated.allocated_bytes / 10);
    assert!(close(dropped.heap_in_use_bytes, deleted.heap_in_use_bytes));
    assert!(collected.heap_in_use_bytes < dropped.heap_in_use_bytes / 10);

    assert!(released.heap_released_bytes >= collected.heap_released_bytes);
    assert!(released.heap_released_bytes >= FULL_COUNT * RECORD_BYTES);

    for snapshot in &report.snapshots {
        well_formed(snapshot);
    }
}

fn boxed_records_free_individually() {
    let report = runner::run::<Box<Record>, _>(&METER, MEDIUM_COUNT, Strategy::DeleteAndAbandon);
    let [_, populated, deleted, dropped] = &report.snapshots[..] else {
        panic!("unexpected snapshot count");
    };

    assert_eq!(report.kind, RecordKind::Boxed);
    assert!(populated.allocated_bytes >= MEDIUM_COUNT * RECORD_BYTES);

    // per-key deletion frees each boxed record, unlike inline storage,
    // but the container's own table stays allocated
    assert!(deleted.allocated_bytes < populated.allocated_bytes / 2);
    assert!(deleted.allocated_bytes > baseline_of(&report.snapshots) + MEDIUM_COUNT * 8);

    assert!(dropped.allocated_bytes < deleted.allocated_bytes);
}

fn baseline_of(snapshots: &[MemorySnapshot]) -> usize {
    snapshots[0].allocated_bytes
}

fn well_formed(snapshot: &MemorySnapshot) {
    assert!(snapshot.heap_in_use_bytes >= snapshot.allocated_bytes);
    assert!(snapshot.system_reserved_bytes >= snapshot.heap_in_use_bytes);
    if os::oracle_supported() {
        assert!(snapshot.resident_set_size_bytes > 0);
    } else {
        assert_eq!(snapshot.resident_set_size_bytes, 0);
    }
}
