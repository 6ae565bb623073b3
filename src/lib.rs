//! `reclaim` measures how much memory a process actually gives back after
//! building, then discarding, a very large associative container.
//!
//! The harness has four parts:
//! - a metered heap ([`Meter`]) standing in for a managed runtime's
//!   memory-statistics source, with explicit collection-cycle and
//!   OS-release requests;
//! - a probe ([`Probe`]) producing labeled [`MemorySnapshot`]s from the
//!   meter and the optional OS resident-set-size oracle;
//! - a workload ([`Container`]) of fixed 1 KiB records stored by value
//!   or behind a box;
//! - the reclamation [`Strategy`] tables and the scenario [`runner`].
//!
//! Rust frees eagerly, so the collection-cycle request marks the sweep
//! point of the modeled heap rather than discovering garbage; the
//! OS-release request is additionally backed by a real `malloc_trim` on
//! Linux/glibc. This platform variant is by contract, see the module
//! docs of [`counters`].
//!
//! ```rust
//! use std::alloc::System;
//! use reclaim::{runner, RecordKind, SpinMeter, Strategy};
//!
//! #[global_allocator]
//! static METER: SpinMeter = SpinMeter::new(System);
//!
//! let report = runner::run_kind(&METER, 10_000, RecordKind::Value, Strategy::FullCycle);
//! assert_eq!(report.snapshots.len(), 6);
//! print!("{report}");
//! ```

pub mod counters;
pub mod meter;
pub mod os;
pub mod probe;
pub mod runner;
pub mod strategy;
pub mod workload;

pub use counters::Counters;
pub use meter::{Meter, SpinMeter};
pub use probe::{HeapRuntime, MemorySnapshot, Probe, SampleMode};
pub use runner::Report;
pub use strategy::{Action, Phase, Strategy, SMALL_COUNT};
pub use workload::{Container, Record, RecordKind, Slot, RECORD_BYTES};
