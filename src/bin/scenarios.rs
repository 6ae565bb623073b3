//! Runs one named reclamation scenario under the metered global heap.
//!
//! Usage: `scenarios <strategy> [value|boxed] [count]`
//!
//! Scenario selection is wiring, not part of the harness contract; every
//! scenario remains parameterized only by (count, record kind, strategy).

use std::alloc::System;

use reclaim::{runner, RecordKind, SpinMeter, Strategy};

#[global_allocator]
static METER: SpinMeter = SpinMeter::new(System);

const DEFAULT_COUNT: usize = 1_000_000;

fn strategy_by_name(name: &str) -> Option<Strategy> {
    match name {
        "reset_rebuild" => Some(Strategy::ResetAndRebuild),
        "compaction" => Some(Strategy::CompactionByCopy),
        "forced_release" => Some(Strategy::ForcedOsRelease),
        "full_cycle" => Some(Strategy::FullCycle),
        "delete_abandon" => Some(Strategy::DeleteAndAbandon),
        _ => None,
    }
}

fn usage() -> ! {
    eprintln!("usage: scenarios <strategy> [value|boxed] [count]");
    eprintln!("strategies:");
    for strategy in Strategy::ALL {
        eprintln!("    {:<16} {}", key_of(strategy), strategy.name());
    }
    std::process::exit(2);
}

fn key_of(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::ResetAndRebuild => "reset_rebuild",
        Strategy::CompactionByCopy => "compaction",
        Strategy::ForcedOsRelease => "forced_release",
        Strategy::FullCycle => "full_cycle",
        Strategy::DeleteAndAbandon => "delete_abandon",
    }
}

fn main() {
    let mut args = std::env::args().skip(1);

    let strategy = match args.next().as_deref().and_then(strategy_by_name) {
        Some(strategy) => strategy,
        None => usage(),
    };

    let kind = match args.next().as_deref() {
        None | Some("value") => RecordKind::Value,
        Some("boxed") => RecordKind::Boxed,
        Some(_) => usage(),
    };

    let count = match args.next() {
        None => DEFAULT_COUNT,
        Some(raw) => match raw.parse() {
            Ok(count) => count,
            Err(_) => usage(),
        },
    };

    let report = runner::run_kind(&METER, count, kind, strategy);
    print!("{report}");
}
