//! The workload under measurement: a large associative container of
//! fixed-size records.
//!
//! Records are 1 KiB, self-contained, immutable once created. The
//! container maps the dense key range `[0, n)` to records stored either
//! inline ([`RecordKind::Value`]) or behind a heap indirection
//! ([`RecordKind::Boxed`]); the two kinds reclaim very differently and
//! are a first-class scenario parameter.
//!
//! A container has exactly one logical owner at a time. Size mismatches
//! at operation boundaries are programming defects and abort.

use std::collections::HashMap;

/// Fixed record payload size in bytes.
pub const RECORD_BYTES: usize = 1024;

/// A fixed-size, self-contained payload with no internal pointers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    data: [u8; RECORD_BYTES],
}

impl Record {
    pub const fn new() -> Self {
        Self { data: [0; RECORD_BYTES] }
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

/// How the container stores its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Records inline in the container's backing storage.
    Value,
    /// Records individually heap-allocated; the container holds pointers.
    Boxed,
}

impl RecordKind {
    pub const fn name(self) -> &'static str {
        match self {
            RecordKind::Value => "value",
            RecordKind::Boxed => "boxed",
        }
    }
}

/// Maps a [`RecordKind`] to the stored slot type.
pub trait Slot: Sized {
    const KIND: RecordKind;

    fn record() -> Self;
}

impl Slot for Record {
    const KIND: RecordKind = RecordKind::Value;

    fn record() -> Self {
        Record::new()
    }
}

impl Slot for Box<Record> {
    const KIND: RecordKind = RecordKind::Boxed;

    fn record() -> Self {
        Box::new(Record::new())
    }
}

/// An associative container over the dense key range `[0, len)`.
#[derive(Debug)]
pub struct Container<S> {
    map: HashMap<usize, S>,
}

impl<S: Slot> Container<S> {
    /// An empty container with no storage reserved.
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }

    /// An empty container pre-sized for `capacity` entries. Pre-sizing is
    /// always an explicit scenario step, never a populate default.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { map: HashMap::with_capacity(capacity) }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains_key(&self, key: usize) -> bool {
        self.map.contains_key(&key)
    }

    /// Insert `count` records under keys `[0, count)`. The container must
    /// be empty; growth follows the map's own resize policy, nothing is
    /// pre-sized here.
    pub fn populate(&mut self, count: usize) {
        assert!(self.map.is_empty(), "populate requires an empty container");

        for key in 0..count {
            self.map.insert(key, S::record());
        }

        assert_eq!(self.map.len(), count, "container size after populate");
    }

    /// Delete every key individually, in key order. The backing storage
    /// is not shrunk by this.
    pub fn delete_all(&mut self) {
        let count = self.map.len();
        for key in 0..count {
            self.map.remove(&key);
        }

        assert!(self.map.is_empty(), "container not empty after delete-all");
    }

    /// Delete every key `>= keep`, in place.
    pub fn retain_first(&mut self, keep: usize) {
        let count = self.map.len();
        for key in keep..count {
            self.map.remove(&key);
        }

        assert_eq!(self.map.len(), keep.min(count), "container size after retain");
    }

    /// Copy every surviving entry into a fresh container sized to the
    /// survivor count, consuming (and so releasing) this one. This is the
    /// only operation that compacts the backing storage.
    pub fn compact(mut self) -> Self {
        let mut fresh = Self::with_capacity(self.map.len());
        for (key, slot) in self.map.drain() {
            fresh.map.insert(key, slot);
        }

        fresh
    }
}
