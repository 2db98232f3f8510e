//! TTL-bounded single-slot caches for vault state.
//!
//! Two caches with identical shape and different TTLs: one for the last
//! computed [`VaultStructure`], one for the last discovered note list. The
//! single-writer assumption holds process-wide — there is no cross-process
//! coordination, and every mutating vault operation must call
//! [`VaultCaches::invalidate`] before reporting success.
//!
//! Lock discipline: the slot mutex is only ever held for the copy-in /
//! copy-out, never across I/O. Callers follow read-check, release,
//! fetch-if-miss, acquire, install.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::vault::types::{NoteMetadata, VaultStructure};

struct CachedEntry<T> {
    value: T,
    inserted_at: Instant,
}

/// One cache slot with a fixed TTL. Entries are replaced atomically and
/// never mutated in place.
pub struct TtlSlot<T: Clone> {
    ttl: Duration,
    slot: Mutex<Option<CachedEntry<T>>>,
}

impl<T: Clone> TtlSlot<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// The cached value, iff present and younger than the TTL.
    pub fn get_fresh(&self) -> Option<T> {
        let guard = self.slot.lock().expect("cache lock poisoned");
        guard
            .as_ref()
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Replace the slot. Last successful put wins.
    pub fn put(&self, value: T) {
        let mut guard = self.slot.lock().expect("cache lock poisoned");
        *guard = Some(CachedEntry {
            value,
            inserted_at: Instant::now(),
        });
    }

    pub fn invalidate(&self) {
        let mut guard = self.slot.lock().expect("cache lock poisoned");
        *guard = None;
    }
}

/// The discovered note list plus a marker for whether the expensive header
/// extraction ran. A snapshot without headers does not satisfy a caller
/// that asked for them.
#[derive(Clone)]
pub struct NotesSnapshot {
    pub notes: Arc<Vec<NoteMetadata>>,
    pub has_headers: bool,
}

/// Both vault caches, owned as a unit so invalidation is all-or-nothing.
pub struct VaultCaches {
    structure: TtlSlot<Arc<VaultStructure>>,
    notes: TtlSlot<NotesSnapshot>,
}

impl VaultCaches {
    pub fn new(structure_ttl: Duration, notes_ttl: Duration) -> Self {
        Self {
            structure: TtlSlot::new(structure_ttl),
            notes: TtlSlot::new(notes_ttl),
        }
    }

    pub fn fresh_structure(&self) -> Option<Arc<VaultStructure>> {
        self.structure.get_fresh()
    }

    pub fn store_structure(&self, structure: Arc<VaultStructure>) {
        self.structure.put(structure);
    }

    /// Fresh note snapshot, honoring the lazy-upgrade rule: a fresh entry
    /// without headers is a miss when the caller requires headers.
    pub fn fresh_notes(&self, require_headers: bool) -> Option<NotesSnapshot> {
        self.notes
            .get_fresh()
            .filter(|snapshot| snapshot.has_headers || !require_headers)
    }

    pub fn store_notes(&self, notes: Vec<NoteMetadata>, has_headers: bool) {
        self.notes.put(NotesSnapshot {
            notes: Arc::new(notes),
            has_headers,
        });
    }

    /// Clear both caches. Called by every mutating vault operation, on
    /// success and on failure alike (partial upstream side effects are
    /// possible).
    pub fn invalidate(&self) {
        self.structure.invalidate();
        self.notes.invalidate();
        tracing::debug!("vault caches invalidated");
    }
}
