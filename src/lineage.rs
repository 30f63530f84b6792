// Copyright 2024 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use fnv::FnvHashMap;

use crate::entry::Entry;
use crate::id::EntryId;
use crate::payload::Payload;

/// A `EntryId -> Entry` mapping. Edges are implicit: an entry's parents are whichever of
/// its derived `parent_ids()` happen to also be keys of this map. A parent id with no
/// corresponding entry is simply "unknown in this lineage" rather than an error.
///
/// By Invariant D (task identifiers are minted before submission and a task's dependency
/// list can only name already-minted identifiers) the implicit parent graph is acyclic, so
/// nothing here needs to guard against cycles.
#[derive(Clone, Debug, Default)]
pub struct Lineage<P> {
    entries: FnvHashMap<EntryId, Entry<P>>,
}

impl<P: Payload> Lineage<P> {
    pub fn new() -> Self {
        Lineage {
            entries: FnvHashMap::default(),
        }
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry<P>> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry<P>> {
        self.entries.get_mut(&id)
    }

    /// Inserts `entry`, enforcing monotonicity: if no prior entry exists, inserts
    /// unconditionally; if one exists with strictly lower status, overwrites it; otherwise
    /// leaves the prior entry untouched. Returns whether the entry was (freshly) set.
    ///
    /// This is the sole mutation path for entries already in the lineage, which is what makes
    /// Invariant M enforceable in one place instead of at every call site.
    pub fn set(&mut self, entry: Entry<P>) -> bool {
        let id = entry.identifier();
        match self.entries.get(&id) {
            Some(existing) if existing.status() >= entry.status() => false,
            _ => {
                self.entries.insert(id, entry);
                true
            }
        }
    }

    pub fn pop(&mut self, id: EntryId) -> Option<Entry<P>> {
        self.entries.remove(&id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry<P>> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
