// Copyright 2024 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use fnv::FnvHashSet;

use crate::id::EntryId;
use crate::payload::Payload;
use crate::status::GcsStatus;

/// A single node in the lineage DAG: an identifier, a payload, and a GCS status.
///
/// Parents are not stored as edges; they are derived on demand from `payload.dependencies()`
/// (see the module docs on `Lineage` for why).
#[derive(Clone, Debug)]
pub struct Entry<P> {
    status: GcsStatus,
    payload: P,
}

impl<P: Payload> Entry<P> {
    pub fn new(payload: P, status: GcsStatus) -> Self {
        Entry { status, payload }
    }

    pub fn status(&self) -> GcsStatus {
        self.status
    }

    /// Bumps the status to `new` if it is strictly greater than the current status, enforcing
    /// monotonicity. Returns whether the bump happened.
    pub fn set_status(&mut self, new: GcsStatus) -> bool {
        if new > self.status {
            self.status = new;
            true
        } else {
            false
        }
    }

    /// Unconditionally assigns `new`. Reserved for the single authorized downward transition
    /// (WAITING -> REMOTE, see `LineageCache::remove_waiting_task`). Fatal if `new` is not
    /// strictly below the current status: this method is never a substitute for `set_status`.
    pub fn reset_status(&mut self, new: GcsStatus) {
        assert!(
            new < self.status,
            "reset_status({:?}) is not a demotion from current status {:?}",
            new,
            self.status
        );
        self.status = new;
    }

    pub fn identifier(&self) -> EntryId {
        self.payload.id()
    }

    /// The identifiers of this entry's parents, computed fresh from the payload each call.
    pub fn parent_ids(&self) -> FnvHashSet<EntryId> {
        self.payload.dependencies().iter().copied().collect()
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut P {
        &mut self.payload
    }
}
