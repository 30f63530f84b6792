// Copyright 2024 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Hand-rolled fakes for the `Payload`, `Table`, and `PubSub` traits, shared by the unit
//! tests scattered across this crate's modules. Kept in one place instead of a mocking
//! framework, matching this codebase's convention for its non-async library crates.

use std::cell::RefCell;
use std::rc::Rc;

use crate::gcs::{AckCallback, PubSub, Table};
use crate::id::{ClientId, DriverId, EntryId, JobId};
use crate::payload::Payload;

#[derive(Clone, Debug)]
pub struct TestTask {
    id: EntryId,
    driver_id: DriverId,
    dependencies: Vec<EntryId>,
}

impl TestTask {
    pub fn new(id: EntryId, dependencies: &[EntryId]) -> Self {
        TestTask {
            id,
            driver_id: DriverId::nil(),
            dependencies: dependencies.to_vec(),
        }
    }
}

impl Payload for TestTask {
    fn id(&self) -> EntryId {
        self.id
    }

    fn driver_id(&self) -> DriverId {
        self.driver_id
    }

    fn dependencies(&self) -> &[EntryId] {
        &self.dependencies
    }
}

/// A `Table` fake that holds pending writes until a test explicitly acks them, so tests can
/// assert on write ordering before and after simulating a GCS acknowledgement.
///
/// Backed by an `Rc` so a test can keep its own handle independent of whatever borrows the
/// `LineageCache` that owns the other clone: `ack`'s callback calls back into the cache
/// (typically `handle_entry_committed`, possibly cascading into further `Table::add` calls),
/// and that re-entry must not land on a `RefCell` a test's own call into `ack` is still
/// borrowing.
#[derive(Default)]
struct FakeTableInner<P> {
    pending: Vec<(DriverId, EntryId, P, AckCallback)>,
    issued: Vec<EntryId>,
}

pub struct FakeTable<P> {
    inner: Rc<RefCell<FakeTableInner<P>>>,
}

impl<P> Clone for FakeTable<P> {
    fn clone(&self) -> Self {
        FakeTable { inner: self.inner.clone() }
    }
}

impl<P> FakeTable<P> {
    pub fn new() -> Self {
        FakeTable {
            inner: Rc::new(RefCell::new(FakeTableInner { pending: Vec::new(), issued: Vec::new() })),
        }
    }

    /// All keys for which `add` has ever been called, in issue order.
    pub fn writes_issued(&self) -> Vec<EntryId> {
        self.inner.borrow().issued.clone()
    }

    pub fn is_pending(&self, id: EntryId) -> bool {
        self.inner.borrow().pending.iter().any(|(_, key, _, _)| *key == id)
    }

    /// Simulates the GCS durably committing `id`, invoking its stashed `on_ack` callback.
    /// Panics if no write for `id` is pending, since that would mean the test mis-modeled what
    /// the cache actually did.
    pub fn ack(&self, id: EntryId) {
        let (_, key, _, on_ack) = {
            let mut inner = self.inner.borrow_mut();
            let idx = inner
                .pending
                .iter()
                .position(|(_, key, _, _)| *key == id)
                .unwrap_or_else(|| panic!("no pending write for {:?}", id));
            inner.pending.remove(idx)
        };
        // The callback may recursively call back into this table (e.g. a cascaded flush), so the
        // borrow above must not still be held.
        on_ack(key);
    }
}

impl<P: Payload> Table<P> for FakeTable<P> {
    fn add(&self, driver_id: DriverId, key: EntryId, value: P, on_ack: AckCallback) {
        let mut inner = self.inner.borrow_mut();
        inner.issued.push(key);
        inner.pending.push((driver_id, key, value, on_ack));
    }
}

/// A `PubSub` fake that just records subscribe/cancel calls; notifications in tests are
/// simulated by calling `LineageCache::handle_entry_committed` directly, matching how the real
/// pub/sub interface is specified to reach back into the cache (see the `gcs` module docs).
#[derive(Default)]
pub struct FakePubSub {
    subscribed: RefCell<Vec<(JobId, EntryId, ClientId)>>,
    cancelled: RefCell<Vec<(JobId, EntryId, ClientId)>>,
}

impl FakePubSub {
    pub fn new() -> Self {
        FakePubSub {
            subscribed: RefCell::new(Vec::new()),
            cancelled: RefCell::new(Vec::new()),
        }
    }

    pub fn subscription_count(&self, id: EntryId) -> usize {
        self.subscribed.borrow().iter().filter(|(_, key, _)| *key == id).count()
    }

    pub fn is_cancelled(&self, id: EntryId) -> bool {
        self.cancelled.borrow().iter().any(|(_, key, _)| *key == id)
    }
}

impl PubSub for FakePubSub {
    fn request_notifications(&self, job_id: JobId, key: EntryId, subscriber_id: ClientId) {
        self.subscribed.borrow_mut().push((job_id, key, subscriber_id));
    }

    fn cancel_notifications(&self, job_id: JobId, key: EntryId, subscriber_id: ClientId) {
        self.cancelled.borrow_mut().push((job_id, key, subscriber_id));
    }
}
