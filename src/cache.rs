// Copyright 2024 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use fnv::{FnvHashMap, FnvHashSet};

use crate::entry::Entry;
use crate::gcs::{PubSub, Table};
use crate::id::{ClientId, EntryId, JobId};
use crate::lineage::Lineage;
use crate::merge::{merge, stop_at_committed};
use crate::payload::Payload;
use crate::status::GcsStatus;

/// The orchestrator: tracks every task this node is responsible for (or that it is blocked
/// on), schedules durable writes in dependency order, and reacts to commit notifications.
///
/// This cache is single-threaded cooperative (see the concurrency notes below): all public
/// methods take `&mut self`, and are only ever expected to run serially, driven by the
/// surrounding event loop. The one wrinkle is `flush_task`'s write callback, which must call
/// back into `handle_entry_committed` on this same instance after `flush_task` has already
/// returned. A plain `&mut self` method can't hand out a `'static` closure that reborrows
/// itself, so the cache is always constructed behind `Rc<RefCell<_>>`, and keeps a `Weak`
/// handle to itself (via `Rc::new_cyclic`) purely to capture in that one callback. Every other
/// method remains an ordinary `&mut self` call through the `RefCell`; the pub/sub interface in
/// particular never receives a callback from the cache at all (see `gcs::PubSub`), so it needs
/// no such handle.
pub struct LineageCache<P, T, S> {
    self_handle: Weak<RefCell<LineageCache<P, T, S>>>,
    client_id: ClientId,
    table: T,
    pubsub: S,
    lineage: Lineage<P>,
    /// Task identifiers with status UNCOMMITTED_READY whose flush was blocked by an
    /// uncommitted parent.
    ready_pending: FnvHashSet<EntryId>,
    /// Task identifiers we've asked the pub/sub layer to notify us about, to avoid requesting
    /// the same subscription twice.
    subscribed: FnvHashSet<EntryId>,
    /// Parent identifier -> set of child identifiers whose flush is blocked on that parent.
    waiters_by_parent: FnvHashMap<EntryId, FnvHashSet<EntryId>>,
}

impl<P, T, S> LineageCache<P, T, S>
where
    P: Payload + Clone,
    T: Table<P>,
    S: PubSub,
{
    pub fn new(client_id: ClientId, table: T, pubsub: S) -> Rc<RefCell<Self>> {
        Rc::new_cyclic(|weak| {
            RefCell::new(LineageCache {
                self_handle: weak.clone(),
                client_id,
                table,
                pubsub,
                lineage: Lineage::new(),
                ready_pending: FnvHashSet::default(),
                subscribed: FnvHashSet::default(),
                waiters_by_parent: FnvHashMap::default(),
            })
        })
    }

    /// Adds a task that is waiting for execution, along with its uncommitted lineage handed to
    /// us by whichever node forwarded it. These entries are not written to the GCS until the
    /// task becomes ready (`add_ready_task`).
    pub fn add_waiting_task(&mut self, task: P, uncommitted_lineage: Lineage<P>) {
        let task_id = task.id();
        merge(task_id, &uncommitted_lineage, &mut self.lineage, &|status| {
            // We received this lineage from a remote node, so every entry in it must already be
            // known to be remote; the only legitimate stopping condition during this merge is
            // running off the end of the forwarded fragment (an absent entry), not this check.
            assert_eq!(
                status,
                GcsStatus::UncommittedRemote,
                "forwarded lineage entry must carry status UncommittedRemote, got {:?}",
                status
            );
            false
        });

        let inserted = self.lineage.set(Entry::new(task, GcsStatus::UncommittedWaiting));
        assert!(inserted, "task {:?} was already submitted locally", task_id);
        log::debug!("added waiting task {:?}", task_id);
    }

    /// Marks a task ready for GCS writeback, because it has started execution locally, and
    /// attempts to flush it immediately.
    pub fn add_ready_task(&mut self, task: P) {
        let task_id = task.id();
        let inserted = self.lineage.set(Entry::new(task, GcsStatus::UncommittedReady));
        assert!(inserted, "task {:?} was not ready to become UncommittedReady", task_id);

        if !self.flush_task(task_id) {
            self.ready_pending.insert(task_id);
        }
    }

    /// Gives a WAITING task back to a remote node (e.g. it was stolen or rerouted), demoting it
    /// to REMOTE rather than discarding it, so that any local descendant can still reference it.
    pub fn remove_waiting_task(&mut self, task_id: EntryId) {
        let mut entry = self
            .lineage
            .pop(task_id)
            .unwrap_or_else(|| panic!("no such waiting task {:?}", task_id));
        assert_eq!(
            entry.status(),
            GcsStatus::UncommittedWaiting,
            "task {:?} is not waiting, cannot remove as such",
            task_id
        );
        entry.reset_status(GcsStatus::UncommittedRemote);
        let inserted = self.lineage.set(entry);
        assert!(inserted, "re-inserting demoted task {:?} must always succeed", task_id);
    }

    /// Returns a fresh `Lineage` containing `task_id` and all of its transitive ancestors whose
    /// status is not yet COMMITTED; anything COMMITTED is omitted since the recipient can rely
    /// on the GCS for it directly.
    pub fn uncommitted_lineage(&self, task_id: EntryId) -> Lineage<P> {
        let mut result = Lineage::new();
        merge(task_id, &self.lineage, &mut result, &stop_at_committed);
        result
    }

    /// Attempts to issue a durable write for `task_id`. Returns whether the write was issued.
    ///
    /// Precondition: the entry exists and has status UncommittedReady.
    fn flush_task(&mut self, task_id: EntryId) -> bool {
        let parent_ids = {
            let entry = self
                .lineage
                .get(task_id)
                .unwrap_or_else(|| panic!("no such entry {:?} to flush", task_id));
            assert_eq!(
                entry.status(),
                GcsStatus::UncommittedReady,
                "entry {:?} is not ready to flush, status is {:?}",
                task_id,
                entry.status()
            );
            entry.parent_ids()
        };

        let mut blocked = false;
        for parent_id in parent_ids {
            let Some(parent) = self.lineage.get(parent_id) else {
                // Unknown to us: nothing to wait on.
                continue;
            };
            let parent_status = parent.status();
            if parent_status == GcsStatus::Committed {
                continue;
            }
            assert_ne!(
                parent_status,
                GcsStatus::UncommittedWaiting,
                "child {:?} became ready before its parent {:?}",
                task_id,
                parent_id
            );

            if parent_status == GcsStatus::UncommittedRemote && self.subscribed.insert(parent_id) {
                log::trace!("subscribing for commit notifications on {:?}", parent_id);
                self
                    .pubsub
                    .request_notifications(JobId::nil(), parent_id, self.client_id);
            }
            self.waiters_by_parent.entry(parent_id).or_default().insert(task_id);
            blocked = true;
        }

        if blocked {
            return false;
        }

        let (driver_id, payload) = {
            let entry = self.lineage.get(task_id).expect("checked above");
            (entry.payload().driver_id(), entry.payload().clone())
        };
        let handle = self.self_handle.clone();
        self.table.add(
            driver_id,
            task_id,
            payload,
            Box::new(move |committed_id| {
                if let Some(cache) = handle.upgrade() {
                    cache.borrow_mut().handle_entry_committed(committed_id);
                }
            }),
        );
        log::debug!("issued write for {:?}", task_id);

        let mut entry = self.lineage.pop(task_id).expect("checked above");
        let bumped = entry.set_status(GcsStatus::Committing);
        assert!(bumped, "entry {:?} must move to Committing after its write is issued", task_id);
        self.lineage.set(entry);

        true
    }

    /// Attempts to flush every task currently in `ready_pending`, removing those that succeed.
    pub fn flush(&mut self) {
        let pending: Vec<EntryId> = self.ready_pending.iter().copied().collect();
        for task_id in pending {
            if self.flush_task(task_id) {
                self.ready_pending.remove(&task_id);
            }
        }
    }

    /// Invoked when a task we wrote is acknowledged, or when a pub/sub notification arrives for
    /// a remote ancestor we subscribed to.
    pub fn handle_entry_committed(&mut self, task_id: EntryId) {
        log::debug!("task committed: {:?}", task_id);
        let mut entry = self
            .lineage
            .pop(task_id)
            .unwrap_or_else(|| panic!("commit notification for unknown entry {:?}", task_id));

        for parent_id in entry.parent_ids() {
            self.pop_ancestors(parent_id);
        }

        if !entry.set_status(GcsStatus::Committed) {
            assert_eq!(
                entry.status(),
                GcsStatus::Committed,
                "entry {:?} failed to advance to Committed but isn't already there",
                task_id
            );
        }
        self.lineage.set(entry);

        if self.subscribed.remove(&task_id) {
            self
                .pubsub
                .cancel_notifications(JobId::nil(), task_id, self.client_id);
        }

        if let Some(children) = self.waiters_by_parent.remove(&task_id) {
            for child_id in children {
                if self.flush_task(child_id) {
                    let removed = self.ready_pending.remove(&child_id);
                    assert!(removed, "flushed child {:?} was not tracked as ready_pending", child_id);
                }
            }
        }
    }

    /// Recursively removes `id` and its transitive ancestors, provided each has status
    /// UncommittedRemote or Committed (anything else is still our responsibility and must not be
    /// discarded). Absent entries stop the recursion silently.
    fn pop_ancestors(&mut self, id: EntryId) {
        let Some(entry) = self.lineage.pop(id) else {
            return;
        };
        let status = entry.status();
        assert!(
            status == GcsStatus::UncommittedRemote || status == GcsStatus::Committed,
            "refusing to garbage-collect ancestor {:?} with status {:?}",
            id,
            status
        );
        for parent_id in entry.parent_ids() {
            self.pop_ancestors(parent_id);
        }
    }

    /// Exposed for tests and for callers that want to inspect the current state directly.
    pub fn lineage(&self) -> &Lineage<P> {
        &self.lineage
    }

    pub fn is_subscribed(&self, id: EntryId) -> bool {
        self.subscribed.contains(&id)
    }

    pub fn is_ready_pending(&self, id: EntryId) -> bool {
        self.ready_pending.contains(&id)
    }
}
