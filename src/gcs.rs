// Copyright 2024 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::id::{ClientId, DriverId, EntryId, JobId};
use crate::payload::Payload;

/// Called back exactly once, on the cache's own thread, when a table write durably commits.
pub type AckCallback = Box<dyn FnOnce(EntryId)>;

/// The write-with-acknowledgement half of the GCS, as seen by the lineage cache.
///
/// Implementations are presumed to retry internally; no failure is ever surfaced back to the
/// cache (see the write-through-failure row of the error table in the module docs on `cache`).
pub trait Table<P: Payload> {
    /// Asynchronously persists `value` under `key`, attributed to `driver_id`. `on_ack` fires
    /// exactly once, on this same thread, once the write is durable.
    fn add(&self, driver_id: DriverId, key: EntryId, value: P, on_ack: AckCallback);
}

/// The publish/subscribe half of the GCS, as seen by the lineage cache.
///
/// Unlike `Table::add`, these calls take no callback: a notification instead arrives as an
/// independent call to `LineageCache::handle_entry_committed` on the cache's thread, made by
/// whatever owns the concrete `PubSub` implementation and holds a reference to the cache (out
/// of scope for this crate; see the self-referential-callback note in the module docs on
/// `cache`, which explains why `Table::add`'s callback needs different treatment).
pub trait PubSub {
    /// Registers interest in commit events for `key`, as `subscriber_id` acting on behalf of
    /// `job_id`.
    fn request_notifications(&self, job_id: JobId, key: EntryId, subscriber_id: ClientId);

    /// Withdraws interest registered by an earlier `request_notifications` call. Notifications
    /// for `key` may still arrive after this call returns and must be tolerated as no-ops.
    fn cancel_notifications(&self, job_id: JobId, key: EntryId, subscriber_id: ClientId);
}
