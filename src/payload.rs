// Copyright 2024 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::fmt::Debug;

use crate::id::{DriverId, EntryId};

/// A task record, as far as the lineage cache is concerned.
///
/// The cache only ever needs a task's own identifier, the driver that owns it (for table
/// writes), and the identifiers of the tasks it depends on. Everything else about a task
/// (the actual function pointer, arguments, resource spec, ...) is opaque to this crate;
/// callers plug in their own representation by implementing this trait.
pub trait Payload: Clone + Debug {
    /// This task's own identifier.
    fn id(&self) -> EntryId;

    /// The driver (job submitter) that owns this task, used as the `driver_id` in table
    /// writes.
    fn driver_id(&self) -> DriverId;

    /// The identifiers of the tasks this one depends on. An entry's parents (`Entry::parent_ids`)
    /// are computed directly from this list.
    fn dependencies(&self) -> &[EntryId];
}
