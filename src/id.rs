// Copyright 2024 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::fmt;

/// An opaque 20-byte identifier.
///
/// `Id` is reused as the representation for every identifier namespace in this crate
/// (`EntryId`, `DriverId`, `JobId`, `ClientId`): the originating system derives all four
/// from a single unique-id representation, and nothing here needs more than byte-equality
/// and hashing over the full sequence.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id([u8; 20]);

/// Names a single node in the lineage DAG (a task, in the terms this crate uses).
pub type EntryId = Id;
/// Names the driver (job submitter) that owns a task, for table writes.
pub type DriverId = Id;
/// Names a job, for pub/sub subscription requests.
pub type JobId = Id;
/// Names this node, for pub/sub subscription requests.
pub type ClientId = Id;

impl Id {
    pub fn new(bytes: [u8; 20]) -> Self {
        Id(bytes)
    }

    /// The nil identifier, used by the cache when it subscribes to an ancestor on a job's
    /// behalf without attributing the subscription to any particular job (see `flush_task`).
    pub fn nil() -> Self {
        Id([0; 20])
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl From<[u8; 20]> for Id {
    fn from(bytes: [u8; 20]) -> Self {
        Id(bytes)
    }
}
