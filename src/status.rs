// Copyright 2024 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

/// An entry's status according to its write-back state in the GCS.
///
/// Variants are declared in increasing order so that `PartialOrd`/`Ord` give the monotonic
/// comparison every call site needs; no code outside this module should compare entries by
/// their raw discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GcsStatus {
    /// Absent from the cache. This variant is never actually stored on an `Entry`; it exists
    /// only as the logical "less than everything else" floor for comparisons.
    None,
    /// Exists on or is owned by another node; not this node's responsibility to write.
    UncommittedRemote,
    /// Locally submitted; not yet executable (still waiting on inputs).
    UncommittedWaiting,
    /// Locally executing or done; eligible for durable write.
    UncommittedReady,
    /// Write issued to the GCS; awaiting acknowledgement.
    Committing,
    /// Durable in the GCS.
    Committed,
}
