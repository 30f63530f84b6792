// Copyright 2024 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

#![deny(warnings)]
#![deny(
    clippy::all,
    clippy::default_trait_access,
    clippy::expl_impl_clone_on_copy,
    clippy::if_not_else,
    clippy::needless_continue,
    clippy::unseparated_literal_suffix,
    clippy::used_underscore_binding
)]
// It is often more clear to show that nothing is being moved.
#![allow(clippy::match_ref_pats)]
// Subjective style.
#![allow(
    clippy::len_without_is_empty,
    clippy::redundant_field_names,
    clippy::too_many_arguments
)]
// Default isn't as big a deal as people seem to think it is.
#![allow(clippy::new_without_default, clippy::new_ret_no_self)]

//! A per-node staging area that tracks the data-dependency DAG of tasks submitted to a
//! distributed task-execution system, coordinates durable write-back of task records to a
//! shared control store (the GCS), and serves lineage queries used for remote task
//! forwarding and failure recovery.
//!
//! Before a task's metadata can be made durable, every ancestor task it depends on must
//! already be durable; otherwise a crash could leave orphan records referencing ancestors no
//! replayer can find. [`LineageCache`] is the component that enforces this ordering.
//!
//! The pieces, roughly leaves-first:
//! - [`status::GcsStatus`]: the totally ordered state an entry occupies in the GCS write-back
//!   protocol.
//! - [`payload::Payload`]: the trait a caller's own task representation implements so the
//!   cache can read an identifier, a driver id, and a dependency list from it.
//! - [`entry::Entry`]: one DAG node: an identifier, a status, and a payload.
//! - [`lineage::Lineage`]: an indexed, monotonic container of entries.
//! - [`merge`]: the DFS used both to ingest a forwarded lineage fragment and to extract the
//!   uncommitted subgraph of a task for forwarding.
//! - [`gcs::Table`] / [`gcs::PubSub`]: the two external interfaces the cache writes through
//!   and subscribes against.
//! - [`cache::LineageCache`]: the orchestrator tying all of the above together.

pub mod cache;
pub mod entry;
pub mod gcs;
pub mod id;
pub mod lineage;
pub mod merge;
pub mod payload;
pub mod status;

#[cfg(test)]
pub(crate) mod test_support;

pub use cache::LineageCache;
pub use entry::Entry;
pub use gcs::{AckCallback, PubSub, Table};
pub use id::{ClientId, DriverId, EntryId, Id, JobId};
pub use lineage::Lineage;
pub use payload::Payload;
pub use status::GcsStatus;
