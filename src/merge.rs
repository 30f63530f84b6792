// Copyright 2024 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::id::EntryId;
use crate::lineage::Lineage;
use crate::payload::Payload;
use crate::status::GcsStatus;

/// Copies the subgraph reachable from `id` in `from` into `into`, stopping at any node for
/// which `stop_if` returns true (or that is absent from `from`, or that `into` already holds
/// an equal-or-better record of).
///
/// This is a DFS: `id` is copied into `into` via `Lineage::set` first, and only if that copy
/// actually changed something (there was no equal-or-better record already present) do we
/// recurse into its parents. That's also what guarantees termination beyond the DAG being
/// finite: a node whose copy is rejected by `set` can't contribute new recursion, so no node
/// is ever productively visited twice.
pub fn merge<P: Payload + Clone>(
    id: EntryId,
    from: &Lineage<P>,
    into: &mut Lineage<P>,
    stop_if: &dyn Fn(GcsStatus) -> bool,
) {
    let Some(entry) = from.get(id) else {
        return;
    };
    if stop_if(entry.status()) {
        return;
    }
    let entry = entry.clone();
    let parent_ids = entry.parent_ids();
    if into.set(entry) {
        for parent_id in parent_ids {
            merge(parent_id, from, into, stop_if);
        }
    }
}

/// Never stops early; only absent entries halt the traversal. Used when ingesting a forwarded
/// lineage fragment, where every entry the sender included is expected to be copied.
pub fn stop_at_absent(_status: GcsStatus) -> bool {
    false
}

/// Stops at (does not copy past) any entry that is already durable. Used when extracting the
/// uncommitted subgraph of a task to ship with a forward: a `COMMITTED` ancestor can be
/// recovered from the GCS directly, so there's no need to carry it along.
pub fn stop_at_committed(status: GcsStatus) -> bool {
    status == GcsStatus::Committed
}

#[cfg(test)]
mod tests {
    use super::{merge, stop_at_absent, stop_at_committed};
    use crate::entry::Entry;
    use crate::id::Id;
    use crate::lineage::Lineage;
    use crate::status::GcsStatus;
    use crate::test_support::TestTask;

    fn set(lineage: &mut Lineage<TestTask>, id: Id, deps: &[Id], status: GcsStatus) {
        lineage.set(Entry::new(TestTask::new(id, deps), status));
    }

    #[test]
    fn merge_stops_at_absent_parent() {
        let a = Id::new([1; 20]);
        let b = Id::new([2; 20]);
        let mut from = Lineage::new();
        set(&mut from, b, &[a], GcsStatus::UncommittedReady);
        // `a` is intentionally never inserted into `from`.

        let mut into = Lineage::new();
        merge(b, &from, &mut into, &stop_at_absent);

        assert_eq!(into.len(), 1);
        assert!(into.get(b).is_some());
        assert!(into.get(a).is_none());
    }

    #[test]
    fn merge_excludes_committed_subtree_with_stop_at_committed() {
        let a = Id::new([1; 20]);
        let b = Id::new([2; 20]);
        let c = Id::new([3; 20]);
        let mut from = Lineage::new();
        set(&mut from, a, &[], GcsStatus::Committed);
        set(&mut from, b, &[a], GcsStatus::Committing);
        set(&mut from, c, &[b], GcsStatus::UncommittedReady);

        let mut into = Lineage::new();
        merge(c, &from, &mut into, &stop_at_committed);

        assert_eq!(into.len(), 2);
        assert!(into.get(c).is_some());
        assert!(into.get(b).is_some());
        assert!(into.get(a).is_none());
    }

    #[test]
    fn merge_does_not_revisit_nodes_already_equally_or_better_recorded() {
        // A diamond: d depends on b and c, both of which depend on a. A naive traversal without
        // the `into.set` rejection would visit `a` twice.
        let a = Id::new([1; 20]);
        let b = Id::new([2; 20]);
        let c = Id::new([3; 20]);
        let d = Id::new([4; 20]);
        let mut from = Lineage::new();
        set(&mut from, a, &[], GcsStatus::UncommittedRemote);
        set(&mut from, b, &[a], GcsStatus::UncommittedRemote);
        set(&mut from, c, &[a], GcsStatus::UncommittedRemote);
        set(&mut from, d, &[b, c], GcsStatus::UncommittedRemote);

        let mut into = Lineage::new();
        merge(d, &from, &mut into, &stop_at_absent);

        assert_eq!(into.len(), 4);
    }
}
