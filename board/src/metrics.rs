//! Metric names recorded by the board reducer.

use metrics::{counter, describe_counter};

/// Intents rejected by validation or lookup, labelled by `kind`
pub const INTENTS_REJECTED: &str = "board.intents.rejected";
/// Snapshots written to storage
pub const SNAPSHOTS_SAVED: &str = "board.snapshots.saved";
/// Snapshot saves or loads that failed
pub const SNAPSHOTS_FAILED: &str = "board.snapshots.failed";

/// Register descriptions for the board metrics
pub fn register_metrics() {
    describe_counter!(INTENTS_REJECTED, "Intents rejected by the board, by error kind");
    describe_counter!(SNAPSHOTS_SAVED, "Board snapshots written to storage");
    describe_counter!(SNAPSHOTS_FAILED, "Board snapshot storage failures, by operation");
}

pub(crate) fn record_rejected(kind: &'static str) {
    counter!(INTENTS_REJECTED, "kind" => kind).increment(1);
}

pub(crate) fn record_saved() {
    counter!(SNAPSHOTS_SAVED).increment(1);
}

pub(crate) fn record_storage_failure(operation: &'static str) {
    counter!(SNAPSHOTS_FAILED, "operation" => operation).increment(1);
}
