//! Metric names and descriptions recorded by the Store.
//!
//! The runtime records through the `metrics` facade only; installing a
//! recorder (Prometheus, statsd, a test recorder) is up to the binary.
//! Without a recorder every call is a no-op.

use metrics::{describe_counter, describe_histogram};
use std::time::Duration;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Total actions accepted by `Store::send`
pub const COMMANDS_TOTAL: &str = "store.commands.total";
/// Reducer wall time per action
pub const REDUCER_DURATION: &str = "store.reducer.duration_seconds";
/// Number of effects returned per action
pub const EFFECTS_COUNT: &str = "store.effects.count";
/// Effects executed, labelled by `type`
pub const EFFECTS_EXECUTED: &str = "store.effects.executed";
/// Shutdown lifecycle counters
pub const SHUTDOWN_INITIATED: &str = "store.shutdown.initiated";
/// Shutdown finished with no pending effects
pub const SHUTDOWN_COMPLETED: &str = "store.shutdown.completed";
/// Shutdown gave up with effects still running
pub const SHUTDOWN_TIMEOUT: &str = "store.shutdown.timeout";
/// Actions rejected because the store was shutting down
pub const SHUTDOWN_REJECTED: &str = "store.shutdown.rejected_actions";

/// Register all metric descriptions.
///
/// Call once after installing a recorder so exporters can attach help text.
pub fn register_metrics() {
    describe_counter!(COMMANDS_TOTAL, "Total number of actions sent to the store");
    describe_histogram!(REDUCER_DURATION, "Time taken to execute the reducer");
    describe_histogram!(EFFECTS_COUNT, "Number of effects returned by each reducer call");
    describe_counter!(EFFECTS_EXECUTED, "Total number of effects executed, by type");
    describe_counter!(SHUTDOWN_INITIATED, "Graceful shutdowns started");
    describe_counter!(SHUTDOWN_COMPLETED, "Graceful shutdowns that drained all effects");
    describe_counter!(SHUTDOWN_TIMEOUT, "Graceful shutdowns that timed out");
    describe_counter!(SHUTDOWN_REJECTED, "Actions rejected during shutdown");
}

/// Reducer metrics recorder.
pub struct ReducerMetrics;

impl ReducerMetrics {
    /// Record one reducer call and the number of effects it produced.
    pub fn record_action(duration: Duration, effects: usize) {
        counter!(COMMANDS_TOTAL).increment(1);
        histogram!(REDUCER_DURATION).record(duration.as_secs_f64());
        // Note: Precision loss acceptable for metrics (effect counts < 2^52)
        #[allow(clippy::cast_precision_loss)]
        histogram!(EFFECTS_COUNT).record(effects as f64);
    }
}

/// Effect metrics recorder.
pub struct EffectMetrics;

impl EffectMetrics {
    /// Record an effect execution of the given kind.
    pub fn record_execution(kind: &'static str) {
        counter!(EFFECTS_EXECUTED, "type" => kind).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_noop() {
        register_metrics();
        ReducerMetrics::record_action(Duration::from_millis(1), 2);
        EffectMetrics::record_execution("none");
    }
}
