use metrics::{counter, histogram};
use std::time::Duration;

use crate::board::Outcome;

/// Counter of board operations, labelled by `operation` and `status`
pub const OPERATIONS_TOTAL: &str = "message_board_operations_total";
/// Histogram of store round-trip time, labelled by `operation`
pub const OPERATION_DURATION: &str = "message_board_operation_duration_seconds";
/// Counter of messages received from list calls
pub const MESSAGES_LOADED_TOTAL: &str = "message_board_messages_loaded_total";

/// Operation metrics: forwarded to the `metrics` facade and tallied locally
#[derive(Debug, Default, Clone)]
pub struct BoardMetrics {
    /// Operations that reached the store, whatever their outcome
    pub operations_total: u64,
    /// Operations that succeeded
    pub succeeded_total: u64,
    /// Operations that failed
    pub failed_total: u64,
    /// Operations skipped on a precondition
    pub skipped_total: u64,
    /// Operations whose result was discarded after cancellation
    pub cancelled_total: u64,
    /// Messages received from list calls
    pub messages_loaded_total: u64,
}

impl BoardMetrics {
    /// Record the outcome of one board operation.
    ///
    /// `duration` is the store round trip; it is `None` when the operation
    /// ended before calling the store (skipped, or cancelled up front).
    pub fn record_operation(&mut self, operation: &'static str, outcome: Outcome, duration: Option<Duration>) {
        let status = outcome.as_str();
        counter!(OPERATIONS_TOTAL, "operation" => operation, "status" => status).increment(1);
        if let Some(duration) = duration {
            histogram!(OPERATION_DURATION, "operation" => operation).record(duration.as_secs_f64());
        }

        match outcome {
            Outcome::Succeeded => self.succeeded_total += 1,
            Outcome::Failed => self.failed_total += 1,
            Outcome::Skipped => self.skipped_total += 1,
            Outcome::Cancelled => self.cancelled_total += 1,
        }
        if duration.is_some() {
            self.operations_total += 1;
        }
    }

    /// Record messages received from a list call.
    pub fn record_messages_loaded(&mut self, count: usize) {
        let count = count as u64;
        counter!(MESSAGES_LOADED_TOTAL).increment(count);
        self.messages_loaded_total += count;
    }
}
