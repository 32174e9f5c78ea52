//! Structured logging setup and the log-line prefix conventions used across the
//! engine, grounded on the teacher's `common::logging` module: short tags that
//! make it possible to grep a log for "everything this consumer dispatched to a
//! client" versus "everything a client handed back".

use tracing_subscriber::EnvFilter;

/// Prefix for a message received from a foreign task (a venue callback, an I/O task).
pub const RECV: &str = "<--";
/// Prefix for a message handed off to a foreign task.
pub const SEND: &str = "-->";
/// Prefix for a command dequeued by the engine's consumer.
pub const CMD: &str = "[CMD]";
/// Prefix for an event dequeued by the engine's consumer.
pub const EVT: &str = "[EVT]";
/// Prefix for a reconciliation-protocol log line.
pub const RECON: &str = "[RECON]";
/// Prefix for a state/status report exchanged with a venue.
pub const RPT: &str = "[RPT]";

/// Initializes `tracing` from the `RUST_LOG` environment variable, defaulting to
/// `info` when unset. Idempotent: a second call is a no-op rather than a panic,
/// since tests may initialize logging more than once across a process.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Logs that a long-running task has started.
pub fn log_task_started(task_name: &str) {
    tracing::debug!(task = task_name, "task started");
}

/// Logs that a long-running task has stopped cleanly.
pub fn log_task_stopped(task_name: &str) {
    tracing::debug!(task = task_name, "task stopped");
}

/// Logs that a long-running task is awaiting cancellation or completion.
pub fn log_task_awaiting(task_name: &str) {
    tracing::debug!(task = task_name, "task awaiting");
}

/// Logs that a long-running task was aborted (killed without draining).
pub fn log_task_aborted(task_name: &str) {
    tracing::warn!(task = task_name, "task aborted");
}

/// Logs that a long-running task exited with an error.
pub fn log_task_error(task_name: &str, error: &(dyn std::error::Error + 'static)) {
    tracing::error!(task = task_name, error = %error, "task error");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }

    #[test]
    fn test_prefixes_are_distinct() {
        let prefixes = [RECV, SEND, CMD, EVT, RECON, RPT];
        for (i, a) in prefixes.iter().enumerate() {
            for b in &prefixes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
