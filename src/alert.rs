//! Best-effort alerting
//!
//! Jobs hand a plain-text message to an [`AlertSink`]; delivery
//! failures stay inside the sink and never fail the job that raised
//! the alert. The production transport (a chat webhook) lives outside
//! this crate behind the same trait.

use parking_lot::Mutex;
use tracing::warn;

/// Best-effort alert delivery
pub trait AlertSink: Send + Sync {
    /// Deliver a message. Implementations log their own failures and
    /// never propagate them.
    fn send(&self, message: &str);
}

/// Emits alerts to the process log at warn level
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn send(&self, message: &str) {
        warn!(alert = %message, "ALERT");
    }
}

/// Captures alerts in memory; used by tests and local runs
#[derive(Default)]
pub struct CapturingAlertSink {
    messages: Mutex<Vec<String>>,
}

impl CapturingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.messages.lock().len()
    }
}

impl AlertSink for CapturingAlertSink {
    fn send(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
