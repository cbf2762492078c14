//! The audit recorder: scrub, then append with a bounded timeout.

use std::sync::Arc;
use std::time::Duration;

use crate::entry::AuditEntry;
use crate::scrub::scrub_entry;
use crate::sink::AuditSink;

/// Records one entry per gateway request.
///
/// `record` never propagates an error into the request path: sink failures
/// and timeouts degrade to a `tracing` warning so the user-facing response
/// is unaffected but operators can still see the gap.
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
    timeout: Duration,
}

pub const DEFAULT_SINK_TIMEOUT: Duration = Duration::from_millis(500);

impl AuditRecorder {
    pub fn new(sink: Arc<dyn AuditSink>, timeout: Duration) -> Self {
        Self { sink, timeout }
    }

    pub fn with_default_timeout(sink: Arc<dyn AuditSink>) -> Self {
        Self::new(sink, DEFAULT_SINK_TIMEOUT)
    }

    /// Scrub and append an entry.
    ///
    /// `secrets` carries request-specific raw values (the presented bearer
    /// token) that must not survive into the persisted record.
    pub async fn record(&self, entry: AuditEntry, secrets: &[String]) {
        let entry = scrub_entry(entry, secrets);
        let action = entry.action.clone();

        match tokio::time::timeout(self.timeout, self.sink.append(entry)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(%action, error = %e, "audit append failed; request proceeds");
            }
            Err(_) => {
                tracing::warn!(%action, timeout_ms = self.timeout.as_millis() as u64,
                    "audit sink timed out; request proceeds");
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
