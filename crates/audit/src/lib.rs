//! `sitegate-audit` — append-only, tamper-evident audit recording.
//!
//! One entry per request that reached authentication, scrubbed of secrets
//! before it is persisted. A failing or slow sink never fails the
//! user-facing request; it degrades to an operator-visible log line.

pub mod entry;
pub mod recorder;
pub mod scrub;
pub mod sink;

pub use entry::AuditEntry;
pub use recorder::AuditRecorder;
pub use scrub::{scrub_entry, scrub_text, FORBIDDEN_TERMS, REDACTED};
pub use sink::{AuditError, AuditSink, InMemoryAuditSink};
