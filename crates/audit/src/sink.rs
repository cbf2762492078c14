use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use crate::entry::AuditEntry;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Port for persisting append-only audit entries.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persist one entry. Must be append-only; implementations never expose
    /// update or delete.
    async fn append(&self, entry: AuditEntry) -> Result<(), AuditError>;
}

/// Reference sink: an in-memory append-only log.
#[derive(Default)]
pub struct InMemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far (test/inspection surface).
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn append(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
        Ok(())
    }
}
