//! Bearer token store.
//!
//! Validation is always a live lookup: revocation marks the record and every
//! later validation sees it immediately. A revoked token answers exactly
//! like one that never existed.

use std::collections::HashMap;
use std::sync::RwLock;

use sitegate_auth::TokenRecord;
use sitegate_core::{TenantId, UserId};

/// Injected token store interface.
pub trait TokenStore: Send + Sync {
    /// Issue a fresh active token bound to the user and their tenant.
    fn issue(&self, user_id: UserId, tenant_id: TenantId) -> TokenRecord;

    /// Resolve an active token to its user. `None` for unknown *and*
    /// revoked tokens; callers must not be able to tell them apart.
    fn validate(&self, token: &str) -> Option<TokenRecord>;

    /// Revoke a token. Returns `false` if the token was not active.
    fn revoke(&self, token: &str) -> bool;
}

/// In-memory token store (RwLock map, read-after-write consistent).
#[derive(Default)]
pub struct InMemoryTokenStore {
    records: RwLock<HashMap<String, TokenRecord>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn issue(&self, user_id: UserId, tenant_id: TenantId) -> TokenRecord {
        let record = TokenRecord::issue(user_id, tenant_id);
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.insert(record.token.clone(), record.clone());
        record
    }

    fn validate(&self, token: &str) -> Option<TokenRecord> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.get(token).filter(|r| r.is_active()).cloned()
    }

    fn revoke(&self, token: &str) -> bool {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        match records.get_mut(token) {
            Some(record) if record.is_active() => {
                record.revoke();
                true
            }
            _ => false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
