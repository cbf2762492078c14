//! Opaque bearer token model.
//!
//! Tokens are server-side records, not self-describing claims: validation is
//! a store lookup, which is what makes revocation visible immediately to
//! every subsequent request (read-after-write, no "was valid" caching).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use sitegate_core::{TenantId, UserId};

/// Lifecycle of a bearer token.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    Issued,
    Active,
    Revoked,
}

/// A bearer token bound 1:1 to a user at issuance time.
///
/// The tenant is captured from the stored user at issue time, never from the
/// login request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token: String,
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub issued_at: DateTime<Utc>,
    pub status: TokenStatus,
}

impl TokenRecord {
    /// Issue a fresh token for a user. Newly issued tokens are immediately
    /// active.
    pub fn issue(user_id: UserId, tenant_id: TenantId) -> Self {
        Self {
            token: generate_token(),
            user_id,
            tenant_id,
            issued_at: Utc::now(),
            status: TokenStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TokenStatus::Active
    }

    pub fn revoke(&mut self) {
        self.status = TokenStatus::Revoked;
    }
}

/// Generate a cryptographically random opaque bearer token
/// (32 bytes, base64 url-safe without padding).
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
