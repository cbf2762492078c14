use thiserror::Error;

/// Authentication-layer error.
///
/// Missing, malformed, unknown, and revoked tokens all collapse into
/// `Unauthenticated` so they are externally indistinguishable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Bearer token absent, malformed, unknown, or revoked.
    #[error("authentication required")]
    Unauthenticated,

    /// Login credentials did not match a stored user.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Login attempt budget exceeded for this client key.
    #[error("too many login attempts")]
    Throttled,

    /// Crypto-level failure (malformed stored hash, etc).
    #[error("crypto error: {0}")]
    Crypto(String),
}
