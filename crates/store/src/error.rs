use thiserror::Error;

/// Store-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Referenced tenant/user/role does not exist.
    #[error("unknown {0}")]
    Unknown(&'static str),

    /// Email already registered within the tenant.
    #[error("email already registered")]
    DuplicateEmail,

    /// System-scoped roles cannot be modified or deleted while assigned.
    #[error("system role '{0}' is immutable while assigned")]
    SystemRoleImmutable(String),

    /// Invalid data handed to the store (e.g. malformed permission code).
    #[error("invalid: {0}")]
    Invalid(String),
}
