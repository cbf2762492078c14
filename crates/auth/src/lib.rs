//! `sitegate-auth` — pure authentication/authorization boundary (zero-trust).
//!
//! This crate is intentionally decoupled from HTTP and storage: token and
//! credential persistence live in `sitegate-store`, header extraction in
//! `sitegate-api`. Everything here is deterministic policy.

pub mod authorize;
pub mod error;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod tenant;
pub mod throttle;
pub mod token;

pub use authorize::{authorize, AuthzError};
pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::{Role, RoleName, RoleScope};
pub use tenant::{check_declared_tenant, TenantError};
pub use throttle::{LoginThrottle, SlidingWindowThrottle, ThrottleDecision};
pub use token::{generate_token, TokenRecord, TokenStatus};
