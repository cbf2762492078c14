//! `sitegate-store` — injected, interface-abstracted stores.
//!
//! The gateway logic never depends on a concrete backend: credentials,
//! tokens, and resources sit behind small traits with in-memory reference
//! implementations (RwLock-based, read-after-write consistent). Swapping in
//! a durable backend changes nothing above this crate.

pub mod credentials;
pub mod error;
pub mod scoped;
pub mod tokens;

pub use credentials::{CredentialStore, Tenant, User};
pub use error::StoreError;
pub use scoped::{ResourceStore, ScopedAccessor, TenantOwned};
pub use tokens::{InMemoryTokenStore, TokenStore};
