//! Tenant isolation check for authenticated requests.

use thiserror::Error;

use sitegate_core::TenantId;

use crate::Principal;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TenantError {
    /// No tenant declared on a tenant-scoped route.
    ///
    /// Surfaced as a generic authorization failure (403) so that clients
    /// cannot distinguish "no tenant" from "wrong permission".
    #[error("tenant context missing")]
    Missing,

    /// Declared tenant does not match the principal's tenant. Kept distinct
    /// so operators can alert on cross-tenant probing.
    #[error("tenant mismatch")]
    Mismatch,
}

/// Compare the request's declared tenant against the principal's own tenant.
///
/// The declared value is used for mismatch detection only; all resource
/// scoping downstream uses `principal.tenant_id`, never the header.
pub fn check_declared_tenant(
    principal: &Principal,
    declared: Option<TenantId>,
) -> Result<(), TenantError> {
    match declared {
        None => Err(TenantError::Missing),
        Some(tenant_id) if tenant_id == principal.tenant_id => Ok(()),
        Some(_) => Err(TenantError::Mismatch),
    }
}
