use serde_json::{Map, Value};

use sitegate_auth::Principal;
use sitegate_core::{ProjectId, TenantId};

/// Tenant context for a request.
///
/// Always the *principal's* tenant. The declared `X-Tenant-ID` header is
/// checked for mismatch and then discarded; it never scopes anything.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: TenantId,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// Principal context for a request (authenticated identity, resolved roles,
/// materialized permission set).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}

/// The raw bearer token presented on this request.
///
/// Carried so the logout handler can revoke it and the audit layer can
/// scrub it; never logged or persisted verbatim.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Audit context a handler can attach to its response (via response
/// extensions) so the gateway's single audit entry carries entity detail.
#[derive(Debug, Clone, Default)]
pub struct AuditInfo {
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub project_id: Option<ProjectId>,
    pub meta: Map<String, Value>,
}

impl AuditInfo {
    pub fn entity(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type: Some(entity_type.into()),
            entity_id: Some(entity_id.into()),
            ..Self::default()
        }
    }

    pub fn project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }
}
