use axum::extract::Extension;
use serde_json::json;

use crate::app::envelope;
use crate::context::{PrincipalContext, TenantContext};

/// GET /: public service info.
pub async fn root() -> axum::response::Response {
    envelope::success(json!({
        "name": "sitegate",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health: public liveness probe.
pub async fn health() -> axum::response::Response {
    envelope::success(json!({ "status": "ok" }))
}

/// GET /whoami: the authenticated principal as the gateway resolved it.
pub async fn whoami(
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let principal = principal.principal();
    envelope::success(json!({
        "user_id": principal.user_id.to_string(),
        "tenant_id": tenant.tenant_id().to_string(),
        "roles": principal.roles.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "permissions": principal
            .permissions
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>(),
    }))
}
