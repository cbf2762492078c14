//! The per-request guard pipeline.
//!
//! Order is fixed: authenticate → tenant isolation → permission → handler.
//! Each guard short-circuits the request; whatever the outcome, exactly one
//! audit entry is recorded for every request that reached authentication.
//! The guards a route gets come from the static route table, not from
//! implicit global middleware.

use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use sitegate_audit::AuditEntry;
use sitegate_auth::{authorize, check_declared_tenant, Principal, TenantError};
use sitegate_core::TenantId;

use crate::app::errors::{ApiError, ErrorCode};
use crate::app::services::AppServices;
use crate::context::{AuditInfo, BearerToken, PrincipalContext, TenantContext};
use crate::route_table::{find_spec, RouteSpec};

pub async fn guard_middleware(
    State(services): State<Arc<AppServices>>,
    matched: MatchedPath,
    mut req: Request,
    next: Next,
) -> Response {
    let method = req.method().as_str().to_string();
    let Some(spec) = find_spec(&services.routes, &method, matched.as_str()).cloned() else {
        // A guarded route missing from the table is a config gap: fail closed.
        tracing::error!(%method, path = matched.as_str(), "route not in guard table");
        return ApiError::not_found().into_response();
    };

    if !spec.requires_auth {
        return next.run(req).await;
    }

    let bearer = extract_bearer(req.headers()).map(str::to_string);
    let secrets: Vec<String> = bearer.clone().into_iter().collect();

    let mut entry = AuditEntry::new(spec.action, matched.as_str(), method);

    match run_guards(&services, &spec, bearer.as_deref(), req.headers()) {
        Ok(principal) => {
            entry.actor = Some(principal.user_id);
            entry.tenant_id = Some(principal.tenant_id);

            req.extensions_mut()
                .insert(TenantContext::new(principal.tenant_id));
            if let Some(token) = bearer {
                req.extensions_mut().insert(BearerToken(token));
            }
            req.extensions_mut().insert(PrincipalContext::new(principal));

            let response = next.run(req).await;

            entry.status = response.status().as_u16();
            if let Some(info) = response.extensions().get::<AuditInfo>() {
                if let (Some(t), Some(i)) = (&info.entity_type, &info.entity_id) {
                    entry = entry.entity(t.clone(), i.clone());
                }
                if let Some(project_id) = info.project_id {
                    entry = entry.project(project_id);
                }
                for (key, value) in &info.meta {
                    entry = entry.meta(key.clone(), value.clone());
                }
            }
            services.recorder.record(entry, &secrets).await;
            response
        }
        Err(err) => {
            entry.status = err.status().as_u16();
            if err.code == ErrorCode::TenantInvalid {
                if let Some(declared) = header_str(req.headers(), "x-tenant-id") {
                    entry = entry.meta("declared_tenant", json!(declared));
                }
            }
            services.recorder.record(entry, &secrets).await;
            err.into_response()
        }
    }
}

/// Run the ordered guard chain for one route spec.
fn run_guards(
    services: &AppServices,
    spec: &RouteSpec,
    bearer: Option<&str>,
    headers: &HeaderMap,
) -> Result<Principal, ApiError> {
    // 1. Token authentication. Absent, malformed, unknown, and revoked all
    //    collapse into the same 401.
    let token = bearer.ok_or_else(ApiError::authentication)?;
    let record = services
        .tokens
        .validate(token)
        .ok_or_else(ApiError::authentication)?;
    let principal = services
        .credentials
        .resolve_principal(record.user_id)
        .map_err(|_| ApiError::authentication())?;

    // 2. Tenant isolation: the declared header is compared, never trusted
    //    for scoping.
    if spec.requires_tenant {
        check_declared_tenant(&principal, declared_tenant(headers)?)?;
    }

    // 3. Permission (single code per route, checked against the set
    //    materialized at authentication).
    if let Some(required) = &spec.permission {
        authorize(&principal, required)?;
    }

    Ok(principal)
}

/// Pull the bearer value out of the Authorization header.
///
/// Any malformation yields `None`; the guard maps that to the same 401 as
/// an unknown or revoked token.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Read the declared tenant header.
///
/// Absent is `None` (the guard turns that into a generic 403); present but
/// unparseable can never equal a real tenant, so it is a mismatch.
fn declared_tenant(headers: &HeaderMap) -> Result<Option<TenantId>, TenantError> {
    match header_str(headers, "x-tenant-id") {
        None => Ok(None),
        Some(raw) => raw
            .parse::<TenantId>()
            .map(Some)
            .map_err(|_| TenantError::Mismatch),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
