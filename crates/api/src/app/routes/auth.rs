//! Login and logout.
//!
//! Login is public (throttle only); logout is a protected route, so the
//! guard pipeline audits it. Login records its own audit entry; it is the
//! one public route that reaches the token authenticator.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Extension},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use sitegate_audit::AuditEntry;
use sitegate_auth::{verify_password, Principal, ThrottleDecision, TokenRecord};
use sitegate_core::TenantId;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::app::envelope;
use crate::context::BearerToken;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub tenant_id: String,
    pub email: String,
    pub password: String,
}

/// POST /auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    // A body that does not parse presents no credentials: no authentication
    // attempt happened, so nothing reaches the audit recorder either.
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };

    let mut entry = AuditEntry::new("sitegate.auth.login", "/auth/login", "POST")
        .meta("email", json!(body.email));
    let mut secrets = vec![body.password.clone()];

    // Throttle by client address before touching credentials. Every attempt
    // counts, successful or not.
    let key = addr.ip().to_string();
    if services.throttle.check_and_count(&key) == ThrottleDecision::Rejected {
        let err = ApiError::throttled();
        entry.status = err.status().as_u16();
        services.recorder.record(entry, &secrets).await;
        return err.into_response();
    }

    match verify_login(&services, &body) {
        Ok((principal, token)) => {
            secrets.push(token.token.clone());
            entry.actor = Some(principal.user_id);
            entry.tenant_id = Some(principal.tenant_id);
            entry.status = 200;
            services.recorder.record(entry, &secrets).await;

            envelope::success(json!({
                "token": token.token,
                "user": {
                    "id": principal.user_id.to_string(),
                    "tenant_id": principal.tenant_id.to_string(),
                    "email": body.email,
                },
                "roles": principal.roles.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
            }))
        }
        Err(err) => {
            entry.status = err.status().as_u16();
            services.recorder.record(entry, &secrets).await;
            err.into_response()
        }
    }
}

/// Verify credentials and issue a token.
///
/// The issued token's tenant comes from the stored user record, not from
/// the request body; the body's tenant only selects which account to look
/// up.
fn verify_login(
    services: &AppServices,
    body: &LoginRequest,
) -> Result<(Principal, TokenRecord), ApiError> {
    let tenant_id: TenantId = body
        .tenant_id
        .parse()
        .map_err(|_| ApiError::authentication())?;

    let user = services
        .credentials
        .find_user_by_email(tenant_id, &body.email)
        .ok_or_else(ApiError::authentication)?;

    if !verify_password(&body.password, &user.password_hash).map_err(ApiError::from)? {
        return Err(ApiError::authentication());
    }

    let token = services.tokens.issue(user.id, user.tenant_id);
    let principal = services
        .credentials
        .resolve_principal(user.id)
        .map_err(|_| ApiError::internal())?;

    Ok((principal, token))
}

/// POST /auth/logout: revoke the presented token.
///
/// After this returns, every request carrying the token gets 401; there is
/// no validity window because validation is a live store lookup.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(token): Extension<BearerToken>,
) -> axum::response::Response {
    services.tokens.revoke(&token.0);
    envelope::success(json!({ "revoked": true }))
}
