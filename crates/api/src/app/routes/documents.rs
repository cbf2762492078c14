//! Documents: the representative tenant-owned resource.
//!
//! Handlers never see an unscoped store; every read goes through a
//! `ScopedAccessor` built from the authenticated principal.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use sitegate_core::{PageRequest, ProjectId, ResourceId, TenantId};
use sitegate_store::{ScopedAccessor, TenantOwned};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::app::envelope;
use crate::context::{AuditInfo, PrincipalContext};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: ResourceId,
    pub tenant_id: TenantId,
    pub project_id: Option<ProjectId>,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl TenantOwned for Document {
    fn resource_id(&self) -> ResourceId {
        self.id
    }

    fn owner_tenant(&self) -> TenantId {
        self.tenant_id
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub project_id: Option<ProjectId>,
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_documents).post(create_document))
        .route("/:id", get(get_document))
}

/// GET /documents
pub async fn list_documents(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    page: Option<Query<PageRequest>>,
) -> axum::response::Response {
    // Pagination input never fails a list: unparseable params fall back to
    // the defaults, out-of-range values are clamped downstream.
    let page = page.map(|Query(p)| p).unwrap_or_default();
    let scope = ScopedAccessor::for_principal(principal.principal());
    envelope::success_page(scope.list(&services.documents, page))
}

/// GET /documents/:id
///
/// A cross-tenant id and a nonexistent id produce byte-identical outcomes.
pub async fn get_document(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<ResourceId>() else {
        // A malformed id cannot name any resource.
        return ApiError::not_found().into_response();
    };

    let scope = ScopedAccessor::for_principal(principal.principal());
    let mut response = match scope.find(&services.documents, id) {
        Ok(doc) => envelope::success(json!(doc)),
        Err(e) => ApiError::from(e).into_response(),
    };
    response
        .extensions_mut()
        .insert(AuditInfo::entity("document", id.to_string()));
    response
}

/// POST /documents
pub async fn create_document(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<CreateDocumentRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };

    let scope = ScopedAccessor::for_principal(principal.principal());
    let doc = Document {
        id: ResourceId::new(),
        tenant_id: scope.tenant_id(),
        project_id: body.project_id,
        title: body.title,
        created_at: Utc::now(),
    };

    match scope.insert(&services.documents, doc) {
        Ok(doc) => {
            let mut info = AuditInfo::entity("document", doc.id.to_string());
            if let Some(project_id) = doc.project_id {
                info = info.project(project_id);
            }
            let mut response = envelope::success_with_status(StatusCode::CREATED, json!(doc));
            response.extensions_mut().insert(info);
            response
        }
        // Unreachable by construction (the row is built from the scope's
        // own tenant), kept as an explicit internal fault.
        Err(_) => ApiError::internal().into_response(),
    }
}
