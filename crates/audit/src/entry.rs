use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use sitegate_core::{ProjectId, TenantId, UserId};

/// One immutable audit record.
///
/// Append-only: the gateway never updates or deletes entries (retention is
/// an external policy). `actor` and `tenant_id` are nullable because
/// rejected authentication attempts are audited too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub actor: Option<UserId>,
    pub tenant_id: Option<TenantId>,
    /// Dot-namespaced action, e.g. `sitegate.document.view`.
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub project_id: Option<ProjectId>,
    pub route: String,
    pub method: String,
    pub status: u16,
    /// Contextual extras. Scrubbed before persistence.
    pub meta: Map<String, Value>,
}

impl AuditEntry {
    pub fn new(action: impl Into<String>, route: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            occurred_at: Utc::now(),
            actor: None,
            tenant_id: None,
            action: action.into(),
            entity_type: None,
            entity_id: None,
            project_id: None,
            route: route.into(),
            method: method.into(),
            status: 0,
            meta: Map::new(),
        }
    }

    pub fn actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn entity(mut self, entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }
}
