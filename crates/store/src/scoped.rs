//! Tenant-scoped resource access.
//!
//! `ScopedAccessor` is a capability: the only way to construct one is from a
//! `Principal`, and every lookup it performs is filtered by that principal's
//! tenant. Resource stores expose no unscoped read path, so querying a table
//! without tenant scoping is a compile error, not a code-review hope.

use std::collections::BTreeMap;
use std::sync::RwLock;

use sitegate_auth::Principal;
use sitegate_core::{DomainError, Page, PageRequest, ResourceId, TenantId};

use crate::error::StoreError;

/// Contract for any tenant-owned entity: every row carries its tenant.
pub trait TenantOwned: Clone {
    fn resource_id(&self) -> ResourceId;
    fn owner_tenant(&self) -> TenantId;
}

/// In-memory resource table.
///
/// Rows are keyed by id in a BTreeMap so list order is deterministic.
/// Reads go through `ScopedAccessor` only.
pub struct ResourceStore<T> {
    rows: RwLock<BTreeMap<ResourceId, T>>,
}

impl<T: TenantOwned> Default for ResourceStore<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T: TenantOwned> ResourceStore<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A tenant-scoped view over resource stores.
///
/// Holds only the tenant id, taken from the principal and never from a
/// client-declared header.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScopedAccessor {
    tenant_id: TenantId,
}

impl ScopedAccessor {
    pub fn for_principal(principal: &Principal) -> Self {
        Self {
            tenant_id: principal.tenant_id,
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Find a row by id within the caller's tenant.
    ///
    /// A row owned by a different tenant answers exactly like a row that
    /// does not exist anywhere. This holds for every caller, including the
    /// most privileged role; there is no bypass parameter.
    pub fn find<T: TenantOwned>(
        &self,
        store: &ResourceStore<T>,
        id: ResourceId,
    ) -> Result<T, DomainError> {
        let rows = store.rows.read().unwrap_or_else(|e| e.into_inner());
        rows.get(&id)
            .filter(|row| row.owner_tenant() == self.tenant_id)
            .cloned()
            .ok_or(DomainError::NotFound)
    }

    /// List rows within the caller's tenant, paginated.
    ///
    /// Caller-supplied filters can narrow this further but can never widen
    /// it: the tenant filter is applied before anything else.
    pub fn list<T: TenantOwned>(&self, store: &ResourceStore<T>, request: PageRequest) -> Page<T> {
        let request = request.clamped();
        let rows = store.rows.read().unwrap_or_else(|e| e.into_inner());

        let owned: Vec<T> = rows
            .values()
            .filter(|row| row.owner_tenant() == self.tenant_id)
            .cloned()
            .collect();

        let total = owned.len() as u64;
        let data: Vec<T> = owned
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.per_page as usize)
            .collect();

        Page::new(data, request, total)
    }

    /// Insert a row. The row must already belong to the caller's tenant;
    /// a scoped accessor cannot write into another tenant.
    pub fn insert<T: TenantOwned>(
        &self,
        store: &ResourceStore<T>,
        row: T,
    ) -> Result<T, StoreError> {
        if row.owner_tenant() != self.tenant_id {
            return Err(StoreError::Invalid(
                "row tenant does not match accessor tenant".to_string(),
            ));
        }
        let mut rows = store.rows.write().unwrap_or_else(|e| e.into_inner());
        rows.insert(row.resource_id(), row.clone());
        Ok(row)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sitegate_auth::{Permission, RoleName};
    use sitegate_core::UserId;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Drawing {
        id: ResourceId,
        tenant_id: TenantId,
        title: String,
    }

    impl TenantOwned for Drawing {
        fn resource_id(&self) -> ResourceId {
            self.id
        }

        fn owner_tenant(&self) -> TenantId {
            self.tenant_id
        }
    }

    fn principal(tenant_id: TenantId, perms: &[&'static str]) -> Principal {
        Principal::new(
            UserId::new(),
            tenant_id,
            vec![RoleName::new("pm")],
            perms.iter().map(|p| Permission::new(*p)),
        )
    }

    fn drawing(tenant_id: TenantId, title: &str) -> Drawing {
        Drawing {
            id: ResourceId::new(),
            tenant_id,
            title: title.to_string(),
        }
    }

    #[test]
    fn cross_tenant_find_is_identical_to_missing() {
        let store = ResourceStore::new();
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();

        let scope_b = ScopedAccessor::for_principal(&principal(tenant_b, &[]));
        let row = scope_b.insert(&store, drawing(tenant_b, "B-001")).unwrap();

        let scope_a = ScopedAccessor::for_principal(&principal(tenant_a, &["document.view"]));
        let cross = scope_a.find(&store, row.id).unwrap_err();
        let missing = scope_a.find(&store, ResourceId::new()).unwrap_err();
        assert_eq!(cross, missing);
        assert_eq!(cross, DomainError::NotFound);
    }

    #[test]
    fn scoping_does_not_depend_on_privilege() {
        let store = ResourceStore::new();
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();

        let scope_b = ScopedAccessor::for_principal(&principal(tenant_b, &[]));
        let row = scope_b.insert(&store, drawing(tenant_b, "B-001")).unwrap();

        // Even a principal holding every permission cannot see across tenants.
        let admin = principal(
            tenant_a,
            &["document.view", "document.create", "admin.manage"],
        );
        let scope_a = ScopedAccessor::for_principal(&admin);
        assert_eq!(scope_a.find(&store, row.id), Err(DomainError::NotFound));
    }

    #[test]
    fn list_never_returns_cross_tenant_rows() {
        let store = ResourceStore::new();
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();

        let scope_a = ScopedAccessor::for_principal(&principal(tenant_a, &[]));
        let scope_b = ScopedAccessor::for_principal(&principal(tenant_b, &[]));
        for i in 0..3 {
            scope_a
                .insert(&store, drawing(tenant_a, &format!("A-{i:03}")))
                .unwrap();
        }
        scope_b.insert(&store, drawing(tenant_b, "B-001")).unwrap();

        let page = scope_a.list(&store, PageRequest::default());
        assert_eq!(page.total, 3);
        assert!(page.data.iter().all(|d| d.tenant_id == tenant_a));
    }

    #[test]
    fn list_paginates_with_envelope_metadata() {
        let store = ResourceStore::new();
        let tenant = TenantId::new();
        let scope = ScopedAccessor::for_principal(&principal(tenant, &[]));
        for i in 0..5 {
            scope
                .insert(&store, drawing(tenant, &format!("A-{i:03}")))
                .unwrap();
        }

        let page = scope.list(&store, PageRequest { page: 2, per_page: 2 });
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.page, 2);
        assert_eq!(page.per_page, 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.last_page, 3);
    }

    #[test]
    fn insert_rejects_foreign_tenant_rows() {
        let store = ResourceStore::new();
        let scope = ScopedAccessor::for_principal(&principal(TenantId::new(), &[]));
        let foreign = drawing(TenantId::new(), "X-001");
        assert!(scope.insert(&store, foreign).is_err());
    }
}
