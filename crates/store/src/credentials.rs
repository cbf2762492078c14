//! Credential store: tenants, users, roles, and the permission catalog.
//!
//! Consumed read-only by the gateway; account provisioning writes through
//! the same API. The reference implementation is an in-memory RwLock map;
//! all reads observe completed writes immediately.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use sitegate_auth::{Permission, Principal, Role, RoleName, RoleScope};
use sitegate_core::{TenantId, UserId};

use crate::error::StoreError;

/// Root of the isolation boundary. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
}

/// A stored user account.
///
/// The tenant reference is set at creation and never reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<RoleName>,
}

#[derive(Default)]
struct Inner {
    tenants: HashMap<TenantId, Tenant>,
    users: HashMap<UserId, User>,
    roles: HashMap<RoleName, Role>,
    /// Permission catalog keyed by code. The stored name always equals the
    /// code, which is what makes seeding idempotent and re-runnable.
    permissions: BTreeMap<String, String>,
}

/// In-memory credential store.
#[derive(Default)]
pub struct CredentialStore {
    inner: RwLock<Inner>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tenants and users (provisioning surface)
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_tenant(&self, name: impl Into<String>) -> Tenant {
        let tenant = Tenant {
            id: TenantId::new(),
            name: name.into(),
        };
        let mut inner = self.write();
        inner.tenants.insert(tenant.id, tenant.clone());
        tenant
    }

    pub fn create_user(
        &self,
        tenant_id: TenantId,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        roles: Vec<RoleName>,
    ) -> Result<User, StoreError> {
        let email = email.into();
        let mut inner = self.write();

        if !inner.tenants.contains_key(&tenant_id) {
            return Err(StoreError::Unknown("tenant"));
        }
        if inner
            .users
            .values()
            .any(|u| u.tenant_id == tenant_id && u.email == email)
        {
            return Err(StoreError::DuplicateEmail);
        }
        for role in &roles {
            if !inner.roles.contains_key(role) {
                return Err(StoreError::Unknown("role"));
            }
        }

        let user = User {
            id: UserId::new(),
            tenant_id,
            email,
            password_hash: password_hash.into(),
            roles,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn find_user(&self, user_id: UserId) -> Option<User> {
        self.read().users.get(&user_id).cloned()
    }

    pub fn find_user_by_email(&self, tenant_id: TenantId, email: &str) -> Option<User> {
        self.read()
            .users
            .values()
            .find(|u| u.tenant_id == tenant_id && u.email == email)
            .cloned()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Roles
    // ─────────────────────────────────────────────────────────────────────

    /// Define or replace a role.
    ///
    /// A system-scoped role cannot be redefined while any user holds it.
    pub fn define_role(&self, role: Role) -> Result<(), StoreError> {
        let mut inner = self.write();
        if let Some(existing) = inner.roles.get(&role.name) {
            if existing.scope == RoleScope::System && assigned(&inner, &role.name) {
                return Err(StoreError::SystemRoleImmutable(role.name.to_string()));
            }
        }
        inner.roles.insert(role.name.clone(), role);
        Ok(())
    }

    /// Delete a role. System-scoped roles are undeletable while assigned.
    pub fn delete_role(&self, name: &RoleName) -> Result<(), StoreError> {
        let mut inner = self.write();
        let role = inner.roles.get(name).ok_or(StoreError::Unknown("role"))?;
        if role.scope == RoleScope::System && assigned(&inner, name) {
            return Err(StoreError::SystemRoleImmutable(name.to_string()));
        }
        inner.roles.remove(name);
        Ok(())
    }

    pub fn assign_role(&self, user_id: UserId, role: RoleName) -> Result<(), StoreError> {
        let mut inner = self.write();
        if !inner.roles.contains_key(&role) {
            return Err(StoreError::Unknown("role"));
        }
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or(StoreError::Unknown("user"))?;
        if !user.roles.contains(&role) {
            user.roles.push(role);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Permission catalog
    // ─────────────────────────────────────────────────────────────────────

    /// Seed the canonical permission catalog.
    ///
    /// Idempotent: codes already present are left untouched, so re-running a
    /// seed produces no duplicates. Every stored name equals its code.
    /// Returns the number of newly inserted codes.
    pub fn seed_permissions(&self, codes: &[&str]) -> Result<usize, StoreError> {
        let mut parsed = Vec::with_capacity(codes.len());
        for code in codes {
            let permission =
                Permission::parse(code).map_err(|e| StoreError::Invalid(e.to_string()))?;
            parsed.push(permission);
        }

        let mut inner = self.write();
        let mut inserted = 0;
        for permission in parsed {
            let code = permission.as_str().to_string();
            if !inner.permissions.contains_key(&code) {
                inner.permissions.insert(code.clone(), code);
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    /// The seeded catalog as (code, name) pairs, sorted by code.
    pub fn permission_catalog(&self) -> Vec<(String, String)> {
        self.read()
            .permissions
            .iter()
            .map(|(code, name)| (code.clone(), name.clone()))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Principal resolution
    // ─────────────────────────────────────────────────────────────────────

    /// Materialize a principal: union of permission codes across the user's
    /// roles, computed once at authentication time.
    pub fn resolve_principal(&self, user_id: UserId) -> Result<Principal, StoreError> {
        let inner = self.read();
        let user = inner
            .users
            .get(&user_id)
            .ok_or(StoreError::Unknown("user"))?;

        let mut permissions: BTreeSet<Permission> = BTreeSet::new();
        for role_name in &user.roles {
            if let Some(role) = inner.roles.get(role_name) {
                permissions.extend(role.permissions.iter().cloned());
            }
        }

        Ok(Principal::new(
            user.id,
            user.tenant_id,
            user.roles.clone(),
            permissions,
        ))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn assigned(inner: &Inner, role: &RoleName) -> bool {
    inner.users.values().any(|u| u.roles.contains(role))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_roles() -> CredentialStore {
        let store = CredentialStore::new();
        store
            .define_role(Role::new(
                "site_engineer",
                RoleScope::System,
                [Permission::new("rfi.view"), Permission::new("rfi.create")],
            ))
            .unwrap();
        store
            .define_role(Role::new(
                "qc_inspector",
                RoleScope::Custom,
                [Permission::new("inspection.view")],
            ))
            .unwrap();
        store
    }

    #[test]
    fn seeding_twice_produces_no_duplicates() {
        let store = CredentialStore::new();
        let catalog = ["rfi.view", "rfi.create", "document.view"];

        assert_eq!(store.seed_permissions(&catalog).unwrap(), 3);
        assert_eq!(store.seed_permissions(&catalog).unwrap(), 0);

        let seeded = store.permission_catalog();
        assert_eq!(seeded.len(), 3);
        for (code, name) in seeded {
            assert_eq!(code, name);
        }
    }

    #[test]
    fn seeding_rejects_malformed_codes() {
        let store = CredentialStore::new();
        assert!(store.seed_permissions(&["not-a-code"]).is_err());
    }

    #[test]
    fn resolve_principal_unions_role_permissions() {
        let store = store_with_roles();
        let tenant = store.create_tenant("Acme Construction");
        let user = store
            .create_user(
                tenant.id,
                "eng@acme.test",
                "hash",
                vec![RoleName::new("site_engineer"), RoleName::new("qc_inspector")],
            )
            .unwrap();

        let principal = store.resolve_principal(user.id).unwrap();
        assert_eq!(principal.tenant_id, tenant.id);
        assert!(principal.has_permission(&Permission::new("rfi.view")));
        assert!(principal.has_permission(&Permission::new("inspection.view")));
        assert!(!principal.has_permission(&Permission::new("document.view")));
    }

    #[test]
    fn system_role_is_immutable_while_assigned() {
        let store = store_with_roles();
        let tenant = store.create_tenant("Acme");
        store
            .create_user(
                tenant.id,
                "eng@acme.test",
                "hash",
                vec![RoleName::new("site_engineer")],
            )
            .unwrap();

        let redefined = Role::new("site_engineer", RoleScope::System, []);
        assert!(matches!(
            store.define_role(redefined),
            Err(StoreError::SystemRoleImmutable(_))
        ));
        assert!(matches!(
            store.delete_role(&RoleName::new("site_engineer")),
            Err(StoreError::SystemRoleImmutable(_))
        ));

        // Custom roles stay mutable even while assigned.
        store
            .create_user(
                tenant.id,
                "qc@acme.test",
                "hash",
                vec![RoleName::new("qc_inspector")],
            )
            .unwrap();
        assert!(store
            .define_role(Role::new("qc_inspector", RoleScope::Custom, []))
            .is_ok());
    }

    #[test]
    fn duplicate_email_rejected_within_tenant_only() {
        let store = store_with_roles();
        let a = store.create_tenant("A");
        let b = store.create_tenant("B");

        store.create_user(a.id, "pm@site.test", "hash", vec![]).unwrap();
        assert_eq!(
            store
                .create_user(a.id, "pm@site.test", "hash", vec![])
                .unwrap_err(),
            StoreError::DuplicateEmail
        );
        assert!(store.create_user(b.id, "pm@site.test", "hash", vec![]).is_ok());
    }
}
