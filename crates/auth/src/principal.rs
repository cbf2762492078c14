use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use sitegate_core::{TenantId, UserId};

use crate::{Permission, RoleName};

/// A fully resolved principal for authorization decisions.
///
/// The effective permission set is materialized once, at authentication time,
/// as the union of permissions across the principal's roles. Authorization
/// checks against it are pure set-membership tests; no store access happens
/// after this object is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub roles: Vec<RoleName>,
    pub permissions: BTreeSet<Permission>,
}

impl Principal {
    pub fn new(
        user_id: UserId,
        tenant_id: TenantId,
        roles: Vec<RoleName>,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        Self {
            user_id,
            tenant_id,
            roles,
            permissions: permissions.into_iter().collect(),
        }
    }

    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }
}
