use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Permission;

/// Role identifier used for RBAC.
///
/// Role names are opaque strings at this layer; the credential store owns
/// the mapping from role to granted permissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(Cow<'static, str>);

impl RoleName {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scope tag on a role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleScope {
    /// Shipped with the product; immutable and undeletable while any user
    /// holds the role.
    System,
    /// Tenant-defined role.
    Custom,
    /// Project-level role.
    Project,
}

/// A role definition: name, scope tag, and the permission codes it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: RoleName,
    pub scope: RoleScope,
    pub permissions: BTreeSet<Permission>,
}

impl Role {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        scope: RoleScope,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        Self {
            name: RoleName::new(name),
            scope,
            permissions: permissions.into_iter().collect(),
        }
    }

    pub fn grants(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }
}
