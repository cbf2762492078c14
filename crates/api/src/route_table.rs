//! Static route guard declarations.
//!
//! Each route's guard list is data, not middleware wiring: the table below
//! is what the gateway enforces at runtime *and* what `validate` checks
//! without running the server. A route declares at most one permission code
//! by construction; mixing the generic authenticated-RBAC marker with an
//! explicit code is a configuration defect `validate` rejects.

use thiserror::Error;

use sitegate_auth::Permission;

/// Guard declaration for one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    pub method: &'static str,
    /// Axum route pattern, e.g. `/documents/:id`.
    pub path: &'static str,
    /// Dot-namespaced audit action for requests on this route.
    pub action: &'static str,
    pub requires_auth: bool,
    pub requires_tenant: bool,
    /// The single required permission code, if any.
    pub permission: Option<Permission>,
    /// Authenticated route whose RBAC is deliberately generic (any
    /// authenticated principal). Mutually exclusive with `permission`.
    pub generic_rbac: bool,
    /// Named throttle applied before the handler (public routes only).
    pub throttle: Option<&'static str>,
}

impl RouteSpec {
    fn public(method: &'static str, path: &'static str, action: &'static str) -> Self {
        Self {
            method,
            path,
            action,
            requires_auth: false,
            requires_tenant: false,
            permission: None,
            generic_rbac: false,
            throttle: None,
        }
    }

    fn protected(
        method: &'static str,
        path: &'static str,
        action: &'static str,
        permission: &'static str,
    ) -> Self {
        Self {
            method,
            path,
            action,
            requires_auth: true,
            requires_tenant: true,
            permission: Some(Permission::new(permission)),
            generic_rbac: false,
            throttle: None,
        }
    }

    fn authenticated(method: &'static str, path: &'static str, action: &'static str) -> Self {
        Self {
            method,
            path,
            action,
            requires_auth: true,
            requires_tenant: true,
            permission: None,
            generic_rbac: true,
            throttle: None,
        }
    }

    fn with_throttle(mut self, name: &'static str) -> Self {
        self.throttle = Some(name);
        self
    }
}

/// The gateway's full route table.
pub fn route_table() -> Vec<RouteSpec> {
    vec![
        RouteSpec::public("GET", "/", "sitegate.system.info"),
        RouteSpec::public("GET", "/health", "sitegate.system.health"),
        RouteSpec::public("POST", "/auth/login", "sitegate.auth.login").with_throttle("login"),
        RouteSpec::authenticated("POST", "/auth/logout", "sitegate.auth.logout"),
        RouteSpec::authenticated("GET", "/whoami", "sitegate.auth.whoami"),
        RouteSpec::protected("GET", "/documents", "sitegate.document.list", "document.view"),
        RouteSpec::protected("GET", "/documents/:id", "sitegate.document.view", "document.view"),
        RouteSpec::protected("POST", "/documents", "sitegate.document.create", "document.create"),
    ]
}

/// Look up the spec for a matched route.
pub fn find_spec<'a>(specs: &'a [RouteSpec], method: &str, path: &str) -> Option<&'a RouteSpec> {
    specs.iter().find(|s| s.method == method && s.path == path)
}

/// Configuration defects detectable without running the server.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteConfigError {
    #[error("{method} {path}: public route must not carry auth/tenant/permission guards")]
    PublicRouteGuarded { method: String, path: String },

    #[error("{method} {path}: generic RBAC marker mixed with explicit permission")]
    MixedRbac { method: String, path: String },

    #[error("{method} {path}: tenant isolation requires authentication")]
    TenantWithoutAuth { method: String, path: String },

    #[error("{method} {path}: registered more than once")]
    Duplicate { method: String, path: String },
}

/// Validate a route table. Returns every defect found.
pub fn validate(specs: &[RouteSpec]) -> Result<(), Vec<RouteConfigError>> {
    let mut errors = Vec::new();

    for (i, spec) in specs.iter().enumerate() {
        let method = spec.method.to_string();
        let path = spec.path.to_string();

        if !spec.requires_auth
            && (spec.requires_tenant || spec.permission.is_some() || spec.generic_rbac)
        {
            errors.push(RouteConfigError::PublicRouteGuarded {
                method: method.clone(),
                path: path.clone(),
            });
        }

        if spec.generic_rbac && spec.permission.is_some() {
            errors.push(RouteConfigError::MixedRbac {
                method: method.clone(),
                path: path.clone(),
            });
        }

        if spec.requires_tenant && !spec.requires_auth {
            errors.push(RouteConfigError::TenantWithoutAuth {
                method: method.clone(),
                path: path.clone(),
            });
        }

        if specs[..i]
            .iter()
            .any(|other| other.method == spec.method && other.path == spec.path)
        {
            errors.push(RouteConfigError::Duplicate { method, path });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
