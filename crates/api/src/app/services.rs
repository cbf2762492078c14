//! Service wiring: the injected stores the gateway runs against.

use std::sync::Arc;

use sitegate_audit::{AuditRecorder, AuditSink};
use sitegate_auth::{LoginThrottle, SlidingWindowThrottle};
use sitegate_store::{CredentialStore, InMemoryTokenStore, ResourceStore, TokenStore};

use crate::app::routes::documents::Document;
use crate::route_table::{route_table, validate, RouteSpec};

/// Canonical permission catalog, seeded idempotently at boot.
///
/// Codes are `module.action`; each stored name equals its code.
pub const PERMISSION_CATALOG: &[&str] = &[
    "document.view",
    "document.create",
    "rfi.view",
    "rfi.create",
    "submittal.view",
    "submittal.create",
    "inspection.view",
    "inspection.create",
    "template.view",
    "template.manage",
    "user.view",
    "user.manage",
];

/// Everything a request handler or guard needs, behind one `Arc`.
pub struct AppServices {
    pub credentials: Arc<CredentialStore>,
    pub tokens: Arc<dyn TokenStore>,
    pub throttle: Arc<dyn LoginThrottle>,
    pub recorder: AuditRecorder,
    pub documents: ResourceStore<Document>,
    pub routes: Vec<RouteSpec>,
}

/// Build services with the default login throttle.
pub fn build_services(sink: Arc<dyn AuditSink>) -> AppServices {
    build_services_with(sink, Arc::new(SlidingWindowThrottle::default()))
}

/// Build services with an explicit throttle (tests tighten the budget).
pub fn build_services_with(
    sink: Arc<dyn AuditSink>,
    throttle: Arc<dyn LoginThrottle>,
) -> AppServices {
    let routes = route_table();
    validate(&routes).expect("route table has configuration defects");

    let credentials = Arc::new(CredentialStore::new());
    credentials
        .seed_permissions(PERMISSION_CATALOG)
        .expect("canonical permission catalog is well-formed");

    AppServices {
        credentials,
        tokens: Arc::new(InMemoryTokenStore::new()),
        throttle,
        recorder: AuditRecorder::with_default_timeout(sink),
        documents: ResourceStore::new(),
        routes,
    }
}
