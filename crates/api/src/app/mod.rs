//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: store wiring (credentials, tokens, throttle, audit)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `envelope.rs` / `errors.rs`: the two fixed response shapes
//!
//! Guard declarations live in `crate::route_table`; the pipeline that
//! enforces them is `crate::middleware`.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::middleware;

pub mod envelope;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    // Protected routes: the guard pipeline runs authenticate → tenant →
    // permission and audits every outcome.
    let protected = routes::router()
        .layer(axum::middleware::from_fn_with_state(
            services.clone(),
            middleware::guard_middleware,
        ))
        .layer(Extension(services.clone()));

    // Public allowlist: no auth, no tenant header, no RBAC. Login carries
    // its own throttle.
    Router::new()
        .route("/", get(routes::system::root))
        .route("/health", get(routes::system::health))
        .route("/auth/login", post(routes::auth::login))
        .layer(Extension(services))
        .merge(protected)
}
