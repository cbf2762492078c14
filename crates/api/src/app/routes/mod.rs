use axum::{
    routing::{get, post},
    Router,
};

pub mod auth;
pub mod documents;
pub mod system;

/// Router for all authenticated (tenant-scoped) endpoints.
///
/// The guard declarations for these live in `crate::route_table`; adding a
/// route here without a table entry fails closed at runtime and is caught
/// by the table validation tests.
pub fn router() -> Router {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/whoami", get(system::whoami))
        .nest("/documents", documents::router())
}
