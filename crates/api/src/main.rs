use std::net::SocketAddr;
use std::sync::Arc;

use sitegate_api::app::{build_app, services::build_services};
use sitegate_audit::InMemoryAuditSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sitegate_observability::init();

    let addr = std::env::var("SITEGATE_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    // Reference sink; a durable sink slots in behind the same trait.
    let sink = Arc::new(InMemoryAuditSink::new());
    let services = Arc::new(build_services(sink));
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
