//! Black-box tests: the real router on an ephemeral port, driven over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use sitegate_api::app::routes::documents::Document;
use sitegate_api::app::services::{build_services, AppServices};
use sitegate_audit::InMemoryAuditSink;
use sitegate_auth::{hash_password, Permission, Role, RoleName, RoleScope};
use sitegate_core::{ResourceId, TenantId, UserId};
use sitegate_store::{ScopedAccessor, Tenant, User};

const PASSWORD: &str = "hunter2";

struct Fixture {
    tenant_a: Tenant,
    tenant_b: Tenant,
    pm_a: User,
    doc_a: Document,
    doc_b: Document,
}

struct TestServer {
    base_url: String,
    sink: Arc<InMemoryAuditSink>,
    fixture: Fixture,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let sink = Arc::new(InMemoryAuditSink::new());
        let services = Arc::new(build_services(sink.clone()));
        let fixture = seed(&services);

        let app = sitegate_api::app::build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        Self {
            base_url,
            sink,
            fixture,
            handle,
        }
    }

    async fn login(&self, tenant: TenantId, email: &str, password: &str) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({
                "tenant_id": tenant.to_string(),
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .unwrap()
    }

    async fn login_token(&self, tenant: TenantId, email: &str) -> String {
        let res = self.login(tenant, email, PASSWORD).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn seed(services: &AppServices) -> Fixture {
    let credentials = &services.credentials;

    credentials
        .define_role(Role::new(
            "document_manager",
            RoleScope::Custom,
            [
                Permission::new("document.view"),
                Permission::new("document.create"),
            ],
        ))
        .unwrap();
    credentials
        .define_role(Role::new(
            "finance",
            RoleScope::Custom,
            [Permission::new("template.view")],
        ))
        .unwrap();

    let tenant_a = credentials.create_tenant("Acme Construction");
    let tenant_b = credentials.create_tenant("Borealis Builders");

    let hash = hash_password(PASSWORD).unwrap();
    let pm_a = credentials
        .create_user(
            tenant_a.id,
            "pm@acme.test",
            hash.clone(),
            vec![RoleName::new("document_manager")],
        )
        .unwrap();
    credentials
        .create_user(
            tenant_a.id,
            "finance@acme.test",
            hash.clone(),
            vec![RoleName::new("finance")],
        )
        .unwrap();
    let pm_b = credentials
        .create_user(
            tenant_b.id,
            "pm@borealis.test",
            hash,
            vec![RoleName::new("document_manager")],
        )
        .unwrap();

    let doc_a = insert_document(services, pm_a.id, "A-drawing-001");
    let doc_b = insert_document(services, pm_b.id, "B-drawing-001");

    Fixture {
        tenant_a,
        tenant_b,
        pm_a,
        doc_a,
        doc_b,
    }
}

fn insert_document(services: &AppServices, owner: UserId, title: &str) -> Document {
    let principal = services.credentials.resolve_principal(owner).unwrap();
    let scope = ScopedAccessor::for_principal(&principal);
    scope
        .insert(
            &services.documents,
            Document {
                id: ResourceId::new(),
                tenant_id: principal.tenant_id,
                project_id: None,
                title: title.to_string(),
                created_at: chrono::Utc::now(),
            },
        )
        .unwrap()
}

async fn error_code(res: reqwest::Response) -> String {
    let body: Value = res.json().await.unwrap();
    body["error"]["code"].as_str().unwrap().to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Guard ladder
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn absent_token_yields_401() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .get(format!("{}/documents", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(res).await, "E401.AUTHENTICATION");
}

#[tokio::test]
async fn wrong_tenant_header_yields_tenant_invalid() {
    let srv = TestServer::spawn().await;
    let token = srv
        .login_token(srv.fixture.tenant_a.id, "pm@acme.test")
        .await;

    let res = reqwest::Client::new()
        .get(format!("{}/documents", srv.base_url))
        .bearer_auth(&token)
        .header("X-Tenant-ID", srv.fixture.tenant_b.id.to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_code(res).await, "TENANT_INVALID");
}

#[tokio::test]
async fn missing_tenant_header_yields_generic_403() {
    let srv = TestServer::spawn().await;
    let token = srv
        .login_token(srv.fixture.tenant_a.id, "pm@acme.test")
        .await;

    let res = reqwest::Client::new()
        .get(format!("{}/documents", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    // Deliberately not distinguishable from a permission failure.
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_code(res).await, "E403.AUTHORIZATION");
}

#[tokio::test]
async fn missing_permission_yields_403() {
    let srv = TestServer::spawn().await;
    let token = srv
        .login_token(srv.fixture.tenant_a.id, "finance@acme.test")
        .await;

    let res = reqwest::Client::new()
        .get(format!("{}/documents", srv.base_url))
        .bearer_auth(&token)
        .header("X-Tenant-ID", srv.fixture.tenant_a.id.to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_code(res).await, "E403.AUTHORIZATION");
}

#[tokio::test]
async fn full_guard_chain_reaches_handler() {
    let srv = TestServer::spawn().await;
    let token = srv
        .login_token(srv.fixture.tenant_a.id, "pm@acme.test")
        .await;

    let res = reqwest::Client::new()
        .get(format!("{}/documents", srv.base_url))
        .bearer_auth(&token)
        .header("X-Tenant-ID", srv.fixture.tenant_a.id.to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();

    // Fixed success envelope.
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["status"], json!("success"));
    assert_eq!(body["status_text"], json!("success"));

    // List data is an array, pagination fields are integers.
    let data = body["data"].as_array().unwrap();
    let pagination = &body["meta"]["pagination"];
    for field in ["page", "per_page", "total", "last_page"] {
        assert!(pagination[field].is_u64(), "{field} must be an integer");
    }

    // Only tenant A rows, ever.
    let tenant_a = srv.fixture.tenant_a.id.to_string();
    assert!(!data.is_empty());
    for row in data {
        assert_eq!(row["tenant_id"].as_str().unwrap(), tenant_a);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tenant isolation on resources
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cross_tenant_id_is_indistinguishable_from_missing() {
    let srv = TestServer::spawn().await;
    let token = srv
        .login_token(srv.fixture.tenant_a.id, "pm@acme.test")
        .await;
    let client = reqwest::Client::new();

    let get = |id: String| {
        client
            .get(format!("{}/documents/{}", srv.base_url, id))
            .bearer_auth(&token)
            .header("X-Tenant-ID", srv.fixture.tenant_a.id.to_string())
            .send()
    };

    let cross = get(srv.fixture.doc_b.id.to_string()).await.unwrap();
    let missing = get(ResourceId::new().to_string()).await.unwrap();

    assert_eq!(cross.status(), StatusCode::NOT_FOUND);
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(cross).await, "E404.NOT_FOUND");
    assert_eq!(error_code(missing).await, "E404.NOT_FOUND");

    // Own-tenant id still resolves.
    let own = get(srv.fixture.doc_a.id.to_string()).await.unwrap();
    assert_eq!(own.status(), StatusCode::OK);
}

// ─────────────────────────────────────────────────────────────────────────────
// Login, throttle, logout
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_issues_token_and_audits() {
    let srv = TestServer::spawn().await;

    let res = srv
        .login(srv.fixture.tenant_a.id, "pm@acme.test", PASSWORD)
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    let token = body["data"]["token"].as_str().unwrap();
    assert!(!token.is_empty());
    assert_eq!(
        body["data"]["user"]["id"].as_str().unwrap(),
        srv.fixture.pm_a.id.to_string()
    );

    let entries = srv.sink.entries();
    let login_entry = entries
        .iter()
        .find(|e| e.action == "sitegate.auth.login" && e.status == 200)
        .expect("login must be audited");
    assert_eq!(login_entry.actor, Some(srv.fixture.pm_a.id));
}

#[tokio::test]
async fn login_tenant_comes_from_stored_user() {
    let srv = TestServer::spawn().await;
    // Logging in against tenant B with tenant A's email finds no account.
    let res = srv
        .login(srv.fixture.tenant_b.id, "pm@acme.test", PASSWORD)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_throttle_kicks_in_within_window() {
    let srv = TestServer::spawn().await;
    let tenant = srv.fixture.tenant_a.id;

    // Default budget: 5 attempts / 60s, keyed by client address. The first
    // attempt from a fresh key must never be throttled.
    let first = srv.login(tenant, "pm@acme.test", "wrong").await;
    assert_eq!(first.status(), StatusCode::UNAUTHORIZED);

    for _ in 0..3 {
        let res = srv.login(tenant, "pm@acme.test", "wrong").await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    // Attempt 5 succeeds and still counts against the budget.
    let fifth = srv.login(tenant, "pm@acme.test", PASSWORD).await;
    assert_eq!(fifth.status(), StatusCode::OK);

    let sixth = srv.login(tenant, "pm@acme.test", PASSWORD).await;
    assert_eq!(sixth.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(error_code(sixth).await, "429");
}

#[tokio::test]
async fn logout_invalidates_token_immediately() {
    let srv = TestServer::spawn().await;
    let tenant = srv.fixture.tenant_a.id;
    let token = srv.login_token(tenant, "pm@acme.test").await;
    let client = reqwest::Client::new();

    let whoami = |token: String| {
        client
            .get(format!("{}/whoami", srv.base_url))
            .bearer_auth(token)
            .header("X-Tenant-ID", tenant.to_string())
            .send()
    };

    assert_eq!(whoami(token.clone()).await.unwrap().status(), StatusCode::OK);

    let res = client
        .post(format!("{}/auth/logout", srv.base_url))
        .bearer_auth(&token)
        .header("X-Tenant-ID", tenant.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // No validity window: every subsequent call fails, including a repeat
    // logout with the same token.
    let after = whoami(token.clone()).await.unwrap();
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(after).await, "E401.AUTHENTICATION");

    let relogout = client
        .post(format!("{}/auth/logout", srv.base_url))
        .bearer_auth(&token)
        .header("X-Tenant-ID", tenant.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(relogout.status(), StatusCode::UNAUTHORIZED);
}

// ─────────────────────────────────────────────────────────────────────────────
// Audit trail
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn audit_entries_never_contain_secrets() {
    let srv = TestServer::spawn().await;
    let tenant = srv.fixture.tenant_a.id;
    let token = srv.login_token(tenant, "pm@acme.test").await;
    let client = reqwest::Client::new();

    client
        .get(format!("{}/documents", srv.base_url))
        .bearer_auth(&token)
        .header("X-Tenant-ID", tenant.to_string())
        .send()
        .await
        .unwrap();
    // A rejected attempt is audited too.
    client
        .get(format!("{}/documents", srv.base_url))
        .bearer_auth("forged-credential")
        .send()
        .await
        .unwrap();

    let entries = srv.sink.entries();
    assert!(!entries.is_empty());
    for entry in &entries {
        let serialized = serde_json::to_string(entry).unwrap();
        let lowered = serialized.to_ascii_lowercase();
        assert!(!serialized.contains(&token), "raw bearer value persisted");
        assert!(!serialized.contains(PASSWORD), "password persisted");
        for term in ["password", "token", "authorization", "bearer"] {
            assert!(!lowered.contains(term), "'{term}' in audit entry");
        }
    }
}

#[tokio::test]
async fn exactly_one_entry_per_authenticated_request() {
    let srv = TestServer::spawn().await;
    let tenant = srv.fixture.tenant_a.id;
    let token = srv.login_token(tenant, "pm@acme.test").await; // entry 1
    let client = reqwest::Client::new();

    client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .header("X-Tenant-ID", tenant.to_string())
        .send()
        .await
        .unwrap(); // entry 2
    client
        .get(format!("{}/documents", srv.base_url))
        .send()
        .await
        .unwrap(); // entry 3 (rejected auth)
    client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap(); // public: never reaches the authenticator, no entry

    assert_eq!(srv.sink.entries().len(), 3);
}

#[tokio::test]
async fn create_document_audits_entity() {
    let srv = TestServer::spawn().await;
    let tenant = srv.fixture.tenant_a.id;
    let token = srv.login_token(tenant, "pm@acme.test").await;

    let res = reqwest::Client::new()
        .post(format!("{}/documents", srv.base_url))
        .bearer_auth(&token)
        .header("X-Tenant-ID", tenant.to_string())
        .json(&json!({ "title": "Structural calcs rev B" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let entries = srv.sink.entries();
    let entry = entries
        .iter()
        .find(|e| e.action == "sitegate.document.create")
        .expect("create must be audited");
    assert_eq!(entry.status, 201);
    assert_eq!(entry.entity_type.as_deref(), Some("document"));
    assert_eq!(entry.entity_id.as_deref(), Some(id.as_str()));
    assert_eq!(entry.tenant_id, Some(tenant));
}

// ─────────────────────────────────────────────────────────────────────────────
// Envelope coverage of extractor failures
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_body_is_still_enveloped() {
    let srv = TestServer::spawn().await;

    let res = reqwest::Client::new()
        .post(format!("{}/auth/login", srv.base_url))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["code"], json!("E500.INTERNAL"));
    assert!(body["error"]["id"].is_string());
    assert!(body["error"]["message"].is_string());

    // No credentials were presented, so nothing reached the recorder.
    assert!(srv.sink.entries().is_empty());
}

#[tokio::test]
async fn unparseable_pagination_falls_back_to_defaults() {
    let srv = TestServer::spawn().await;
    let token = srv
        .login_token(srv.fixture.tenant_a.id, "pm@acme.test")
        .await;

    let res = reqwest::Client::new()
        .get(format!("{}/documents?page=abc&per_page=-3", srv.base_url))
        .bearer_auth(&token)
        .header("X-Tenant-ID", srv.fixture.tenant_a.id.to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["meta"]["pagination"]["page"], json!(1));
    assert!(body["data"].is_array());
}

// ─────────────────────────────────────────────────────────────────────────────
// Public allowlist
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn public_routes_need_no_auth_or_tenant() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for path in ["/", "/health"] {
        let res = client
            .get(format!("{}{}", srv.base_url, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["success"], json!(true), "{path}");
    }
}
