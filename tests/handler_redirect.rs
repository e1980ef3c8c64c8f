mod common;

use axum::{Extension, Router, extract::ConnectInfo, routing::get};
use axum_test::TestServer;
use golinks::api::handlers::redirect_handler;
use golinks::api::middleware::identity::CurrentUser;
use golinks::domain::click_event::{MAX_REFERRER_LEN, MAX_USER_AGENT_LEN};
use golinks::domain::click_worker::Drain;
use golinks::domain::repositories::ClickRepository;
use golinks::infrastructure::persistence::SqlClickRepository;
use golinks::state::AppState;
use golinks::utils::ip_hash::IpHasher;
use std::net::SocketAddr;
use std::time::Duration;
use tower::Layer;

#[derive(Clone)]
struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

fn redirect_app(state: AppState) -> Router {
    Router::new()
        .route("/{slug}", get(redirect_handler))
        .layer(MockConnectInfoLayer)
        .with_state(state)
}

#[tokio::test]
async fn test_redirect_success_records_click() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane").await;
    let link = common::create_test_link(&t.db, "docs", "https://example.com/target", owner.id).await;

    let (state, worker, shutdown_tx) = common::create_test_state(&t.db);
    let server = TestServer::new(redirect_app(state)).unwrap();

    let response = server
        .get("/docs")
        .add_header("User-Agent", "test-agent")
        .add_header("Referer", "https://intranet.example.com/")
        .await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://example.com/target");

    shutdown_tx.send(true).unwrap();
    let Drain::Drained(stats) = worker.join(Duration::from_secs(5)).await else {
        panic!("worker did not drain");
    };
    assert_eq!(stats.persisted, 1);

    let clicks = SqlClickRepository::new(&t.db)
        .recent_for_link(link.id, 10)
        .await
        .unwrap();
    assert_eq!(clicks.len(), 1);

    let expected_hash = IpHasher::new(common::TEST_IP_SECRET).hash("127.0.0.1".parse().unwrap());
    assert_eq!(clicks[0].ip_hash.as_deref(), Some(expected_hash.as_str()));
    assert_eq!(clicks[0].user_agent.as_deref(), Some("test-agent"));
    assert_eq!(
        clicks[0].referrer.as_deref(),
        Some("https://intranet.example.com/")
    );
    assert_eq!(clicks[0].user_id, None);
}

#[tokio::test]
async fn test_redirect_clips_oversized_headers_to_column_widths() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane").await;
    let link = common::create_test_link(&t.db, "docs", "https://example.com/target", owner.id).await;

    let (state, worker, shutdown_tx) = common::create_test_state(&t.db);
    let server = TestServer::new(redirect_app(state)).unwrap();

    let agent = "a".repeat(5000);
    let referrer = format!("https://intranet.example.com/{}", "r".repeat(5000));
    let response = server
        .get("/docs")
        .add_header("User-Agent", agent.as_str())
        .add_header("Referer", referrer.as_str())
        .await;
    assert_eq!(response.status_code(), 307);

    shutdown_tx.send(true).unwrap();
    let Drain::Drained(stats) = worker.join(Duration::from_secs(5)).await else {
        panic!("worker did not drain");
    };
    assert_eq!(stats.persisted, 1);

    let clicks = SqlClickRepository::new(&t.db)
        .recent_for_link(link.id, 10)
        .await
        .unwrap();
    assert_eq!(clicks[0].user_agent.as_deref().map(str::len), Some(MAX_USER_AGENT_LEN));
    assert_eq!(clicks[0].referrer.as_deref().map(str::len), Some(MAX_REFERRER_LEN));
}

#[tokio::test]
async fn test_redirect_is_case_insensitive() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane").await;
    common::create_test_link(&t.db, "team-docs", "https://example.com/team", owner.id).await;

    let (state, _worker, _shutdown_tx) = common::create_test_state(&t.db);
    let server = TestServer::new(redirect_app(state)).unwrap();

    let response = server.get("/Team-Docs").await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://example.com/team");
}

#[tokio::test]
async fn test_redirect_not_found() {
    let t = common::setup_db().await;
    let (state, _worker, _shutdown_tx) = common::create_test_state(&t.db);
    let server = TestServer::new(redirect_app(state)).unwrap();

    let response = server.get("/nonexistent").await;

    assert_eq!(response.status_code(), 404);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_redirect_impossible_slug_not_found() {
    let t = common::setup_db().await;
    let (state, _worker, _shutdown_tx) = common::create_test_state(&t.db);
    let server = TestServer::new(redirect_app(state)).unwrap();

    let response = server.get("/favicon.ico").await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_redirect_records_signed_in_user() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane").await;
    let visitor = common::create_test_user(&t.db, "Bob").await;
    let link = common::create_test_link(&t.db, "docs", "https://example.com", owner.id).await;

    let (state, worker, shutdown_tx) = common::create_test_state(&t.db);
    let app = Router::new()
        .route("/{slug}", get(redirect_handler))
        .layer(Extension(CurrentUser(visitor.id)))
        .layer(MockConnectInfoLayer)
        .with_state(state);
    let server = TestServer::new(app).unwrap();

    server.get("/docs").await.assert_status(axum::http::StatusCode::TEMPORARY_REDIRECT);

    shutdown_tx.send(true).unwrap();
    worker.join(Duration::from_secs(5)).await;

    let clicks = SqlClickRepository::new(&t.db)
        .recent_for_link(link.id, 10)
        .await
        .unwrap();
    assert_eq!(clicks.len(), 1);
    assert_eq!(clicks[0].user_id, Some(visitor.id));
}

#[tokio::test]
async fn test_redirect_after_shutdown_still_redirects() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane").await;
    common::create_test_link(&t.db, "docs", "https://example.com", owner.id).await;

    let (state, worker, shutdown_tx) = common::create_test_state(&t.db);
    let sender = state.click_sender.clone();
    let server = TestServer::new(redirect_app(state)).unwrap();

    shutdown_tx.send(true).unwrap();
    worker.join(Duration::from_secs(5)).await;

    let response = server.get("/docs").await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(sender.stats().dropped_closed, 1);
}
