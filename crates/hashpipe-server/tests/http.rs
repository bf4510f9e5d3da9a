use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use core::time::Duration;
use hashpipe::{BcryptHasher, ContainerConfig, HashError, PasswordHasher};
use hashpipe_server::server::service::handler::{HashService, router};
use tower::ServiceExt;

struct ReverseHasher;

impl PasswordHasher for ReverseHasher {
    fn hash(&self, payload: &str) -> Result<String, HashError> {
        Ok(payload.chars().rev().collect())
    }

    fn verify(&self, payload: &str, hash: &str) -> Result<bool, HashError> {
        Ok(payload.chars().rev().eq(hash.chars()))
    }
}

struct BrokenHasher;

impl PasswordHasher for BrokenHasher {
    fn hash(&self, _payload: &str) -> Result<String, HashError> {
        Err(HashError::new("primitive unavailable"))
    }

    fn verify(&self, _payload: &str, _hash: &str) -> Result<bool, HashError> {
        Err(HashError::new("primitive unavailable"))
    }
}

fn service<H: PasswordHasher>(hasher: H, hash_delay: Duration) -> HashService<H> {
    HashService::new(
        hasher,
        0,
        ContainerConfig {
            hash_delay,
            max_workers: None,
        },
        Duration::from_secs(1),
    )
    .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, String) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn post_hash(password: &str) -> Request<Body> {
    Request::post("/hash")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("password={password}")))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_shutdown() -> Request<Body> {
    Request::post("/shutdown").body(Body::empty()).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn submit_returns_accepted_with_sequential_ids() {
    let svc = service(ReverseHasher, Duration::ZERO);
    let app = router(svc.clone());

    assert_eq!(send(&app, post_hash("a")).await, (StatusCode::ACCEPTED, "1".into()));
    assert_eq!(send(&app, post_hash("b")).await, (StatusCode::ACCEPTED, "2".into()));

    svc.shutdown().await;
    svc.wait().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn result_is_not_found_until_hashed() {
    let svc = service(ReverseHasher, Duration::from_millis(200));
    let app = router(svc.clone());

    let (status, id) = send(&app, post_hash("angrymonkey")).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let uri = format!("/hash/{id}");
    let (status, _) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    svc.shutdown().await;
    svc.wait().await;

    let (status, body) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "yeknomyrgna");
}

#[tokio::test(flavor = "multi_thread")]
async fn bcrypt_result_verifies() {
    let svc = service(BcryptHasher::new(4), Duration::ZERO);
    let app = router(svc.clone());

    let (_, id) = send(&app, post_hash("angrymonkey")).await;
    svc.shutdown().await;
    svc.wait().await;

    let (status, hash) = send(&app, get(&format!("/hash/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(svc.container().hasher().verify("angrymonkey", &hash).unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_hash_is_reported_as_server_error() {
    let svc = service(BrokenHasher, Duration::ZERO);
    let app = router(svc.clone());

    let (_, id) = send(&app, post_hash("x")).await;
    svc.shutdown().await;
    svc.wait().await;

    let (status, body) = send(&app, get(&format!("/hash/{id}"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("primitive unavailable"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_and_malformed_ids_are_not_found() {
    let svc = service(ReverseHasher, Duration::ZERO);
    let app = router(svc.clone());

    assert_eq!(send(&app, get("/hash/42")).await.0, StatusCode::NOT_FOUND);
    assert_eq!(send(&app, get("/hash/abc")).await.0, StatusCode::NOT_FOUND);

    svc.shutdown().await;
    svc.wait().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn stats_start_at_zero_and_count_jobs() {
    let svc = service(ReverseHasher, Duration::ZERO);
    let app = router(svc.clone());

    let (status, body) = send(&app, get("/stats")).await;
    assert_eq!(status, StatusCode::OK);
    let stats: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(stats, serde_json::json!({ "Total": 0, "Average": 0 }));

    send(&app, post_hash("a")).await;
    send(&app, post_hash("b")).await;
    svc.shutdown().await;
    svc.wait().await;

    let (_, body) = send(&app, get("/stats")).await;
    let stats: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(stats["Total"], 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_refuses_new_submissions_and_is_repeatable() {
    let svc = service(ReverseHasher, Duration::ZERO);
    let app = router(svc.clone());

    let (_, id) = send(&app, post_hash("before")).await;

    assert_eq!(send(&app, post_shutdown()).await.0, StatusCode::OK);
    assert!(svc.coordinator().transport_token().is_cancelled());

    let (status, _) = send(&app, post_hash("after")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    assert_eq!(send(&app, post_shutdown()).await.0, StatusCode::OK);

    svc.wait().await;
    let (status, body) = send(&app, get(&format!("/hash/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "erofeb");
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_password_field_hashes_empty_string() {
    let svc = service(ReverseHasher, Duration::ZERO);
    let app = router(svc.clone());

    let req = Request::post("/hash")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::empty())
        .unwrap();
    let (status, id) = send(&app, req).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    svc.shutdown().await;
    svc.wait().await;
    assert_eq!(send(&app, get(&format!("/hash/{id}"))).await, (StatusCode::OK, String::new()));
}

#[tokio::test(flavor = "multi_thread")]
async fn password_is_read_from_query_string() {
    let svc = service(ReverseHasher, Duration::ZERO);
    let app = router(svc.clone());

    let req = Request::post("/hash?password=angrymonkey")
        .body(Body::empty())
        .unwrap();
    let (status, id) = send(&app, req).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    svc.shutdown().await;
    svc.wait().await;
    assert_eq!(
        send(&app, get(&format!("/hash/{id}"))).await,
        (StatusCode::OK, "yeknomyrgna".into())
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn form_body_takes_precedence_over_query_string() {
    let svc = service(ReverseHasher, Duration::ZERO);
    let app = router(svc.clone());

    let req = Request::post("/hash?password=query")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("password=body"))
        .unwrap();
    let (_, id) = send(&app, req).await;

    svc.shutdown().await;
    svc.wait().await;
    assert_eq!(
        send(&app, get(&format!("/hash/{id}"))).await,
        (StatusCode::OK, "ydob".into())
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn bare_post_hashes_empty_string() {
    let svc = service(ReverseHasher, Duration::ZERO);
    let app = router(svc.clone());

    let (status, id) = send(&app, Request::post("/hash").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    svc.shutdown().await;
    svc.wait().await;
    assert_eq!(send(&app, get(&format!("/hash/{id}"))).await, (StatusCode::OK, String::new()));
}

#[tokio::test(flavor = "multi_thread")]
async fn signed_and_fractional_ids_are_not_found() {
    let svc = service(ReverseHasher, Duration::ZERO);
    let app = router(svc.clone());

    let (_, id) = send(&app, post_hash("a")).await;
    assert_eq!(id, "1");
    svc.shutdown().await;
    svc.wait().await;

    assert_eq!(send(&app, get("/hash/1")).await.0, StatusCode::OK);
    assert_eq!(send(&app, get("/hash/+1")).await.0, StatusCode::NOT_FOUND);
    assert_eq!(send(&app, get("/hash/-1")).await.0, StatusCode::NOT_FOUND);
    assert_eq!(send(&app, get("/hash/1.0")).await.0, StatusCode::NOT_FOUND);
}
