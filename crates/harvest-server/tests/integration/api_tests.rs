use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::integration::common::{serve_page_once, setup_test_app};

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn create_source(router: &Router, body: Value) -> Value {
    let (status, json) = send(router, post_json("/v1/sources", body)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json
}

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app().await;

    let (status, json) = send(
        &app.router,
        Request::get("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "ok");
}

#[tokio::test]
async fn create_and_list_sources() {
    let app = setup_test_app().await;

    let created = create_source(
        &app.router,
        json!({"name": "Remote feed", "url": "https://feeds.example/jobs.rss", "type": "RSS"}),
    )
    .await;
    assert_eq!(created["type"], "rss");

    let untyped = create_source(
        &app.router,
        json!({"name": "Team page", "url": "https://acme.example/team", "selector": ".role"}),
    )
    .await;
    assert_eq!(untyped["type"], "selector-or-jsonld");

    let (status, json) = send(
        &app.router,
        Request::get("/v1/sources").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);
    assert_eq!(json["sources"][0]["name"], "Remote feed");
    assert_eq!(json["sources"][1]["selector"], ".role");
}

#[tokio::test]
async fn create_source_rejects_invalid_url() {
    let app = setup_test_app().await;

    let (status, json) = send(
        &app.router,
        post_json("/v1/sources", json!({"name": "bad", "url": "not a url"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn scrape_unknown_source_returns_404() {
    let app = setup_test_app().await;

    let (status, json) = send(
        &app.router,
        Request::post(format!("/v1/sources/{}/scrape", uuid::Uuid::new_v4()))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn scrape_failure_is_reported_as_message() {
    let app = setup_test_app().await;

    // Bind then drop to get a local port nothing listens on.
    let closed = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let source = create_source(
        &app.router,
        json!({"name": "Down", "url": format!("http://{closed}/jobs"), "type": "links"}),
    )
    .await;

    let (status, json) = send(
        &app.router,
        Request::post(format!("/v1/sources/{}/scrape", source["id"].as_str().unwrap()))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "scrape_failed");
    assert!(!json["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn manual_scrape_saves_new_postings() {
    let app = setup_test_app().await;
    let base = serve_page_once(
        r#"<html><body>
            <a href="/about">About us</a>
            <a href="/jobs/1#apply">Rust Engineer</a>
        </body></html>"#,
    )
    .await;
    let source = create_source(
        &app.router,
        json!({"name": "Local board", "url": format!("{base}/"), "type": "links"}),
    )
    .await;

    let (status, json) = send(
        &app.router,
        Request::post(format!("/v1/sources/{}/scrape", source["id"].as_str().unwrap()))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["strategy"], "links");
    assert_eq!(json["candidates"], 1);
    assert_eq!(json["saved"][0]["url"], format!("{base}/jobs/1"));
    assert_eq!(json["saved"][0]["source"], "Local board");

    let (_, listing) = send(
        &app.router,
        Request::get("/v1/postings").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["postings"][0]["title"], "Rust Engineer");
}

#[tokio::test]
async fn create_get_and_dedupe_postings() {
    let app = setup_test_app().await;
    let posting = json!({
        "source": "Manual",
        "title": "Staff Engineer",
        "company": "Acme",
        "url": "https://acme.example/jobs/9#top"
    });

    let (status, created) = send(&app.router, post_json("/v1/postings", posting.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["url"], "https://acme.example/jobs/9");

    let (status, fetched) = send(
        &app.router,
        Request::get(format!("/v1/postings/{}", created["id"].as_str().unwrap()))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["company"], "Acme");

    let mut variant = posting;
    variant["url"] = json!("HTTPS://ACME.EXAMPLE/jobs/9");
    let (status, json) = send(&app.router, post_json("/v1/postings", variant)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "conflict");
}

#[tokio::test]
async fn create_posting_rejects_blank_url() {
    let app = setup_test_app().await;

    let (status, json) = send(
        &app.router,
        post_json(
            "/v1/postings",
            json!({"source": "Manual", "title": "No link", "url": "  "}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn get_unknown_posting_returns_404() {
    let app = setup_test_app().await;

    let (status, _) = send(
        &app.router,
        Request::get(format!("/v1/postings/{}", uuid::Uuid::new_v4()))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app().await;

    let (status, json) = send(
        &app.router,
        Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["info"]["title"], "Harvest API");
}
