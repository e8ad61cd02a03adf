//! End-to-end tests over a live TCP listener.

use axum::http::StatusCode;
use waymark::http::middleware::{recovery, request_id};
use waymark::Router;

mod common;

fn app() -> Router {
    let router = Router::new();
    router.use_middleware(recovery()).unwrap();
    router.use_middleware(request_id()).unwrap();

    let api = router.group("/api");
    api.get("/users/:id", |ctx| {
        let id = ctx.param("id").unwrap_or_default().to_string();
        ctx.json(StatusCode::OK, &serde_json::json!({ "id": id }))
    })
    .unwrap();
    api.post("/echo", |ctx| {
        let body: serde_json::Value = ctx.bind_json()?;
        ctx.json(StatusCode::CREATED, &body)
    })
    .unwrap();
    router
}

#[tokio::test]
async fn test_serves_over_http() {
    let server = common::start_server(app()).await;
    let client = reqwest::Client::new();

    let response = client.get(server.url("/api/users/7")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], "7");

    let response = client
        .post(server.url("/api/echo"))
        .json(&serde_json::json!({ "hello": "world" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["hello"], "world");

    let response = client.get(server.url("/nowhere")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(response.text().await.unwrap(), "404 page not found");

    server.stop().await;
}

#[tokio::test]
async fn test_oversized_body_gets_413() {
    let router = Router::with_config(waymark::config::DispatchConfig {
        max_body_bytes: 16,
        ..Default::default()
    });
    router
        .post("/upload", |ctx| {
            let len = ctx.body().len();
            ctx.text(StatusCode::OK, len.to_string());
            Ok(())
        })
        .unwrap();
    let server = common::start_server(router).await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/upload"))
        .body("small")
        .send()
        .await
        .unwrap();
    assert_eq!(response.text().await.unwrap(), "5");

    let response = client
        .post(server.url("/upload"))
        .body(vec![b'x'; 1024])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 413);

    server.stop().await;
}
