use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use integration_tests::http::app;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_login_and_profile() {
    let app = app();
    let token = app.login("ann").await;

    let (status, me) = app.get("/auth/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "ann");
    assert!(me.get("password").is_none());

    let (status, body) = app
        .json("POST", "/auth/register", None, json!({ "email": "ANN@example.com", "password": "secret1" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, _) = app.json("POST", "/auth/logout", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/auth/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let app = app();
    let (status, body) = app.json("POST", "/posts", None, json!({ "title": "x", "content": "y" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = app.get("/notifications", Some("not-a-session")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_things_are_404_with_a_uniform_body() {
    let app = app();
    let (status, body) = app.get("/posts/no-such-slug", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert!(body["detail"].as_str().is_some_and(|d| !d.is_empty()));

    let (status, _) = app.get("/users/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_and_read_a_post() {
    let app = app();
    let token = app.login("ann").await;

    let (status, created) = app
        .json(
            "POST",
            "/posts",
            Some(&token),
            json!({ "title": "Hello HTTP", "content": "Served by axum.", "tags": ["Rust"] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["slug"], "hello-http");

    let (status, read) = app.get("/posts/hello-http", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["title"], "Hello HTTP");
    assert_eq!(read["views_count"], 1);

    let id = created["id"].as_i64().unwrap();
    let (status, by_id) = app.get(&format!("/posts/id/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_id["slug"], "hello-http");

    let (status, page) = app.get("/posts?limit=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);

    let (status, body) = app.get("/posts?limit=500", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = app
        .json("POST", "/posts", Some(&token), json!({ "title": "Again", "content": "x", "slug": "hello-http" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn others_cannot_edit_and_non_admins_cannot_moderate() {
    let app = app();
    let ann = app.login("ann").await;
    let bob = app.login("bob").await;
    let (_, post) = app.json("POST", "/posts", Some(&ann), json!({ "title": "Mine", "content": "x" })).await;
    let id = post["id"].as_i64().unwrap();

    let (status, body) = app
        .json("PUT", &format!("/posts/{id}"), Some(&bob), json!({ "title": "Yours" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = app.get("/admin/stats", Some(&bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn likes_and_comments_over_http() {
    let app = app();
    let ann = app.login("ann").await;
    let bob = app.login("bob").await;
    let (_, post) = app.json("POST", "/posts", Some(&ann), json!({ "title": "Chat", "content": "x" })).await;
    let id = post["id"].as_i64().unwrap();

    let (status, liked) = app.json("POST", &format!("/posts/{id}/like"), Some(&bob), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(liked["likes_count"], 1);
    let (status, _) = app.json("POST", &format!("/posts/{id}/like"), Some(&bob), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, comment) = app
        .json("POST", &format!("/posts/{id}/comments"), Some(&bob), json!({ "content": "Nice" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, reply) = app
        .json(
            "POST",
            &format!("/posts/{id}/comments"),
            Some(&ann),
            json!({ "content": "Thanks", "parentId": comment["id"] }),
        )
        .await;
    assert_eq!(reply["parentId"], comment["id"]);

    let (_, count) = app.get("/notifications/unread-count", Some(&ann)).await;
    assert_eq!(count["count"], 2);
    let (_, count) = app.get("/notifications/unread-count", Some(&bob)).await;
    assert_eq!(count["count"], 1);
}

#[tokio::test]
async fn anonymous_wall_hides_the_sender() {
    let app = app();
    let req = Request::post("/anonymous/messages")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
        .body(Body::from(json!({ "content": "psst" }).to_string()))
        .unwrap();
    let (status, sent) = app.send(req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(sent.get("ip_hash").is_none());

    let stored = app.store.snapshot();
    assert!(!stored.anonymous_messages[0].ip_hash.contains("203.0.113.9"));

    let (_, wall) = app.get("/anonymous/messages", None).await;
    assert_eq!(wall["items"][0]["content"], "psst");
}

#[tokio::test]
async fn metrics_are_exposed_after_traffic() {
    let app = app();
    app.get("/health", None).await;

    let resp = app.router.clone().oneshot(Request::get("/metrics").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("http_requests_total"));
    assert!(text.contains("http_request_duration_seconds"));
}

#[tokio::test]
async fn generated_avatar_is_svg() {
    let app = app();
    let token = app.login("zed").await;
    let (_, me) = app.get("/auth/profile", Some(&token)).await;
    let id = me["id"].as_i64().unwrap();

    let resp = app
        .router
        .clone()
        .oneshot(Request::get(format!("/users/{id}/avatar.svg")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/svg+xml");
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let svg = String::from_utf8(body.to_vec()).unwrap();
    assert!(svg.starts_with("<svg") && svg.contains('Z'));

    let (status, _) = app.get("/users/999/avatar.svg", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = app();
    let resp = app.router.clone().oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert!(resp.headers().contains_key("x-request-id"));
}
