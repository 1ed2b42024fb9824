//! Blog API integration tests
//!
//! 覆盖所有权模型的两面：读接口严格按所有者过滤，
//! 写接口按 id 操作且不检查所有者。

use axum::Router;
use axum::body::{Body, to_bytes};
use http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::Service;

use blog_server::{Config, JwtConfig, ServerState, routes};

const TEST_JWT_SECRET: &str = "integration-test-secret-key-0123456789";

async fn test_state() -> (ServerState, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        database_path: dir.path().join("blog.db").to_string_lossy().into_owned(),
        database_namespace: "test".to_string(),
        database_name: "test".to_string(),
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            expiration_minutes: 60,
            issuer: "blog-server".to_string(),
            audience: "blog-clients".to_string(),
        },
        environment: "development".to_string(),
    };
    let state = ServerState::initialize(&config)
        .await
        .expect("Failed to initialize server state");
    (state, dir)
}

fn test_app(state: &ServerState) -> Router {
    routes::build_app(state).with_state(state.clone())
}

async fn send(app: &mut Router, req: Request<Body>) -> http::Response<Body> {
    app.call(req).await.expect("Router call is infallible")
}

async fn body_json(resp: http::Response<Body>) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body is not valid JSON")
}

fn json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

fn get_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("Failed to build request")
}

/// 注册并登录，返回 Bearer 令牌
async fn signup(app: &mut Router, username: &str) -> String {
    let resp = send(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"username": username, "password": "password123"}).to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"username": username, "password": "password123"}).to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    body["data"]["token"].as_str().unwrap().to_string()
}

/// 创建博客，返回 "blog:xxx" 形式的 id
async fn create_blog(app: &mut Router, token: &str, title: &str, category: &str) -> String {
    let resp = send(
        app,
        json_request(
            "POST",
            "/api/blogs",
            token,
            json!({"title": title, "content": "body text", "category": category}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn list_blogs(app: &mut Router, token: &str) -> Vec<Value> {
    let resp = send(app, get_request("/api/blogs", token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    body["data"].as_array().unwrap().clone()
}

#[tokio::test]
async fn test_create_blog_sets_owner_and_defaults() {
    let (state, _dir) = test_state().await;
    let mut app = test_app(&state);

    let token = signup(&mut app, "alice").await;

    let resp = send(
        &mut app,
        json_request(
            "POST",
            "/api/blogs",
            &token,
            json!({"title": "First", "content": "Hello", "category": "rust"}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = body_json(resp).await;
    let blog = &body["data"];
    assert!(blog["id"].as_str().unwrap().starts_with("blog:"));
    assert_eq!(blog["title"], "First");
    assert_eq!(blog["likes"], 0);
    assert_eq!(blog["comments"], json!([]));
    assert!(blog["author"].as_str().unwrap().starts_with("user:"));
}

#[tokio::test]
async fn test_create_ignores_spoofed_author() {
    let (state, _dir) = test_state().await;
    let mut app = test_app(&state);

    let alice = signup(&mut app, "alice").await;
    let bob = signup(&mut app, "bob").await;

    // Alice 试图把所有者写成别人
    let resp = send(
        &mut app,
        json_request(
            "POST",
            "/api/blogs",
            &alice,
            json!({
                "title": "Spoofed",
                "content": "x",
                "category": "misc",
                "author": "user:bob",
                "likes": 999
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // 博客出现在 Alice 的列表里，不在 Bob 的
    let alice_blogs = list_blogs(&mut app, &alice).await;
    assert_eq!(alice_blogs.len(), 1);
    assert_eq!(alice_blogs[0]["title"], "Spoofed");
    assert_eq!(alice_blogs[0]["likes"], 0);
    assert_eq!(alice_blogs[0]["author_name"], "alice");

    let bob_blogs = list_blogs(&mut app, &bob).await;
    assert!(bob_blogs.is_empty());
}

#[tokio::test]
async fn test_list_is_strictly_owner_scoped() {
    let (state, _dir) = test_state().await;
    let mut app = test_app(&state);

    let alice = signup(&mut app, "alice").await;
    let bob = signup(&mut app, "bob").await;

    create_blog(&mut app, &alice, "A1", "rust").await;
    create_blog(&mut app, &alice, "A2", "rust").await;
    create_blog(&mut app, &bob, "B1", "go").await;

    let alice_blogs = list_blogs(&mut app, &alice).await;
    assert_eq!(alice_blogs.len(), 2);
    for blog in &alice_blogs {
        assert_eq!(blog["author_name"], "alice");
    }

    let bob_blogs = list_blogs(&mut app, &bob).await;
    assert_eq!(bob_blogs.len(), 1);
    assert_eq!(bob_blogs[0]["title"], "B1");
}

#[tokio::test]
async fn test_title_and_category_filters_are_owner_scoped() {
    let (state, _dir) = test_state().await;
    let mut app = test_app(&state);

    let alice = signup(&mut app, "alice").await;
    let bob = signup(&mut app, "bob").await;

    create_blog(&mut app, &alice, "Shared Title", "rust").await;
    create_blog(&mut app, &alice, "Other", "go").await;
    create_blog(&mut app, &bob, "Shared Title", "rust").await;

    // 标题过滤只命中自己的
    let resp = send(
        &mut app,
        get_request("/api/blogs/title?title=Shared%20Title", &alice),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let blogs = body["data"].as_array().unwrap();
    assert_eq!(blogs.len(), 1);
    assert_eq!(blogs[0]["author_name"], "alice");

    // 分类过滤同理
    let resp = send(&mut app, get_request("/api/blogs/category?category=rust", &alice)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let blogs = body["data"].as_array().unwrap();
    assert_eq!(blogs.len(), 1);
    assert_eq!(blogs[0]["category"], "rust");
    assert_eq!(blogs[0]["author_name"], "alice");
}

#[tokio::test]
async fn test_sort_by_allowed_field_both_orders() {
    let (state, _dir) = test_state().await;
    let mut app = test_app(&state);

    let alice = signup(&mut app, "alice").await;
    create_blog(&mut app, &alice, "banana", "fruit").await;
    create_blog(&mut app, &alice, "apple", "fruit").await;
    create_blog(&mut app, &alice, "cherry", "fruit").await;

    let resp = send(&mut app, get_request("/api/blogs/sort?sort=title&order=asc", &alice)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let blogs = body["data"].as_array().unwrap();
    let titles: Vec<&str> = blogs.iter().map(|b| b["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["apple", "banana", "cherry"]);
    // 排序路径同样带所有者用户名投影
    for blog in blogs {
        assert_eq!(blog["author_name"], "alice");
    }

    // order 省略或非 asc 都按降序
    let resp = send(&mut app, get_request("/api/blogs/sort?sort=title", &alice)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["cherry", "banana", "apple"]);
}

#[tokio::test]
async fn test_sort_unknown_field_is_rejected() {
    let (state, _dir) = test_state().await;
    let mut app = test_app(&state);

    let alice = signup(&mut app, "alice").await;

    for bad in ["author", "__proto__", "title; DELETE blog", "id"] {
        let uri = format!(
            "/api/blogs/sort?sort={}",
            bad.replace(' ', "%20").replace(';', "%3B")
        );
        let resp = send(&mut app, get_request(&uri, &alice)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "sort key: {bad}");
        let body = body_json(resp).await;
        assert_ne!(body["code"], 0);
    }
}

#[tokio::test]
async fn test_update_by_id_crosses_owners() {
    let (state, _dir) = test_state().await;
    let mut app = test_app(&state);

    let alice = signup(&mut app, "alice").await;
    let bob = signup(&mut app, "bob").await;

    let id = create_blog(&mut app, &alice, "Original", "rust").await;

    // Bob 直接按 id 更新 Alice 的博客，契约允许
    let resp = send(
        &mut app,
        json_request("PUT", &format!("/api/blogs/{id}"), &bob, json!({"title": "Edited"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["title"], "Edited");
    // 未提供的字段保持原值
    assert_eq!(body["data"]["category"], "rust");

    // 所有者仍是 Alice，修改对她可见
    let alice_blogs = list_blogs(&mut app, &alice).await;
    assert_eq!(alice_blogs.len(), 1);
    assert_eq!(alice_blogs[0]["title"], "Edited");
}

#[tokio::test]
async fn test_update_missing_blog_is_not_found() {
    let (state, _dir) = test_state().await;
    let mut app = test_app(&state);

    let alice = signup(&mut app, "alice").await;

    let resp = send(
        &mut app,
        json_request("PUT", "/api/blogs/doesnotexist", &alice, json!({"title": "x"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // UPDATE 不会创建缺失的记录
    let ghost: Option<Value> = state
        .get_db()
        .select(("blog", "doesnotexist"))
        .await
        .expect("Select failed");
    assert!(ghost.is_none());
}

#[tokio::test]
async fn test_delete_by_id_crosses_owners() {
    let (state, _dir) = test_state().await;
    let mut app = test_app(&state);

    let alice = signup(&mut app, "alice").await;
    let bob = signup(&mut app, "bob").await;

    let id = create_blog(&mut app, &alice, "Doomed", "rust").await;

    let resp = send(
        &mut app,
        json_request("DELETE", &format!("/api/blogs/{id}"), &bob, json!({})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(list_blogs(&mut app, &alice).await.is_empty());

    // 再删一次 → 404
    let resp = send(
        &mut app,
        json_request("DELETE", &format!("/api/blogs/{id}"), &bob, json!({})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_like_crosses_owners_and_increments_by_one() {
    let (state, _dir) = test_state().await;
    let mut app = test_app(&state);

    let alice = signup(&mut app, "alice").await;
    let bob = signup(&mut app, "bob").await;

    let id = create_blog(&mut app, &alice, "Likeable", "rust").await;

    let resp = send(
        &mut app,
        json_request("PATCH", &format!("/api/blogs/{id}/like"), &bob, json!({})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["likes"], 1);

    let alice_blogs = list_blogs(&mut app, &alice).await;
    assert_eq!(alice_blogs[0]["likes"], 1);

    // 点赞不改变所有权：Bob 的列表里仍然没有这篇博客
    assert!(list_blogs(&mut app, &bob).await.is_empty());
}

#[tokio::test]
async fn test_concurrent_likes_lose_no_counts() {
    let (state, _dir) = test_state().await;
    let mut app = test_app(&state);

    let alice = signup(&mut app, "alice").await;
    let id = create_blog(&mut app, &alice, "Popular", "rust").await;

    const N: usize = 20;
    let mut handles = Vec::with_capacity(N);
    for _ in 0..N {
        let mut task_app = app.clone();
        let token = alice.clone();
        let uri = format!("/api/blogs/{id}/like");
        handles.push(tokio::spawn(async move {
            let req = json_request("PATCH", &uri, &token, json!({}));
            let resp = task_app.call(req).await.expect("Router call is infallible");
            assert_eq!(resp.status(), StatusCode::OK);
        }));
    }
    for handle in handles {
        handle.await.expect("Like task panicked");
    }

    let blogs = list_blogs(&mut app, &alice).await;
    assert_eq!(blogs[0]["likes"], N as i64);
}

#[tokio::test]
async fn test_comments_append_in_order_with_stamped_identity() {
    let (state, _dir) = test_state().await;
    let mut app = test_app(&state);

    let alice = signup(&mut app, "alice").await;
    let bob = signup(&mut app, "bob").await;

    let id = create_blog(&mut app, &alice, "Discussed", "rust").await;

    for text in ["first", "second", "third"] {
        let resp = send(
            &mut app,
            json_request(
                "PATCH",
                &format!("/api/blogs/{id}/comment"),
                &bob,
                json!({"text": text, "user": "user:forged"}),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let blogs = list_blogs(&mut app, &alice).await;
    let comments = blogs[0]["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 3);

    // 插入顺序保持不变
    let texts: Vec<&str> = comments
        .iter()
        .map(|c| c["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["first", "second", "third"]);

    // 评论者身份来自令牌，请求体里的 user 被忽略
    for comment in comments {
        let user = comment["user"].as_str().unwrap();
        assert!(user.starts_with("user:"));
        assert_ne!(user, "user:forged");
        assert!(!comment["id"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_comment_on_missing_blog_is_not_found() {
    let (state, _dir) = test_state().await;
    let mut app = test_app(&state);

    let alice = signup(&mut app, "alice").await;

    let resp = send(
        &mut app,
        json_request(
            "PATCH",
            "/api/blogs/nothere/comment",
            &alice,
            json!({"text": "hello"}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // 没有凭空创建出记录
    let ghost: Option<Value> = state
        .get_db()
        .select(("blog", "nothere"))
        .await
        .expect("Select failed");
    assert!(ghost.is_none());
}

#[tokio::test]
async fn test_validation_runs_before_persistence() {
    let (state, _dir) = test_state().await;
    let mut app = test_app(&state);

    let alice = signup(&mut app, "alice").await;

    // 空标题被拒绝
    let resp = send(
        &mut app,
        json_request(
            "POST",
            "/api/blogs",
            &alice,
            json!({"title": "  ", "content": "x", "category": "rust"}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(list_blogs(&mut app, &alice).await.is_empty());

    // 更新时的空字段同样被拒绝
    let id = create_blog(&mut app, &alice, "Valid", "rust").await;
    let resp = send(
        &mut app,
        json_request("PUT", &format!("/api/blogs/{id}"), &alice, json!({"title": ""})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let blogs = list_blogs(&mut app, &alice).await;
    assert_eq!(blogs[0]["title"], "Valid");
}

#[tokio::test]
async fn test_blog_routes_require_authentication() {
    let (state, _dir) = test_state().await;
    let mut app = test_app(&state);

    let resp = send(
        &mut app,
        Request::builder()
            .uri("/api/blogs")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(
        &mut app,
        Request::builder()
            .uri("/api/blogs")
            .header(header::AUTHORIZATION, "Bearer bogus")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
