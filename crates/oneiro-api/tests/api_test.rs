use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use oneiro_api::auth::AppStateInner;
use oneiro_db::Database;

fn test_app(dir: &tempfile::TempDir) -> Router {
    let db = Database::open(&dir.path().join("test.db")).unwrap();
    let state = Arc::new(AppStateInner {
        db,
        jwt_secret: "test-secret".to_string(),
    });
    oneiro_api::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, value)
}

/// Registers a user and returns (user_id, token).
async fn register(app: &Router, username: &str) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "hunter2hunter2",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    (
        body["id"].as_str().unwrap().to_string(),
        body["token"].as_str().unwrap().to_string(),
    )
}

async fn create_dream(app: &Router, token: &str, date: &str, body_extra: Value) -> String {
    let mut payload = json!({
        "content": "standing in a field of static",
        "summary": "field",
        "dream_date": date,
    });
    payload
        .as_object_mut()
        .unwrap()
        .extend(body_extra.as_object().unwrap().clone());

    let (status, body) = send(app, "POST", "/dreams", Some(token), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["dreamId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    register(&app, "ada").await;

    let (status, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({
            "username": "ada2",
            "email": "ada@example.com",
            "password": "hunter2hunter2",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username or email already taken");
}

#[tokio::test]
async fn login_returns_user_and_rejects_bad_password() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);
    register(&app, "ada").await;

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "ada", "password": "hunter2hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["username"], "ada");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["user"].get("password").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "ada", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid username or password");
}

#[tokio::test]
async fn journal_requires_token() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let (status, _) = send(&app, "GET", "/dreams", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/dreams", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn legacy_user_id_must_match_token() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);
    let (user_id, token) = register(&app, "ada").await;

    let (status, _) = send(
        &app,
        "GET",
        &format!("/dreams?user_id={user_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let other = uuid::Uuid::new_v4();
    let (status, body) = send(
        &app,
        "GET",
        &format!("/dreams?user_id={other}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
}

#[tokio::test]
async fn created_dream_comes_back_with_symbols() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);
    let (_, token) = register(&app, "ada").await;

    create_dream(
        &app,
        &token,
        "2026-07-01",
        json!({ "symbols": ["flying", "water"], "is_lucid": true, "mood_score": 8 }),
    )
    .await;

    let (status, body) = send(&app, "GET", "/dreams", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let dreams = body.as_array().unwrap();
    assert_eq!(dreams.len(), 1);
    assert_eq!(dreams[0]["title"], "field");
    assert_eq!(dreams[0]["is_lucid"], true);
    assert_eq!(dreams[0]["mood_score"], 8);

    let mut symbols: Vec<&str> = dreams[0]["symbols"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap())
        .collect();
    symbols.sort();
    assert_eq!(symbols, vec!["flying", "water"]);
}

#[tokio::test]
async fn create_rejects_out_of_range_mood() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);
    let (_, token) = register(&app, "ada").await;

    let (status, body) = send(
        &app,
        "POST",
        "/dreams",
        Some(&token),
        Some(json!({
            "content": "x",
            "summary": "x",
            "dream_date": "2026-07-01",
            "mood_score": 11,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "mood_score must be between 1 and 10");
}

#[tokio::test]
async fn search_mood_bounds_exclude_outliers() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);
    let (_, token) = register(&app, "ada").await;

    for (date, mood) in [
        ("2026-07-01", 6),
        ("2026-07-02", 7),
        ("2026-07-03", 9),
        ("2026-07-04", 10),
    ] {
        create_dream(&app, &token, date, json!({ "mood_score": mood })).await;
    }

    let (status, body) = send(
        &app,
        "GET",
        "/dreams/search?mood_min=7&mood_max=9",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["hasMore"], false);

    let moods: Vec<i64> = body["dreams"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["mood_score"].as_i64().unwrap())
        .collect();
    assert_eq!(moods, vec![9, 7]);
}

#[tokio::test]
async fn search_pagination_sets_has_more() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);
    let (_, token) = register(&app, "ada").await;

    for day in 1..=3 {
        create_dream(&app, &token, &format!("2026-07-0{day}"), json!({})).await;
    }

    let (_, body) = send(
        &app,
        "GET",
        "/dreams/search?limit=2&offset=0",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["dreams"].as_array().unwrap().len(), 2);
    assert_eq!(body["hasMore"], true);

    let (_, body) = send(
        &app,
        "GET",
        "/dreams/search?limit=2&offset=2",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["dreams"].as_array().unwrap().len(), 1);
    assert_eq!(body["hasMore"], false);
}

#[tokio::test]
async fn delete_enforces_ownership() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);
    let (_, ada_token) = register(&app, "ada").await;
    let (_, lin_token) = register(&app, "lin").await;

    let dream_id = create_dream(&app, &ada_token, "2026-07-01", json!({})).await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/dreams/{dream_id}"),
        Some(&lin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Not authorized to delete this dream");

    // Still there for the owner.
    let (_, body) = send(&app, "GET", "/dreams", Some(&ada_token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/dreams/{dream_id}"),
        Some(&ada_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/dreams/{dream_id}"),
        Some(&ada_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Dream not found");
}

#[tokio::test]
async fn feed_is_public_and_carries_usernames() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);
    let (_, ada_token) = register(&app, "ada").await;
    let (_, lin_token) = register(&app, "lin").await;

    create_dream(&app, &ada_token, "2026-07-01", json!({ "symbols": ["flying"] })).await;
    create_dream(&app, &lin_token, "2026-07-02", json!({})).await;

    let (status, body) = send(&app, "GET", "/feed", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let dreams = body.as_array().unwrap();
    assert_eq!(dreams.len(), 2);
    assert_eq!(dreams[0]["username"], "lin");
    assert_eq!(dreams[1]["username"], "ada");

    let (_, body) = send(&app, "GET", "/feed?symbol=flying", None, None).await;
    let dreams = body.as_array().unwrap();
    assert_eq!(dreams.len(), 1);
    assert_eq!(dreams[0]["username"], "ada");
}

#[tokio::test]
async fn popular_symbols_rank_by_usage() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);
    let (_, token) = register(&app, "ada").await;

    create_dream(&app, &token, "2026-07-01", json!({ "symbols": ["ocean", "teeth"] })).await;
    create_dream(&app, &token, "2026-07-02", json!({ "symbols": ["ocean"] })).await;

    let (status, body) = send(&app, "GET", "/symbols/popular", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let symbols = body.as_array().unwrap();
    assert_eq!(symbols[0]["name"], "ocean");
    assert_eq!(symbols[0]["dream_count"], 2);
}

#[tokio::test]
async fn profile_reports_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);
    let (user_id, token) = register(&app, "ada").await;

    create_dream(
        &app,
        &token,
        "2026-07-01",
        json!({ "is_lucid": true, "mood_score": 8, "symbols": ["flying"] }),
    )
    .await;
    create_dream(&app, &token, "2026-07-02", json!({ "mood_score": 4 })).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/users/{user_id}/profile"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["user"]["username"], "ada");
    assert_eq!(body["statistics"]["total_dreams"], 2);
    assert_eq!(body["statistics"]["lucid_dreams"], 1);
    assert_eq!(body["statistics"]["avg_mood"], 6.0);
    assert_eq!(body["statistics"]["first_dream_date"], "2026-07-01");
    assert_eq!(body["topSymbols"][0]["name"], "flying");
    assert_eq!(body["recentDreams"].as_array().unwrap().len(), 2);

    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(
        &app,
        "GET",
        &format!("/users/{missing}/profile"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn analysis_reports_over_journal() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);
    let (_, token) = register(&app, "ada").await;

    // Empty journal: zeroed report, no recommendations.
    let (status, body) = send(&app, "GET", "/dreams/analysis", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalDreams"], 0);
    assert_eq!(body["moodAnalysis"]["average"], 0.0);
    assert!(body["recommendations"].as_array().unwrap().is_empty());

    create_dream(
        &app,
        &token,
        "2026-07-01",
        json!({ "mood_score": 8, "sleep_duration": 8.0, "sleep_quality": 7, "symbols": ["flying"] }),
    )
    .await;
    create_dream(
        &app,
        &token,
        "2026-07-02",
        json!({ "mood_score": 7, "sleep_duration": 7.5, "sleep_quality": 8, "is_lucid": true }),
    )
    .await;

    let (status, body) = send(&app, "GET", "/dreams/analysis", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalDreams"], 2);
    assert_eq!(body["moodAnalysis"]["average"], 7.5);
    assert_eq!(body["sleepAnalysis"]["optimalRange"], 2);
    assert_eq!(body["lucidAnalysis"]["percentage"], 50.0);
    assert_eq!(body["symbolAnalysis"]["mostCommon"][0]["symbol"], "flying");

    // Window that excludes everything behaves like an empty journal.
    let (_, body) = send(
        &app,
        "GET",
        "/dreams/analysis?date_from=2027-01-01",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["totalDreams"], 0);
}
