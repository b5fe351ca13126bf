mod support;

use std::time::Duration;

use reqwest::{header::HeaderValue, StatusCode};
use serde_json::{json, Value};

use support::{spawn_app, TestApp};

async fn register(app: &TestApp, name: &str) -> reqwest::Response {
    app.client
        .post(app.url("/participants"))
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("register request")
}

async fn post_message(app: &TestApp, from: &str, body: Value) -> reqwest::Response {
    app.client
        .post(app.url("/messages"))
        .header("User", from)
        .json(&body)
        .send()
        .await
        .expect("message request")
}

async fn messages_for(app: &TestApp, name: &str, limit: Option<&str>) -> reqwest::Response {
    let mut request = app.client.get(app.url("/messages")).header("User", name);
    if let Some(limit) = limit {
        request = request.query(&[("limit", limit)]);
    }
    request.send().await.expect("messages request")
}

async fn heartbeat(app: &TestApp, name: &str) -> StatusCode {
    app.client
        .post(app.url("/status"))
        .header("User", name)
        .send()
        .await
        .expect("status request")
        .status()
}

async fn texts(response: reqwest::Response) -> Vec<String> {
    let body: Vec<Value> = response.json().await.expect("messages json");
    body.iter()
        .map(|m| m["text"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn health_check_responds() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("health");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn registration_rules() {
    let app = spawn_app().await;

    let created = register(&app, "maria").await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body: Value = created.json().await.unwrap();
    assert_eq!(body["name"], "maria");
    assert_eq!(body["lastSeen"], 1_714_564_800_000_i64);

    assert_eq!(register(&app, "maria").await.status(), StatusCode::CONFLICT);
    assert_eq!(
        register(&app, "   ").await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let missing_field = app
        .client
        .post(app.url("/participants"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_field.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: Value = missing_field.json().await.unwrap();
    assert_eq!(error["code"], "VALIDATION_FAILED");
    assert_eq!(error["details"][0]["field"], "name");

    let malformed = app
        .client
        .post(app.url("/participants"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let listed: Vec<Value> = app
        .client
        .get(app.url("/participants"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "maria");
}

#[tokio::test]
async fn message_visibility_and_limits() {
    let app = spawn_app().await;
    for name in ["a", "b", "c", "d"] {
        assert_eq!(register(&app, name).await.status(), StatusCode::CREATED);
    }

    let m1 = post_message(
        &app,
        "a",
        json!({ "to": "Todos", "text": "M1", "type": "message" }),
    )
    .await;
    assert_eq!(m1.status(), StatusCode::CREATED);
    let m1: Value = m1.json().await.unwrap();
    assert_eq!(m1["from"], "a");
    assert_eq!(m1["type"], "message");
    assert_eq!(m1["time"], "2024-05-01T12:00:00Z");

    post_message(
        &app,
        "a",
        json!({ "to": "b", "text": "M2", "type": "private_message" }),
    )
    .await;
    post_message(
        &app,
        "c",
        json!({ "to": "d", "text": "M3", "type": "private_message" }),
    )
    .await;

    let joined = "joined the room".to_string();
    let for_b = texts(messages_for(&app, "b", None).await).await;
    assert_eq!(for_b, vec![joined.clone(), joined.clone(), joined.clone(), joined.clone(), "M1".into(), "M2".into()]);

    let for_c = texts(messages_for(&app, "c", None).await).await;
    assert_eq!(&for_c[4..], &["M1".to_string(), "M3".to_string()]);

    let latest = texts(messages_for(&app, "b", Some("1")).await).await;
    assert_eq!(latest, vec!["M2".to_string()]);

    for bad in ["0", "-2", "abc"] {
        let response = messages_for(&app, "b", Some(bad)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "limit={bad}");
    }
}

#[tokio::test]
async fn message_posting_errors() {
    let app = spawn_app().await;
    register(&app, "ana").await;

    let unknown = post_message(
        &app,
        "ghost",
        json!({ "to": "Todos", "text": "oi", "type": "message" }),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let status_type = post_message(
        &app,
        "ana",
        json!({ "to": "Todos", "text": "oi", "type": "status" }),
    )
    .await;
    assert_eq!(status_type.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let missing_text = post_message(&app, "ana", json!({ "to": "Todos", "type": "message" })).await;
    assert_eq!(missing_text.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let no_header = app
        .client
        .post(app.url("/messages"))
        .json(&json!({ "to": "Todos", "text": "oi", "type": "message" }))
        .send()
        .await
        .unwrap();
    assert_eq!(no_header.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let no_header_get = app.client.get(app.url("/messages")).send().await.unwrap();
    assert_eq!(no_header_get.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn utf8_identity_header_is_accepted() {
    let app = spawn_app().await;
    assert_eq!(register(&app, "João").await.status(), StatusCode::CREATED);

    let status = app
        .client
        .post(app.url("/status"))
        .header("User", HeaderValue::from_bytes("João".as_bytes()).unwrap())
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn inactive_participants_are_swept() {
    let app = spawn_app().await;
    register(&app, "maria").await;
    register(&app, "joao").await;

    assert_eq!(heartbeat(&app, "maria").await, StatusCode::OK);
    assert_eq!(heartbeat(&app, "ghost").await, StatusCode::NOT_FOUND);
    let no_header = app.client.post(app.url("/status")).send().await.unwrap();
    assert_eq!(no_header.status(), StatusCode::NOT_FOUND);

    app.clock.advance(Duration::from_secs(8));
    assert_eq!(heartbeat(&app, "joao").await, StatusCode::OK);
    app.clock.advance(Duration::from_secs(5));

    let report = app.sweeper.sweep_once().await.expect("sweep");
    let evicted: Vec<_> = report.evicted.iter().map(|p| p.name.to_string()).collect();
    assert_eq!(evicted, vec!["maria".to_string()]);

    let listed: Vec<Value> = app
        .client
        .get(app.url("/participants"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "joao");

    let log: Vec<Value> = messages_for(&app, "someone", None)
        .await
        .json()
        .await
        .unwrap();
    let last = log.last().expect("leave notice");
    assert_eq!(last["from"], "maria");
    assert_eq!(last["to"], "Todos");
    assert_eq!(last["type"], "status");
    assert_eq!(last["text"], "left the room");

    assert_eq!(heartbeat(&app, "maria").await, StatusCode::NOT_FOUND);
    assert_eq!(register(&app, "maria").await.status(), StatusCode::CREATED);
}
