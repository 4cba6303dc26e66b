use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use tourney_link::{
    config::AppConfig, dao::lookup::NoopLookup, ipc::FileChannel, routes, state::AppState,
};

fn app(outbound_sync: bool) -> Router {
    let root = std::env::temp_dir().join(format!("tourney-link-{}", Uuid::new_v4()));
    let config = AppConfig {
        ipc_root: root.clone(),
        outbound_sync,
        ..AppConfig::default()
    };
    let channel = FileChannel::new(root, Duration::from_millis(5)).unwrap();
    routes::router(AppState::new(config, channel, Arc::new(NoopLookup)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn finals() -> Value {
    json!({
        "round": {
            "name": "Finals",
            "ban_count": 1,
            "beatmaps": [
                {"id": 101, "mods": "NM"},
                {"id": 102, "mods": "NM"},
                {"id": 201, "mods": "HD"},
                {"id": 901, "mods": "TB"}
            ]
        }
    })
}

#[tokio::test]
async fn apply_and_undo_round_trip() {
    let app = app(true);
    let (status, loaded) = send(&app, Method::PUT, "/match", Some(finals())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded["round"]["beatmaps"][1]["slot_name"], "NM2");

    let choice = json!({"beatmap_id": 101, "team": "red", "kind": "ban"});
    let (status, applied) = send(&app, Method::POST, "/match/choices", Some(choice.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(applied["picks_bans"].as_array().unwrap().len(), 1);
    assert!(applied["version"].as_u64() > loaded["version"].as_u64());

    let (status, _) = send(&app, Method::POST, "/match/choices", Some(choice)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, undone) = send(&app, Method::DELETE, "/match/choices/101", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(undone["picks_bans"].as_array().unwrap().is_empty());

    let (status, _) = send(&app, Method::DELETE, "/match/choices/101", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn choices_outside_the_pool_are_rejected() {
    let app = app(true);
    let choice = json!({"beatmap_id": 101});
    let (status, _) = send(&app, Method::POST, "/match/choices", Some(choice.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    send(&app, Method::PUT, "/match", Some(finals())).await;
    let (status, _) = send(&app, Method::POST, "/match/choices", Some(json!({"beatmap_id": 555}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, snapshot) = send(&app, Method::POST, "/match/choices", Some(choice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["picks_bans"][0]["team"], "red");
    assert_eq!(snapshot["picks_bans"][0]["kind"], "ban");
    assert_eq!(snapshot["mode"]["team"], "blue");
}

#[tokio::test]
async fn invalid_round_is_a_bad_request() {
    let app = app(true);
    let body = json!({"round": {"name": "", "beatmaps": [{"id": 1, "mods": "nm"}]}});
    let (status, _) = send(&app, Method::PUT, "/match", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scores_and_winner_overrides() {
    let app = app(true);
    send(&app, Method::PUT, "/match", Some(finals())).await;

    let (status, snapshot) = send(
        &app,
        Method::PUT,
        "/match/scores/NM1",
        Some(json!({"red": 500000, "blue": 400000})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["map_scores"]["NM1"], json!([500000, 400000]));

    let (status, _) = send(
        &app,
        Method::PUT,
        "/match/scores/DT9",
        Some(json!({"red": 1, "blue": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/match/sets/7/winner",
        Some(json!({"winner": "blue"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inbound_sync_toggle_is_reflected() {
    let app = app(true);
    let (status, body) = send(&app, Method::PUT, "/sync/inbound", Some(json!({"enabled": false}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabled"], false);

    let (_, inbound) = send(&app, Method::GET, "/inbound", None).await;
    assert_eq!(inbound["enabled"], false);
    assert_eq!(inbound["beatmap_id"], -1);
}

#[tokio::test]
async fn client_feed_is_refused_without_outbound_sync() {
    let app = app(false);
    let (status, _) = send(&app, Method::PUT, "/client/phase", Some(json!({"phase": "playing"}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let app = self::app(true);
    let (status, body) = send(&app, Method::PUT, "/client/phase", Some(json!({"phase": "playing"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "playing");
}

#[tokio::test]
async fn healthcheck_reports_reachable_ipc_root() {
    let app = app(true);
    let (status, body) = send(&app, Method::GET, "/healthcheck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["ipc_reachable"], true);
}
