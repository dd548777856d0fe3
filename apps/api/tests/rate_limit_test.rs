//! # 流入制御ミドルウェアのテスト
//!
//! 流入制御ミドルウェアが HTTP パイプライン上で正しく動作することを検証する。
//!
//! - ウィンドウ内の許可数が上限で頭打ちになり、超過分は 429 になる
//! - ウィンドウ満了後は再び許可される
//! - 拒否レスポンスに設定済みメッセージと Retry-After が含まれる
//! - スキップパスは制限されない
//!
//! 時刻は `FixedClock` で注入し、ウィンドウ満了を決定的に再現する。

use std::{sync::Arc, time::Duration};

use axum::{
    Json,
    Router,
    body::{Body, to_bytes},
    middleware::from_fn_with_state,
    response::Response,
    routing::get,
};
use chrono::{TimeDelta, Utc};
use http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use torii_api::middleware::{RateLimitState, admission_middleware};
use torii_domain::{AdmissionGate, FixedClock, RateLimitPolicy};
use tower::ServiceExt;

const REJECTION_MESSAGE: &str = "Too many requests, please try again later.";

/// テスト用の最小限ルーターを構築する
///
/// main.rs と同じ構成のうち、流入制御に関係する部分のみを再現する。
fn test_app(gate: Arc<AdmissionGate>) -> Router {
    Router::new()
        .route(
            "/api",
            get(|| async { Json(serde_json::json!({"data": {"message": "ok"}})) }),
        )
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({"status": "healthy"})) }),
        )
        .layer(from_fn_with_state(RateLimitState { gate }, admission_middleware))
}

fn make_gate(window_ms: u64, max_requests: u32) -> (Arc<FixedClock>, Arc<AdmissionGate>) {
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let gate = Arc::new(AdmissionGate::new(
        RateLimitPolicy::new(
            Duration::from_millis(window_ms),
            max_requests,
            REJECTION_MESSAGE.to_string(),
        ),
        clock.clone(),
    ));
    (clock, gate)
}

/// 指定クライアントからのリクエストを 1 件送る
async fn send_from(app: &Router, path: &str, client: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(path)
                .header("x-forwarded-for", client)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn error_detail(response: Response) -> String {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    json["detail"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn test_ウィンドウ内は上限まで200でそれ以降429になる() {
    // window=1000ms, max=2 で t=0/10/20ms に 3 リクエスト → 200, 200, 429
    let (clock, gate) = make_gate(1000, 2);
    let app = test_app(gate);

    assert_eq!(send_from(&app, "/api", "203.0.113.1").await.status(), StatusCode::OK);
    clock.advance(TimeDelta::milliseconds(10));
    assert_eq!(send_from(&app, "/api", "203.0.113.1").await.status(), StatusCode::OK);
    clock.advance(TimeDelta::milliseconds(10));
    assert_eq!(
        send_from(&app, "/api", "203.0.113.1").await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    // t=1050ms（ウィンドウ満了後）は再び 200
    clock.advance(TimeDelta::milliseconds(1030));
    assert_eq!(send_from(&app, "/api", "203.0.113.1").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_バースト100件は全て200で101件目が429になる() {
    let (_clock, gate) = make_gate(60_000, 100);
    let app = test_app(gate);

    for i in 0..100 {
        let response = send_from(&app, "/api", "203.0.113.2").await;
        assert_eq!(response.status(), StatusCode::OK, "{}件目は 200 であること", i + 1);
    }

    let response = send_from(&app, "/api", "203.0.113.2").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(error_detail(response).await, REJECTION_MESSAGE);
}

#[tokio::test]
async fn test_別クライアントは互いのカウンタに影響しない() {
    let (_clock, gate) = make_gate(1000, 1);
    let app = test_app(gate);

    assert_eq!(send_from(&app, "/api", "203.0.113.3").await.status(), StatusCode::OK);
    assert_eq!(
        send_from(&app, "/api", "203.0.113.3").await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    // 別クライアントは独立したカウンタを持つ
    assert_eq!(send_from(&app, "/api", "203.0.113.4").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_拒否レスポンスにメッセージとretry_afterが含まれる() {
    let (_clock, gate) = make_gate(1000, 1);
    let app = test_app(gate);

    send_from(&app, "/api", "203.0.113.5").await;
    let response = send_from(&app, "/api", "203.0.113.5").await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after = response
        .headers()
        .get("retry-after")
        .expect("Retry-After ヘッダーが含まれること")
        .to_str()
        .unwrap()
        .parse::<u64>()
        .unwrap();
    assert!(retry_after >= 1, "再試行までの秒数は切り上げで 1 以上になること");
    assert_eq!(
        response.headers().get("ratelimit-remaining").unwrap(),
        "0"
    );
    assert_eq!(error_detail(response).await, REJECTION_MESSAGE);
}

#[tokio::test]
async fn test_許可レスポンスにratelimitヘッダーが付与される() {
    let (_clock, gate) = make_gate(60_000, 5);
    let app = test_app(gate);

    let response = send_from(&app, "/api", "203.0.113.6").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("ratelimit-limit").unwrap(), "5");
    assert_eq!(response.headers().get("ratelimit-remaining").unwrap(), "4");
    assert!(response.headers().contains_key("ratelimit-reset"));
}

#[tokio::test]
async fn test_スキップパスは上限を超えても制限されない() {
    let (_clock, gate) = make_gate(1000, 1);
    let app = test_app(gate);

    // /health は上限（1 件）をはるかに超えてもすべて 200
    for _ in 0..10 {
        assert_eq!(
            send_from(&app, "/health", "203.0.113.7").await.status(),
            StatusCode::OK
        );
    }

    // スキップパスへのアクセスは /api のカウンタを消費しない
    assert_eq!(send_from(&app, "/api", "203.0.113.7").await.status(), StatusCode::OK);
}
