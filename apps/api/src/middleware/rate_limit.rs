//! # 流入制御ミドルウェア
//!
//! [`torii_domain::AdmissionGate`] を axum のリクエストパイプラインに
//! 組み込むアダプタ。ゲート本体の判定ロジックは domain クレートにあり、
//! このモジュールはクライアント識別・スキップパス・レスポンス変換のみを担う。
//!
//! ## レスポンスヘッダー
//!
//! 判定結果は draft RateLimit ヘッダーとしてレスポンスに載せる:
//!
//! - `RateLimit-Limit`: ウィンドウあたりの上限
//! - `RateLimit-Remaining`: 現ウィンドウの残り許可数
//! - `RateLimit-Reset`: ウィンドウ回転までの秒数
//! - `Retry-After`: 拒否時のみ。再試行までの秒数

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{
        HeaderMap, HeaderName, HeaderValue, Request, StatusCode,
        header::RETRY_AFTER,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use torii_domain::{AdmissionDecision, AdmissionGate};
use torii_shared::ErrorResponse;

/// 流入制御をスキップするパス（運用系エンドポイントと API ドキュメント）
const RATE_LIMIT_SKIP_PATHS: &[&str] = &["/health", "/health/ready", "/api-docs"];

const LIMIT_HEADER: HeaderName = HeaderName::from_static("ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RESET_HEADER: HeaderName = HeaderName::from_static("ratelimit-reset");

/// 流入制御ミドルウェアの状態
#[derive(Clone)]
pub struct RateLimitState {
    pub gate: Arc<AdmissionGate>,
}

/// 流入制御をスキップするパスかどうか
fn should_skip_rate_limit(path: &str) -> bool {
    RATE_LIMIT_SKIP_PATHS.contains(&path)
}

/// クライアント識別子を決定する
///
/// プロキシ背後での運用を考慮し、`X-Forwarded-For` の先頭ホップを優先する。
/// ヘッダーがなければ接続元アドレスを使う。
fn client_key(request: &Request<Body>) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// 秒単位に切り上げる（Retry-After / RateLimit-Reset 用）
fn ceil_secs(duration: Duration) -> u64 {
    duration.as_millis().div_ceil(1000) as u64
}

fn set_rate_limit_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset: Duration) {
    headers.insert(LIMIT_HEADER, HeaderValue::from(limit));
    headers.insert(REMAINING_HEADER, HeaderValue::from(remaining));
    headers.insert(RESET_HEADER, HeaderValue::from(ceil_secs(reset)));
}

/// 拒否レスポンスを構築する
///
/// ステータス 429、ボディはポリシーの拒否メッセージを detail に載せた
/// Problem Details。
fn rejected_response(gate: &AdmissionGate, retry_after: Duration) -> Response {
    let policy = gate.policy();
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse::too_many_requests(policy.message.clone())),
    )
        .into_response();

    let headers = response.headers_mut();
    set_rate_limit_headers(headers, policy.max_requests, 0, retry_after);
    headers.insert(RETRY_AFTER, HeaderValue::from(ceil_secs(retry_after)));

    response
}

/// 流入制御ミドルウェア
///
/// ビジネスロジックに到達する前にリクエストパス上で同期的に実行される。
/// 拒否はここで完結し、後段には一切伝播しない。
pub async fn admission_middleware(
    State(state): State<RateLimitState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if should_skip_rate_limit(request.uri().path()) {
        return next.run(request).await;
    }

    let key = client_key(&request);
    let limit = state.gate.policy().max_requests;

    match state.gate.check(&key) {
        AdmissionDecision::Admitted {
            remaining,
            reset_after,
        } => {
            let mut response = next.run(request).await;
            set_rate_limit_headers(response.headers_mut(), limit, remaining, reset_after);
            response
        }
        AdmissionDecision::Rejected { retry_after } => {
            tracing::warn!(client = %key, "流入制御によりリクエストを拒否しました");
            rejected_response(&state.gate, retry_after)
        }
    }
}
