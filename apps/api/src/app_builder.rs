//! # アプリケーション構築
//!
//! State の初期化とルーター構築を担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。
//!
//! パイプラインはセキュリティヘッダー → CORS → API ドキュメント →
//! 流入制御 → ルート → リクエストログ → エラーハンドラの順に重ねる。
//! JSON の解析・生成は axum の extractor / `Json` が担うため、
//! 明示的なレイヤーは持たない。

use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use torii_domain::AdmissionGate;
use torii_shared::{
    canonical_log::CanonicalLogLineLayer,
    observability::{MakeRequestUuidV7, make_request_span},
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    error,
    handler::{ReadinessState, health_check, readiness_check, welcome},
    middleware::{RateLimitState, admission_middleware, set_security_headers},
    openapi,
};

/// ルーターを構築する
///
/// インフラ初期化済みの依存（流入制御ゲート、DB プール）を受け取り、
/// ルート → ミドルウェアの順に組み立てる。
pub fn build_app(gate: Arc<AdmissionGate>, readiness_state: Arc<ReadinessState>) -> Router {
    let rate_limit_state = RateLimitState { gate };

    Router::new()
        .route("/api", get(welcome))
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        // API ドキュメント（流入制御の対象外）
        .route("/api-docs", get(openapi::serve_openapi))
        // グローバルエラーハンドラ: 未定義ルートは 404 の Problem Details
        .fallback(error::fallback_not_found)
        // 流入制御: ビジネスロジック到達前に判定する。
        // /health*, /api-docs はスキップパス
        .layer(from_fn_with_state(rate_limit_state, admission_middleware))
        // CORS: 全オリジン許可
        .layer(cors_layer())
        // セキュリティヘッダー: 全レスポンスに付与
        .layer(from_fn(set_security_headers))
        // Request ID レイヤー（レイヤー順序が重要: 下に書いたものが外側）
        // 1. SetRequestIdLayer（最外）: リクエスト受信時に UUID v7 を生成（またはクライアント提供値を使用）
        // 2. TraceLayer: カスタムスパンに request_id を含め、全ログに自動注入
        // 3. CanonicalLogLineLayer: リクエスト完了時に1行サマリログを出力（スパン内）
        // 4. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CanonicalLogLineLayer)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}

/// CORS レイヤーを構築する
///
/// 全オリジン・全メソッド・全ヘッダーを許可する。
/// 認証情報（Cookie 等）を扱わないため許可制にはしない。
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
