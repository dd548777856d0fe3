//! # API エラーハンドリング
//!
//! エラーレスポンスへの変換と、未定義ルートのフォールバックハンドラを集約する。
//!
//! すべてのエラーボディは [`torii_shared::ErrorResponse`]（RFC 9457 Problem
//! Details）で統一する。shared クレートは axum に依存しないため、
//! `IntoResponse` への変換はこのモジュールの責務となる。

use axum::{
    Json,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use torii_shared::ErrorResponse;

// --- レスポンスヘルパー ---

/// 404 Not Found レスポンス
pub fn not_found_response(detail: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::not_found(detail)),
    )
        .into_response()
}

/// 内部エラーレスポンス
pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::internal_error()),
    )
        .into_response()
}

// --- フォールバックハンドラ ---

/// 未定義ルートのフォールバックハンドラ
///
/// どのルートにも一致しなかったリクエストを 404 の Problem Details で
/// 応答する。到達したパスはログに残す。
pub async fn fallback_not_found(uri: Uri) -> Response {
    tracing::debug!(path = %uri.path(), "未定義ルートへのリクエスト");
    not_found_response("リクエストされたリソースは存在しません")
}
