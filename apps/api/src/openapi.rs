//! # OpenAPI 仕様定義
//!
//! utoipa を使用して API の OpenAPI 仕様を Rust の型から自動生成する。
//! `ApiDoc::openapi()` で OpenAPI ドキュメントを取得できる。
//!
//! ドキュメントは `/api-docs` で JSON として配信されるほか、
//! `generate-openapi` バイナリで YAML をファイルに書き出せる。

use axum::Json;
use utoipa::OpenApi;

use crate::handler::{health, welcome};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Torii API",
        version = "0.1.0",
        description = "流入制御（レートリミット）を備えた API サーバー基盤"
    ),
    paths(
        // health
        health::health_check,
        health::readiness_check,
        // api
        welcome::welcome,
    ),
    components(schemas(
        torii_shared::ErrorResponse,
    )),
    tags(
        (name = "health", description = "ヘルスチェック"),
        (name = "api", description = "API ルート"),
    )
)]
pub struct ApiDoc;

/// OpenAPI ドキュメントを JSON で返すハンドラ
///
/// `/api-docs` に配置する。流入制御の対象外（スキップパス）。
pub async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
