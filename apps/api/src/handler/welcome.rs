//! # プレースホルダールート
//!
//! API のエントリーポイントとなる挨拶エンドポイント。
//! 業務ルートが追加されるまでの疎通確認用で、流入制御の対象となる。

use axum::Json;
use serde::Serialize;
use torii_shared::ApiResponse;

/// 挨拶レスポンス
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct WelcomeMessage {
    /// 挨拶文
    pub message: String,
}

/// プレースホルダーエンドポイント
#[utoipa::path(
    get,
    path = "/api",
    tag = "api",
    responses(
        (status = 200, description = "挨拶を返す", body = ApiResponse<WelcomeMessage>),
        (status = 429, description = "流入制御により拒否", body = torii_shared::ErrorResponse)
    )
)]
pub async fn welcome() -> Json<ApiResponse<WelcomeMessage>> {
    Json(ApiResponse::new(WelcomeMessage {
        message: "Thank you for visiting Torii API!".to_string(),
    }))
}
