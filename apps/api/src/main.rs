//! # Torii API サーバー
//!
//! 流入制御（レートリミット）を備えた API サーバーのブートストラップ。
//!
//! ## 役割
//!
//! 本バイナリは以下を束ねて HTTP リスナーを起動する:
//!
//! - **流入制御**: クライアント（送信元アドレス）ごとの固定ウィンドウカウンタで
//!   過剰なリクエストを 429 で拒否する
//! - **セキュリティヘッダー / CORS**: 全レスポンスへの標準ヘッダー付与
//! - **API ドキュメント**: OpenAPI 仕様を `/api-docs` で配信
//! - **リクエストログ**: Request ID 付きのトレースと完了サマリログ
//! - **データベース初期化**: リスナー起動前に接続プールを確立
//!
//! ## 環境変数
//!
//! ポート番号などは `.env` ファイルで設定できる。
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `TORII_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `TORII_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `RATE_LIMIT_WINDOW_MS` | No | 流入制御のウィンドウ長（デフォルト: 15 分） |
//! | `RATE_LIMIT_MAX_REQUESTS` | No | ウィンドウあたりの上限（デフォルト: 100） |
//! | `RATE_LIMIT_MESSAGE` | No | 拒否時のメッセージ |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（.env ファイルを使用）
//! cargo run -p torii-api
//!
//! # 本番環境（環境変数を直接指定）
//! TORII_PORT=3000 DATABASE_URL=postgres://... LOG_FORMAT=json cargo run -p torii-api --release
//! ```

mod config;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use config::ApiConfig;
use tokio::net::TcpListener;
use torii_api::{app_builder::build_app, handler::ReadinessState};
use torii_domain::{AdmissionGate, SystemClock};
use torii_infra::db;
use torii_shared::observability::{self, TracingConfig};

/// アイドルカウンタを破棄するエビクションタスクの実行間隔
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

/// API サーバーのエントリーポイント
///
/// 以下の順序で初期化を行う:
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. アプリケーション設定の読み込み
/// 4. データベース接続プールの作成（リスナー起動前に完了させる）
/// 5. 流入制御ゲートの構築とエビクションタスクの起動
/// 6. ルーターの構築
/// 7. HTTP サーバーの起動
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    // 本番環境では .env ファイルは使用せず、環境変数を直接設定する
    dotenvy::dotenv().ok();

    // トレーシング初期化
    let tracing_config = TracingConfig::from_env("api");
    observability::init_tracing(tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "api").entered();

    // 設定読み込み
    let config = ApiConfig::from_env().expect("設定の読み込みに失敗しました");

    tracing::info!("API サーバーを起動します: {}:{}", config.host, config.port);
    tracing::info!(
        "流入制御: {}ms あたり {} リクエストまで",
        config.rate_limit.window.as_millis(),
        config.rate_limit.max_requests
    );

    // データベース接続プールを作成（失敗した場合はリスナーを起動しない）
    let pool = match db::create_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(
                error.category = "infrastructure",
                error.kind = "database",
                "データベース初期化に失敗しました: {}",
                e
            );
            anyhow::bail!("database initialization failed: {e}");
        }
    };
    tracing::info!("データベース接続を確立しました");

    // 流入制御ゲートを構築し、アイドルカウンタのエビクションタスクを起動する
    let gate = Arc::new(AdmissionGate::new(
        config.rate_limit.clone(),
        Arc::new(SystemClock),
    ));
    spawn_eviction_task(gate.clone());

    let readiness_state = Arc::new(ReadinessState { pool });

    // ルーター構築
    let app = build_app(gate, readiness_state);

    // サーバー起動
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("アドレスのパースに失敗しました");

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("API サーバーが起動しました: {}", addr);

    // ConnectInfo でハンドラ・ミドルウェアから接続元アドレスを参照できるようにする
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// 満了済みカウンタを定期的に破棄するバックグラウンドタスクを起動する
///
/// ゲート自体は満了済みエントリを次のリクエストでリセットするため、
/// このタスクは正しさではなくメモリ使用量のためにある。
fn spawn_eviction_task(gate: Arc<AdmissionGate>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(EVICTION_INTERVAL);
        loop {
            interval.tick().await;
            let evicted = gate.evict_idle();
            if evicted > 0 {
                tracing::debug!(
                    evicted,
                    tracked = gate.tracked_clients(),
                    "アイドルカウンタを破棄しました"
                );
            }
        }
    });
}
