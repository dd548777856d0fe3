//! # API サーバー設定
//!
//! 環境変数から API サーバーの設定を読み込む。

use std::{env, time::Duration};

use torii_domain::RateLimitPolicy;

/// デフォルトのウィンドウ長（15 分）
const DEFAULT_WINDOW_MS: u64 = 15 * 60 * 1000;

/// デフォルトのウィンドウあたり最大リクエスト数
const DEFAULT_MAX_REQUESTS: u32 = 100;

/// デフォルトの拒否メッセージ
const DEFAULT_MESSAGE: &str = "Too many requests, please try again later.";

/// API サーバーの設定
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// データベース接続 URL
    pub database_url: String,
    /// 流入制御ポリシー
    pub rate_limit: RateLimitPolicy,
}

impl ApiConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            host: env::var("TORII_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("TORII_PORT")
                .expect("TORII_PORT が設定されていません")
                .parse()
                .expect("TORII_PORT は有効なポート番号である必要があります"),
            database_url: env::var("DATABASE_URL")
                .expect("DATABASE_URL が設定されていません"),
            rate_limit: rate_limit_from_env(),
        })
    }
}

/// 環境変数から流入制御ポリシーを読み込む
///
/// すべて任意項目。未設定の場合は 15 分ウィンドウ・100 リクエストの
/// デフォルトを使う。
fn rate_limit_from_env() -> RateLimitPolicy {
    let window_ms = parse_window_ms(env::var("RATE_LIMIT_WINDOW_MS").ok().as_deref());
    let max_requests = parse_max_requests(env::var("RATE_LIMIT_MAX_REQUESTS").ok().as_deref());
    let message =
        env::var("RATE_LIMIT_MESSAGE").unwrap_or_else(|_| DEFAULT_MESSAGE.to_string());

    RateLimitPolicy::new(Duration::from_millis(window_ms), max_requests, message)
}

/// `RATE_LIMIT_WINDOW_MS` の値をパースする
fn parse_window_ms(value: Option<&str>) -> u64 {
    match value {
        Some(v) => v
            .parse()
            .expect("RATE_LIMIT_WINDOW_MS は正の整数（ミリ秒）である必要があります"),
        None => DEFAULT_WINDOW_MS,
    }
}

/// `RATE_LIMIT_MAX_REQUESTS` の値をパースする
fn parse_max_requests(value: Option<&str>) -> u32 {
    match value {
        Some(v) => v
            .parse()
            .expect("RATE_LIMIT_MAX_REQUESTS は正の整数である必要があります"),
        None => DEFAULT_MAX_REQUESTS,
    }
}

#[cfg(test)]
mod tests {
    // テスト間で環境変数の競合を避けるため、
    // パース関数に値を直接渡して検証する

    use super::*;

    #[test]
    fn test_window_ms_未設定のときデフォルト15分() {
        assert_eq!(parse_window_ms(None), 900_000);
    }

    #[test]
    fn test_window_ms_設定値をパースする() {
        assert_eq!(parse_window_ms(Some("1000")), 1000);
        assert_eq!(parse_window_ms(Some("60000")), 60_000);
    }

    #[test]
    fn test_max_requests_未設定のときデフォルト100() {
        assert_eq!(parse_max_requests(None), 100);
    }

    #[test]
    fn test_max_requests_設定値をパースする() {
        assert_eq!(parse_max_requests(Some("2")), 2);
        assert_eq!(parse_max_requests(Some("500")), 500);
    }
}
