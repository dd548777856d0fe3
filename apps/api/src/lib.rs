//! # Torii API ライブラリ
//!
//! API サーバーのコアモジュール。
//!
//! ## モジュール構成
//!
//! - `app_builder`: ルーターとミドルウェアスタックの構築
//! - `error`: エラーレスポンスへの変換とフォールバックハンドラ
//! - `handler`: HTTP ハンドラ
//! - `middleware`: ミドルウェア（流入制御、セキュリティヘッダー）
//! - `openapi`: OpenAPI 仕様定義

pub mod app_builder;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod openapi;
