//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュールで re-export し、フラットな API を提供
//! - ハンドラは薄く保つ。流入制御などの横断的関心事はミドルウェアが担う
//!
//! ## ハンドラ一覧
//!
//! - `health`: ヘルスチェック（liveness / readiness）
//! - `welcome`: プレースホルダールート

pub mod health;
pub mod welcome;

pub use health::{ReadinessState, health_check, readiness_check};
pub use welcome::welcome;
