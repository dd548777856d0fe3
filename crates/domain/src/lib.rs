//! # Torii ドメイン層
//!
//! このサーバーが自前で所有するロジック — リクエストの流入制御
//! （Admission Gate）— を定義する。
//!
//! ## 設計方針
//!
//! - HTTP やインフラの詳細には一切依存しない（axum への依存なし）。
//!   ミドルウェアへの組み込みは api クレートの責務
//! - 時刻は [`clock::Clock`] 経由で注入し、テストで決定的に制御できるようにする
//! - カウンタテーブルは明示的に所有・注入されるコンポーネントであり、
//!   モジュールレベルのシングルトンにしない
//!
//! ## 依存関係の方向
//!
//! ```text
//! api → domain
//! api → infra
//! api → shared
//! ```
//!
//! ドメイン層は他の内部クレートに依存しない。
//!
//! ## モジュール構成
//!
//! - [`admission`] - 流入制御ゲート（ポリシー、カウンタテーブル、判定）
//! - [`clock`] - 時刻プロバイダの抽象化

pub mod admission;
pub mod clock;

pub use admission::{AdmissionDecision, AdmissionGate, ClientWindow, RateLimitPolicy};
pub use clock::{Clock, FixedClock, SystemClock};
