//! # Torii インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理と接続確認
//!
//! ## 依存関係
//!
//! ```text
//! api → domain
//! api → infra
//! api → shared
//! ```
//!
//! インフラ層はドメイン層に依存しない。ドメイン層（流入制御）は
//! メモリ上で完結し、外部システムを必要としないため、両者は独立している。
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理

pub mod db;
