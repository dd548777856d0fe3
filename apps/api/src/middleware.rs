//! # ミドルウェア
//!
//! API サーバー用のミドルウェアを提供する。

mod rate_limit;
mod security_headers;

pub use rate_limit::{RateLimitState, admission_middleware};
pub use security_headers::set_security_headers;
