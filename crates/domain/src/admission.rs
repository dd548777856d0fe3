//! # 流入制御（Admission Gate）
//!
//! クライアントごとの固定ウィンドウカウンタに基づいて、リクエストを
//! 後段に転送するか 429 で拒否するかを判定するコンポーネント。
//!
//! ## 設計方針
//!
//! - カウンタテーブルは [`AdmissionGate`] が明示的に所有する。
//!   プロセス全体のシングルトンにせず、構築したインスタンスを
//!   ミドルウェアに注入する（テスト分離と複数インスタンス化のため）
//! - テーブルは検査可能な構造（クライアント識別子 → [`ClientWindow`]）として
//!   公開し、TTL エビクションと合わせて満了動作を決定的にテストできる
//! - 同一クライアントの並行リクエストはエントリ単位のロックで直列化される。
//!   上限間際の 2 リクエストが両方通過することはない
//! - 拒否は判定値であってエラーではない。この層から `Err` は発生しない

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::clock::Clock;

/// レート制限ポリシー
///
/// プロセス起動時に一度だけ構築される不変のレコード。
#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    /// ウィンドウ長
    pub window:       Duration,
    /// ウィンドウあたりの最大許可リクエスト数
    pub max_requests: u32,
    /// 拒否時にレスポンスへ載せるメッセージ
    pub message:      String,
}

impl RateLimitPolicy {
    /// 新しいポリシーを作成する
    pub fn new(window: Duration, max_requests: u32, message: String) -> Self {
        Self {
            window,
            max_requests,
            message,
        }
    }
}

/// クライアントごとのウィンドウカウンタ
///
/// 初回リクエストで遅延作成され、ウィンドウ内の各リクエストで加算される。
/// `count` は `now - window_start >= window` で 0 にリセットされる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientWindow {
    /// 現ウィンドウ内のリクエスト数（拒否されたリクエストも含む）
    pub count:        u32,
    /// 現ウィンドウの開始時刻
    pub window_start: DateTime<Utc>,
}

/// 流入判定の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// 許可。リクエストを後段に転送してよい
    Admitted {
        /// 現ウィンドウ内であと何リクエスト許可されるか
        remaining:   u32,
        /// 現ウィンドウが回転するまでの時間
        reset_after: Duration,
    },
    /// 拒否。429 とポリシーのメッセージで応答する
    Rejected {
        /// 現ウィンドウが回転するまでの時間（Retry-After に使用）
        retry_after: Duration,
    },
}

/// 流入制御ゲート
///
/// リクエストパス上で同期的に実行される。判定はメモリ上の操作のみで、
/// この中でサスペンドは発生しない。
pub struct AdmissionGate {
    policy:  RateLimitPolicy,
    clock:   Arc<dyn Clock>,
    windows: DashMap<String, ClientWindow>,
}

impl AdmissionGate {
    /// 新しいゲートを構築する
    pub fn new(policy: RateLimitPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            clock,
            windows: DashMap::new(),
        }
    }

    /// 適用中のポリシー
    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// クライアント `client_key` からのリクエスト 1 件を判定する
    ///
    /// 1. カウンタを検索し、なければ作成する
    /// 2. ウィンドウ満了（または時計の巻き戻り）ならリセットする
    /// 3. カウントを加算する
    /// 4. 上限超過なら拒否、そうでなければ許可
    ///
    /// 拒否されたリクエストもカウントに含まれる（加算が上限チェックより先）。
    /// ウィンドウ開始時刻は拒否によって延長されないため、ウィンドウが
    /// 回転すればクライアントは必ず回復する。
    pub fn check(&self, client_key: &str) -> AdmissionDecision {
        let now = self.clock.now();
        let window_ms = self.window_ms();

        // entry ガードを保持している間、同一キーの並行判定は直列化される
        let mut entry = self
            .windows
            .entry(client_key.to_string())
            .or_insert_with(|| ClientWindow {
                count:        0,
                window_start: now,
            });

        // 経過時間が負（時計の巻き戻り）の場合もウィンドウ満了として扱う。
        // 恒久的なロックアウトを防ぐ
        let elapsed_ms = now
            .signed_duration_since(entry.window_start)
            .num_milliseconds();
        if !(0..window_ms).contains(&elapsed_ms) {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count = entry.count.saturating_add(1);

        let elapsed_in_window = now
            .signed_duration_since(entry.window_start)
            .num_milliseconds();
        let reset_after = Duration::from_millis((window_ms - elapsed_in_window).max(0) as u64);

        if entry.count > self.policy.max_requests {
            AdmissionDecision::Rejected {
                retry_after: reset_after,
            }
        } else {
            AdmissionDecision::Admitted {
                remaining: self.policy.max_requests - entry.count,
                reset_after,
            }
        }
    }

    /// 満了済みカウンタを破棄し、破棄した件数を返す
    ///
    /// 満了済みエントリは次のリクエストでいずれにせよリセットされるため、
    /// 破棄してもカウントの正しさには影響しない。バックグラウンドタスクから
    /// 定期的に呼び出されることを想定している。
    pub fn evict_idle(&self) -> usize {
        let now = self.clock.now();
        let window_ms = self.window_ms();

        let before = self.windows.len();
        self.windows.retain(|_, window| {
            let elapsed_ms = now
                .signed_duration_since(window.window_start)
                .num_milliseconds();
            (0..window_ms).contains(&elapsed_ms)
        });
        before.saturating_sub(self.windows.len())
    }

    /// 追跡中のクライアント数
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// クライアントの現在のカウンタを返す（検査用）
    pub fn window_of(&self, client_key: &str) -> Option<ClientWindow> {
        self.windows.get(client_key).map(|r| r.value().clone())
    }

    fn window_ms(&self) -> i64 {
        self.policy.window.as_millis().try_into().unwrap_or(i64::MAX)
    }
}
