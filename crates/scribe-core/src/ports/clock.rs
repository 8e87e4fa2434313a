//! Clock port - 時刻の抽象化
//!
//! 「今日」の日付は quota とファイル名の両方を決めるので、
//! テストでは FixedClock に差し替える。

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Clock は現在時刻と今日の日付を提供
///
/// # テスト容易性
/// - trait により時刻を差し替え可能
/// - テストでは FixedClock を使用
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date used for quota and file names.
    fn today(&self) -> NaiveDate;
}

/// 本番用: OS の時計。日付はローカルタイムゾーンで決める。
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// テスト用: 常に同じ時刻を返す。日付は UTC で決める。
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }

    fn today(&self) -> NaiveDate {
        self.at.date_naive()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}
