//! RecordStore port - 質問リストの正本（flat file）
//!
//! # 設計原則
//! - run 開始時に丸ごと読み、終了時に丸ごと書き戻す（差分更新はしない）
//! - 理解できないフィールドはそのまま書き戻す
//! - ロックはしない。同時実行されたら最後に書いた方が勝つ

use std::path::Path;

use async_trait::async_trait;

use crate::domain::{RecordSet, StoreError};

/// RecordStore は RecordSet を読み書きする
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read every record, in store order.
    async fn load(&self) -> Result<RecordSet, StoreError>;

    /// Replace the whole store with `records`.
    async fn save(&self, records: &RecordSet) -> Result<(), StoreError>;

    /// Where the store lives, for logs and reports.
    fn location(&self) -> &Path;
}
