//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **CsvRecordStore / JsonRecordStore**: flat file の record store
//! - **GeminiGenerator**: 本番用の生成サービスクライアント
//! - **ScriptedGenerator**: テスト用の生成器

mod fs;

pub mod csv_store;
pub mod gemini;
pub mod json_store;
pub mod scripted;

// 主要な型を再エクスポート
pub use self::csv_store::CsvRecordStore;
pub use self::gemini::GeminiGenerator;
pub use self::json_store::JsonRecordStore;
pub use self::scripted::ScriptedGenerator;

use crate::config::{PublishConfig, StoreFormat};
use crate::domain::ConfigError;
use crate::ports::RecordStore;

/// Pick the store implementation for the configured path and format.
pub fn open_store(config: &PublishConfig) -> Result<Box<dyn RecordStore>, ConfigError> {
    let path = config.store_path.clone();
    let layout = config.layout.clone();
    let store: Box<dyn RecordStore> = match config.resolved_store_format()? {
        StoreFormat::Csv => Box::new(CsvRecordStore::new(path, layout, config.status_fill)),
        StoreFormat::Json => Box::new(JsonRecordStore::new(path, layout, config.status_fill)),
    };
    Ok(store)
}
