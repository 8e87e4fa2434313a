//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部（record store ファイル, 生成サービス, 時計）への
//! インターフェースを提供し、実装の詳細を隠蔽します。

pub mod clock;
pub mod generator;
pub mod id_generator;
pub mod record_store;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::generator::Generator;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::record_store::RecordStore;
