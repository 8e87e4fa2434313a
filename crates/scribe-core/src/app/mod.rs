//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **RunnerBuilder**: PublishRunner の構築とワイヤリング
//! - **PublishRunner**: 1 回分のバッチ（run / plan / status）
//! - **prompt**: 生成サービスへの指示文
//! - **status**: store の集計

pub mod builder;
pub mod prompt;
pub mod runner;
pub mod status;

// 主要な型を再エクスポート
pub use self::builder::RunnerBuilder;
pub use self::prompt::render_prompt;
pub use self::runner::{
    FailureKind, PlannedArticle, PublishRunner, RecordFailure, RunPlan, RunReport,
};
pub use self::status::{StatusReport, StoreCounts};
