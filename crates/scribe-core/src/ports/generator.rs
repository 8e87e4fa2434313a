//! Generator port - 文章生成サービス
//!
//! 生成サービスは「prompt を渡すと text が返る（または失敗する）」だけの
//! 不透明な依存として扱う。
//!
//! # 実装
//! - **GeminiGenerator**: 本番用（REST）
//! - **ScriptedGenerator**: テスト用（応答を事前に仕込む）

use async_trait::async_trait;

use crate::domain::GenerationError;

/// Generator turns a prompt into article text.
///
/// One call per record; the runner never has two calls in flight.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
