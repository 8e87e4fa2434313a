//! ScriptedGenerator - テスト用の生成器
//!
//! # 学習ポイント
//! - 応答を事前に仕込んでおき、受け取った prompt を記録する
//! - 特定の文字列を含む prompt だけ失敗させられる（失敗の隔離テスト用）

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::GenerationError;
use crate::ports::Generator;

pub struct ScriptedGenerator {
    reply: String,
    fail_on: Vec<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    /// Always answer with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            fail_on: Vec::new(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fail every prompt containing `fragment`.
    pub fn fail_when(mut self, fragment: impl Into<String>) -> Self {
        self.fail_on.push(fragment.into());
        self
    }

    /// Prompts received so far, in call order (failed calls included).
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    pub async fn calls(&self) -> usize {
        self.prompts.lock().await.len()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().await.push(prompt.to_string());

        if let Some(fragment) = self.fail_on.iter().find(|f| prompt.contains(f.as_str())) {
            return Err(GenerationError::Unavailable(format!(
                "scripted failure for {fragment:?}"
            )));
        }
        Ok(self.reply.clone())
    }
}
