//! RunnerBuilder - PublishRunner の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 差し替え可能な ports（store / generator / clock）

use std::sync::Arc;

use crate::config::PublishConfig;
use crate::domain::{ConfigError, QuotaPolicy};
use crate::impls::open_store;
use crate::ports::{Clock, Generator, RecordStore, SystemClock, UlidGenerator};

use super::runner::PublishRunner;

/// RunnerBuilder は PublishRunner を構築
///
/// # 使用例
/// ```ignore
/// let runner = RunnerBuilder::new(config)
///     .generator(Arc::new(GeminiGenerator::new(&settings, key)?))
///     .build()?;
/// let report = runner.run().await?;
/// ```
///
/// # Fail-fast 設計
/// - build() 時に PublishConfig を検証する
/// - store を差し込まない場合は store ファイルの存在もここで確認する
/// - generator 無しでも build できる（status / dry run 用）。run() は NoGenerator で失敗する
pub struct RunnerBuilder {
    config: PublishConfig,
    store: Option<Box<dyn RecordStore>>,
    generator: Option<Arc<dyn Generator>>,
    clock: Option<Arc<dyn Clock>>,
    quota_override: Option<usize>,
}

impl RunnerBuilder {
    pub fn new(config: PublishConfig) -> Self {
        Self {
            config,
            store: None,
            generator: None,
            clock: None,
            quota_override: None,
        }
    }

    /// Use this store instead of the one named by the config.
    pub fn store(mut self, store: Box<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Fixed quota for this runner, replacing the configured policy.
    pub fn quota(mut self, n: usize) -> Self {
        self.quota_override = Some(n);
        self
    }

    pub fn build(self) -> Result<PublishRunner, ConfigError> {
        let store = match self.store {
            Some(store) => {
                self.config.validate_settings()?;
                store
            }
            None => {
                self.config.validate()?;
                open_store(&self.config)?
            }
        };

        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let quota = match self.quota_override {
            Some(n) => QuotaPolicy::fixed(n),
            None => self.config.quota,
        };

        Ok(PublishRunner {
            store,
            generator: self.generator,
            ids: UlidGenerator::new(clock.clone()),
            clock,
            quota,
            output_dir: self.config.output_dir,
            slug_max_len: self.config.slug_max_len,
        })
    }
}
