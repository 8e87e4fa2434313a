//! PublishRunner - 1 回分のバッチ実行
//!
//! # フロー
//! 1. Clock から今日の日付 → QuotaPolicy で quota を決める
//! 2. RecordStore::load() で全レコードを読む（失敗は fatal）
//! 3. store の順に走査。Published は数えずに飛ばす。quota に達したら止める
//! 4. prompt を組み立てて Generator を呼ぶ
//! 5. fence を剥がしてファイルに書く
//! 6. 成功したレコードだけ Published にする
//! 7. RecordStore::save() で丸ごと書き戻す
//!
//! 4-5 の失敗はそのレコードだけの失敗。Pending のまま残り、次の run で再挑戦される。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::{Instrument, error, info, info_span, warn};

use super::prompt::render_prompt;
use super::status::{StatusReport, StoreCounts};
use crate::domain::{
    Article, GenerationError, PublishError, QuotaPolicy, RunId, WriteError, article_file_name,
};
use crate::ports::{Clock, Generator, IdGenerator, RecordStore, UlidGenerator};

/// Characters of the question shown in progress lines.
const PREVIEW_LEN: usize = 40;

/// Why a single record was not published this run.
#[derive(Debug, Error)]
enum RecordError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Generation,
    Write,
}

/// A record that stayed `Pending` because of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    /// Position in the store (0-based).
    pub index: usize,
    pub question: String,
    pub kind: FailureKind,
    pub error: String,
}

/// Result of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub date: NaiveDate,
    pub quota: usize,
    pub processed: usize,
    /// Published records passed over before the run stopped.
    pub skipped_published: usize,
    pub failures: Vec<RecordFailure>,
    pub written: Vec<PathBuf>,
}

impl RunReport {
    fn new(run_id: RunId, date: NaiveDate, quota: usize) -> Self {
        Self {
            run_id,
            date,
            quota,
            processed: 0,
            skipped_published: 0,
            failures: Vec::new(),
            written: Vec::new(),
        }
    }
}

/// One article a run would write today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedArticle {
    pub index: usize,
    pub question: String,
    pub file_name: String,
}

/// What `run` would do today if every generation succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunPlan {
    pub date: NaiveDate,
    pub quota: usize,
    pub articles: Vec<PlannedArticle>,
}

/// Runs the publish batch. Built by `RunnerBuilder`.
pub struct PublishRunner {
    pub(crate) store: Box<dyn RecordStore>,
    pub(crate) generator: Option<Arc<dyn Generator>>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: UlidGenerator<Arc<dyn Clock>>,
    pub(crate) quota: QuotaPolicy,
    pub(crate) output_dir: PathBuf,
    pub(crate) slug_max_len: usize,
}

impl PublishRunner {
    pub fn store_location(&self) -> &Path {
        self.store.location()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Today's quota.
    pub fn quota_today(&self) -> usize {
        self.quota.quota_for(self.clock.today())
    }

    /// Run the batch once.
    ///
    /// Only startup and store errors are returned; per-record failures are
    /// logged and listed in the report.
    pub async fn run(&self) -> Result<RunReport, PublishError> {
        let generator = self.generator.as_ref().ok_or(PublishError::NoGenerator)?;
        let run_id = self.ids.generate_run_id();
        let span = info_span!("publish_run", run_id = %run_id);
        self.run_with(&**generator, run_id)
            .instrument(span)
            .await
    }

    async fn run_with(
        &self,
        generator: &dyn Generator,
        run_id: RunId,
    ) -> Result<RunReport, PublishError> {
        let date = self.clock.today();
        let quota = self.quota.quota_for(date);
        info!(%date, quota, "today's target");

        let mut records = self.store.load().await?;
        info!(
            store = %self.store.location().display(),
            records = records.len(),
            "loaded record store"
        );

        let mut report = RunReport::new(run_id, date, quota);
        for (index, record) in records.records.iter_mut().enumerate() {
            if report.processed >= quota {
                break;
            }
            if record.is_published() {
                report.skipped_published += 1;
                continue;
            }
            if !record.is_eligible() {
                warn!(row = index + 1, "skipping record without a question");
                continue;
            }

            info!(question = %preview(&record.question), "generating");
            match self.publish_one(generator, date, &record.question).await {
                Ok(path) => {
                    record.mark_published();
                    report.processed += 1;
                    info!(path = %path.display(), "published");
                    report.written.push(path);
                }
                Err(err) => {
                    error!(question = %preview(&record.question), error = %err, "record failed");
                    report.failures.push(RecordFailure {
                        index,
                        question: record.question.clone(),
                        kind: match err {
                            RecordError::Generation(_) => FailureKind::Generation,
                            RecordError::Write(_) => FailureKind::Write,
                        },
                        error: err.to_string(),
                    });
                }
            }
        }

        self.store.save(&records).await?;
        info!(
            processed = report.processed,
            failed = report.failures.len(),
            skipped_published = report.skipped_published,
            "run finished"
        );
        Ok(report)
    }

    async fn publish_one(
        &self,
        generator: &dyn Generator,
        date: NaiveDate,
        question: &str,
    ) -> Result<PathBuf, RecordError> {
        let prompt = render_prompt(question, date);
        let generated = generator.generate(&prompt).await?;
        let article = Article::new(date, question, &generated, self.slug_max_len);
        if article.content.trim().is_empty() {
            return Err(GenerationError::EmptyResponse.into());
        }
        let path = write_article(&self.output_dir, &article).await?;
        Ok(path)
    }

    /// What a run would pick today, without generating or writing anything.
    pub async fn plan(&self) -> Result<RunPlan, PublishError> {
        let date = self.clock.today();
        let quota = self.quota.quota_for(date);
        let records = self.store.load().await?;

        let articles = records
            .pending_indices(quota)
            .into_iter()
            .map(|index| {
                let question = records.records[index].question.clone();
                PlannedArticle {
                    index,
                    file_name: article_file_name(date, &question, self.slug_max_len),
                    question,
                }
            })
            .collect();

        Ok(RunPlan {
            date,
            quota,
            articles,
        })
    }

    /// Counts for the store plus today's quota.
    pub async fn status(&self) -> Result<StatusReport, PublishError> {
        let date = self.clock.today();
        let records = self.store.load().await?;
        Ok(StatusReport {
            store: self.store.location().to_path_buf(),
            date,
            quota: self.quota.quota_for(date),
            counts: StoreCounts::from_records(&records),
        })
    }
}

/// Write the whole article in one shot, replacing any file of the same name.
async fn write_article(dir: &Path, article: &Article) -> Result<PathBuf, WriteError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| WriteError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

    let path = dir.join(&article.file_name);
    tokio::fs::write(&path, article.content.as_bytes())
        .await
        .map_err(|source| WriteError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

fn preview(question: &str) -> String {
    let mut chars = question.trim().chars();
    let head: String = chars.by_ref().take(PREVIEW_LEN).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::RunnerBuilder;
    use crate::config::PublishConfig;
    use crate::domain::StoreError;
    use crate::impls::ScriptedGenerator;
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};

    const ARTICLE: &str = "```markdown\n---\nlayout: post\n---\n# Body\n```";

    struct Fixture {
        dir: tempfile::TempDir,
        generator: Arc<ScriptedGenerator>,
    }

    impl Fixture {
        fn new(store: &str) -> Self {
            Self::with_generator(store, ScriptedGenerator::new(ARTICLE))
        }

        fn with_generator(store: &str, generator: ScriptedGenerator) -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("questions.csv"), store).unwrap();
            Self {
                dir,
                generator: Arc::new(generator),
            }
        }

        fn store_path(&self) -> PathBuf {
            self.dir.path().join("questions.csv")
        }

        fn posts_dir(&self) -> PathBuf {
            self.dir.path().join("_posts")
        }

        fn config(&self) -> PublishConfig {
            PublishConfig {
                store_path: self.store_path(),
                output_dir: self.posts_dir(),
                ..PublishConfig::default()
            }
        }

        fn runner(&self, quota: usize) -> PublishRunner {
            self.runner_with(self.config(), quota)
        }

        fn runner_with(&self, config: PublishConfig, quota: usize) -> PublishRunner {
            RunnerBuilder::new(config)
                .generator(self.generator.clone())
                .clock(Arc::new(FixedClock::new(
                    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
                )))
                .quota(quota)
                .build()
                .unwrap()
        }

        fn store_text(&self) -> String {
            std::fs::read_to_string(self.store_path()).unwrap()
        }

        fn posts(&self) -> Vec<String> {
            let Ok(entries) = std::fs::read_dir(self.posts_dir()) else {
                return Vec::new();
            };
            let mut names: Vec<String> = entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        }
    }

    #[tokio::test]
    async fn quota_bounds_published_records_in_store_order() {
        let fx = Fixture::new("Question,Status\nWhat is DNS?,\nWhat is BGP?,\nWhat is TCP?,\nWhat is UDP?,\n");

        let report = fx.runner(2).run().await.unwrap();

        assert_eq!(report.processed, 2);
        assert_eq!(report.quota, 2);
        assert_eq!(
            fx.store_text(),
            "Question,Status\nWhat is DNS?,Published\nWhat is BGP?,Published\nWhat is TCP?,\nWhat is UDP?,\n"
        );
        assert_eq!(
            fx.posts(),
            vec!["2024-01-01-what-is-bgp.md", "2024-01-01-what-is-dns.md"]
        );
        assert_eq!(fx.generator.calls().await, 2);
    }

    #[tokio::test]
    async fn published_records_are_skipped_and_not_counted() {
        let fx = Fixture::new(
            "Question,Status\nWhat is DNS?,Published\nWhat is BGP?,\nWhat is TCP?,Published\nWhat is UDP?,\n",
        );

        let report = fx.runner(1).run().await.unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(report.skipped_published, 1);
        let prompts = fx.generator.prompts().await;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("What is BGP?"));
        assert!(!prompts.iter().any(|p| p.contains("What is DNS?")));
        assert_eq!(fx.posts(), vec!["2024-01-01-what-is-bgp.md"]);
        assert!(fx.store_text().contains("What is UDP?,\n"));
    }

    #[tokio::test]
    async fn generation_failure_is_isolated() {
        let fx = Fixture::with_generator(
            "Question,Status\nWhat is DNS?,\nWhat is BGP?,\nWhat is TCP?,\n",
            ScriptedGenerator::new(ARTICLE).fail_when("What is BGP?"),
        );

        let report = fx.runner(2).run().await.unwrap();

        assert_eq!(report.processed, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[0].kind, FailureKind::Generation);
        assert_eq!(
            fx.store_text(),
            "Question,Status\nWhat is DNS?,Published\nWhat is BGP?,\nWhat is TCP?,Published\n"
        );
        assert_eq!(
            fx.posts(),
            vec!["2024-01-01-what-is-dns.md", "2024-01-01-what-is-tcp.md"]
        );
    }

    #[tokio::test]
    async fn second_run_is_a_no_op() {
        let fx = Fixture::new("Question,Status\nWhat is DNS?,\nWhat is BGP?,Published\n");

        let first = fx.runner(4).run().await.unwrap();
        assert_eq!(first.processed, 1);
        let store_after_first = fx.store_text();
        let posts_after_first = fx.posts();

        let second = fx.runner(4).run().await.unwrap();

        assert_eq!(second.processed, 0);
        assert!(second.written.is_empty());
        assert_eq!(fx.store_text(), store_after_first);
        assert_eq!(fx.posts(), posts_after_first);
        assert_eq!(fx.generator.calls().await, 1);
    }

    #[tokio::test]
    async fn written_file_has_fences_stripped() {
        let fx = Fixture::new("Question,Status\nWhat is a Load Balancer?,\n");

        let report = fx.runner(1).run().await.unwrap();

        let path = &report.written[0];
        assert_eq!(path, &fx.posts_dir().join("2024-01-01-what-is-a-load-balancer.md"));
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "---\nlayout: post\n---\n# Body");
    }

    #[tokio::test]
    async fn empty_article_keeps_record_pending() {
        let fx = Fixture::with_generator(
            "Question,Status\nWhat is DNS?,\n",
            ScriptedGenerator::new("```markdown\n```"),
        );

        let report = fx.runner(1).run().await.unwrap();

        assert_eq!(report.processed, 0);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, FailureKind::Generation);
        assert!(fx.posts().is_empty());
        assert_eq!(fx.store_text(), "Question,Status\nWhat is DNS?,\n");
    }

    #[tokio::test]
    async fn write_failure_keeps_record_pending() {
        let fx = Fixture::new("Question,Status\nWhat is DNS?,\nWhat is BGP?,\n");
        // a plain file where the output directory should be
        let blocked = fx.dir.path().join("blocked");
        std::fs::write(&blocked, "").unwrap();
        let config = PublishConfig {
            output_dir: blocked,
            ..fx.config()
        };

        let report = fx.runner_with(config, 2).run().await.unwrap();

        assert_eq!(report.processed, 0);
        assert_eq!(report.failures.len(), 2);
        assert!(report.failures.iter().all(|f| f.kind == FailureKind::Write));
        assert_eq!(
            fx.store_text(),
            "Question,Status\nWhat is DNS?,\nWhat is BGP?,\n"
        );
    }

    #[tokio::test]
    async fn status_column_is_added_when_store_has_none() {
        let fx = Fixture::new("Question,Level\nWhat is DNS?,Junior\nWhat is BGP?,Senior\n");

        fx.runner(1).run().await.unwrap();

        assert_eq!(
            fx.store_text(),
            "Question,Level,Status\nWhat is DNS?,Junior,Published\nWhat is BGP?,Senior,\n"
        );
    }

    #[tokio::test]
    async fn missing_store_is_fatal() {
        let fx = Fixture::new("Question,Status\n");
        let runner = fx.runner(1);
        std::fs::remove_file(fx.store_path()).unwrap();

        let err = runner.run().await.unwrap_err();

        assert!(matches!(err, PublishError::Store(StoreError::NotFound(_))));
        assert_eq!(fx.generator.calls().await, 0);
    }

    #[tokio::test]
    async fn blank_questions_are_left_alone() {
        let fx = Fixture::new("Question,Status\n,\nWhat is DNS?,\n");

        let report = fx.runner(1).run().await.unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(fx.store_text(), "Question,Status\n,\nWhat is DNS?,Published\n");
    }

    #[tokio::test]
    async fn zero_quota_touches_nothing() {
        let fx = Fixture::new("Question,Status\nWhat is DNS?,\n");

        let report = fx.runner(0).run().await.unwrap();

        assert_eq!(report.processed, 0);
        assert_eq!(fx.generator.calls().await, 0);
        assert!(fx.posts().is_empty());
    }

    #[tokio::test]
    async fn run_without_generator_fails_before_loading() {
        let fx = Fixture::new("Question,Status\nWhat is DNS?,\n");
        let runner = RunnerBuilder::new(fx.config()).build().unwrap();

        assert!(matches!(runner.run().await, Err(PublishError::NoGenerator)));
        assert_eq!(fx.store_text(), "Question,Status\nWhat is DNS?,\n");
    }

    #[tokio::test]
    async fn plan_lists_todays_picks_without_side_effects() {
        let fx = Fixture::new(
            "Question,Status\nWhat is DNS?,Published\nWhat is BGP?,\nWhat is TCP?,\nWhat is UDP?,\n",
        );
        let before = fx.store_text();

        let plan = fx.runner(2).plan().await.unwrap();

        assert_eq!(plan.quota, 2);
        assert_eq!(
            plan.articles,
            vec![
                PlannedArticle {
                    index: 1,
                    question: "What is BGP?".into(),
                    file_name: "2024-01-01-what-is-bgp.md".into(),
                },
                PlannedArticle {
                    index: 2,
                    question: "What is TCP?".into(),
                    file_name: "2024-01-01-what-is-tcp.md".into(),
                },
            ]
        );
        assert_eq!(fx.generator.calls().await, 0);
        assert_eq!(fx.store_text(), before);
        assert!(fx.posts().is_empty());
    }

    #[tokio::test]
    async fn status_reports_counts_and_quota() {
        let fx = Fixture::new("Question,Status\nWhat is DNS?,Published\nWhat is BGP?,\n");

        let status = fx.runner(3).status().await.unwrap();

        assert_eq!(status.quota, 3);
        assert_eq!(status.counts.published, 1);
        assert_eq!(status.counts.pending, 1);
        assert_eq!(status.store, fx.store_path());
    }

    #[tokio::test]
    async fn json_store_runs_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("questions.json");
        std::fs::write(
            &store,
            r#"[{"Question":"What is DNS?","Level":"Junior"},{"Question":"What is BGP?","Status":"Published"}]"#,
        )
        .unwrap();
        let config = PublishConfig {
            store_path: store.clone(),
            output_dir: dir.path().join("_posts"),
            ..PublishConfig::default()
        };
        let runner = RunnerBuilder::new(config)
            .generator(Arc::new(ScriptedGenerator::new("# Body")))
            .quota(5)
            .build()
            .unwrap();

        let report = runner.run().await.unwrap();

        assert_eq!(report.processed, 1);
        let saved: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&store).unwrap()).unwrap();
        assert_eq!(saved[0]["Status"], "Published");
        assert_eq!(saved[0]["Level"], "Junior");
        assert_eq!(saved[1]["Status"], "Published");
    }

    #[test]
    fn preview_truncates_long_questions() {
        assert_eq!(preview("  short  "), "short");
        let long = "x".repeat(PREVIEW_LEN + 5);
        assert_eq!(preview(&long), format!("{}...", "x".repeat(PREVIEW_LEN)));
    }
}
