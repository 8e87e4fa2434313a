//! # scribe
//!
//! 1 日 1 回のバッチ: record store から未公開の質問を quota 件だけ取り出し、
//! 生成サービスで記事にして output directory へ書き出す。

mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use scribe_core::app::{RunPlan, RunReport, RunnerBuilder, StatusReport};
use scribe_core::config::PublishConfig;
use scribe_core::impls::GeminiGenerator;

#[derive(Parser, Debug)]
#[command(name = "scribe")]
#[command(about = "Publish a daily batch of generated articles from a question list")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Record store (.csv or .json)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Directory articles are written to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate today's articles and mark their records published
    Run {
        /// Process at most N records, ignoring the quota policy
        #[arg(long, value_name = "N")]
        quota: Option<usize>,

        /// Only list what would be generated
        #[arg(long)]
        dry_run: bool,
    },
    /// Show pending / published counts and today's quota
    Status {
        #[arg(long)]
        json: bool,
    },
}

/// defaults → config file → environment → flags
fn load_config<F>(cli: &Cli, env: F) -> anyhow::Result<PublishConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config {
        Some(path) => PublishConfig::from_file(path)?,
        None => PublishConfig::default(),
    };
    config.apply_env(env)?;

    if let Some(store) = &cli.store {
        config.store_path = store.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = load_config(&cli, |name| std::env::var(name).ok())
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Run { quota, dry_run } => run(config, quota, dry_run).await,
        Commands::Status { json } => status(config, json).await,
    }
}

async fn run(config: PublishConfig, quota: Option<usize>, dry_run: bool) -> anyhow::Result<()> {
    let mut builder = RunnerBuilder::new(config.clone());
    if let Some(n) = quota {
        builder = builder.quota(n);
    }

    if dry_run {
        let runner = builder.build()?;
        let plan = runner.plan().await?;
        print!("{}", render_plan(&plan));
        return Ok(());
    }

    let key = config.require_api_key()?.clone();
    let generator = GeminiGenerator::new(&config.generator, key)?;
    let runner = builder.generator(Arc::new(generator)).build()?;

    info!(
        store = %runner.store_location().display(),
        output_dir = %runner.output_dir().display(),
        "scribe starting"
    );
    let report = runner.run().await.context("run aborted")?;
    log_summary(&report);
    Ok(())
}

async fn status(config: PublishConfig, json: bool) -> anyhow::Result<()> {
    let runner = RunnerBuilder::new(config).build()?;
    let report = runner.status().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_status(&report));
    }
    Ok(())
}

fn log_summary(report: &RunReport) {
    info!(
        run_id = %report.run_id,
        processed = report.processed,
        quota = report.quota,
        "processed {} of {} article(s)",
        report.processed,
        report.quota
    );
    for failure in &report.failures {
        warn!(
            row = failure.index + 1,
            question = %failure.question,
            error = %failure.error,
            "left pending"
        );
    }
}

fn render_status(report: &StatusReport) -> String {
    let remaining = match report.days_remaining() {
        Some(days) => format!("{days} day(s) at today's quota"),
        None => "no quota today".to_string(),
    };
    format!(
        "store:     {}\ndate:      {}\nquota:     {}\npending:   {}\npublished: {}\nblank:     {}\nremaining: {}\n",
        report.store.display(),
        report.date,
        report.quota,
        report.counts.pending,
        report.counts.published,
        report.counts.blank,
        remaining,
    )
}

fn render_plan(plan: &RunPlan) -> String {
    let mut out = format!(
        "{}: {} of quota {}\n",
        plan.date,
        plan.articles.len(),
        plan.quota
    );
    for article in &plan.articles {
        out.push_str(&format!("  row {:>4}  {}\n", article.index + 1, article.file_name));
    }
    out
}
