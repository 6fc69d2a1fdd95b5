//! ca - CLI entry point for the channel trust auditor

use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::info;

use chanaudit::analyzer::{AnalyzeError, Analyzer};
use chanaudit::assess::create_assessor;
use chanaudit::cli::{Cli, Command};
use chanaudit::config::Config;
use chanaudit::domain::{Job, TaskStatus};
use chanaudit::events::QueueEvent;
use chanaudit::queue::JobQueue;
use chanaudit::store::MemoryStore;
use chanaudit::telegram::TelegramClient;

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Some(level) = cli_log_level {
        filter = filter.add_directive(level.parse().context("invalid --log-level")?);
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
    Ok(())
}

/// Build the production analysis pipeline from configuration
fn build_analyzer(config: &Config) -> Result<Arc<Analyzer>> {
    let telegram = Arc::new(TelegramClient::from_config(&config.telegram)?);
    let assessor = create_assessor(&config.assessment)?;
    let store = Arc::new(MemoryStore::new());
    Ok(Arc::new(Analyzer::new(telegram, assessor, store)))
}

async fn run_analyze(config: &Config, link: &str) -> Result<()> {
    let analyzer = build_analyzer(config)?;

    match analyzer.analyze(link).await {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Err(AnalyzeError::RateLimited { retry_after_secs }) => {
            eprintln!("Rate limited by the data API. Try again in {retry_after_secs}s.");
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_batch(config: &Config, links: &[String]) -> Result<()> {
    let analyzer = build_analyzer(config)?;
    let queue = JobQueue::new(config.queue.clone(), analyzer);
    let mut events = queue.subscribe();

    let job_id = queue.submit_batch(links).await?;
    info!(%job_id, "batch submitted");

    loop {
        match events.recv().await {
            Ok(event) if event.job_id() == job_id => match event {
                QueueEvent::ChannelCompleted { channel, .. } => println!("done     {channel}"),
                QueueEvent::ChannelFailed { channel, error, .. } => println!("failed   {channel}: {error}"),
                QueueEvent::JobCompleted { .. } => break,
                QueueEvent::JobUpdated { .. } => {}
            },
            Ok(_) => {}
            // A lagged consumer just misses progress lines; the summary below is authoritative
            Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }

    let job = queue
        .job(&job_id)
        .await
        .ok_or_else(|| eyre::eyre!("job {job_id} disappeared from the registry"))?;
    print_summary(&job);
    Ok(())
}

fn print_summary(job: &Job) {
    println!("\njob {} - {}/{} channels processed", job.id, job.completed, job.total);
    for task in &job.channels {
        match task.status {
            TaskStatus::Completed => {
                let verdict = task
                    .result
                    .as_ref()
                    .map(|r| {
                        format!(
                            "{} (trust {})",
                            r.data.assessment.verdict.rating, r.data.assessment.verdict.trust_score
                        )
                    })
                    .unwrap_or_default();
                println!("  {:<30} {}", task.link, verdict);
            }
            TaskStatus::Failed => {
                println!("  {:<30} failed: {}", task.link, task.error.as_deref().unwrap_or("unknown"));
            }
            other => println!("  {:<30} {}", task.link, other),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref())?;

    let config = Config::load(cli.config.as_ref())?;
    config.validate()?;

    match &cli.command {
        Command::Analyze { link } => run_analyze(&config, link).await,
        Command::Batch { links } => run_batch(&config, links).await,
    }
}
