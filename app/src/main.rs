//! Terminal task list.
//!
//! Logs go to a file because the terminal belongs to the UI.

use anyhow::Context;
use std::sync::Arc;
use tasklist::{ui, Config, Session};
use tasklist_core::environment::RandomIds;
use tasklist_storage::FileStore;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let config = Config::from_env();
    let _log_guard = init_logging(&config)?;
    tasklist_runtime::metrics::describe_metrics();

    info!(
        data_dir = %config.data_dir.display(),
        log_dir = %config.log_dir.display(),
        "Configuration loaded"
    );

    let kv = FileStore::open(&config.data_dir)
        .with_context(|| format!("Failed to open data directory {}", config.data_dir.display()))?;
    let session =
        Session::open(Arc::new(kv), Arc::new(RandomIds)).context("Failed to load saved tasks")?;

    let outcome = ui::run(session.store(), tasklist::session::termination_signal()).await;
    if let Err(error) = &outcome {
        error!(error = %format!("{error:#}"), "UI stopped with an error");
    }

    session.close().await.context("Failed to shut down cleanly")?;
    info!("Goodbye");
    outcome
}

fn init_logging(config: &Config) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory {}", config.log_dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(&config.log_file)
        .build(&config.log_dir)
        .context("Failed to open log file")?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_new(&config.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(tasklist::config::DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Ok(guard)
}
