use anyhow::{Context, Result};
use std::io;
use std::path::Path;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Set up timestamped logging to stdout and to `repopulse.log` in the base
/// directory. The returned guard must stay alive for the process duration so
/// the non-blocking file writer flushes on exit.
pub fn init(base_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(base_dir)
        .with_context(|| format!("failed to create base directory {:?}", base_dir))?;

    let file_appender = rolling::never(base_dir, "repopulse.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(false);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .context("failed to initialize logging")?;

    Ok(guard)
}
