mod logging;
mod runner;

use anyhow::{Context, Result};
use clap::Parser;
use repopulse::{ConfigFile, Overrides, RunMode, Settings};
use repopulse_git::GitWorkspace;
use repopulse_github::GithubClient;
use runner::Runner;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "repopulse")]
#[command(about = "Keep a repository active with generated content, issues, and pull requests")]
struct Cli {
    /// GitHub personal access token (overrides the config file)
    #[arg(long)]
    token: Option<String>,

    /// Repository in owner/repo form (overrides the config file)
    #[arg(long)]
    repo: Option<String>,

    /// Run mode: single or continuous (overrides the config file)
    #[arg(long)]
    mode: Option<RunMode>,

    /// Interval in minutes for continuous mode (overrides the config file)
    #[arg(long)]
    interval: Option<u64>,

    /// Base directory of the repository checkout (overrides the config file)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Ignore the config file and use only command line arguments
    #[arg(long)]
    no_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    let overrides = Overrides {
        token: cli.token,
        repo: cli.repo,
        mode: cli.mode,
        interval_minutes: cli.interval,
        base_dir: cli.base_dir,
    };
    let settings = Settings::resolve(overrides, config)?;

    let _guard = logging::init(&settings.base_dir)?;

    info!("configuration loaded:");
    info!("  repository: {}", settings.repo);
    info!("  mode: {:?}", settings.mode);
    info!("  base directory: {}", settings.base_dir.display());
    if settings.mode == RunMode::Continuous {
        info!("  interval: {} minutes", settings.interval_minutes);
    }

    let github = GithubClient::new(settings.token.clone());
    let git = GitWorkspace::new(&settings.base_dir);
    let runner = Runner::new(github, git, settings.clone());

    match settings.mode {
        RunMode::Single => runner.run_single_cycle(),
        RunMode::Continuous => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&shutdown);
            ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
                .context("failed to install interrupt handler")?;

            info!(
                "starting continuous mode with {} minute intervals",
                settings.interval_minutes
            );
            runner.run_continuous(&shutdown);
            Ok(())
        }
    }
}

/// Load the config file unless `--no-config` was given.
///
/// A config file that cannot be read is tolerated when the CLI flags carry
/// both token and repository; otherwise it is a fatal startup error.
fn load_config(cli: &Cli) -> Result<Option<ConfigFile>> {
    if cli.no_config {
        return Ok(None);
    }
    match ConfigFile::load(&cli.config) {
        Ok(config) => Ok(Some(config)),
        Err(_) if cli.token.is_some() && cli.repo.is_some() => Ok(None),
        Err(err) => Err(err.context(
            "either provide a valid config file or pass both --token and --repo",
        )),
    }
}
