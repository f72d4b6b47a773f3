//! Main entry point for the dydl CLI

use anyhow::Context;
use clap::Parser;
use dydl::cli::output::OutputFormatter;
use dydl::cli::prompt::StdinPrompter;
use dydl::cli::{App, Args};
use dydl::config::AppConfig;
use dydl::core::{cookies, Downloader};
use dydl::download::YtDlp;
use dydl::platform::{HttpSession, UrlResolver};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status after Ctrl-C
const INTERRUPT_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())
        .context("Failed to load configuration; fix the file or remove it to use defaults")?;
    args.apply(&mut config);

    if !config.ui.enable_colors {
        colored::control::set_override(false);
    }
    init_logging(config.ui.verbose_logging)?;
    debug!("Starting dydl with args: {:?}", args);

    let formatter = Arc::new(OutputFormatter::new(args.verbosity_level()));
    spawn_interrupt_watcher(formatter.clone());

    if let Err(e) = run(config, formatter.clone()).await {
        formatter.error(&format!("Program error: {:#}", e));
        formatter.info("Check your network connection and the link, then try again");
        debug!(error = ?e, "Exiting after error");
        std::process::exit(1);
    }

    Ok(())
}

async fn run(config: AppConfig, formatter: Arc<OutputFormatter>) -> anyhow::Result<()> {
    let session = Arc::new(cookies::load(&config.cookies));
    info!(status = ?session.status, loaded = session.status.is_loaded(), "Cookie file processed");

    let http = HttpSession::new(&config.network, &config.resolver.cookie_domains, &session)
        .context("Failed to build HTTP client")?;
    let resolver = UrlResolver::new(Arc::new(http), config.resolver.short_link_hosts.clone());
    let fetcher = Arc::new(YtDlp::from_config(&config));
    debug!(binary = %fetcher.binary().display(), "Using media tool");

    let downloader = Downloader::new(
        Arc::new(config),
        session,
        resolver,
        fetcher,
        formatter.clone(),
    );

    let mut app = App::new(downloader, formatter, StdinPrompter::new());
    app.run().await?;
    Ok(())
}

/// Print a farewell and exit on Ctrl-C, whatever the session is doing
fn spawn_interrupt_watcher(formatter: Arc<OutputFormatter>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            formatter.print_farewell("Program interrupted, goodbye!");
            std::process::exit(INTERRUPT_EXIT_CODE);
        }
    });
}

/// Initialize logging system
fn init_logging(verbose: bool) -> anyhow::Result<()> {
    // RUST_LOG wins over the verbosity flag
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(verbose)
                .with_line_number(verbose)
                .compact(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}
