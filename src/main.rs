//! Main entry point for the text feed viewer.
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use text_feed::config::{Cli, Config, LogConfig, LogTimeFormat};
use text_feed::display::TextDisplay;
use text_feed::feed::{HttpFetcher, TextFeed};
use text_feed::{TextFeedApp, TuiLoggerWriter};
use tokio::runtime::Builder;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Level;
use tracing_subscriber::fmt::time;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn init_logger(log: &LogConfig) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(TuiLoggerWriter)
        .with_target(log.module_path);

    match log.time {
        LogTimeFormat::None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer.without_time())
                .init();
        }
        LogTimeFormat::Date => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer.with_timer(time::ChronoUtc::new("%T:%3f".to_string())))
                .init();
        }
        LogTimeFormat::Uptime => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer.with_timer(time::uptime()))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_cli(&cli)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(main_async(config))
}

async fn main_async(config: Config) -> anyhow::Result<()> {
    init_logger(&config.log);

    let fetcher = HttpFetcher::new().context("failed to build http client")?;
    let tasks = TaskTracker::new();
    let token = CancellationToken::new();
    let feed = TextFeed::new(
        config.source(),
        TextDisplay::new(config.display()?),
        config.timeout(),
        Arc::new(fetcher),
        tasks.clone(),
        token.child_token(),
    );

    let mut app = TextFeedApp::new(feed, config.refresh(), token.clone());

    let terminal = ratatui::init();
    let result = app.run(terminal).await;
    ratatui::restore();

    // In-flight fetches observe the token and exit without reporting.
    token.cancel();
    tasks.close();
    tasks.wait().await;

    result
}
