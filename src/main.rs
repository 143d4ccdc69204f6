mod api;
mod app;
mod cache;
mod commands;
mod config;
mod error;
mod event;
mod paging;
mod query;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "qfetch")]
#[command(about = "Data-fetching patterns in the terminal: queries, mutations, pagination and infinite lists")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/qfetch/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Products API base URL
  #[arg(short, long)]
  base_url: Option<String>,

  /// Items per page for paginated and infinite lists
  #[arg(short, long)]
  page_size: Option<u64>,

  /// Write logs here instead of the default data directory
  #[arg(long)]
  log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Command line wins over file and environment
  if let Some(base_url) = args.base_url {
    config.api.base_url = base_url;
  }
  if let Some(page_size) = args.page_size {
    config.paging.page_size = page_size;
  }
  if let Some(log_file) = args.log_file {
    config.log.file = Some(log_file);
  }
  config.validate()?;

  // The terminal belongs to the UI, so logs go to a file
  let log_path = config.log_path()?;
  if let Some(dir) = log_path.parent() {
    std::fs::create_dir_all(dir)?;
  }
  let file = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(&log_path)?;
  let (writer, _guard) = tracing_appender::non_blocking(file);

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false),
    )
    .init();

  tracing::info!(base_url = %config.api.base_url, page_size = config.paging.page_size, "starting qfetch");

  // Initialize and run the app
  let mut app = app::App::new(&config)?;
  app.run().await?;

  tracing::info!("qfetch shutdown complete");
  Ok(())
}
