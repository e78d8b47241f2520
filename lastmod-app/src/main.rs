use anyhow::Result;
use clap::Parser;
use cli::Cli;
use lastmod_common::observability::{init_logging, LogConfig};
use lastmod_common::LastmodError;
use lastmod_config::{LastmodConfig, LastmodConfigLoader};
use lastmod_http::{ClientOpts, HttpClient};
use std::time::Duration;
mod cli;

const DEFAULT_CONFIG_FILE: &str = "lastmod.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Config: defaults < file < env < flags
    let cfg = load_config(&cli)?;

    // 2) Logging to stderr (and optionally a file); stdout is for the summary
    let log_file = init_logging(LogConfig {
        log_dir: cfg.logging.dir.clone(),
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
        ..LogConfig::default()
    })?;
    if let Some(path) = log_file {
        tracing::debug!(path=%path.display(), "logging to file");
    }

    // 3) Validate the input before touching the network
    let urls = lastmod_report::read_urls(&cfg.urls_path)?;

    let client = HttpClient::new(ClientOpts {
        timeout: Duration::from_secs(cfg.http.timeout_secs),
        connect_timeout: Duration::from_secs(cfg.http.connect_timeout_secs),
        user_agent: cfg.http.user_agent.clone(),
    })
    .map_err(|e| LastmodError::Client(e.to_string()))?;

    let rows = lastmod_report::check_all(&client, &urls, cfg.concurrency).await;
    lastmod_report::write_report(&cfg.output_path, &rows)?;

    println!("Wrote {} with {} rows.", cfg.output_path.display(), rows.len());
    Ok(())
}

fn load_config(cli: &Cli) -> Result<LastmodConfig, LastmodError> {
    let loader = match &cli.config {
        Some(path) => LastmodConfigLoader::new().with_file(path),
        None => LastmodConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let mut cfg = loader
        .load()
        .map_err(|e| LastmodError::Config(e.to_string()))?;

    cli.apply_overrides(&mut cfg);
    cfg.validate()
        .map_err(|e| LastmodError::Config(e.to_string()))?;
    Ok(cfg)
}
