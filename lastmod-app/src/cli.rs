use clap::Parser;
use lastmod_config::LastmodConfig;
use std::path::PathBuf;

/// Check when web pages were last updated and write a CSV report.
#[derive(Debug, Parser)]
#[command(name = "lastmod", version, about)]
pub struct Cli {
    /// YAML config file. Without it, `lastmod.yaml` is used when present.
    #[arg(long, env = "LASTMOD_CONFIG")]
    pub config: Option<PathBuf>,

    /// URL list, one URL per line.
    #[arg(long)]
    pub urls: Option<PathBuf>,

    /// CSV report destination.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum number of requests in flight.
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    #[arg(long)]
    pub user_agent: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON log lines.
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    /// Command-line values win over file and environment configuration.
    pub fn apply_overrides(&self, cfg: &mut LastmodConfig) {
        if let Some(p) = &self.urls {
            cfg.urls_path = p.clone();
        }
        if let Some(p) = &self.output {
            cfg.output_path = p.clone();
        }
        if let Some(secs) = self.timeout {
            cfg.http.timeout_secs = secs;
        }
        if let Some(n) = self.concurrency {
            cfg.concurrency = n;
        }
        if let Some(ua) = &self.user_agent {
            cfg.http.user_agent = ua.clone();
        }
        if self.verbose {
            cfg.logging.filter = "debug".into();
        }
        if self.log_json {
            cfg.logging.format = lastmod_common::observability::LogFormat::Json;
        }
    }
}
