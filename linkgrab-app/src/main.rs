use anyhow::{Context, Result};
use clap::Parser;
use linkgrab_common::GrabError;
use linkgrab_common::observability::{LogConfig, init_logging};
use linkgrab_config::GrabConfigLoader;
use linkgrab_http::HttpClient;
use linkgrab_web::{ExitPolicy, FantocciniNavigator, run_from_links_file};

mod cli;

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LogConfig {
        log_dir: cli.log_dir.clone(),
        format: cli.log_format,
        ..LogConfig::default()
    })?;

    // file < env < flags
    let loader = GrabConfigLoader::new().with_optional_file(&cli.config);
    let cfg = cli
        .apply_overrides(loader)
        .and_then(|loader| loader.load())
        .map_err(|e| GrabError::Config(e.to_string()))?;

    let http = HttpClient::new(&cfg.http).context("failed to build the HTTP session")?;
    let policy = if cli.strict {
        ExitPolicy::Strict
    } else {
        ExitPolicy::Lenient
    };

    run_from_links_file(&cfg, http, || FantocciniNavigator::launch(&cfg.browser), policy).await?;
    Ok(())
}
