use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tweetie_common::observability::init_logging;
use tweetie_config::{TweetieConfig, TweetieConfigLoader};
use tweetie_runtime::TweetieRuntime;
use tweetie_social::twitter::Credentials;

use cli::Cli;

mod cli;
mod credentials;
mod pipeline;

const DEFAULT_CONFIG: &str = "tweetie.yaml";

fn load_config(explicit: Option<&Path>) -> Result<TweetieConfig> {
    let loader = match explicit {
        Some(path) => TweetieConfigLoader::new().with_file(path),
        None => TweetieConfigLoader::new().with_optional_file(DEFAULT_CONFIG),
    };
    loader.load().context("failed to load configuration")
}

fn load_credentials(cli: &Cli, cfg: &TweetieConfig) -> Result<Credentials> {
    match (&cli.credentials, &cfg.credentials) {
        (Some(path), _) => credentials::load_file(path),
        (None, Some(section)) => credentials::from_config(section),
        (None, None) => {
            bail!("no credentials: pass --credentials <file> or set a `credentials` section")
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Config (env wins), then logging from it
    let cfg = load_config(cli.config.as_deref())?;
    let log_path = init_logging(pipeline::log_config(&cfg.logging)?)?;
    tracing::debug!(log = %log_path.display(), "app.start");

    let credentials = load_credentials(&cli, &cfg)?;

    // 2) Run on the shared runtime; Ctrl-C cancels between pages/lookups
    let runtime = TweetieRuntime::build("tweetie", None)?;
    let handle = runtime.handle();
    let _ctrl_c = handle.cancel_on_ctrl_c();
    let outcome = runtime.block_on(pipeline::run(
        &cli.command,
        &cfg,
        &credentials,
        handle.child_token(),
    ));
    runtime.shutdown(Duration::from_millis(250));

    println!("{}", outcome?);
    Ok(())
}
