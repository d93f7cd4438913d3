//! Wire configuration into the social pipeline and run one command.
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tweetie_common::observability::{LogConfig, LogFormat};
use tweetie_config::{LoggingConfig, TweetieConfig};
use tweetie_social::twitter::{
    Credentials, FetchOptions, RetryPolicy, Session, SessionSettings, aggregate, fetch_following,
    fetch_recent,
};

use crate::cli::Command;

pub fn log_config(logging: &LoggingConfig) -> Result<LogConfig> {
    let format: LogFormat = logging
        .format
        .parse()
        .map_err(anyhow::Error::msg)
        .context("invalid `logging.format`")?;
    Ok(LogConfig {
        app_name: "tweetie",
        log_dir: logging.dir.as_ref().map(PathBuf::from),
        emit_stderr: logging.stderr,
        format,
        default_filter: logging.filter.clone(),
    })
}

pub fn session_settings(cfg: &TweetieConfig) -> SessionSettings {
    SessionSettings {
        base_url: cfg.api.base_url.clone(),
        timeout: Duration::from_secs(cfg.api.timeout_secs),
        transport_retries: cfg.api.transport_retries,
        qps: cfg.rate.qps,
        burst: cfg.rate.burst,
    }
}

pub fn fetch_options(cfg: &TweetieConfig, cancel: CancellationToken) -> FetchOptions {
    FetchOptions {
        page_size: cfg.timeline.page_size,
        max_in_flight: cfg.following.max_in_flight,
        retry: RetryPolicy {
            max_attempts: cfg.retry.max_attempts,
            base_delay: Duration::from_millis(cfg.retry.base_delay_ms),
            max_delay: Duration::from_secs(cfg.retry.max_delay_secs),
        },
        cancel,
    }
}

/// Open a session, run `command`, and render its result as pretty JSON.
pub async fn run(
    command: &Command,
    cfg: &TweetieConfig,
    credentials: &Credentials,
    cancel: CancellationToken,
) -> Result<String> {
    let session = Session::open(credentials, &session_settings(cfg))
        .await
        .context("failed to open API session")?;
    let opts = fetch_options(cfg, cancel);

    let rendered = match command {
        Command::Timeline { handle, cap } => {
            let cap = cap.unwrap_or(cfg.timeline.cap);
            let timeline = fetch_recent(&session, handle, cap, &opts)
                .await
                .with_context(|| format!("failed to fetch timeline of @{handle}"))?;
            if !timeline.complete {
                tracing::warn!(%handle, items = timeline.items.len(), "app.timeline.partial");
            }
            serde_json::to_string_pretty(&aggregate(handle, timeline))?
        }
        Command::Following { handle } => {
            let following = fetch_following(&session, handle, &opts)
                .await
                .with_context(|| format!("failed to fetch accounts followed by @{handle}"))?;
            if !following.complete {
                tracing::warn!(
                    %handle,
                    entries = following.len(),
                    unresolved = following.unresolved_count(),
                    "app.following.partial"
                );
            }
            serde_json::to_string_pretty(&following)?
        }
    };
    Ok(rendered)
}
