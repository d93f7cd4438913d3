use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Fetch a Twitter/X account's recent posts or followed profiles as JSON.
#[derive(Debug, Parser)]
#[command(name = "tweetie", version, about)]
pub struct Cli {
    /// One line: `consumer_key, consumer_secret, access_token, access_token_secret`.
    /// Falls back to the `credentials` section of the config.
    #[arg(long, env = "TWEETIE_CREDENTIALS", global = true)]
    pub credentials: Option<PathBuf>,

    /// YAML config file. Without it `tweetie.yaml` is read when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// The most recent posts of HANDLE, with entities and sentiment.
    Timeline {
        handle: String,
        /// Maximum number of posts (defaults to `timeline.cap`).
        #[arg(long)]
        cap: Option<usize>,
    },
    /// Profiles of every account HANDLE follows.
    Following { handle: String },
}
