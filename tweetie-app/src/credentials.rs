//! The single-line credentials file: `key, secret, token, token_secret`.
use std::path::Path;

use anyhow::{Context, Result, bail};
use tweetie_config::CredentialsConfig;
use tweetie_social::twitter::Credentials;

pub fn parse_line(line: &str) -> Result<Credentials> {
    let parts: Vec<&str> = line.trim().split(',').map(str::trim).collect();
    let [consumer_key, consumer_secret, access_token, access_token_secret] = parts[..] else {
        bail!("expected 4 comma-separated values, found {}", parts.len());
    };
    let creds = Credentials::new(consumer_key, consumer_secret, access_token, access_token_secret);
    creds.validate()?;
    Ok(creds)
}

/// Read the first non-blank line of `path`.
pub fn load_file(path: &Path) -> Result<Credentials> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read credentials file {}", path.display()))?;
    let line = raw
        .lines()
        .find(|l| !l.trim().is_empty())
        .with_context(|| format!("credentials file {} is empty", path.display()))?;
    parse_line(line).with_context(|| format!("invalid credentials in {}", path.display()))
}

pub fn from_config(section: &CredentialsConfig) -> Result<Credentials> {
    let creds = Credentials::new(
        section.consumer_key.as_str(),
        section.consumer_secret.as_str(),
        section.access_token.as_str(),
        section.access_token_secret.as_str(),
    );
    creds.validate().context("invalid `credentials` section in config")?;
    Ok(creds)
}
