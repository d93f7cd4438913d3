//! Loader for tweetie configuration with YAML + environment overlays.
//!
//! Sources are merged in the order they are attached; `TWEETIE__`-prefixed
//! environment variables (with `__` between path segments, e.g.
//! `TWEETIE__TIMELINE__CAP=50`) always win. After merging, every string value
//! has `${VAR}` placeholders expanded, which is how secrets are usually wired in.
//!
//! Every section is optional and falls back to the defaults documented on each
//! struct.
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "TWEETIE";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TweetieConfig {
    pub api: ApiConfig,
    pub rate: RateConfig,
    pub retry: RetryConfig,
    pub timeline: TimelineConfig,
    pub following: FollowingConfig,
    pub logging: LoggingConfig,
    /// Inline credentials, normally `${VAR}` references. A credentials file
    /// given on the command line takes precedence.
    pub credentials: Option<CredentialsConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Retries for network failures and 5xx, below the rate-limit policy.
    pub transport_retries: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.twitter.com/".into(),
            timeout_secs: 15,
            transport_retries: 2,
        }
    }
}

/// Token bucket pacing for every remote call made through one session.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateConfig {
    pub qps: f64,
    pub burst: u32,
}

impl Default for RateConfig {
    fn default() -> Self {
        // users/show allows 900 calls per 15 minute window.
        Self {
            qps: 0.9,
            burst: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 1_000,
            max_delay_secs: 900,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub cap: usize,
    pub page_size: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            cap: 100,
            page_size: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FollowingConfig {
    pub max_in_flight: usize,
}

impl Default for FollowingConfig {
    fn default() -> Self {
        Self { max_in_flight: 8 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    /// `text` or `json`.
    pub format: String,
    pub stderr: bool,
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            format: "text".into(),
            stderr: true,
            dir: None,
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct CredentialsConfig {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CredentialsConfig { <redacted> }")
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (files, inline YAML, env overrides).
pub struct TweetieConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for TweetieConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TweetieConfigLoader {
    /// Start empty; defaults fill every section that no source mentions.
    ///
    /// ```
    /// use tweetie_config::TweetieConfigLoader;
    ///
    /// let config = TweetieConfigLoader::new()
    ///     .with_yaml_str("timeline:\n  cap: 20")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.timeline.cap, 20);
    /// assert_eq!(config.timeline.page_size, 200);
    /// assert_eq!(config.following.max_in_flight, 8);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`with_file`](Self::with_file) but silently skipped when absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// ```
    /// use tweetie_config::TweetieConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOC_CONSUMER_KEY", "ck-from-env"); }
    ///
    /// let config = TweetieConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// credentials:
    ///   consumer_key: "${DOC_CONSUMER_KEY}"
    ///   consumer_secret: "cs"
    ///   access_token: "at"
    ///   access_token_secret: "ats"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// let creds = config.credentials.expect("credentials section");
    /// assert_eq!(creds.consumer_key, "ck-from-env");
    ///
    /// unsafe { std::env::remove_var("DOC_CONSUMER_KEY"); }
    /// ```
    pub fn load(self) -> Result<TweetieConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        // An empty source set deserializes as `null`.
        if v.is_null() {
            v = Value::Object(Default::default());
        }

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
