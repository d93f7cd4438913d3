#![allow(dead_code)]

use std::sync::OnceLock;
use std::time::Duration;

use serde_json::{Value, json};
use tweetie_common::observability::{LogConfig, LogFormat};
use tweetie_social::twitter::{Credentials, FetchOptions, RetryPolicy, Session, SessionSettings};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "tweetie-tests",
            log_dir: Some(std::env::temp_dir().join("tweetie-tests")),
            emit_stderr: true,
            format: if std::env::var("TWEETIE_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
        };

        tweetie_common::observability::init_logging(config).unwrap_or_default()
    });
}

pub fn credentials() -> Credentials {
    Credentials::new("key", "secret", "token", "token-secret")
}

pub fn settings(server: &MockServer) -> SessionSettings {
    SessionSettings {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        transport_retries: 0,
        // No pacing; tests exercise backoff, not the bucket.
        qps: 0.0,
        burst: 0,
    }
}

/// Retry policy with millisecond delays.
pub fn fast_options() -> FetchOptions {
    FetchOptions::default().with_retry(RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(10),
    })
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"token_type": "bearer", "access_token": "AAAA"})),
        )
        .mount(server)
        .await;
}

pub async fn open_session(server: &MockServer) -> Session {
    init_test_tracing();
    mount_token(server).await;
    Session::open(&credentials(), &settings(server))
        .await
        .expect("session opens")
}

pub fn user_json(id: u64, handle: &str, statuses: u64) -> Value {
    json!({
        "id": id,
        "id_str": id.to_string(),
        "name": format!("User {id}"),
        "screen_name": handle,
        "followers_count": id * 10,
        "statuses_count": statuses,
        "created_at": "Mon Jan 01 00:00:00 +0000 2024",
        "profile_image_url": format!("http://img/{id}.png"),
        "profile_image_url_https": format!("https://img/{id}.png"),
        "protected": false
    })
}

pub fn status_json(id: u64, text: &str) -> Value {
    json!({
        "id": id,
        "id_str": id.to_string(),
        "created_at": "Wed Oct 10 20:19:24 +0000 2018",
        "full_text": text,
        "retweet_count": id,
        "entities": {"hashtags": [], "urls": [], "user_mentions": []}
    })
}

pub fn statuses(ids: impl IntoIterator<Item = u64>) -> Value {
    Value::Array(
        ids.into_iter()
            .map(|id| status_json(id, &format!("post {id}")))
            .collect(),
    )
}
