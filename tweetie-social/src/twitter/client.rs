//! Authenticated session against the Twitter/X v1.1 REST API.
//!
//! [`Session::open`] exchanges the consumer key/secret for an app-only bearer
//! token and hands back a read-shared handle. Every request surfaces throttling
//! to the caller as [`TweetieError::RateLimited`]; retries across calls are the
//! fetchers' job (see [`crate::twitter::rate`]).
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tweetie_common::{Result, TweetieError};
use tweetie_http::{Auth, HttpClient, HttpError, RequestOpts, StatusCode};

use crate::twitter::rate::RateGate;
use crate::twitter::types::{FriendIds, Status, TokenResponse, User};

/// The four secrets issued for an app/user pair.
#[derive(Clone)]
pub struct Credentials {
    consumer_key: String,
    consumer_secret: String,
    access_token: String,
    access_token_secret: String,
}

impl Credentials {
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            access_token: access_token.into(),
            access_token_secret: access_token_secret.into(),
        }
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn access_token_secret(&self) -> &str {
        &self.access_token_secret
    }

    /// Every secret must be present; whitespace-only counts as missing.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("consumer_key", &self.consumer_key),
            ("consumer_secret", &self.consumer_secret),
            ("access_token", &self.access_token),
            ("access_token_secret", &self.access_token_secret),
        ];
        match fields.iter().find(|(_, v)| v.trim().is_empty()) {
            Some((name, _)) => Err(TweetieError::Auth(format!("missing credential `{name}`"))),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &"<redacted>")
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

/// Transport and pacing settings for one [`Session`].
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub base_url: String,
    pub timeout: Duration,
    /// Retries for network errors and 5xx inside a single call.
    pub transport_retries: usize,
    pub qps: f64,
    pub burst: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.twitter.com/".to_string(),
            timeout: Duration::from_secs(15),
            transport_retries: 2,
            qps: 0.9,
            burst: 15,
        }
    }
}

/// The remote calls the fetchers need. [`Session`] is the real implementation.
#[async_trait]
pub trait SocialApi: Send + Sync {
    /// Gate every call made through this API must acquire first.
    fn rate_gate(&self) -> &RateGate;

    async fn user_by_handle(&self, handle: &str) -> Result<User>;

    async fn user_by_id(&self, id: u64) -> Result<User>;

    /// One page of `handle`'s timeline, newest first, at or below `max_id`.
    async fn timeline_page(&self, handle: &str, max_id: Option<u64>, count: u32)
    -> Result<Vec<Status>>;

    async fn friend_ids_page(&self, handle: &str, cursor: i64) -> Result<FriendIds>;
}

pub struct Session {
    http: HttpClient,
    bearer: String,
    gate: RateGate,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base", &self.http.base().as_str())
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Authenticate and return a session ready for fetching.
    ///
    /// Fails with [`TweetieError::Auth`] on empty credentials, a 401/403 from the
    /// token endpoint, or a token type other than `bearer`.
    pub async fn open(credentials: &Credentials, settings: &SessionSettings) -> Result<Self> {
        credentials.validate()?;

        let base = if settings.base_url.ends_with('/') {
            settings.base_url.clone()
        } else {
            format!("{}/", settings.base_url)
        };
        let http = HttpClient::new(&base)
            .map_err(|e| TweetieError::Config(e.to_string()))?
            .with_timeout(settings.timeout)
            .with_retries(settings.transport_retries);

        let key: String =
            url::form_urlencoded::byte_serialize(credentials.consumer_key().as_bytes()).collect();
        let secret: String =
            url::form_urlencoded::byte_serialize(credentials.consumer_secret().as_bytes())
                .collect();

        let token: TokenResponse = http
            .post_form_json(
                "oauth2/token",
                RequestOpts {
                    auth: Some(Auth::Basic {
                        user: Cow::Owned(key),
                        password: Cow::Owned(secret),
                    }),
                    form: Some(vec![("grant_type", Cow::Borrowed("client_credentials"))]),
                    ..Default::default()
                },
            )
            .await
            .map_err(|err| match err.status() {
                Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                    TweetieError::Auth(api_message(&err))
                }
                _ => classify(err, "oauth2/token"),
            })?;

        if !token.token_type.eq_ignore_ascii_case("bearer") {
            return Err(TweetieError::Auth(format!(
                "unexpected token type `{}`",
                token.token_type
            )));
        }

        tracing::info!(
            base = %http.base(),
            qps = settings.qps,
            burst = settings.burst,
            "session.opened"
        );
        Ok(Self {
            http,
            bearer: token.access_token,
            gate: RateGate::new(settings.qps, settings.burst),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(&str, Cow<'_, str>)>,
        target: &str,
    ) -> Result<T> {
        self.http
            .get_json(
                path,
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.bearer)),
                    query: Some(query),
                    ..Default::default()
                },
            )
            .await
            .map_err(|err| classify(err, target))
    }
}

#[async_trait]
impl SocialApi for Session {
    fn rate_gate(&self) -> &RateGate {
        &self.gate
    }

    async fn user_by_handle(&self, handle: &str) -> Result<User> {
        self.get(
            "1.1/users/show.json",
            vec![("screen_name", Cow::Borrowed(handle))],
            &format!("screen_name={handle}"),
        )
        .await
    }

    async fn user_by_id(&self, id: u64) -> Result<User> {
        self.get(
            "1.1/users/show.json",
            vec![("user_id", Cow::Owned(id.to_string()))],
            &format!("user_id={id}"),
        )
        .await
    }

    async fn timeline_page(
        &self,
        handle: &str,
        max_id: Option<u64>,
        count: u32,
    ) -> Result<Vec<Status>> {
        let mut query = vec![
            ("screen_name", Cow::Borrowed(handle)),
            ("count", Cow::Owned(count.to_string())),
            ("tweet_mode", Cow::Borrowed("extended")),
            ("include_rts", Cow::Borrowed("true")),
        ];
        if let Some(max_id) = max_id {
            query.push(("max_id", Cow::Owned(max_id.to_string())));
        }
        self.get(
            "1.1/statuses/user_timeline.json",
            query,
            &format!("timeline screen_name={handle}"),
        )
        .await
    }

    async fn friend_ids_page(&self, handle: &str, cursor: i64) -> Result<FriendIds> {
        self.get(
            "1.1/friends/ids.json",
            vec![
                ("screen_name", Cow::Borrowed(handle)),
                ("cursor", Cow::Owned(cursor.to_string())),
                ("count", Cow::Borrowed("5000")),
            ],
            &format!("friends screen_name={handle}"),
        )
        .await
    }
}

fn api_message(err: &HttpError) -> String {
    match err {
        HttpError::Api { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

/// Map a transport failure onto the pipeline's error taxonomy.
pub(crate) fn classify(err: HttpError, target: &str) -> TweetieError {
    if err.is_rate_limited() {
        return TweetieError::RateLimited {
            retry_after: err.retry_after(),
            attempts: 1,
        };
    }
    match err {
        HttpError::Api { status, message, .. } if status == StatusCode::UNAUTHORIZED => {
            TweetieError::Auth(message)
        }
        HttpError::Api { status, message, .. }
            if status == StatusCode::FORBIDDEN || status == StatusCode::NOT_FOUND =>
        {
            TweetieError::NotFound(format!("{target}: {message}"))
        }
        HttpError::Decode(reason, snippet) => {
            TweetieError::Decode(format!("{target}: {reason} (body: {snippet})"))
        }
        other => TweetieError::Transport(other.to_string()),
    }
}
