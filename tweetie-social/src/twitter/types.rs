//! Wire models for the v1.1 REST endpoints the pipeline touches.
//!
//! Only the fields the pipeline reads are modelled. Post `entities` stay as raw
//! JSON so one ill-shaped sub-field cannot fail the decode of a whole page;
//! [`crate::twitter::extract`] pulls the typed pieces out field by field.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub screen_name: String,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub statuses_count: u64,
    pub created_at: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub profile_image_url_https: Option<String>,
    #[serde(default)]
    pub protected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub id: u64,
    pub created_at: String,

    // `tweet_mode=extended` returns `full_text`; compat mode returns `text`.
    #[serde(default)]
    pub full_text: Option<String>,
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub entities: Option<serde_json::Value>,
}

impl Status {
    pub fn body(&self) -> &str {
        self.full_text
            .as_deref()
            .or(self.text.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendIds {
    #[serde(default)]
    pub ids: Vec<u64>,
    #[serde(default)]
    pub next_cursor: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashtagEntity {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlEntity {
    /// The t.co wrapper.
    pub url: String,
    #[serde(default)]
    pub expanded_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionEntity {
    pub screen_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token_type: String,
    pub access_token: String,
}
