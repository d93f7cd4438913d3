//! Convert raw v1.1 payloads into normalized records.
//!
//! Entity sub-fields are decoded one at a time. A missing or ill-shaped field
//! yields [`TweetieError::MalformedEntity`] from the field helpers, which
//! [`normalize_status`] turns into an empty list for that field alone.
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};
use tweetie_common::{Result, TweetieError};
use tweetie_sentiment::SentimentScorer;

use crate::twitter::model::{FollowedProfile, PostRecord};
use crate::twitter::types::{HashtagEntity, MentionEntity, Status, UrlEntity, User};

/// `Wed Oct 10 20:19:24 +0000 2018`
const CREATED_AT: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute] [year]"
);

/// Parse a v1.1 `created_at` stamp and keep only its UTC calendar date.
pub fn parse_created_date(raw: &str) -> Result<Date> {
    OffsetDateTime::parse(raw.trim(), CREATED_AT)
        .map(|at| at.to_offset(UtcOffset::UTC).date())
        .map_err(|e| TweetieError::Decode(format!("created_at `{raw}`: {e}")))
}

fn entity_field<T: DeserializeOwned>(
    entities: Option<&Value>,
    field: &'static str,
) -> Result<Vec<T>> {
    let raw = entities
        .and_then(|e| e.get(field))
        .ok_or_else(|| TweetieError::MalformedEntity {
            field,
            reason: "missing".into(),
        })?;
    Vec::<T>::deserialize(raw).map_err(|e| TweetieError::MalformedEntity {
        field,
        reason: e.to_string(),
    })
}

pub fn hashtags(entities: Option<&Value>) -> Result<Vec<String>> {
    let tags: Vec<HashtagEntity> = entity_field(entities, "hashtags")?;
    Ok(tags.into_iter().map(|t| t.text).collect())
}

/// Expanded URLs, falling back to the t.co wrapper when none was expanded.
pub fn urls(entities: Option<&Value>) -> Result<Vec<String>> {
    let urls: Vec<UrlEntity> = entity_field(entities, "urls")?;
    Ok(urls
        .into_iter()
        .map(|u| u.expanded_url.filter(|e| !e.is_empty()).unwrap_or(u.url))
        .collect())
}

pub fn mentions(entities: Option<&Value>) -> Result<Vec<String>> {
    let mentions: Vec<MentionEntity> = entity_field(entities, "user_mentions")?;
    Ok(mentions.into_iter().map(|m| m.screen_name).collect())
}

fn or_empty(status_id: u64, field: Result<Vec<String>>) -> Vec<String> {
    field.unwrap_or_else(|err| {
        tracing::debug!(status_id, error = %err, "extract.entity.malformed");
        Vec::new()
    })
}

/// Build a [`PostRecord`] from a raw status, scoring its text with `scorer`.
///
/// Only an unparseable `created_at` fails; entity problems never do.
pub fn normalize_status<S>(status: &Status, scorer: &S) -> Result<PostRecord>
where
    S: SentimentScorer + ?Sized,
{
    let entities = status.entities.as_ref();
    let text = status.body().to_string();
    Ok(PostRecord {
        id: status.id,
        created: parse_created_date(&status.created_at)?,
        repost_count: status.retweet_count,
        hashtags: or_empty(status.id, hashtags(entities)),
        urls: or_empty(status.id, urls(entities)),
        mentions: or_empty(status.id, mentions(entities)),
        sentiment_score: scorer.score(&text),
        text,
    })
}

pub fn normalize_profile(user: &User) -> Result<FollowedProfile> {
    let avatar_url = user
        .profile_image_url
        .as_deref()
        .or(user.profile_image_url_https.as_deref())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| TweetieError::Decode(format!("user_id={} has no profile image", user.id)))?;

    Ok(FollowedProfile {
        display_name: user.name.clone(),
        handle: user.screen_name.clone(),
        follower_count: user.followers_count,
        created: parse_created_date(&user.created_at)?,
        avatar_url: avatar_url.to_string(),
    })
}
