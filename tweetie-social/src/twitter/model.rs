//! Normalized records produced by the pipeline.
//!
//! Serialized field names follow the keys downstream consumers already read
//! (`retweeted`, `score`, `screen_name`, `image`, ...).
use serde::{Deserialize, Serialize};
use time::Date;

/// One post from a timeline window, with extracted entities and a sentiment score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: u64,
    pub created: Date,
    #[serde(rename = "retweeted")]
    pub repost_count: u64,
    pub text: String,
    pub hashtags: Vec<String>,
    pub urls: Vec<String>,
    pub mentions: Vec<String>,
    /// Compound polarity in `[-1.0, 1.0]`.
    #[serde(rename = "score")]
    pub sentiment_score: f64,
}

/// A bounded, newest-first window of an account's posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineResult {
    pub owner_handle: String,
    /// Lifetime post count reported by the API, independent of `items.len()`.
    pub total_activity_count: u64,
    pub items: Vec<PostRecord>,
    /// False when the fetch was cancelled before the window filled.
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowedProfile {
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "screen_name")]
    pub handle: String,
    #[serde(rename = "followers")]
    pub follower_count: u64,
    pub created: Date,
    #[serde(rename = "image")]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// The account no longer exists or is inaccessible.
    NotFound,
    /// The profile came back but could not be normalized.
    Malformed,
    /// Transport failure after the transport's own retries.
    Failed,
    /// The caller cancelled before this lookup finished.
    Cancelled,
}

/// One slot of a [`FollowingList`], in identifier order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FollowingEntry {
    Resolved(FollowedProfile),
    Unresolved {
        id: u64,
        reason: UnresolvedReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

impl FollowingEntry {
    pub fn unresolved(id: u64, reason: UnresolvedReason, detail: Option<String>) -> Self {
        FollowingEntry::Unresolved { id, reason, detail }
    }

    pub fn profile(&self) -> Option<&FollowedProfile> {
        match self {
            FollowingEntry::Resolved(p) => Some(p),
            FollowingEntry::Unresolved { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, FollowingEntry::Resolved(_))
    }
}

/// Profiles of every account `owner_handle` follows, one entry per identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowingList {
    pub owner_handle: String,
    pub entries: Vec<FollowingEntry>,
    /// False when cancellation cut identifier paging short or left lookups undispatched.
    pub complete: bool,
}

impl FollowingList {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resolved(&self) -> impl Iterator<Item = &FollowedProfile> {
        self.entries.iter().filter_map(FollowingEntry::profile)
    }

    pub fn unresolved_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_resolved()).count()
    }
}

/// The `{user, count, tweets}` envelope handed to downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEnvelope {
    pub user: String,
    pub count: u64,
    pub tweets: Vec<PostRecord>,
}

/// Reshape a timeline window into the consumer envelope.
pub fn aggregate(handle: &str, timeline: TimelineResult) -> TimelineEnvelope {
    TimelineEnvelope {
        user: handle.to_string(),
        count: timeline.total_activity_count,
        tweets: timeline.items,
    }
}
