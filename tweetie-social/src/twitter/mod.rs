//! Twitter/X integration: an authenticated [`Session`], the bounded
//! [`fetch_recent`] timeline window, the [`fetch_following`] resolver, and the
//! [`aggregate`] envelope.
//!
//! Every remote call goes through the session's [`RateGate`] and is retried on
//! throttling according to [`RetryPolicy`]; a 429 seen by any caller pauses the
//! gate for everyone sharing the session.
pub mod client;
pub mod extract;
pub mod following;
pub mod model;
pub mod options;
pub mod rate;
pub mod timeline;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{Credentials, Session, SessionSettings, SocialApi};
pub use following::fetch_following;
pub use model::{
    FollowedProfile, FollowingEntry, FollowingList, PostRecord, TimelineEnvelope, TimelineResult,
    UnresolvedReason, aggregate,
};
pub use options::FetchOptions;
pub use rate::{RateGate, RetryPolicy};
pub use timeline::{TimelineCursor, fetch_recent, fetch_recent_with};
