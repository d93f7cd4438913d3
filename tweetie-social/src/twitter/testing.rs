//! In-memory [`SocialApi`] for unit tests.
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tweetie_common::{Result, TweetieError};

use crate::twitter::client::SocialApi;
use crate::twitter::rate::RateGate;
use crate::twitter::types::{FriendIds, Status, User};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Lookup {
    Found,
    Missing,
    Denied,
    Broken,
    /// Decodes, but the creation date is garbage.
    Malformed,
}

#[derive(Default)]
struct Tripwire {
    after: usize,
    token: Option<CancellationToken>,
}

impl Tripwire {
    fn hit(&self, count: usize) {
        if let Some(token) = &self.token {
            if count >= self.after {
                token.cancel();
            }
        }
    }
}

#[derive(Default)]
struct Recorded {
    timeline_counts: Vec<u32>,
    profile_lookups: usize,
    id_lookups: usize,
    timeline_pages: usize,
}

#[derive(Default)]
pub(crate) struct FakeApi {
    gate: RateGate,
    accounts: HashMap<String, u64>,
    friends: HashMap<String, Vec<Vec<u64>>>,
    profiles: HashMap<u64, Lookup>,
    lookup_delay: Option<Duration>,
    throttled_lookups: AtomicUsize,
    throttled_pages: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    recorded: Mutex<Recorded>,
    lookup_wire: Mutex<Tripwire>,
    page_wire: Mutex<Tripwire>,
}

fn user(id: u64, handle: &str, statuses: u64, created_at: &str) -> User {
    User {
        id,
        name: format!("User {id}"),
        screen_name: handle.to_string(),
        followers_count: id * 10,
        statuses_count: statuses,
        created_at: created_at.to_string(),
        profile_image_url: Some(format!("http://img/{id}.png")),
        profile_image_url_https: None,
        protected: false,
    }
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// An account whose timeline holds posts `1..=posts`, newest first.
    pub(crate) fn with_account(mut self, handle: &str, posts: u64) -> Self {
        self.accounts.insert(handle.to_string(), posts);
        self
    }

    pub(crate) fn with_friends(mut self, handle: &str, pages: Vec<Vec<u64>>) -> Self {
        self.friends.insert(handle.to_string(), pages);
        self
    }

    pub(crate) fn with_profile(mut self, id: u64, lookup: Lookup) -> Self {
        self.profiles.insert(id, lookup);
        self
    }

    pub(crate) fn with_profiles(
        mut self,
        ids: impl IntoIterator<Item = u64>,
        lookup: Lookup,
    ) -> Self {
        self.profiles.extend(ids.into_iter().map(|id| (id, lookup)));
        self
    }

    pub(crate) fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = Some(delay);
        self
    }

    /// The next `n` id lookups are throttled.
    pub(crate) fn with_throttled_lookups(self, n: usize) -> Self {
        self.throttled_lookups.store(n, Ordering::SeqCst);
        self
    }

    /// The next `n` timeline pages are throttled.
    pub(crate) fn with_throttled_pages(self, n: usize) -> Self {
        self.throttled_pages.store(n, Ordering::SeqCst);
        self
    }

    pub(crate) fn cancel_after_lookups(&self, n: usize, token: CancellationToken) {
        *self.lookup_wire.lock().unwrap() = Tripwire {
            after: n,
            token: Some(token),
        };
    }

    pub(crate) fn cancel_after_timeline_pages(&self, n: usize, token: CancellationToken) {
        *self.page_wire.lock().unwrap() = Tripwire {
            after: n,
            token: Some(token),
        };
    }

    pub(crate) fn timeline_counts(&self) -> Vec<u32> {
        self.recorded.lock().unwrap().timeline_counts.clone()
    }

    pub(crate) fn profile_lookups(&self) -> usize {
        self.recorded.lock().unwrap().profile_lookups
    }

    pub(crate) fn max_concurrent_lookups(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

fn take_throttle(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

fn throttled<T>() -> Result<T> {
    Err(TweetieError::RateLimited {
        retry_after: None,
        attempts: 1,
    })
}

#[async_trait]
impl SocialApi for FakeApi {
    fn rate_gate(&self) -> &RateGate {
        &self.gate
    }

    async fn user_by_handle(&self, handle: &str) -> Result<User> {
        self.recorded.lock().unwrap().profile_lookups += 1;
        let posts = self
            .accounts
            .get(handle)
            .ok_or_else(|| TweetieError::NotFound(format!("screen_name={handle}")))?;
        Ok(user(1, handle, *posts, "Tue Mar 21 20:50:14 +0000 2006"))
    }

    async fn user_by_id(&self, id: u64) -> Result<User> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let count = {
            let mut rec = self.recorded.lock().unwrap();
            rec.id_lookups += 1;
            rec.id_lookups
        };
        self.lookup_wire.lock().unwrap().hit(count);

        if take_throttle(&self.throttled_lookups) {
            return throttled();
        }

        let created = "Mon Jan 01 00:00:00 +0000 2024";
        match self.profiles.get(&id).copied() {
            Some(Lookup::Found) => Ok(user(id, &format!("user{id}"), 0, created)),
            Some(Lookup::Malformed) => Ok(user(id, &format!("user{id}"), 0, "not a date")),
            Some(Lookup::Denied) => Err(TweetieError::Auth("token revoked".into())),
            Some(Lookup::Broken) => Err(TweetieError::Transport("connection reset".into())),
            Some(Lookup::Missing) | None => Err(TweetieError::NotFound(format!("user_id={id}"))),
        }
    }

    async fn timeline_page(
        &self,
        handle: &str,
        max_id: Option<u64>,
        count: u32,
    ) -> Result<Vec<Status>> {
        let pages = {
            let mut rec = self.recorded.lock().unwrap();
            rec.timeline_counts.push(count);
            rec.timeline_pages += 1;
            rec.timeline_pages
        };
        self.page_wire.lock().unwrap().hit(pages);
        if take_throttle(&self.throttled_pages) {
            return throttled();
        }

        let posts = self
            .accounts
            .get(handle)
            .ok_or_else(|| TweetieError::NotFound(format!("screen_name={handle}")))?;
        let top = max_id.map_or(*posts, |m| m.min(*posts));
        Ok((1..=top)
            .rev()
            .take(count as usize)
            .map(|id| {
                serde_json::from_value(json!({
                    "id": id,
                    "created_at": "Mon Jan 01 12:00:00 +0000 2024",
                    "full_text": format!("post {id} is great #n{id}"),
                    "retweet_count": id,
                    "entities": {
                        "hashtags": [{"text": format!("n{id}")}],
                        "urls": [],
                        "user_mentions": []
                    }
                }))
                .unwrap()
            })
            .collect())
    }

    async fn friend_ids_page(&self, handle: &str, cursor: i64) -> Result<FriendIds> {
        let pages = self
            .friends
            .get(handle)
            .ok_or_else(|| TweetieError::NotFound(format!("screen_name={handle}")))?;
        let index = if cursor < 0 { 0 } else { cursor as usize };
        let ids = pages.get(index).cloned().unwrap_or_default();
        let next_cursor = if index + 1 < pages.len() {
            (index + 1) as i64
        } else {
            0
        };
        Ok(FriendIds { ids, next_cursor })
    }
}
