//! Bounded, newest-first timeline windows.
//!
//! [`TimelineCursor`] walks `statuses/user_timeline` with `max_id` paging and
//! stops at the cap, on an empty page, when the cursor stops moving, or when
//! the caller cancels, whether between pages or during a throttling backoff.
//! [`fetch_recent`] drives one to completion and normalizes every post.
use async_stream::try_stream;
use futures::Stream;
use tweetie_common::{Result, TweetieError};
use tweetie_sentiment::{LexiconScorer, SentimentScorer};

use crate::twitter::client::SocialApi;
use crate::twitter::extract::normalize_status;
use crate::twitter::model::TimelineResult;
use crate::twitter::options::FetchOptions;
use crate::twitter::rate::call_with_backoff;
use crate::twitter::types::Status;

/// Largest `count` the timeline endpoint honours.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Forward-only, one-shot pager over one account's timeline.
pub struct TimelineCursor<'a, A: SocialApi + ?Sized> {
    api: &'a A,
    handle: &'a str,
    opts: &'a FetchOptions,
    remaining: usize,
    max_id: Option<u64>,
    pages: u32,
    finished: bool,
    cancelled: bool,
}

impl<'a, A: SocialApi + ?Sized> TimelineCursor<'a, A> {
    pub fn new(api: &'a A, handle: &'a str, cap: usize, opts: &'a FetchOptions) -> Self {
        Self {
            api,
            handle,
            opts,
            remaining: cap,
            max_id: None,
            pages: 0,
            finished: cap == 0,
            cancelled: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// True when the cursor stopped because the caller cancelled.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Fetch the next page, or `None` once the window is complete.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Status>>> {
        if self.finished {
            return Ok(None);
        }
        if self.opts.cancel.is_cancelled() {
            tracing::info!(handle = self.handle, pages = self.pages, "timeline.cancelled");
            self.finished = true;
            self.cancelled = true;
            return Ok(None);
        }

        let page_size = self.opts.page_size.clamp(1, MAX_PAGE_SIZE) as usize;
        let count = page_size.min(self.remaining) as u32;
        let (api, handle, max_id) = (self.api, self.handle, self.max_id);

        let opts = self.opts;
        let fetched = call_with_backoff(
            api.rate_gate(),
            &opts.retry,
            &opts.cancel,
            "timeline.page",
            || api.timeline_page(handle, max_id, count),
        )
        .await;
        let mut page = match fetched {
            Ok(page) => page,
            Err(TweetieError::Cancelled) => {
                tracing::info!(handle, pages = self.pages, "timeline.cancelled");
                self.finished = true;
                self.cancelled = true;
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        self.pages += 1;

        let Some(last_id) = page.last().map(|s| s.id) else {
            tracing::debug!(handle, pages = self.pages, "timeline.exhausted");
            self.finished = true;
            return Ok(None);
        };

        // A page that does not move below the previous cursor repeats an earlier window.
        if max_id.is_some_and(|prev| last_id > prev) {
            tracing::warn!(handle, last_id, ?max_id, "timeline.cursor_stalled");
            self.finished = true;
            return Ok(None);
        }

        page.truncate(self.remaining);
        self.remaining -= page.len();
        self.max_id = last_id.checked_sub(1);
        if self.remaining == 0 || self.max_id.is_none() {
            self.finished = true;
        }

        tracing::debug!(
            handle,
            page = self.pages,
            items = page.len(),
            remaining = self.remaining,
            next_max_id = ?self.max_id,
            "timeline.page"
        );
        Ok(Some(page))
    }

    /// Flatten the remaining pages into a stream of raw statuses.
    pub fn into_stream(mut self) -> impl Stream<Item = Result<Status>> + 'a {
        try_stream! {
            while let Some(page) = self.next_page().await? {
                for status in page {
                    yield status;
                }
            }
        }
    }
}

/// Fetch up to `cap` of `handle`'s most recent posts, scored with the built-in lexicon.
pub async fn fetch_recent<A>(
    api: &A,
    handle: &str,
    cap: usize,
    opts: &FetchOptions,
) -> Result<TimelineResult>
where
    A: SocialApi + ?Sized,
{
    let scorer = LexiconScorer::new();
    fetch_recent_with(api, &scorer, handle, cap, opts).await
}

/// Like [`fetch_recent`], scoring with the supplied `scorer`.
///
/// The profile lookup always runs, even for `cap == 0`, so the lifetime post
/// count is reported regardless of the window size.
pub async fn fetch_recent_with<A, S>(
    api: &A,
    scorer: &S,
    handle: &str,
    cap: usize,
    opts: &FetchOptions,
) -> Result<TimelineResult>
where
    A: SocialApi + ?Sized,
    S: SentimentScorer + ?Sized,
{
    let user = call_with_backoff(
        api.rate_gate(),
        &opts.retry,
        &opts.cancel,
        "timeline.profile",
        || api.user_by_handle(handle),
    )
    .await?;

    let mut cursor = TimelineCursor::new(api, handle, cap, opts);
    let mut items = Vec::with_capacity(cap.min(user.statuses_count as usize));
    while let Some(page) = cursor.next_page().await? {
        for status in &page {
            items.push(normalize_status(status, scorer)?);
        }
    }

    let complete = !cursor.was_cancelled();
    tracing::info!(
        handle,
        items = items.len(),
        cap,
        total = user.statuses_count,
        complete,
        scorer = scorer.name(),
        "timeline.fetched"
    );
    Ok(TimelineResult {
        owner_handle: user.screen_name,
        total_activity_count: user.statuses_count,
        items,
        complete,
    })
}
