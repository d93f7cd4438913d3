//! Resolve the accounts a user follows into profile summaries.
//!
//! Identifiers are gathered from every `friends/ids` page, then looked up with
//! at most `max_in_flight` calls outstanding. Results come back in identifier
//! order. A failed lookup becomes an unresolved entry; only authentication
//! failures and exhausted throttling abort the batch. Cancellation never
//! aborts: the list comes back with `complete = false`.
use futures::{StreamExt, TryStreamExt, stream};
use tweetie_common::{Result, TweetieError};

use crate::twitter::client::SocialApi;
use crate::twitter::extract::normalize_profile;
use crate::twitter::model::{FollowingEntry, FollowingList, UnresolvedReason};
use crate::twitter::options::FetchOptions;
use crate::twitter::rate::call_with_backoff;

/// `friends/ids` cursor meaning "first page".
const FIRST_CURSOR: i64 = -1;

pub async fn fetch_following<A>(
    api: &A,
    handle: &str,
    opts: &FetchOptions,
) -> Result<FollowingList>
where
    A: SocialApi + ?Sized,
{
    let (ids, ids_complete) = friend_ids(api, handle, opts).await?;
    let total = ids.len();

    let entries: Vec<FollowingEntry> = stream::iter(ids)
        .map(|id| resolve_one(api, id, opts))
        .buffered(opts.max_in_flight.max(1))
        .try_collect()
        .await?;

    let lookups_complete = !entries.iter().any(|e| {
        matches!(
            e,
            FollowingEntry::Unresolved {
                reason: UnresolvedReason::Cancelled,
                ..
            }
        )
    });
    let list = FollowingList {
        owner_handle: handle.to_string(),
        entries,
        complete: ids_complete && lookups_complete,
    };
    tracing::info!(
        handle,
        total,
        unresolved = list.unresolved_count(),
        complete = list.complete,
        "following.fetched"
    );
    Ok(list)
}

/// Every followed identifier, and whether paging ran to the end.
async fn friend_ids<A>(api: &A, handle: &str, opts: &FetchOptions) -> Result<(Vec<u64>, bool)>
where
    A: SocialApi + ?Sized,
{
    let mut ids = Vec::new();
    let mut cursor = FIRST_CURSOR;
    loop {
        if opts.cancel.is_cancelled() {
            tracing::info!(handle, gathered = ids.len(), "following.ids.cancelled");
            return Ok((ids, false));
        }
        let fetched = call_with_backoff(
            api.rate_gate(),
            &opts.retry,
            &opts.cancel,
            "following.ids",
            || api.friend_ids_page(handle, cursor),
        )
        .await;
        let page = match fetched {
            Ok(page) => page,
            Err(TweetieError::Cancelled) => {
                tracing::info!(handle, gathered = ids.len(), "following.ids.cancelled");
                return Ok((ids, false));
            }
            Err(err) => return Err(err),
        };
        tracing::debug!(
            handle,
            cursor,
            ids = page.ids.len(),
            next = page.next_cursor,
            "following.ids.page"
        );
        ids.extend(page.ids);

        if page.next_cursor == 0 || page.next_cursor == cursor {
            break;
        }
        cursor = page.next_cursor;
    }
    Ok((ids, true))
}

async fn resolve_one<A>(api: &A, id: u64, opts: &FetchOptions) -> Result<FollowingEntry>
where
    A: SocialApi + ?Sized,
{
    if opts.cancel.is_cancelled() {
        return Ok(FollowingEntry::unresolved(id, UnresolvedReason::Cancelled, None));
    }

    let looked_up = call_with_backoff(
        api.rate_gate(),
        &opts.retry,
        &opts.cancel,
        "following.lookup",
        || api.user_by_id(id),
    )
    .await;

    let (reason, detail) = match looked_up {
        Ok(user) => match normalize_profile(&user) {
            Ok(profile) => return Ok(FollowingEntry::Resolved(profile)),
            Err(err) => (UnresolvedReason::Malformed, err.to_string()),
        },
        Err(TweetieError::Cancelled) => {
            tracing::debug!(id, "following.lookup.cancelled");
            return Ok(FollowingEntry::unresolved(id, UnresolvedReason::Cancelled, None));
        }
        Err(err) if err.is_fatal() => {
            tracing::warn!(id, error = %err, "following.lookup.aborted");
            return Err(err);
        }
        Err(TweetieError::NotFound(detail)) => (UnresolvedReason::NotFound, detail),
        Err(err) => (UnresolvedReason::Failed, err.to_string()),
    };

    tracing::warn!(id, ?reason, %detail, "following.lookup.unresolved");
    Ok(FollowingEntry::unresolved(id, reason, Some(detail)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twitter::testing::{FakeApi, Lookup};

    fn opts(max_in_flight: usize) -> FetchOptions {
        FetchOptions {
            max_in_flight,
            ..FetchOptions::default()
        }
    }

    #[tokio::test]
    async fn missing_account_leaves_a_hole_in_order() {
        let api = FakeApi::new()
            .with_friends("jack", vec![vec![10, 20, 30]])
            .with_profile(10, Lookup::Found)
            .with_profile(20, Lookup::Missing)
            .with_profile(30, Lookup::Found);

        let list = fetch_following(&api, "jack", &opts(2)).await.unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.entries[0].profile().unwrap().handle, "user10");
        assert!(matches!(
            list.entries[1],
            FollowingEntry::Unresolved {
                id: 20,
                reason: UnresolvedReason::NotFound,
                ..
            }
        ));
        assert_eq!(list.entries[2].profile().unwrap().handle, "user30");
    }

    #[tokio::test]
    async fn follows_every_id_page() {
        let api = FakeApi::new()
            .with_friends("jack", vec![vec![1, 2], vec![3], vec![4, 5]])
            .with_profiles(1..=5, Lookup::Found);

        let list = fetch_following(&api, "jack", &opts(4)).await.unwrap();
        let handles: Vec<&str> = list.resolved().map(|p| p.handle.as_str()).collect();
        assert_eq!(handles, vec!["user1", "user2", "user3", "user4", "user5"]);
        assert!(list.complete);
    }

    #[tokio::test]
    async fn cancelled_id_paging_is_reported_incomplete() {
        let api = FakeApi::new().with_friends("jack", vec![vec![1, 2, 3]]);
        let options = opts(2);
        options.cancel.cancel();

        let cancelled = fetch_following(&api, "jack", &options).await.unwrap();
        let empty = FakeApi::new().with_friends("jack", vec![vec![]]);
        let nobody = fetch_following(&empty, "jack", &opts(2)).await.unwrap();

        assert!(cancelled.is_empty());
        assert!(!cancelled.complete);
        assert!(nobody.complete);
        assert_ne!(cancelled, nobody);
    }

    #[tokio::test]
    async fn cancel_during_backoff_leaves_lookup_unresolved() {
        let api = FakeApi::new()
            .with_friends("jack", vec![vec![7, 8]])
            .with_profiles([7, 8], Lookup::Found)
            .with_throttled_lookups(1);
        let options = FetchOptions {
            max_in_flight: 1,
            retry: crate::twitter::RetryPolicy {
                max_attempts: 3,
                base_delay: std::time::Duration::from_secs(600),
                max_delay: std::time::Duration::from_secs(900),
            },
            ..FetchOptions::default()
        };
        let trigger = options.cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = tokio::time::Instant::now();
        let list = fetch_following(&api, "jack", &options).await.unwrap();

        assert!(started.elapsed() < std::time::Duration::from_secs(1));
        assert!(!list.complete);
        assert_eq!(list.resolved().count(), 0);
        assert!(list.entries.iter().all(|e| matches!(
            e,
            FollowingEntry::Unresolved {
                reason: UnresolvedReason::Cancelled,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn lookups_stay_within_the_in_flight_bound() {
        let ids: Vec<u64> = (1..=12).collect();
        let api = FakeApi::new()
            .with_friends("jack", vec![ids.clone()])
            .with_profiles(ids, Lookup::Found)
            .with_lookup_delay(std::time::Duration::from_millis(5));

        let list = fetch_following(&api, "jack", &opts(3)).await.unwrap();
        assert_eq!(list.len(), 12);
        assert_eq!(api.max_concurrent_lookups(), 3);
    }

    #[tokio::test]
    async fn per_item_failures_are_isolated() {
        let api = FakeApi::new()
            .with_friends("jack", vec![vec![1, 2, 3, 4]])
            .with_profile(1, Lookup::Broken)
            .with_profile(2, Lookup::Malformed)
            .with_profile(3, Lookup::Found)
            .with_profile(4, Lookup::Missing);

        let list = fetch_following(&api, "jack", &opts(8)).await.unwrap();
        let reasons: Vec<Option<UnresolvedReason>> = list
            .entries
            .iter()
            .map(|e| match e {
                FollowingEntry::Resolved(_) => None,
                FollowingEntry::Unresolved { reason, .. } => Some(*reason),
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                Some(UnresolvedReason::Failed),
                Some(UnresolvedReason::Malformed),
                None,
                Some(UnresolvedReason::NotFound),
            ]
        );
    }

    #[tokio::test]
    async fn auth_failure_aborts_the_batch() {
        let api = FakeApi::new()
            .with_friends("jack", vec![vec![1, 2, 3]])
            .with_profile(1, Lookup::Found)
            .with_profile(2, Lookup::Denied)
            .with_profile(3, Lookup::Found);

        let err = fetch_following(&api, "jack", &opts(1)).await.unwrap_err();
        assert!(matches!(err, TweetieError::Auth(_)));
    }

    #[tokio::test]
    async fn cancellation_keeps_resolved_prefix() {
        let ids: Vec<u64> = (1..=6).collect();
        let api = FakeApi::new()
            .with_friends("jack", vec![ids.clone()])
            .with_profiles(ids, Lookup::Found);
        let options = opts(1);
        api.cancel_after_lookups(2, options.cancel.clone());

        let list = fetch_following(&api, "jack", &options).await.unwrap();
        assert_eq!(list.len(), 6);
        assert!(!list.complete);
        assert_eq!(list.resolved().count(), 2);
        assert!(list.entries[2..].iter().all(|e| matches!(
            e,
            FollowingEntry::Unresolved {
                reason: UnresolvedReason::Cancelled,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn throttled_lookup_is_retried() {
        let api = FakeApi::new()
            .with_friends("jack", vec![vec![7]])
            .with_profile(7, Lookup::Found)
            .with_throttled_lookups(2);
        let options = FetchOptions {
            retry: crate::twitter::RetryPolicy {
                max_attempts: 3,
                base_delay: std::time::Duration::from_millis(1),
                max_delay: std::time::Duration::from_millis(5),
            },
            ..FetchOptions::default()
        };

        let list = fetch_following(&api, "jack", &options).await.unwrap();
        assert_eq!(list.resolved().count(), 1);
    }

    #[tokio::test]
    async fn no_follows_is_an_empty_list() {
        let api = FakeApi::new().with_friends("jack", vec![vec![]]);
        let list = fetch_following(&api, "jack", &opts(8)).await.unwrap();
        assert!(list.is_empty());
        assert!(list.complete);
        assert_eq!(list.owner_handle, "jack");
    }
}
