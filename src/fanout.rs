//! Concurrent fan-out primitives with per-item error isolation.
//!
//! Two disciplines, matching the two workloads:
//!
//! - [`batched_map`] / [`batched_filter_map`]: at most `batch_size`
//!   sub-operations in flight; a new batch starts only after the previous
//!   batch has fully completed. Used for discovery enrichment and the
//!   keyword scan, where the item count is the vault size.
//! - [`gather_map`]: every sub-operation starts at once. Used for
//!   search-hit metadata, where the item count is a handful of hits.
//!
//! In both, a failing sub-operation never aborts its siblings and is never
//! re-raised; it simply yields `None` in the result.

use std::future::Future;

use crate::error::VaultResult;

/// Run `f` over `items` in sequential batches of `batch_size`. The result
/// is aligned with the input: `results[i]` is `Some` iff `f(items[i])`
/// succeeded.
pub async fn batched_map<T, R, F, Fut>(items: Vec<T>, batch_size: usize, f: F) -> Vec<Option<R>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = VaultResult<R>>,
{
    let batch_size = batch_size.max(1);
    let mut results = Vec::with_capacity(items.len());
    let mut remaining = items.into_iter();
    loop {
        let batch: Vec<T> = remaining.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }
        let outcomes = futures::future::join_all(batch.into_iter().map(&f)).await;
        results.extend(outcomes.into_iter().map(Result::ok));
    }
    results
}

/// Like [`batched_map`], but `f` may also decline an item (`Ok(None)`), and
/// an optional `limit` stops the pipeline at the first batch boundary after
/// `limit` accepted items exist. Failures count as declines. Returns the
/// accepted items in input order, truncated to `limit`.
pub async fn batched_filter_map<T, R, F, Fut>(
    items: Vec<T>,
    batch_size: usize,
    limit: Option<usize>,
    f: F,
) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = VaultResult<Option<R>>>,
{
    let batch_size = batch_size.max(1);
    let mut accepted = Vec::new();
    if limit == Some(0) {
        return accepted;
    }

    let mut remaining = items.into_iter();
    loop {
        let batch: Vec<T> = remaining.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }
        let outcomes = futures::future::join_all(batch.into_iter().map(&f)).await;
        accepted.extend(outcomes.into_iter().filter_map(|r| r.ok().flatten()));

        if let Some(limit) = limit {
            if accepted.len() >= limit {
                accepted.truncate(limit);
                break;
            }
        }
    }
    accepted
}

/// Run `f` over every item concurrently, without a bound. The result is
/// aligned with the input; failures yield `None`.
pub async fn gather_map<T, R, F, Fut>(items: Vec<T>, f: F) -> Vec<Option<R>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = VaultResult<R>>,
{
    futures::future::join_all(items.into_iter().map(f))
        .await
        .into_iter()
        .map(Result::ok)
        .collect()
}
