//! Entry fetching with a timeout and bounded retry on every attempt.

use std::future::Future;

use tracing::{error, info, warn};

use crate::client::ContentClient;
use crate::config::FetchPolicy;
use crate::contract::{DeliveryApi, EntryQuery, OrderBy};
use crate::error::FetchError;
use crate::model::{Entry, EntryCollection, Includes};

/// Sort key for entries without an order field. Sorts them last.
pub const MISSING_ORDER: f64 = f64::MAX;

/// Largest page the delivery API serves.
pub const PAGE_LIMIT: u32 = 1000;

pub async fn fetch_entries(
    client: &ContentClient,
    query: &EntryQuery,
) -> Result<EntryCollection, FetchError> {
    fetch_entries_with(client.delivery(), query, client.fetch_policy()).await
}

/// Runs `query`, retrying transient failures with exponential backoff, then
/// applies any client-side ordering.
pub async fn fetch_entries_with<D>(
    delivery: &D,
    query: &EntryQuery,
    policy: &FetchPolicy,
) -> Result<EntryCollection, FetchError>
where
    D: DeliveryApi + ?Sized,
{
    let mut attempt: u32 = 0;
    loop {
        match with_timeout(policy, "entries", delivery.get_entries(query)).await {
            Ok(mut collection) => {
                if let Some(OrderBy::Field(field)) = &query.order {
                    sort_by_order_field(&mut collection.items, field);
                }
                info!(
                    content_type = query.content_type.as_deref().unwrap_or("*"),
                    slug = query.slug_filter().unwrap_or(""),
                    items = collection.items.len(),
                    total = collection.total,
                    "Fetched entries"
                );
                return Ok(collection);
            }
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                let delay = policy.backoff.saturating_mul(1u32 << attempt.min(16));
                warn!(
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient fetch failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                error!(
                    content_type = query.content_type.as_deref().unwrap_or("*"),
                    error = %e,
                    "Entries query failed"
                );
                return Err(e);
            }
        }
    }
}

/// Pages through every result of `query`, merging the includes tables.
pub async fn fetch_all(
    client: &ContentClient,
    query: &EntryQuery,
) -> Result<EntryCollection, FetchError> {
    let page_size = query.limit.unwrap_or(PAGE_LIMIT).clamp(1, PAGE_LIMIT);
    let mut merged = EntryCollection::default();
    let mut skip = query.skip.unwrap_or(0);

    loop {
        let page_query = query.clone().limit(page_size).skip(skip);
        let page = fetch_entries(client, &page_query).await?;
        let received = page.items.len() as u32;

        merged.total = page.total;
        merged.items.extend(page.items);
        merge_includes(&mut merged.includes, page.includes);

        skip += received;
        if received < page_size || u64::from(skip) >= page.total {
            break;
        }
    }

    if let Some(OrderBy::Field(field)) = &query.order {
        sort_by_order_field(&mut merged.items, field);
    }
    merged.limit = u64::from(page_size);
    Ok(merged)
}

/// Fetches one entry by id together with the includes needed to hydrate it.
pub async fn fetch_entry(
    client: &ContentClient,
    id: &str,
    include: u8,
) -> Result<Option<(Entry, Includes)>, FetchError> {
    let query = EntryQuery::default()
        .filter("sys.id", id)
        .include(include)
        .limit(1);
    let mut collection = fetch_entries(client, &query).await?;
    if collection.items.is_empty() {
        warn!(entry_id = id, "No entry with this id");
        return Ok(None);
    }
    let entry = collection.items.swap_remove(0);
    Ok(Some((entry, collection.includes)))
}

/// Stable ascending sort on a numeric field; entries without it go last.
pub fn sort_by_order_field(items: &mut [Entry], field: &str) {
    items.sort_by(|a, b| order_key(a, field).total_cmp(&order_key(b, field)));
}

fn order_key(entry: &Entry, field: &str) -> f64 {
    entry.number(field).unwrap_or(MISSING_ORDER)
}

fn merge_includes(into: &mut Includes, from: Includes) {
    for entry in from.entries {
        if into.entry(entry.id()).is_none() {
            into.entries.push(entry);
        }
    }
    for asset in from.assets {
        if into.asset(asset.id()).is_none() {
            into.assets.push(asset);
        }
    }
}

/// Bounds a single CMS call by the policy timeout.
pub(crate) async fn with_timeout<T, F>(
    policy: &FetchPolicy,
    label: &str,
    call: F,
) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(policy.timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            url: label.to_string(),
        }),
    }
}
