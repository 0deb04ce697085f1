//! Asset link repair.
//!
//! A page's includes table does not always carry every asset the page links
//! to (unpublished or freshly replaced images are the usual cause). Each
//! missing asset is looked up through an ordered chain of strategies, and the
//! first one that yields an asset with a file wins:
//!
//! 1. the response's includes table,
//! 2. the delivery API by id,
//! 3. the management API, re-publishing the asset so the delivery API serves
//!    it from then on,
//! 4. a delivery search on `sys.type = Asset` and `sys.id`.
//!
//! A total miss is `None`; the caller drops the field. Nothing here returns an
//! error.

use std::collections::{BTreeSet, HashMap};

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::ContentClient;
use crate::contract::EntryQuery;
use crate::error::{FetchError, ResolveError};
use crate::fetch::with_timeout;
use crate::model::{Asset, Entry, Includes, Link, LinkType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Includes,
    DeliveryAsset,
    ManagementRepublish,
    AssetSearch,
}

impl Strategy {
    pub const CHAIN: [Strategy; 4] = [
        Strategy::Includes,
        Strategy::DeliveryAsset,
        Strategy::ManagementRepublish,
        Strategy::AssetSearch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Includes => "includes",
            Strategy::DeliveryAsset => "delivery_asset",
            Strategy::ManagementRepublish => "management_republish",
            Strategy::AssetSearch => "asset_search",
        }
    }
}

/// Resolves one asset link, or `None` when every strategy fails.
pub async fn resolve_asset(
    link: &Link,
    includes: &Includes,
    client: &ContentClient,
) -> Option<Asset> {
    if link.link_type != LinkType::Asset {
        warn!(link_id = %link.id, "Asked to resolve a non-asset link");
        return None;
    }

    for strategy in Strategy::CHAIN {
        match attempt(strategy, &link.id, includes, client).await {
            Ok(asset) => {
                info!(
                    asset_id = %link.id,
                    strategy = strategy.as_str(),
                    "Resolved asset link"
                );
                return Some(asset);
            }
            Err(ResolveError::Fetch(FetchError::ManagementUnavailable)) => {
                debug!(
                    asset_id = %link.id,
                    strategy = strategy.as_str(),
                    "Strategy skipped, no management token"
                );
            }
            Err(e) => {
                debug!(
                    asset_id = %link.id,
                    strategy = strategy.as_str(),
                    error = %e,
                    "Strategy failed"
                );
            }
        }
    }

    warn!(asset_id = %link.id, "Asset link could not be resolved, dropping field");
    None
}

async fn attempt(
    strategy: Strategy,
    id: &str,
    includes: &Includes,
    client: &ContentClient,
) -> Result<Asset, ResolveError> {
    let asset = match strategy {
        Strategy::Includes => includes
            .asset(id)
            .map(Asset::from_delivery)
            .ok_or_else(|| ResolveError::NotFound(id.to_string()))?,
        Strategy::DeliveryAsset => {
            let policy = client.fetch_policy();
            let raw = with_timeout(policy, "asset", client.delivery().get_asset(id)).await?;
            Asset::from_delivery(&raw)
        }
        Strategy::ManagementRepublish => republish(id, client).await?,
        Strategy::AssetSearch => search(id, client).await?,
    };

    if asset.has_file() {
        Ok(asset)
    } else {
        Err(ResolveError::NoFile(id.to_string()))
    }
}

async fn republish(id: &str, client: &ContentClient) -> Result<Asset, ResolveError> {
    let management = client.management().ok_or(FetchError::ManagementUnavailable)?;
    let policy = client.fetch_policy();

    let current = with_timeout(policy, "management asset", management.get_asset(id)).await?;
    let published = with_timeout(
        policy,
        "management publish",
        management.publish_asset(&current),
    )
    .await?;
    info!(
        asset_id = id,
        version = published.sys.version,
        "Re-published asset"
    );
    Asset::from_management(&published, client.locale())
}

async fn search(id: &str, client: &ContentClient) -> Result<Asset, ResolveError> {
    let query = EntryQuery::default()
        .filter("sys.type", "Asset")
        .filter("sys.id", id)
        .limit(1);
    let policy = client.fetch_policy();
    let found = with_timeout(policy, "asset search", client.delivery().get_entries(&query)).await?;

    found
        .items
        .iter()
        .chain(found.includes.assets.iter())
        .find(|raw| raw.id() == id)
        .map(Asset::from_delivery)
        .ok_or_else(|| ResolveError::NotFound(id.to_string()))
}

/// Resolves every unresolved asset link inside `entry` concurrently and
/// embeds the results. Fields and array elements whose link stays
/// unresolved are removed.
pub async fn resolve_linked_assets(
    entry: Entry,
    includes: &Includes,
    client: &ContentClient,
) -> Entry {
    let mut ids = BTreeSet::new();
    for value in entry.fields.values() {
        collect_asset_links(value, &mut ids);
    }
    if ids.is_empty() {
        return entry;
    }

    let lookups = ids.into_iter().map(|id| async move {
        let asset = resolve_asset(&Link::asset(id.clone()), includes, client).await;
        (id, asset)
    });
    let resolved: HashMap<String, Option<Asset>> = join_all(lookups).await.into_iter().collect();

    let missing = resolved.values().filter(|a| a.is_none()).count();
    info!(
        entry_id = %entry.id(),
        links = resolved.len(),
        missing,
        "Resolved linked assets"
    );

    let Entry { sys, fields } = entry;
    let fields = fields
        .into_iter()
        .filter_map(|(name, value)| substitute(value, &resolved).map(|v| (name, v)))
        .collect();
    Entry { sys, fields }
}

fn collect_asset_links(value: &Value, ids: &mut BTreeSet<String>) {
    if let Some(link) = Link::from_value(value) {
        if link.link_type == LinkType::Asset {
            ids.insert(link.id);
        }
        return;
    }
    match value {
        Value::Array(values) => values.iter().for_each(|v| collect_asset_links(v, ids)),
        Value::Object(map) => map.values().for_each(|v| collect_asset_links(v, ids)),
        _ => {}
    }
}

fn substitute(value: Value, resolved: &HashMap<String, Option<Asset>>) -> Option<Value> {
    if let Some(link) = Link::from_value(&value) {
        if link.link_type == LinkType::Asset {
            return resolved
                .get(&link.id)
                .cloned()
                .flatten()
                .map(|asset| asset.to_delivery_value());
        }
        return Some(value);
    }
    match value {
        Value::Array(values) => Some(Value::Array(
            values
                .into_iter()
                .filter_map(|v| substitute(v, resolved))
                .collect(),
        )),
        Value::Object(map) => Some(Value::Object(
            map.into_iter()
                .filter_map(|(k, v)| substitute(v, resolved).map(|v| (k, v)))
                .collect(),
        )),
        other => Some(other),
    }
}
