//! Embeds linked entries and assets into field values, the way the CMS SDK
//! does for `include > 0` responses.
//!
//! Links are looked up in the response's own items first, then in the
//! includes table. A link that cannot be found stays a link; the asset
//! resolver deals with those afterwards. Entry links are followed at most
//! `depth` hops and never back into an entry already on the current path, so
//! a cyclic parent chain in the CMS cannot recurse forever.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::model::{Entry, Includes, Link, LinkType};

pub struct LinkGraph<'a> {
    entries: HashMap<&'a str, &'a Entry>,
    assets: HashMap<&'a str, &'a Entry>,
}

impl<'a> LinkGraph<'a> {
    pub fn new(items: &'a [Entry], includes: &'a Includes) -> Self {
        let mut entries = HashMap::new();
        for entry in includes.entries.iter().chain(items.iter()) {
            entries.insert(entry.id(), entry);
        }
        let assets = includes.assets.iter().map(|a| (a.id(), a)).collect();
        LinkGraph { entries, assets }
    }

    pub fn hydrate(&self, entry: &Entry, depth: u8) -> Entry {
        let mut path = vec![entry.id().to_string()];
        self.hydrate_entry(entry, depth, &mut path)
    }

    fn hydrate_entry(&self, entry: &Entry, depth: u8, path: &mut Vec<String>) -> Entry {
        let fields = entry
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), self.hydrate_value(value, depth, path)))
            .collect();
        Entry {
            sys: entry.sys.clone(),
            fields,
        }
    }

    fn hydrate_value(&self, value: &Value, depth: u8, path: &mut Vec<String>) -> Value {
        if let Some(link) = Link::from_value(value) {
            return self.follow(&link, value, depth, path);
        }
        match value {
            Value::Array(values) => Value::Array(
                values
                    .iter()
                    .map(|v| self.hydrate_value(v, depth, path))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.hydrate_value(v, depth, path)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn follow(&self, link: &Link, original: &Value, depth: u8, path: &mut Vec<String>) -> Value {
        match link.link_type {
            LinkType::Asset => match self.assets.get(link.id.as_str()) {
                Some(asset) => asset.to_value(),
                None => original.clone(),
            },
            LinkType::Entry => {
                if depth == 0 {
                    return original.clone();
                }
                if path.contains(&link.id) {
                    debug!(entry_id = %link.id, "Link cycle detected, leaving link unresolved");
                    return original.clone();
                }
                match self.entries.get(link.id.as_str()) {
                    Some(target) => {
                        path.push(link.id.clone());
                        let hydrated = self.hydrate_entry(target, depth - 1, path);
                        path.pop();
                        hydrated.to_value()
                    }
                    None => {
                        debug!(entry_id = %link.id, "Linked entry not in response");
                        original.clone()
                    }
                }
            }
        }
    }
}

/// Hydrates every item of a response.
pub fn hydrate_items(items: &[Entry], includes: &Includes, depth: u8) -> Vec<Entry> {
    let graph = LinkGraph::new(items, includes);
    items.iter().map(|item| graph.hydrate(item, depth)).collect()
}
