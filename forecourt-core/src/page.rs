//! Page resolution: from a requested URL path to renderable props.

use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::client::ContentClient;
use crate::config::SiteSettings;
use crate::contract::EntryQuery;
use crate::error::FetchError;
use crate::fetch::fetch_entries;
use crate::graph::hydrate_items;
use crate::mapper::Mapper;
use crate::model::{Entry, Includes, Link};
use crate::listing::fetch_dynamic_listing;
use crate::path::{leaf_slug, matches_requested_slug, normalise};
use crate::props::{ComponentProps, ImageProps};
use crate::resolve::{resolve_asset, resolve_linked_assets};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PageKind {
    Page,
    Service,
}

impl PageKind {
    /// Content types searched for a path, in order.
    pub const SEARCH_ORDER: [PageKind; 2] = [PageKind::Page, PageKind::Service];

    pub fn content_type(&self) -> &'static str {
        match self {
            PageKind::Page => "page",
            PageKind::Service => "service",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<ImageProps>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub id: String,
    pub kind: PageKind,
    pub path: String,
    pub meta: PageMeta,
    pub body: Vec<ComponentProps>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Found(PageView),
    NotFound,
}

/// Looks up the page or service whose full reconstructed path equals
/// `requested`.
pub async fn resolve_page(
    client: &ContentClient,
    settings: &SiteSettings,
    requested: &str,
) -> Result<PageOutcome, FetchError> {
    let policy = settings.path_policy();
    let slug = leaf_slug(requested);
    let depth = client.include_depth().max(settings.chain_include_depth());

    for kind in PageKind::SEARCH_ORDER {
        let query = EntryQuery::content_type(kind.content_type())
            .slug(slug)
            .include(depth);
        let collection = fetch_entries(client, &query).await?;
        let candidates = collection.items.len();

        let matched = hydrate_items(&collection.items, &collection.includes, depth)
            .into_iter()
            .find(|entry| matches_requested_slug(entry, requested, &policy));

        let Some(entry) = matched else {
            if candidates > 0 {
                info!(
                    requested,
                    content_type = kind.content_type(),
                    candidates,
                    "Slug matched but full path did not"
                );
            }
            continue;
        };

        let entry = resolve_linked_assets(entry, &collection.includes, client).await;
        let path = normalise(requested).to_string();
        let view = build_view(client, settings, kind, &entry, path, &collection.includes).await;
        info!(
            requested,
            entry_id = %view.id,
            kind = kind.content_type(),
            components = view.body.len(),
            "Resolved page"
        );
        return Ok(PageOutcome::Found(view));
    }

    info!(requested, "No page or service at path");
    Ok(PageOutcome::NotFound)
}

/// Like [`resolve_page`], but any fetch failure becomes a not-found outcome.
pub async fn serve_page(
    client: &ContentClient,
    settings: &SiteSettings,
    requested: &str,
) -> PageOutcome {
    match resolve_page(client, settings, requested).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(requested, error = %e, "Page resolution failed, serving not found");
            PageOutcome::NotFound
        }
    }
}

async fn build_view(
    client: &ContentClient,
    settings: &SiteSettings,
    kind: PageKind,
    entry: &Entry,
    path: String,
    includes: &Includes,
) -> PageView {
    let mapper = Mapper::new(settings.path_policy());

    let (title, description, og_field) = match kind {
        PageKind::Page => ("pageTitle", "pageDescription", "ogImage"),
        PageKind::Service => ("name", "shortDescription", "featuredImage"),
    };

    let body_items = entry.entries("body");
    let mut body = if kind == PageKind::Service && body_items.is_empty() {
        mapper.map_service_layout(entry)
    } else {
        body_items
            .iter()
            .filter_map(|item| mapper.map_body_item(item))
            .collect()
    };
    attach_listing_cards(client, settings, &mut body).await;

    let og_image = match ImageProps::from_field(entry, og_field) {
        Some(image) => Some(image),
        None => default_og_image(client, settings, includes).await,
    };

    PageView {
        id: entry.id().to_string(),
        kind,
        path,
        meta: PageMeta {
            title: entry.text_or_default(title),
            description: entry.text_or_default(description),
            og_image,
        },
        body,
    }
}

/// Fetches the cards of every dynamic listing in `body` in one batch. A
/// listing whose fetch fails is left empty.
async fn attach_listing_cards(
    client: &ContentClient,
    settings: &SiteSettings,
    body: &mut [ComponentProps],
) {
    let fetches = body.iter().map(|component| async move {
        let ComponentProps::ListingDynamic(listing) = component else {
            return None;
        };
        match fetch_dynamic_listing(client, settings, listing).await {
            Ok(cards) => Some(cards),
            Err(e) => {
                warn!(
                    listing_id = %listing.id,
                    error = %e,
                    "Dynamic listing fetch failed, rendering empty"
                );
                Some(Vec::new())
            }
        }
    });
    let fetched = join_all(fetches).await;

    for (component, cards) in body.iter_mut().zip(fetched) {
        if let (ComponentProps::ListingDynamic(listing), Some(cards)) = (component, cards) {
            listing.cards = cards;
        }
    }
}

async fn default_og_image(
    client: &ContentClient,
    settings: &SiteSettings,
    includes: &Includes,
) -> Option<ImageProps> {
    let id = settings.singletons.og_image.as_deref()?;
    let asset = resolve_asset(&Link::asset(id), includes, client).await?;
    ImageProps::from_asset(&asset, None)
}
