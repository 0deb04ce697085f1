//! Content for dynamic listings, fetched at render time.

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::client::ContentClient;
use crate::config::SiteSettings;
use crate::contract::{EntryQuery, OrderBy};
use crate::error::FetchError;
use crate::fetch::{fetch_all, fetch_entries};
use crate::graph::hydrate_items;
use crate::mapper::testimonial;
use crate::path::entry_href;
use crate::props::{DynamicListing, ImageProps, ListingDynamicProps, TestimonialProps};
use crate::resolve::resolve_linked_assets;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCard {
    pub id: String,
    pub name: String,
    pub short_description: String,
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageProps>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ListingCard {
    Service(ServiceCard),
    Testimonial(TestimonialProps),
}

/// Fetches the cards a dynamic listing displays.
///
/// Services are ordered by their numeric `order` field, which the CMS cannot
/// sort on reliably, so every service is fetched and the list is cut to the
/// listing's limit afterwards; services whose path cannot be reconstructed
/// are dropped. Testimonials are sorted by name server-side and inactive ones
/// are left out.
pub async fn fetch_dynamic_listing(
    client: &ContentClient,
    settings: &SiteSettings,
    listing: &ListingDynamicProps,
) -> Result<Vec<ListingCard>, FetchError> {
    let depth = client.include_depth().max(settings.chain_include_depth());
    let limit = listing.limit as usize;

    let cards: Vec<ListingCard> = match listing.listing {
        DynamicListing::Services => {
            let query = EntryQuery::content_type("service")
                .order(OrderBy::Field("order".to_string()))
                .include(depth);
            let all = fetch_all(client, &query).await?;
            let policy = settings.path_policy();

            let services = hydrate_items(&all.items, &all.includes, depth)
                .into_iter()
                .take(limit)
                .map(|service| resolve_linked_assets(service, &all.includes, client));
            let services = join_all(services).await;
            services
                .into_iter()
                .filter_map(|service| {
                    let href = entry_href(&service, &policy)?;
                    Some(ListingCard::Service(ServiceCard {
                        id: service.id().to_string(),
                        name: service.text_or_default("name"),
                        short_description: service.text_or_default("shortDescription"),
                        href,
                        image: ImageProps::from_field(&service, "featuredImage"),
                    }))
                })
                .collect()
        }
        DynamicListing::Testimonials => {
            let query = EntryQuery::content_type("testimonial")
                .order(OrderBy::Native("fields.name".to_string()))
                .include(depth);
            let found = fetch_entries(client, &query).await?;

            let entries = hydrate_items(&found.items, &found.includes, depth)
                .into_iter()
                .map(|entry| resolve_linked_assets(entry, &found.includes, client));
            let entries = join_all(entries).await;
            entries
                .iter()
                .map(testimonial)
                .filter(|props| props.active)
                .take(limit)
                .map(ListingCard::Testimonial)
                .collect()
        }
        DynamicListing::Articles => {
            warn!(listing_id = %listing.id, "Article listings have no content source");
            Vec::new()
        }
    };

    info!(
        listing_id = %listing.id,
        listing = ?listing.listing,
        cards = cards.len(),
        "Fetched dynamic listing"
    );
    Ok(cards)
}
