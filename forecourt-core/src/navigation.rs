use serde::Serialize;
use tracing::{info, warn};

use crate::client::ContentClient;
use crate::config::SiteSettings;
use crate::error::FetchError;
use crate::fetch::fetch_entry;
use crate::graph::LinkGraph;
use crate::mapper::Mapper;
use crate::model::{Entry, Link};
use crate::path::{entry_href, PathPolicy};
use crate::props::{CtaProps, ImageProps};
use crate::resolve::{resolve_asset, resolve_linked_assets};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    pub label: String,
    pub href: String,
    pub children: Vec<NavItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationProps {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<ImageProps>,
    pub items: Vec<NavItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta: Option<CtaProps>,
}

/// Which navigation singleton to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Header,
    Footer,
}

/// Loads the configured header or footer navigation. `None` when the
/// singleton is not configured or no longer exists.
pub async fn fetch_site_navigation(
    client: &ContentClient,
    settings: &SiteSettings,
    menu: Menu,
) -> Result<Option<NavigationProps>, FetchError> {
    let id = match menu {
        Menu::Header => settings.singletons.navigation.as_deref(),
        Menu::Footer => settings.singletons.footer.as_deref(),
    };
    let Some(id) = id else {
        warn!(?menu, "No navigation singleton configured");
        return Ok(None);
    };
    fetch_navigation(client, settings, id).await
}

pub async fn fetch_navigation(
    client: &ContentClient,
    settings: &SiteSettings,
    id: &str,
) -> Result<Option<NavigationProps>, FetchError> {
    // Link targets need their parent chains for hrefs.
    let depth = client.include_depth().max(settings.chain_include_depth());
    let Some((raw, includes)) = fetch_entry(client, id, depth).await? else {
        return Ok(None);
    };

    let entry = LinkGraph::new(std::slice::from_ref(&raw), &includes).hydrate(&raw, depth);
    let entry = resolve_linked_assets(entry, &includes, client).await;

    let policy = settings.path_policy();
    let mapper = Mapper::new(policy.clone());

    let logo = match ImageProps::from_field(&entry, "logo") {
        Some(logo) => Some(logo),
        None => match settings.singletons.logo_asset.as_deref() {
            Some(logo_id) => resolve_asset(&Link::asset(logo_id), &includes, client)
                .await
                .and_then(|asset| ImageProps::from_asset(&asset, None)),
            None => None,
        },
    };

    let items: Vec<NavItem> = entry
        .entries("items")
        .iter()
        .map(|item| nav_item(item, &policy))
        .collect();
    let cta = entry.entry("cta").and_then(|cta| mapper.cta(&cta));

    info!(
        navigation_id = id,
        items = items.len(),
        logo = logo.is_some(),
        "Loaded navigation"
    );

    Ok(Some(NavigationProps {
        id: entry.id().to_string(),
        logo,
        items,
        cta,
    }))
}

fn nav_item(item: &Entry, policy: &PathPolicy) -> NavItem {
    let href = item
        .entry("link")
        .and_then(|target| entry_href(&target, policy))
        .or_else(|| {
            item.text("url")
                .filter(|url| !url.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "/".to_string());
    NavItem {
        label: item.text_or_default("label"),
        href,
        children: item
            .entries("items")
            .iter()
            .map(|child| nav_item(child, policy))
            .collect(),
    }
}
