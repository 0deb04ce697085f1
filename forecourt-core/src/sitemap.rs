use std::collections::HashSet;
use std::fmt::Write as _;

use tracing::{info, warn};

use crate::client::ContentClient;
use crate::config::SiteSettings;
use crate::contract::EntryQuery;
use crate::error::FetchError;
use crate::fetch::fetch_all;
use crate::graph::hydrate_items;
use crate::page::PageKind;
use crate::path::resolve_path;

pub const HOME_PRIORITY: &str = "1.0";
pub const PAGE_PRIORITY: &str = "0.8";
pub const CHANGE_FREQUENCY: &str = "weekly";

/// Every page and service path on the site, home (the empty path) first.
pub async fn collect_site_paths(
    client: &ContentClient,
    settings: &SiteSettings,
) -> Result<Vec<String>, FetchError> {
    let policy = settings.path_policy();
    let depth = settings.chain_include_depth();

    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    for kind in PageKind::SEARCH_ORDER {
        let query = EntryQuery::content_type(kind.content_type())
            .select(["sys", "fields.slug", "fields.pageParent", "fields.parent"])
            .include(depth);
        let all = fetch_all(client, &query).await?;
        info!(
            content_type = kind.content_type(),
            entries = all.items.len(),
            "Collected sitemap entries"
        );

        for entry in hydrate_items(&all.items, &all.includes, depth) {
            let path = match resolve_path(&entry, &policy) {
                Ok(path) => path,
                Err(e) => {
                    warn!(entry_id = %entry.id(), error = %e, "Left out of sitemap");
                    continue;
                }
            };
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }

    paths.sort_by_key(|path| !path.is_empty());
    Ok(paths)
}

/// Renders a sitemaps.org `urlset` for `paths` under `base_url`.
pub fn render_sitemap(base_url: &str, paths: &[String]) -> String {
    let base = base_url.trim_end_matches('/');
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for path in paths {
        let path = path.trim_matches('/');
        let (loc, priority) = if path.is_empty() {
            (format!("{base}/"), HOME_PRIORITY)
        } else {
            (format!("{base}/{path}"), PAGE_PRIORITY)
        };
        let _ = write!(
            xml,
            "  <url>\n    <loc>{}</loc>\n    <changefreq>{}</changefreq>\n    <priority>{}</priority>\n  </url>\n",
            html_escape::encode_text(&loc),
            CHANGE_FREQUENCY,
            priority
        );
    }
    xml.push_str("</urlset>\n");
    xml
}

pub async fn generate_sitemap(
    client: &ContentClient,
    settings: &SiteSettings,
) -> Result<String, FetchError> {
    let paths = collect_site_paths(client, settings).await?;
    info!(urls = paths.len(), "Generating sitemap");
    Ok(render_sitemap(&settings.base_url, &paths))
}
