/// `load_config` module: reads the site's static YAML configuration into
/// [`SiteSettings`].
///
/// The YAML holds only non-secret settings. CMS credentials come from the
/// environment and are read separately when the client is built.
///
/// # Accepted schema
/// ```yaml
/// site:
///   base_url: https://www.example.co.uk   # required
///   locale: en-GB                          # default en-US
/// content:
///   include_depth: 3                       # 0-10
///   max_path_depth: 5
///   service_root: services
/// fetch:
///   timeout_secs: 10
///   max_retries: 2
///   backoff_ms: 200
/// api:
///   delivery_url: https://cdn.contentful.com
///   management_url: https://api.contentful.com
/// singletons:
///   navigation: <entry id>
///   footer: <entry id>
///   logo_asset: <asset id>
///   og_image: <asset id>
/// ```
///
/// Every section except `site` may be left out.
use anyhow::Result;
use forecourt_core::config::{ApiEndpoints, FetchPolicy, SiteSettings, Singletons};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
struct RawConfig {
    site: SiteSection,
    #[serde(default)]
    content: ContentSection,
    #[serde(default)]
    fetch: FetchSection,
    #[serde(default)]
    api: ApiSection,
    #[serde(default)]
    singletons: SingletonsSection,
}

#[derive(Debug, Deserialize)]
struct SiteSection {
    base_url: Option<String>,
    locale: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentSection {
    include_depth: Option<u8>,
    max_path_depth: Option<usize>,
    service_root: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FetchSection {
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    backoff_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSection {
    delivery_url: Option<String>,
    management_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SingletonsSection {
    navigation: Option<String>,
    footer: Option<String>,
    logo_asset: Option<String>,
    og_image: Option<String>,
}

/// Loads and validates the YAML config at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SiteSettings> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let settings = into_settings(raw)?;
    if let Err(e) = settings.validate() {
        error!(error = %e, config_path = ?path_ref, "Config failed validation");
        return Err(e.into());
    }
    settings.trace_loaded();
    Ok(settings)
}

fn into_settings(raw: RawConfig) -> Result<SiteSettings> {
    let defaults = SiteSettings::default();

    let base_url = raw
        .site
        .base_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("site.base_url is required"))?;

    let fetch_defaults = FetchPolicy::default();
    let fetch = FetchPolicy {
        timeout: raw
            .fetch
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(fetch_defaults.timeout),
        max_retries: raw.fetch.max_retries.unwrap_or(fetch_defaults.max_retries),
        backoff: raw
            .fetch
            .backoff_ms
            .map(Duration::from_millis)
            .unwrap_or(fetch_defaults.backoff),
    };

    let api_defaults = ApiEndpoints::default();
    let api = ApiEndpoints {
        delivery_url: raw.api.delivery_url.unwrap_or(api_defaults.delivery_url),
        management_url: raw.api.management_url.unwrap_or(api_defaults.management_url),
    };

    Ok(SiteSettings {
        base_url,
        locale: raw.site.locale.unwrap_or(defaults.locale),
        include_depth: raw.content.include_depth.unwrap_or(defaults.include_depth),
        max_path_depth: raw.content.max_path_depth.unwrap_or(defaults.max_path_depth),
        service_root: raw.content.service_root.filter(|root| !root.is_empty()),
        fetch,
        api,
        singletons: Singletons {
            navigation: raw.singletons.navigation,
            footer: raw.singletons.footer,
            logo_asset: raw.singletons.logo_asset,
            og_image: raw.singletons.og_image,
        },
    })
}
