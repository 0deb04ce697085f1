use std::fmt;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::ConfigError;
use crate::path::{PathPolicy, DEFAULT_MAX_DEPTH};

pub const ENV_SPACE_ID: &str = "CONTENTFUL_SPACE_ID";
pub const ENV_ACCESS_TOKEN: &str = "CONTENTFUL_ACCESS_TOKEN";
pub const ENV_MANAGEMENT_TOKEN: &str = "CONTENTFUL_MANAGEMENT_TOKEN";
pub const ENV_ENVIRONMENT: &str = "CONTENTFUL_ENVIRONMENT";

pub const DEFAULT_ENVIRONMENT: &str = "master";
pub const DEFAULT_LOCALE: &str = "en-US";
pub const DEFAULT_DELIVERY_URL: &str = "https://cdn.contentful.com";
pub const DEFAULT_MANAGEMENT_URL: &str = "https://api.contentful.com";
pub const MAX_INCLUDE_DEPTH: u8 = 10;

/// Secrets for the CMS, always taken from the environment.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub space_id: String,
    pub access_token: String,
    pub management_token: Option<String>,
    pub environment: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("space_id", &self.space_id)
            .field("access_token", &"<redacted>")
            .field(
                "management_token",
                &self.management_token.as_ref().map(|_| "<redacted>"),
            )
            .field("environment", &self.environment)
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds credentials from any key lookup. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let space_id = read(ENV_SPACE_ID).ok_or(ConfigError::Missing(ENV_SPACE_ID))?;
        let access_token = read(ENV_ACCESS_TOKEN).ok_or(ConfigError::Missing(ENV_ACCESS_TOKEN))?;
        let management_token = read(ENV_MANAGEMENT_TOKEN);
        let environment =
            read(ENV_ENVIRONMENT).unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        info!(
            space_id = %space_id,
            environment = %environment,
            management = management_token.is_some(),
            "Loaded CMS credentials"
        );

        Ok(Credentials {
            space_id,
            access_token,
            management_token,
            environment,
        })
    }
}

/// Timeout and retry budget applied to every fetch at the fetcher boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        FetchPolicy {
            timeout: Duration::from_secs(10),
            max_retries: 2,
            backoff: Duration::from_millis(200),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiEndpoints {
    pub delivery_url: String,
    pub management_url: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        ApiEndpoints {
            delivery_url: DEFAULT_DELIVERY_URL.to_string(),
            management_url: DEFAULT_MANAGEMENT_URL.to_string(),
        }
    }
}

/// IDs of entries and assets that exist exactly once in the space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Singletons {
    pub navigation: Option<String>,
    pub footer: Option<String>,
    pub logo_asset: Option<String>,
    pub og_image: Option<String>,
}

/// Non-secret settings for the site, usually loaded from YAML.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSettings {
    pub base_url: String,
    pub locale: String,
    pub include_depth: u8,
    pub max_path_depth: usize,
    pub service_root: Option<String>,
    pub fetch: FetchPolicy,
    pub api: ApiEndpoints,
    pub singletons: Singletons,
}

impl Default for SiteSettings {
    fn default() -> Self {
        SiteSettings {
            base_url: String::new(),
            locale: DEFAULT_LOCALE.to_string(),
            include_depth: 3,
            max_path_depth: DEFAULT_MAX_DEPTH,
            service_root: None,
            fetch: FetchPolicy::default(),
            api: ApiEndpoints::default(),
            singletons: Singletons::default(),
        }
    }
}

impl SiteSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.locale.trim().is_empty() {
            return Err(ConfigError::Missing("site.locale"));
        }
        if self.include_depth > MAX_INCLUDE_DEPTH {
            return Err(ConfigError::Invalid {
                key: "content.include_depth",
                reason: format!("must be at most {MAX_INCLUDE_DEPTH}"),
            });
        }
        if self.max_path_depth == 0 {
            return Err(ConfigError::Invalid {
                key: "content.max_path_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn path_policy(&self) -> PathPolicy {
        PathPolicy {
            max_depth: self.max_path_depth,
            service_root: self.service_root.clone(),
        }
    }

    /// Include depth that embeds every ancestor a path may have.
    pub fn chain_include_depth(&self) -> u8 {
        self.max_path_depth.min(usize::from(MAX_INCLUDE_DEPTH)) as u8
    }

    pub fn trace_loaded(&self) {
        info!(
            base_url = %self.base_url,
            locale = %self.locale,
            include_depth = self.include_depth,
            max_path_depth = self.max_path_depth,
            "Loaded site settings"
        );
        debug!(?self, "Site settings loaded (full debug)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_space_id_is_named() {
        let err = Credentials::from_lookup(lookup(&[(ENV_ACCESS_TOKEN, "t")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENV_SPACE_ID)));
        assert!(err.to_string().contains("CONTENTFUL_SPACE_ID"));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let err = Credentials::from_lookup(lookup(&[
            (ENV_SPACE_ID, "space"),
            (ENV_ACCESS_TOKEN, "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENV_ACCESS_TOKEN)));
    }

    #[test]
    fn environment_defaults_to_master() {
        let creds = Credentials::from_lookup(lookup(&[
            (ENV_SPACE_ID, "space"),
            (ENV_ACCESS_TOKEN, "token"),
        ]))
        .unwrap();
        assert_eq!(creds.environment, "master");
        assert!(creds.management_token.is_none());
        assert!(!format!("{creds:?}").contains("\"token\""));
    }

    #[test]
    fn include_depth_above_ten_is_rejected() {
        let settings = SiteSettings {
            include_depth: 11,
            ..SiteSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
