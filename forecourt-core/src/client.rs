use std::sync::Arc;

use tracing::info;

use crate::config::{Credentials, FetchPolicy, SiteSettings};
use crate::contract::{DeliveryApi, ManagementApi};
use crate::delivery::HttpDelivery;
use crate::error::ConfigError;
use crate::management::HttpManagement;

/// Authenticated handle to the CMS: a delivery API and, when a management
/// token is configured, a management API bound to the same environment.
///
/// Every page request builds or clones its own handle; nothing here is
/// shared mutable state.
#[derive(Clone)]
pub struct ContentClient {
    delivery: Arc<dyn DeliveryApi>,
    management: Option<Arc<dyn ManagementApi>>,
    locale: String,
    include_depth: u8,
    fetch: FetchPolicy,
}

impl ContentClient {
    /// Builds HTTP clients for the given credentials. Fails before any
    /// request is made if the settings are unusable.
    pub fn connect(credentials: &Credentials, settings: &SiteSettings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let delivery: Arc<dyn DeliveryApi> = Arc::new(HttpDelivery::new(
            &settings.api.delivery_url,
            credentials,
            settings.fetch.timeout,
        )?);

        let management = match &credentials.management_token {
            Some(token) => {
                let api = HttpManagement::new(
                    &settings.api.management_url,
                    &credentials.space_id,
                    &credentials.environment,
                    token,
                    settings.fetch.timeout,
                )?;
                Some(Arc::new(api) as Arc<dyn ManagementApi>)
            }
            None => None,
        };

        info!(
            space_id = %credentials.space_id,
            environment = %credentials.environment,
            management = management.is_some(),
            "Initialized content client"
        );

        Ok(Self::from_parts(delivery, management, settings))
    }

    /// Reads credentials from the environment, then connects.
    pub fn from_env(settings: &SiteSettings) -> Result<Self, ConfigError> {
        let credentials = Credentials::from_env()?;
        Self::connect(&credentials, settings)
    }

    pub fn from_parts(
        delivery: Arc<dyn DeliveryApi>,
        management: Option<Arc<dyn ManagementApi>>,
        settings: &SiteSettings,
    ) -> Self {
        ContentClient {
            delivery,
            management,
            locale: settings.locale.clone(),
            include_depth: settings.include_depth,
            fetch: settings.fetch.clone(),
        }
    }

    pub fn delivery(&self) -> &dyn DeliveryApi {
        self.delivery.as_ref()
    }

    pub fn management(&self) -> Option<&dyn ManagementApi> {
        self.management.as_deref()
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn include_depth(&self) -> u8 {
        self.include_depth
    }

    pub fn fetch_policy(&self) -> &FetchPolicy {
        &self.fetch
    }
}
