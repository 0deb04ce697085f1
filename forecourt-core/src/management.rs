use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::contract::ManagementApi;
use crate::delivery::send_json;
use crate::error::{ConfigError, FetchError};
use crate::model::ManagementAsset;

/// Management API client over HTTP, bound to a single environment.
pub struct HttpManagement {
    http: Client,
    base: String,
    token: String,
}

impl HttpManagement {
    pub fn new(
        endpoint: &str,
        space_id: &str,
        environment: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let http = Client::builder().timeout(timeout).build()?;
        let base = format!(
            "{}/spaces/{}/environments/{}",
            endpoint.trim_end_matches('/'),
            space_id,
            environment
        );
        Ok(HttpManagement {
            http,
            base,
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl ManagementApi for HttpManagement {
    async fn get_asset(&self, id: &str) -> Result<ManagementAsset, FetchError> {
        let url = format!("{}/assets/{}", self.base, id);
        debug!(url = %url, asset_id = id, "Fetching asset from management API");
        let request = self.http.get(&url).bearer_auth(&self.token);
        send_json(request, &url).await
    }

    async fn publish_asset(&self, asset: &ManagementAsset) -> Result<ManagementAsset, FetchError> {
        let url = format!("{}/assets/{}/published", self.base, asset.sys.id);
        info!(
            asset_id = %asset.sys.id,
            version = asset.sys.version,
            "Publishing asset through management API"
        );
        let request = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .header("X-Contentful-Version", asset.sys.version.to_string());
        send_json(request, &url).await
    }
}
