use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::config::Credentials;
use crate::contract::{DeliveryApi, EntryQuery};
use crate::error::{ConfigError, FetchError};
use crate::model::{Entry, EntryCollection};

/// Delivery API client over HTTP.
pub struct HttpDelivery {
    http: Client,
    base: String,
    token: String,
}

impl HttpDelivery {
    pub fn new(
        endpoint: &str,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let http = Client::builder().timeout(timeout).build()?;
        let base = format!(
            "{}/spaces/{}/environments/{}",
            endpoint.trim_end_matches('/'),
            credentials.space_id,
            credentials.environment
        );
        Ok(HttpDelivery {
            http,
            base,
            token: credentials.access_token.clone(),
        })
    }
}

#[async_trait]
impl DeliveryApi for HttpDelivery {
    async fn get_entries(&self, query: &EntryQuery) -> Result<EntryCollection, FetchError> {
        let url = format!("{}/entries", self.base);
        let params = query.to_params();
        debug!(url = %url, ?params, "Querying delivery API entries");
        let request = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&params);
        send_json(request, &url).await
    }

    async fn get_asset(&self, id: &str) -> Result<Entry, FetchError> {
        let url = format!("{}/assets/{}", self.base, id);
        debug!(url = %url, asset_id = id, "Fetching asset from delivery API");
        let request = self.http.get(&url).bearer_auth(&self.token);
        send_json(request, &url).await
    }
}

/// Sends a request and decodes a JSON body, mapping every failure to a
/// [`FetchError`].
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    url: &str,
) -> Result<T, FetchError> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: e,
            }
        }
    })?;

    let status = response.status();
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| String::from("<Failed to decode response body>"));

    if !status.is_success() {
        error!(status = %status, url = %url, "CMS API returned error");
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body: text,
        });
    }

    serde_json::from_str(&text).map_err(|e| {
        error!(error = ?e, url = %url, "Failed to parse CMS response JSON");
        FetchError::Decode {
            url: url.to_string(),
            source: e,
        }
    })
}
