//! # contract: the seams between the pipeline and the CMS
//!
//! Two traits describe everything the pipeline needs from the CMS:
//! - [`DeliveryApi`]: read-only queries against published content.
//! - [`ManagementApi`]: the write API, used only to re-publish assets the
//!   delivery API cannot serve.
//!
//! Both are implemented over HTTP in [`crate::delivery`] and
//! [`crate::management`], and by `mockall` mocks (`MockDeliveryApi`,
//! `MockManagementApi`) for tests. The mocks are exported under the
//! `test-export-mocks` feature so integration tests can assert call counts on
//! every fallback path.
//!
//! [`EntryQuery`] is the typed form of the query string the delivery API
//! accepts; implementors turn it into wire parameters with
//! [`EntryQuery::to_params`].

use async_trait::async_trait;

#[allow(unused_imports)]
use mockall::{automock, predicate::*};

use crate::error::FetchError;
use crate::model::{Entry, EntryCollection, ManagementAsset};

/// Sort order for an entries query.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderBy {
    /// A CMS-native sort expression, sent as the `order` parameter
    /// (e.g. `-sys.createdAt`).
    Native(String),
    /// An application-level numeric field. Not sent; the fetcher re-sorts
    /// client-side.
    Field(String),
}

/// A typed entries query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryQuery {
    pub content_type: Option<String>,
    pub filters: Vec<(String, String)>,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
    pub order: Option<OrderBy>,
    pub include: Option<u8>,
    pub select: Vec<String>,
}

impl EntryQuery {
    pub fn content_type(content_type: impl Into<String>) -> Self {
        EntryQuery {
            content_type: Some(content_type.into()),
            ..EntryQuery::default()
        }
    }

    pub fn slug(self, slug: impl Into<String>) -> Self {
        self.filter("fields.slug", slug)
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn order(mut self, order: OrderBy) -> Self {
        self.order = Some(order);
        self
    }

    /// Link depth the CMS resolves server-side. Capped at 10.
    pub fn include(mut self, depth: u8) -> Self {
        self.include = Some(depth.min(crate::config::MAX_INCLUDE_DEPTH));
        self
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn slug_filter(&self) -> Option<&str> {
        self.filters
            .iter()
            .find(|(k, _)| k == "fields.slug")
            .map(|(_, v)| v.as_str())
    }

    /// Query-string pairs in a stable order.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(ct) = &self.content_type {
            params.push(("content_type".to_string(), ct.clone()));
        }
        for (k, v) in &self.filters {
            params.push((k.clone(), v.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(skip) = self.skip {
            params.push(("skip".to_string(), skip.to_string()));
        }
        if let Some(OrderBy::Native(expr)) = &self.order {
            params.push(("order".to_string(), expr.clone()));
        }
        if let Some(include) = self.include {
            params.push(("include".to_string(), include.to_string()));
        }
        if !self.select.is_empty() {
            params.push(("select".to_string(), self.select.join(",")));
        }
        params
    }
}

/// Read access to published content.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DeliveryApi: Send + Sync {
    /// Run an entries query. A query matching nothing is an empty collection,
    /// not an error.
    async fn get_entries(&self, query: &EntryQuery) -> Result<EntryCollection, FetchError>;

    /// Fetch a single asset by id, in delivery shape.
    async fn get_asset(&self, id: &str) -> Result<Entry, FetchError>;
}

/// Write access, bound to one environment.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ManagementApi: Send + Sync {
    async fn get_asset(&self, id: &str) -> Result<ManagementAsset, FetchError>;

    /// Publish the given version of an asset, returning the published state.
    async fn publish_asset(&self, asset: &ManagementAsset) -> Result<ManagementAsset, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_order_is_not_sent() {
        let params = EntryQuery::content_type("service")
            .order(OrderBy::Field("order".into()))
            .include(12)
            .to_params();
        assert_eq!(
            params,
            vec![
                ("content_type".to_string(), "service".to_string()),
                ("include".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn native_order_and_select_are_sent() {
        let params = EntryQuery::content_type("page")
            .slug("about")
            .order(OrderBy::Native("-sys.createdAt".into()))
            .select(["sys", "fields.slug"])
            .limit(5)
            .to_params();
        assert!(params.contains(&("fields.slug".into(), "about".into())));
        assert!(params.contains(&("order".into(), "-sys.createdAt".into())));
        assert!(params.contains(&("select".into(), "sys,fields.slug".into())));
        assert!(params.contains(&("limit".into(), "5".into())));
    }
}
