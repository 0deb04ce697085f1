use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use forecourt_core::config::FetchPolicy;
use forecourt_core::contract::{DeliveryApi, EntryQuery, MockDeliveryApi, OrderBy};
use forecourt_core::error::FetchError;
use forecourt_core::fetch::{fetch_entries_with, sort_by_order_field};
use forecourt_core::model::{Entry, EntryCollection};
use serde_json::json;

fn service(id: &str, order: Option<i64>) -> Entry {
    let mut fields = json!({ "name": id, "slug": id });
    if let Some(order) = order {
        fields["order"] = json!(order);
    }
    serde_json::from_value(json!({ "sys": { "id": id, "type": "Entry" }, "fields": fields }))
        .unwrap()
}

fn ids(items: &[Entry]) -> Vec<&str> {
    items.iter().map(Entry::id).collect()
}

fn quick_policy(max_retries: u32) -> FetchPolicy {
    FetchPolicy {
        timeout: Duration::from_secs(2),
        max_retries,
        backoff: Duration::ZERO,
    }
}

fn unavailable() -> FetchError {
    FetchError::Status {
        url: "https://cdn.example.test/entries".into(),
        status: 503,
        body: "upstream unavailable".into(),
    }
}

#[test]
fn missing_order_sorts_last() {
    let mut items = vec![
        service("three", Some(3)),
        service("none", None),
        service("one", Some(1)),
    ];
    sort_by_order_field(&mut items, "order");
    assert_eq!(ids(&items), vec!["one", "three", "none"]);
}

#[test]
fn equal_order_keeps_response_order() {
    let mut items = vec![
        service("b", Some(2)),
        service("a", Some(2)),
        service("x", None),
        service("c", Some(1)),
        service("y", None),
    ];
    sort_by_order_field(&mut items, "order");
    assert_eq!(ids(&items), vec!["c", "b", "a", "x", "y"]);
}

#[tokio::test]
async fn field_order_is_applied_client_side() {
    let mut delivery = MockDeliveryApi::new();
    delivery
        .expect_get_entries()
        .withf(|query| !query.to_params().iter().any(|(k, _)| k == "order"))
        .times(1)
        .returning(|_| {
            Ok(EntryCollection {
                items: vec![
                    service("three", Some(3)),
                    service("none", None),
                    service("one", Some(1)),
                ],
                total: 3,
                ..EntryCollection::default()
            })
        });

    let query = EntryQuery::content_type("service").order(OrderBy::Field("order".into()));
    let found = fetch_entries_with(&delivery, &query, &quick_policy(0))
        .await
        .unwrap();
    assert_eq!(ids(&found.items), vec!["one", "three", "none"]);
}

#[tokio::test]
async fn empty_result_is_not_an_error() {
    let mut delivery = MockDeliveryApi::new();
    delivery
        .expect_get_entries()
        .times(1)
        .returning(|_| Ok(EntryCollection::default()));

    let query = EntryQuery::content_type("page").slug("nowhere");
    let found = fetch_entries_with(&delivery, &query, &quick_policy(2))
        .await
        .unwrap();
    assert!(found.items.is_empty());
}

#[tokio::test]
async fn transient_failure_is_retried() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut delivery = MockDeliveryApi::new();
    delivery.expect_get_entries().times(2).returning(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(unavailable())
        } else {
            Ok(EntryCollection {
                items: vec![service("one", Some(1))],
                total: 1,
                ..EntryCollection::default()
            })
        }
    });

    let query = EntryQuery::content_type("service");
    let found = fetch_entries_with(&delivery, &query, &quick_policy(2))
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(ids(&found.items), vec!["one"]);
}

#[tokio::test]
async fn retries_are_bounded() {
    let mut delivery = MockDeliveryApi::new();
    delivery
        .expect_get_entries()
        .times(3)
        .returning(|_| Err(unavailable()));

    let query = EntryQuery::content_type("service");
    let err = fetch_entries_with(&delivery, &query, &quick_policy(2))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 503, .. }));
}

#[tokio::test]
async fn auth_failure_is_not_retried() {
    let mut delivery = MockDeliveryApi::new();
    delivery.expect_get_entries().times(1).returning(|_| {
        Err(FetchError::Status {
            url: "https://cdn.example.test/entries".into(),
            status: 401,
            body: "AccessTokenInvalid".into(),
        })
    });

    let query = EntryQuery::content_type("page");
    let err = fetch_entries_with(&delivery, &query, &quick_policy(2))
        .await
        .unwrap_err();
    assert!(!err.is_transient());
}

/// Delivery API whose first `slow_calls` entries queries hang past any
/// reasonable timeout.
struct StallingDelivery {
    calls: AtomicUsize,
    slow_calls: usize,
}

#[async_trait]
impl DeliveryApi for StallingDelivery {
    async fn get_entries(&self, _query: &EntryQuery) -> Result<EntryCollection, FetchError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.slow_calls {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        Ok(EntryCollection {
            items: vec![service("one", Some(1))],
            total: 1,
            ..EntryCollection::default()
        })
    }

    async fn get_asset(&self, id: &str) -> Result<Entry, FetchError> {
        Err(FetchError::Status {
            url: format!("https://cdn.example.test/assets/{id}"),
            status: 404,
            body: String::new(),
        })
    }
}

fn short_timeout(max_retries: u32) -> FetchPolicy {
    FetchPolicy {
        timeout: Duration::from_millis(50),
        max_retries,
        backoff: Duration::ZERO,
    }
}

#[tokio::test]
async fn timed_out_attempt_is_retried() {
    let delivery = StallingDelivery {
        calls: AtomicUsize::new(0),
        slow_calls: 1,
    };

    let query = EntryQuery::content_type("service");
    let found = fetch_entries_with(&delivery, &query, &short_timeout(1))
        .await
        .unwrap();
    assert_eq!(delivery.calls.load(Ordering::SeqCst), 2);
    assert_eq!(ids(&found.items), vec!["one"]);
}

#[tokio::test]
async fn timeout_without_retries_is_an_error() {
    let delivery = StallingDelivery {
        calls: AtomicUsize::new(0),
        slow_calls: 1,
    };

    let query = EntryQuery::content_type("service");
    let err = fetch_entries_with(&delivery, &query, &short_timeout(0))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Timeout { .. }));
    assert_eq!(delivery.calls.load(Ordering::SeqCst), 1);
}
