use std::time::Duration;

use forecourt_core::config::Credentials;
use forecourt_core::contract::{DeliveryApi, EntryQuery, ManagementApi};
use forecourt_core::delivery::HttpDelivery;
use forecourt_core::error::FetchError;
use forecourt_core::management::HttpManagement;
use forecourt_core::model::ManagementAsset;
use mockito::Matcher;
use serde_json::json;

fn credentials() -> Credentials {
    Credentials {
        space_id: "sp1".into(),
        access_token: "delivery-token".into(),
        management_token: Some("management-token".into()),
        environment: "master".into(),
    }
}

#[tokio::test]
async fn entries_query_sends_params_and_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let body = json!({
        "items": [{
            "sys": { "id": "about", "type": "Entry", "contentType": { "sys": { "id": "page" } } },
            "fields": { "slug": "about" }
        }],
        "includes": { "Asset": [{ "sys": { "id": "img", "type": "Asset" }, "fields": {} }] },
        "total": 1,
        "skip": 0,
        "limit": 100
    });
    let mock = server
        .mock("GET", "/spaces/sp1/environments/master/entries")
        .match_header("authorization", "Bearer delivery-token")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("content_type".into(), "page".into()),
            Matcher::UrlEncoded("fields.slug".into(), "about".into()),
            Matcher::UrlEncoded("include".into(), "3".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .expect(1)
        .create_async()
        .await;

    let delivery = HttpDelivery::new(&server.url(), &credentials(), Duration::from_secs(5)).unwrap();
    let query = EntryQuery::content_type("page").slug("about").include(3);
    let found = delivery.get_entries(&query).await.unwrap();

    mock.assert_async().await;
    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].content_type_id(), Some("page"));
    assert!(found.includes.asset("img").is_some());
    assert_eq!(found.total, 1);
}

#[tokio::test]
async fn missing_asset_is_a_status_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/spaces/sp1/environments/master/assets/nope")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"sys":{"type":"Error","id":"NotFound"}}"#)
        .expect(1)
        .create_async()
        .await;

    let delivery = HttpDelivery::new(&server.url(), &credentials(), Duration::from_secs(5)).unwrap();
    let err = delivery.get_asset("nope").await.unwrap_err();

    match &err {
        FetchError::Status { status, body, .. } => {
            assert_eq!(*status, 404);
            assert!(body.contains("NotFound"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!err.is_transient());
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/spaces/sp1/environments/master/assets/img")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let delivery = HttpDelivery::new(&server.url(), &credentials(), Duration::from_secs(5)).unwrap();
    let err = delivery.get_asset("img").await.unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
}

#[tokio::test]
async fn publish_sends_current_version() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", "/spaces/sp1/environments/master/assets/img/published")
        .match_header("authorization", "Bearer management-token")
        .match_header("x-contentful-version", "5")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "sys": { "id": "img", "version": 6, "publishedVersion": 5 }, "fields": {} }).to_string())
        .expect(1)
        .create_async()
        .await;

    let management = HttpManagement::new(
        &server.url(),
        "sp1",
        "master",
        "management-token",
        Duration::from_secs(5),
    )
    .unwrap();
    let current: ManagementAsset =
        serde_json::from_value(json!({ "sys": { "id": "img", "version": 5 }, "fields": {} })).unwrap();

    let published = management.publish_asset(&current).await.unwrap();

    mock.assert_async().await;
    assert_eq!(published.sys.version, 6);
    assert_eq!(published.sys.published_version, Some(5));
}
