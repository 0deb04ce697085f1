use forecourt_core::error::PathError;
use forecourt_core::model::Entry;
use forecourt_core::path::{matches_requested_slug, path_segments, resolve_path, PathPolicy};
use serde_json::{json, Value};

fn node(id: &str, content_type: &str, slug: &str, parent_field: &str, parent: Option<Value>) -> Value {
    let mut fields = json!({ "slug": slug });
    if let Some(parent) = parent {
        fields[parent_field] = parent;
    }
    json!({
        "sys": {
            "id": id,
            "type": "Entry",
            "contentType": { "sys": { "id": content_type } }
        },
        "fields": fields
    })
}

fn page(id: &str, slug: &str, parent: Option<Value>) -> Value {
    node(id, "page", slug, "pageParent", parent)
}

fn service(id: &str, slug: &str, parent: Option<Value>) -> Value {
    node(id, "service", slug, "parent", parent)
}

/// Pages nested in the order given, the last one being the leaf.
fn chain(slugs: &[&str]) -> Entry {
    let mut current: Option<Value> = None;
    for (i, slug) in slugs.iter().enumerate() {
        current = Some(page(&format!("p{i}"), slug, current));
    }
    serde_json::from_value(current.unwrap()).unwrap()
}

fn entry(value: Value) -> Entry {
    serde_json::from_value(value).unwrap()
}

#[test]
fn reconstructs_chains_of_depth_zero_to_three() {
    let slugs = ["garage", "servicing", "cars", "mot"];
    let policy = PathPolicy::default();
    for depth in 0..=3 {
        let chain_slugs = &slugs[..=depth];
        let leaf = chain(chain_slugs);
        let expected = chain_slugs.join("/");
        assert_eq!(resolve_path(&leaf, &policy).as_deref(), Ok(expected.as_str()));
        assert!(matches_requested_slug(&leaf, &format!("/{expected}/"), &policy));
    }
}

#[test]
fn leaf_only_request_is_rejected() {
    let policy = PathPolicy::default();
    let child = chain(&["parent", "child"]);
    assert!(!matches_requested_slug(&child, "child", &policy));
    assert!(matches_requested_slug(&child, "parent/child", &policy));

    let orphan = chain(&["child"]);
    assert!(!matches_requested_slug(&orphan, "parent/child", &policy));
}

#[test]
fn home_page_is_the_empty_path() {
    let policy = PathPolicy::default();
    let home = entry(page("home", "/", None));
    assert_eq!(resolve_path(&home, &policy).as_deref(), Ok(""));
    assert!(matches_requested_slug(&home, "/", &policy));

    let about = entry(page("about", "/about/", Some(page("home", "/", None))));
    assert_eq!(resolve_path(&about, &policy).as_deref(), Ok("about"));
}

#[test]
fn services_follow_their_parent_field() {
    let policy = PathPolicy::default();
    let mot = entry(service(
        "mot",
        "mot",
        Some(page("servicing", "servicing", None)),
    ));
    assert_eq!(resolve_path(&mot, &policy).as_deref(), Ok("servicing/mot"));

    // A service's pageParent is not its parent.
    let stray = entry(node("tyres", "service", "tyres", "pageParent", Some(page("x", "x", None))));
    assert_eq!(resolve_path(&stray, &policy).as_deref(), Ok("tyres"));
}

#[test]
fn orphan_services_go_under_the_service_root() {
    let policy = PathPolicy {
        service_root: Some("/services/".into()),
        ..PathPolicy::default()
    };
    let tyres = entry(service("tyres", "tyres", None));
    assert_eq!(resolve_path(&tyres, &policy).as_deref(), Ok("services/tyres"));

    let nested = entry(service("mot", "mot", Some(page("servicing", "servicing", None))));
    assert_eq!(resolve_path(&nested, &policy).as_deref(), Ok("servicing/mot"));

    let about = entry(page("about", "about", None));
    assert_eq!(resolve_path(&about, &policy).as_deref(), Ok("about"));
}

#[test]
fn cycle_is_rejected() {
    let looped = entry(page(
        "a",
        "a",
        Some(page("b", "b", Some(page("a", "a", Some(page("b", "b", None)))))),
    ));
    let policy = PathPolicy::default();
    assert_eq!(
        path_segments(&looped, &policy),
        Err(PathError::Cycle {
            entry_id: "a".into(),
            repeated_id: "a".into(),
        })
    );
    assert!(!matches_requested_slug(&looped, "b/a", &policy));
}

#[test]
fn chain_deeper_than_max_depth_is_rejected() {
    let policy = PathPolicy {
        max_depth: 2,
        service_root: None,
    };
    let leaf = chain(&["one", "two", "three", "four"]);
    assert_eq!(
        resolve_path(&leaf, &policy),
        Err(PathError::TooDeep {
            entry_id: "p3".into(),
            max_depth: 2,
        })
    );
    assert!(!matches_requested_slug(&leaf, "two/three/four", &policy));
    assert!(!matches_requested_slug(&leaf, "one/two/three/four", &policy));

    let within = chain(&["two", "three", "four"]);
    assert_eq!(resolve_path(&within, &policy).as_deref(), Ok("two/three/four"));
}

#[test]
fn unresolved_parent_link_is_rejected() {
    let leaf = entry(page(
        "child",
        "child",
        Some(json!({ "sys": { "type": "Link", "linkType": "Entry", "id": "parent" } })),
    ));
    let policy = PathPolicy::default();
    assert_eq!(
        resolve_path(&leaf, &policy),
        Err(PathError::UnresolvedParent {
            entry_id: "child".into(),
            parent_id: "parent".into(),
        })
    );
    assert!(!matches_requested_slug(&leaf, "child", &policy));
}

#[test]
fn asset_in_parent_field_is_not_a_parent() {
    let leaf = entry(page(
        "child",
        "child",
        Some(json!({ "sys": { "type": "Link", "linkType": "Asset", "id": "img" } })),
    ));
    assert_eq!(resolve_path(&leaf, &PathPolicy::default()).as_deref(), Ok("child"));
}
