use restview::{CollectionPolicy, ResponsePayload};

use crate::common::*;

fn ready_object(h: &mut Harness, key: &str) {
    h.to_object(ResponsePayload::Object(full_object("1", &[key])));
    h.to_object(ResponsePayload::Layout(layout()));
    h.to_object(ResponsePayload::Grid(grid()));
    h.requests();
}

#[test]
fn summary_listing_is_enough_and_items_are_not_fetched() {
    let mut h = Harness::new(CollectionPolicy::Summary);
    ready_object(&mut h, "friends");

    h.to_collection("friends", ResponsePayload::Object(listing("1", "friends", 3)));
    assert!(h.requests().is_empty());
    assert_eq!(h.renders(), 1);
    let collection = h.aggregator().collection("friends").unwrap();
    assert_eq!(collection.model().listing().unwrap().len(), 3);
    assert_eq!(collection.model().item_count(), 0);
}

#[test]
fn resolved_policy_fetches_every_item_through_the_collection() {
    let mut h = Harness::new(CollectionPolicy::Resolved);
    ready_object(&mut h, "friends");

    h.to_collection("friends", ResponsePayload::Object(listing("1", "friends", 2)));
    let requests = h.requests();
    let hrefs: Vec<&str> = requests.iter().map(|r| r.link.href.as_str()).collect();
    assert_eq!(hrefs, vec![item_href("friends", 1), item_href("friends", 2)]);
    assert!(requests.iter().all(|r| r.target == h.collection_target("friends")));
    assert_eq!(h.renders(), 0);

    h.to_collection("friends", ResponsePayload::Object(item("friends", 2)));
    assert_eq!(h.renders(), 0);
    h.to_collection("friends", ResponsePayload::Object(item("friends", 1)));
    assert_eq!(h.renders(), 1);

    let view = &h.views.views()[0];
    assert_eq!(view.collections[0].listed, 2);
    assert_eq!(view.collections[0].resolved, 2);
}

#[test]
fn repeated_listing_does_not_refetch_items() {
    let mut h = Harness::new(CollectionPolicy::Resolved);
    ready_object(&mut h, "friends");

    h.to_collection("friends", ResponsePayload::Object(listing("1", "friends", 2)));
    assert_eq!(h.requests().len(), 2);
    h.to_collection("friends", ResponsePayload::Object(listing("1", "friends", 2)));
    assert!(h.requests().is_empty());
}

#[test]
fn item_stub_is_fetched_in_full() {
    let mut h = Harness::new(CollectionPolicy::Resolved);
    ready_object(&mut h, "friends");
    h.to_collection("friends", ResponsePayload::Object(listing("1", "friends", 1)));
    h.requests();

    let mut stub = item("friends", 1);
    stub.properties.clear();
    h.to_collection("friends", ResponsePayload::Object(stub));
    let requests = h.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].link.href, item_href("friends", 1));
    assert_eq!(requests[0].target, h.collection_target("friends"));
    assert_eq!(h.renders(), 0);

    h.to_collection("friends", ResponsePayload::Object(item("friends", 1)));
    assert_eq!(h.renders(), 1);
}

#[test]
fn empty_collection_is_ready_once_listed() {
    let mut h = Harness::new(CollectionPolicy::Resolved);
    ready_object(&mut h, "friends");
    assert_eq!(h.renders(), 0);

    h.to_collection("friends", ResponsePayload::Object(listing("1", "friends", 0)));
    assert!(h.requests().is_empty());
    assert_eq!(h.renders(), 1);
}

#[test]
fn collection_layout_and_grid_do_not_affect_readiness() {
    let mut h = Harness::new(CollectionPolicy::Summary);
    ready_object(&mut h, "friends");

    h.to_collection("friends", ResponsePayload::Layout(layout()));
    h.to_collection("friends", ResponsePayload::Grid(grid()));
    assert_eq!(h.renders(), 0);
    assert!(h.aggregator().collection("friends").unwrap().model().layout().is_some());

    h.to_collection("friends", ResponsePayload::Object(listing("1", "friends", 1)));
    assert_eq!(h.renders(), 1);
}

#[test]
fn response_for_undiscovered_collection_is_an_error() {
    let mut h = Harness::new(CollectionPolicy::Summary);
    ready_object(&mut h, "friends");

    let delivery = restview::Delivery::new(
        h.collection_target("enemies"),
        ResponsePayload::Object(listing("1", "enemies", 1)),
        "json",
    );
    let err = h.dispatcher.deliver(delivery).unwrap_err();
    assert!(matches!(err, restview::AggregationError::UnknownCollection(ref key) if key == "enemies"));
    assert_eq!(h.renders(), 0);
}

/// `id` in full, listing `friends` inline as links to the given objects.
fn with_friends(id: &str, friends: &[&str]) -> restview::payload::DomainObject {
    let mut obj = full_object(id, &[]);
    obj.collections = vec![restview::payload::CollectionMember {
        id: "friends".to_string(),
        links: Vec::new(),
        value: Some(
            friends
                .iter()
                .map(|f| restview::Link::new("urn:org.restfulobjects:rels/value", object_href(f)))
                .collect(),
        ),
    }];
    obj
}

#[test]
fn item_of_the_owners_type_is_stored_not_taken_for_the_listing() {
    let mut h = Harness::new(CollectionPolicy::Resolved);
    ready_object(&mut h, "friends");

    h.to_collection("friends", ResponsePayload::Object(with_friends("1", &["2"])));
    let requests = h.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].link.href, object_href("2"));

    h.to_collection("friends", ResponsePayload::Object(with_friends("2", &["1"])));
    let collection = h.aggregator().collection("friends").unwrap();
    assert_eq!(collection.model().item_count(), 1);
    assert_eq!(collection.model().listing().unwrap()[0].href, object_href("2"));
    assert_eq!(h.renders(), 1);
}
