//! Property-based tests for arrival-order independence of the render trigger

use proptest::prelude::*;
use proptest::test_runner::TestRunner;
use restview::{Aggregator, CollectionPolicy, ResponsePayload};

use crate::common::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Object,
    Layout,
    Grid,
    ListingA,
    ListingB,
}

impl Event {
    fn is_collection(self) -> bool {
        matches!(self, Event::ListingA | Event::ListingB)
    }
}

/// Collection responses can only arrive after the object that requested
/// them, so any that were shuffled ahead of it are moved to just after it.
fn causal(order: Vec<Event>) -> Vec<Event> {
    let Some(at) = order.iter().position(|e| *e == Event::Object) else {
        return order;
    };
    let (early, late): (Vec<Event>, Vec<Event>) =
        order[..at].iter().partition(|e| e.is_collection());
    let mut out = late;
    out.push(Event::Object);
    out.extend(early);
    out.extend(order[at + 1..].iter().copied().filter(|e| *e != Event::Object));
    out
}

fn apply(h: &mut Harness, event: Event) {
    match event {
        Event::Object => h.to_object(ResponsePayload::Object(full_object("1", &["a", "b"]))),
        Event::Layout => h.to_object(ResponsePayload::Layout(layout())),
        Event::Grid => h.to_object(ResponsePayload::Grid(grid())),
        Event::ListingA => h.to_collection("a", ResponsePayload::Object(listing("1", "a", 2))),
        Event::ListingB => h.to_collection("b", ResponsePayload::Object(listing("1", "b", 1))),
    }
}

fn arrivals() -> impl Strategy<Value = Vec<Event>> {
    Just(vec![
        Event::Object,
        Event::Layout,
        Event::Grid,
        Event::ListingA,
        Event::ListingB,
        Event::Grid,
        Event::ListingA,
    ])
    .prop_shuffle()
}

/// The view opens exactly once, on the first event after which every
/// required response has been seen, whatever the arrival order.
#[test]
fn test_render_fires_once_for_any_arrival_order() {
    let mut runner = TestRunner::default();

    runner
        .run(&arrivals(), |order| {
            let mut h = Harness::new(CollectionPolicy::Summary);
            let mut seen = Vec::new();
            for event in causal(order) {
                apply(&mut h, event);
                seen.push(event);
                let complete = [
                    Event::Object,
                    Event::Layout,
                    Event::Grid,
                    Event::ListingA,
                    Event::ListingB,
                ]
                .iter()
                .all(|required| seen.contains(required));
                prop_assert_eq!(h.renders(), usize::from(complete));
                prop_assert_eq!(h.aggregator().model().is_rendered(), complete);
            }
            prop_assert_eq!(h.aggregator().render_count(), 1);
            Ok(())
        })
        .unwrap();
}

/// Without collections only the object, layout and grid matter.
#[test]
fn test_render_fires_once_without_collections() {
    let mut runner = TestRunner::default();
    let events = Just(vec![Event::Object, Event::Layout, Event::Grid, Event::Grid]).prop_shuffle();

    runner
        .run(&events, |order| {
            let mut h = Harness::new(CollectionPolicy::Summary);
            for event in order {
                match event {
                    Event::Object => h.to_object(ResponsePayload::Object(full_object("1", &[]))),
                    other => apply(&mut h, other),
                }
            }
            prop_assert_eq!(h.renders(), 1);
            Ok(())
        })
        .unwrap();
}

/// Any mix of stubs and full representations discovers each collection
/// once and requests the layout once.
#[test]
fn test_repeated_objects_never_duplicate_requests() {
    let mut runner = TestRunner::default();

    runner
        .run(&prop::collection::vec(any::<bool>(), 1..8), |stubs| {
            let mut h = Harness::new(CollectionPolicy::Summary);
            h.requests();
            for stub in &stubs {
                let obj = if *stub {
                    reference_object("1", &["a", "b"])
                } else {
                    full_object("1", &["a", "b"])
                };
                h.to_object(ResponsePayload::Object(obj));
            }

            let requests = h.requests();
            let stub_count = stubs.iter().filter(|s| **s).count();
            let any_full = stubs.iter().any(|s| !*s);
            let follow_ups = if any_full { 3 } else { 0 };
            prop_assert_eq!(requests.len(), stub_count + follow_ups);
            prop_assert_eq!(h.aggregator().collections().count(), if any_full { 2 } else { 0 });
            prop_assert!(h.aggregator().object().is_some());
            Ok(())
        })
        .unwrap();
}
