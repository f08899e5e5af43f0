//! Display model for a parented collection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::payload::{DomainObject, Layout, Link};

/// How much of a collection must be resolved before it can be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionPolicy {
    /// The listing of item links is enough; rows are drawn from link titles.
    #[default]
    Summary,
    /// Every listed item must be fetched in full.
    Resolved,
}

#[derive(Debug, Clone)]
pub struct CollectionModel {
    id: String,
    policy: CollectionPolicy,
    listing: Option<Vec<Link>>,
    items: BTreeMap<String, DomainObject>,
    layout: Option<Layout>,
    failed: bool,
    rendered: bool,
}

impl CollectionModel {
    pub fn new(id: impl Into<String>, policy: CollectionPolicy) -> Self {
        Self {
            id: id.into(),
            policy,
            listing: None,
            items: BTreeMap::new(),
            layout: None,
            failed: false,
            rendered: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn policy(&self) -> CollectionPolicy {
        self.policy
    }

    pub fn listing(&self) -> Option<&[Link]> {
        self.listing.as_deref()
    }

    pub fn items(&self) -> impl Iterator<Item = &DomainObject> {
        self.items.values()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    fn guard(&self, what: &'static str) -> bool {
        if self.rendered {
            debug!(collection = %self.id, what, "Ignoring update to rendered collection");
            return false;
        }
        true
    }

    /// Records the listing. Returns `true` only the first time, so callers
    /// can issue item fetches exactly once.
    pub fn set_listing(&mut self, links: Vec<Link>) -> bool {
        if !self.guard("listing") || self.listing.is_some() {
            return false;
        }
        self.listing = Some(links);
        true
    }

    pub fn add_item(&mut self, href: impl Into<String>, obj: DomainObject) -> bool {
        if !self.guard("item") {
            return false;
        }
        self.items.insert(href.into(), obj);
        true
    }

    pub fn add_layout(&mut self, layout: Layout) -> bool {
        if !self.guard("layout") {
            return false;
        }
        self.layout = Some(layout);
        true
    }

    pub fn mark_failed(&mut self) {
        self.failed = true;
    }

    pub fn mark_rendered(&mut self) {
        self.rendered = true;
    }

    pub fn reset(&mut self) {
        self.rendered = false;
    }

    /// Collection-displayability: the listing is known and, unless the
    /// policy tolerates partial display, every listed item is resolved.
    pub fn parented_collection_can_be_displayed(&self) -> bool {
        if self.failed {
            return false;
        }
        let Some(listing) = &self.listing else {
            return false;
        };
        match self.policy {
            CollectionPolicy::Summary => true,
            CollectionPolicy::Resolved => listing.iter().all(|l| self.items.contains_key(&l.href)),
        }
    }
}
