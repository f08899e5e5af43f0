//! Collection Aggregator
//!
//! Tracks one parented collection. Its readiness is pulled by the owning
//! [`crate::aggregator::ObjectAggregator`]; it never opens a view.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::aggregator::{
    invoke_self_link, Aggregator, Collaborators, EpisodeId, ErrorPresenter, Target, Transport,
};
use crate::error::AggregationError;
use crate::model::{CollectionModel, CollectionPolicy};
use crate::payload::{DomainObject, Grid, Layout, Relation, ResultObject};

pub struct CollectionAggregator {
    parent: EpisodeId,
    key: String,
    model: CollectionModel,
    transport: Arc<dyn Transport>,
    errors: Arc<dyn ErrorPresenter>,
}

impl CollectionAggregator {
    pub fn new(
        parent: EpisodeId,
        key: impl Into<String>,
        policy: CollectionPolicy,
        collaborators: &Collaborators,
    ) -> Self {
        let key = key.into();
        Self {
            parent,
            model: CollectionModel::new(key.clone(), policy),
            key,
            transport: Arc::clone(&collaborators.transport),
            errors: Arc::clone(&collaborators.errors),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn parent(&self) -> EpisodeId {
        self.parent
    }

    pub fn model(&self) -> &CollectionModel {
        &self.model
    }

    pub(crate) fn freeze(&mut self) {
        self.model.mark_rendered();
    }

    /// Whether `obj` is one of the items named by the recorded listing.
    fn is_listed(&self, obj: &DomainObject) -> bool {
        match (self.model.listing(), obj.self_link()) {
            (Some(listing), Some(link)) => listing.iter().any(|l| l.href == link.href),
            _ => false,
        }
    }

    fn fetch_items(&self) {
        let Some(listing) = self.model.listing() else {
            return;
        };
        for link in listing {
            self.transport.invoke(link, self.target());
        }
    }
}

impl Aggregator for CollectionAggregator {
    fn target(&self) -> Target {
        Target::Collection {
            episode: self.parent,
            key: self.key.clone(),
        }
    }

    fn error_presenter(&self) -> &dyn ErrorPresenter {
        self.errors.as_ref()
    }

    /// First resolved item.
    fn object(&self) -> Option<&DomainObject> {
        self.model.items().next()
    }

    fn handle_object(&mut self, obj: DomainObject) -> Result<(), AggregationError> {
        // Items of the owner's own type carry a listing of the same key.
        let listing = if self.is_listed(&obj) {
            None
        } else {
            obj.collection(&self.key)
                .and_then(|member| member.value.clone())
        };
        if let Some(listing) = listing {
            debug!(collection = %self.target(), items = listing.len(), "Collection listing received");
            let first = self.model.set_listing(listing);
            if first && self.model.policy() == CollectionPolicy::Resolved {
                self.fetch_items();
            }
            return Ok(());
        }

        if obj.is_reference() {
            return invoke_self_link(self.transport.as_ref(), &obj, self.target());
        }

        let href = obj
            .self_link()
            .map(|l| l.href.clone())
            .ok_or_else(|| AggregationError::MissingLink {
                relation: Relation::SelfRef,
                title: obj.title.clone(),
            })?;
        self.model.add_item(href, obj);
        Ok(())
    }

    fn handle_result_object(&mut self, result: ResultObject) -> Result<(), AggregationError> {
        warn!(
            collection = %self.target(),
            result_type = %result.result_type,
            "Ignoring action result addressed to a collection"
        );
        Ok(())
    }

    fn handle_layout(&mut self, layout: Layout) -> Result<(), AggregationError> {
        self.model.add_layout(layout);
        Ok(())
    }

    fn handle_grid(&mut self, _grid: Grid) -> Result<(), AggregationError> {
        debug!(collection = %self.target(), "Ignoring grid for collection");
        Ok(())
    }

    fn mark_failed(&mut self) {
        self.model.mark_failed();
    }

    fn reset(&mut self) -> &mut Self {
        self.model.reset();
        self
    }
}
