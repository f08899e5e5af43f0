//! Object Aggregator
//!
//! Correlates the cascade of responses needed to present one domain object:
//! the object itself, the action result that produced it, its layout and
//! grid, and every parented collection.
//!
//! Sequence for a typical menu action:
//! 1. the action link answers with a result object or a reference stub
//! 2. the stub's self link answers with the full object
//! 3. collection discovery fetches each collection, layout fetch follows
//! 4. layout (and its grid) and collection listings arrive in any order
//!
//! The view opens exactly once, on the first update after which the
//! object and all of its collections are displayable.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::aggregator::{
    invoke_self_link, Aggregator, CollectionAggregator, Collaborators, EpisodeId, ErrorPresenter,
    Target,
};
use crate::error::AggregationError;
use crate::model::{CollectionPolicy, ObjectModel};
use crate::payload::{DomainObject, Grid, Layout, ResponsePayload, ResultObject};

pub struct ObjectAggregator {
    episode: EpisodeId,
    model: ObjectModel,
    collection_map: HashMap<String, CollectionAggregator>,
    collections_discovered: bool,
    layout_requested: bool,
    grid_requested: bool,
    collection_policy: CollectionPolicy,
    collaborators: Collaborators,
    render_count: usize,
}

impl ObjectAggregator {
    pub fn new(
        episode: EpisodeId,
        action_title: impl Into<String>,
        collection_policy: CollectionPolicy,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            episode,
            model: ObjectModel::new(action_title),
            collection_map: HashMap::new(),
            collections_discovered: false,
            layout_requested: false,
            grid_requested: false,
            collection_policy,
            collaborators,
            render_count: 0,
        }
    }

    pub fn episode(&self) -> EpisodeId {
        self.episode
    }

    pub fn model(&self) -> &ObjectModel {
        &self.model
    }

    pub fn collection(&self, key: &str) -> Option<&CollectionAggregator> {
        self.collection_map.get(key)
    }

    pub fn collections(&self) -> impl Iterator<Item = &CollectionAggregator> {
        self.collection_map.values()
    }

    /// Number of times the view layer has been asked to open this object.
    pub fn render_count(&self) -> usize {
        self.render_count
    }

    /// Route a response addressed to one of this object's collections, then
    /// re-evaluate readiness. Children never trigger the view themselves.
    pub fn deliver_to_collection(
        &mut self,
        key: &str,
        payload: ResponsePayload,
        subtype: &str,
    ) -> Result<(), AggregationError> {
        let child = self
            .collection_map
            .get_mut(key)
            .ok_or_else(|| AggregationError::UnknownCollection(key.to_string()))?;
        child.update(payload, subtype)?;
        self.evaluate_readiness();
        Ok(())
    }

    /// Vacuously true without collections; otherwise every child must be
    /// displayable.
    pub fn collections_can_be_displayed(&self) -> bool {
        self.collection_map
            .values()
            .all(|c| c.model().parented_collection_can_be_displayed())
    }

    pub fn is_ready(&self) -> bool {
        self.model.can_be_displayed() && self.collections_can_be_displayed()
    }

    fn evaluate_readiness(&mut self) {
        if self.model.is_rendered() || !self.is_ready() {
            return;
        }
        info!(
            episode = %self.episode,
            title = %self.model.title(),
            collections = self.collection_map.len(),
            "Object view ready"
        );
        let views = Arc::clone(&self.collaborators.views);
        views.open_object_view(self);
        self.model.mark_rendered();
        for child in self.collection_map.values_mut() {
            child.freeze();
        }
        self.render_count += 1;
    }

    fn discover_collections(&mut self, obj: &DomainObject) {
        self.collections_discovered = true;
        for member in &obj.collections {
            let key = member.id.clone();
            let aggregator = CollectionAggregator::new(
                self.episode,
                key.clone(),
                self.collection_policy,
                &self.collaborators,
            );
            let target = aggregator.target();
            self.collection_map.insert(key.clone(), aggregator);
            match member.primary_link() {
                Some(link) => {
                    debug!(episode = %self.episode, collection = %key, href = %link.href, "Fetching collection");
                    self.collaborators.transport.invoke(link, target);
                }
                None => warn!(episode = %self.episode, collection = %key, "Collection has no link"),
            }
        }
    }

    fn invoke_layout_link(&mut self, obj: &DomainObject) {
        self.layout_requested = true;
        match obj.layout_link() {
            Some(link) => self.collaborators.transport.invoke(link, self.target()),
            None => warn!(episode = %self.episode, title = %obj.title, "Object has no layout link"),
        }
    }
}

impl Aggregator for ObjectAggregator {
    fn target(&self) -> Target {
        Target::Object(self.episode)
    }

    fn error_presenter(&self) -> &dyn ErrorPresenter {
        self.collaborators.errors.as_ref()
    }

    fn object(&self) -> Option<&DomainObject> {
        self.model.object()
    }

    fn handle_object(&mut self, obj: DomainObject) -> Result<(), AggregationError> {
        if obj.is_reference() {
            invoke_self_link(self.collaborators.transport.as_ref(), &obj, self.target())?;
            self.model.add_reference(obj);
            return Ok(());
        }
        if !self.collections_discovered {
            self.discover_collections(&obj);
        }
        if !self.layout_requested {
            self.invoke_layout_link(&obj);
        }
        self.model.add_data(obj);
        Ok(())
    }

    fn handle_result_object(&mut self, result: ResultObject) -> Result<(), AggregationError> {
        if let Some(entity) = result.result.clone() {
            self.handle_object(entity)?;
        }
        self.model.add_result(result);
        Ok(())
    }

    fn handle_layout(&mut self, layout: Layout) -> Result<(), AggregationError> {
        if !self.grid_requested && self.model.grid().is_none() {
            if let Some(link) = layout.grid_link() {
                self.grid_requested = true;
                self.collaborators.transport.invoke(link, self.target());
            }
        }
        self.model.add_layout(layout);
        Ok(())
    }

    fn handle_grid(&mut self, grid: Grid) -> Result<(), AggregationError> {
        self.model.add_grid(grid);
        Ok(())
    }

    fn mark_failed(&mut self) {
        self.model.mark_failed();
    }

    fn after_update(&mut self) {
        self.evaluate_readiness();
    }

    fn reset(&mut self) -> &mut Self {
        self.model.reset();
        for child in self.collection_map.values_mut() {
            child.reset();
        }
        self
    }
}
