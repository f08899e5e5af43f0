//! Episode Dispatch
//!
//! Owns the live object aggregators, one per user action, and routes each
//! decoded response to the aggregator named by its target.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::aggregator::{Aggregator, Collaborators, EpisodeId, ObjectAggregator, Target};
use crate::error::AggregationError;
use crate::model::CollectionPolicy;
use crate::payload::{Link, ResponsePayload};

/// A decoded response together with the target it was requested for.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub target: Target,
    pub payload: ResponsePayload,
    pub subtype: String,
}

impl Delivery {
    pub fn new(target: Target, payload: ResponsePayload, subtype: impl Into<String>) -> Self {
        Self {
            target,
            payload,
            subtype: subtype.into(),
        }
    }
}

pub struct Dispatcher {
    episodes: HashMap<EpisodeId, ObjectAggregator>,
    collaborators: Collaborators,
    collection_policy: CollectionPolicy,
    next_id: u64,
}

impl Dispatcher {
    pub fn new(collaborators: Collaborators, collection_policy: CollectionPolicy) -> Self {
        Self {
            episodes: HashMap::new(),
            collaborators,
            collection_policy,
            next_id: 1,
        }
    }

    /// Start an episode for a user action and invoke its link.
    pub fn open(&mut self, action_title: impl Into<String>, link: &Link) -> EpisodeId {
        let episode = EpisodeId(self.next_id);
        self.next_id += 1;
        let aggregator = ObjectAggregator::new(
            episode,
            action_title,
            self.collection_policy,
            self.collaborators.clone(),
        );
        info!(%episode, title = %aggregator.model().title(), href = %link.href, "Opening episode");
        let target = aggregator.target();
        self.episodes.insert(episode, aggregator);
        self.collaborators.transport.invoke(link, target);
        episode
    }

    /// Route one response. Responses for closed or unknown episodes are
    /// dropped; failures stay local to the addressed episode.
    pub fn deliver(&mut self, delivery: Delivery) -> Result<(), AggregationError> {
        let Delivery {
            target,
            payload,
            subtype,
        } = delivery;
        let Some(aggregator) = self.episodes.get_mut(&target.episode()) else {
            warn!(aggregator = %target, kind = payload.kind(), "Dropping response for inactive episode");
            return Ok(());
        };
        debug!(aggregator = %target, kind = payload.kind(), "Delivering response");
        match &target {
            Target::Object(_) => aggregator.update(payload, &subtype),
            Target::Collection { key, .. } => {
                aggregator.deliver_to_collection(key, payload, &subtype)
            }
        }
    }

    pub fn episode(&self, id: EpisodeId) -> Option<&ObjectAggregator> {
        self.episodes.get(&id)
    }

    pub fn episode_mut(&mut self, id: EpisodeId) -> Option<&mut ObjectAggregator> {
        self.episodes.get_mut(&id)
    }

    /// Abandon an episode. Its in-flight responses will be dropped on arrival.
    pub fn close(&mut self, id: EpisodeId) -> Option<ObjectAggregator> {
        let closed = self.episodes.remove(&id);
        if closed.is_some() {
            info!(episode = %id, "Closing episode");
        }
        closed
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }
}
