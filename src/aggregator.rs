//! Aggregators
//!
//! An aggregator receives the responses of one logical user action, in any
//! order and any number of times, merges them into its display model, and
//! decides which follow-up requests to issue. The [`Aggregator`] trait holds
//! the shared dispatch; [`ObjectAggregator`] and [`CollectionAggregator`]
//! supply the per-variant handlers.

use std::fmt;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::AggregationError;
use crate::payload::{
    DomainObject, Grid, HttpFailure, Layout, Link, Property, Relation, ResponsePayload,
    ResultObject,
};

pub mod collection;
pub mod object;

pub use collection::CollectionAggregator;
pub use object::ObjectAggregator;

/// Identity of one aggregation episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EpisodeId(pub u64);

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "episode-{}", self.0)
    }
}

/// Correlation context handed to the transport and echoed back with the
/// response. A collection target names its parent episode and its key in
/// the parent's collection map; it never owns the parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Target {
    Object(EpisodeId),
    Collection { episode: EpisodeId, key: String },
}

impl Target {
    pub fn episode(&self) -> EpisodeId {
        match self {
            Target::Object(episode) => *episode,
            Target::Collection { episode, .. } => *episode,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Object(episode) => write!(f, "{}", episode),
            Target::Collection { episode, key } => write!(f, "{}/{}", episode, key),
        }
    }
}

/// What the error presenter is shown for a transport failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub ts: String,
    pub target: Target,
    pub url: String,
    pub status: u16,
    pub message: String,
}

impl ErrorReport {
    pub fn with_now(target: Target, failure: HttpFailure) -> Self {
        Self {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            target,
            url: failure.url,
            status: failure.status,
            message: failure.message,
        }
    }
}

/// Issues a request; the response re-enters later through
/// [`crate::dispatch::Dispatcher::deliver`] carrying the same target.
pub trait Transport {
    fn invoke(&self, link: &Link, target: Target);
}

/// The render layer.
pub trait ViewLayer {
    fn open_object_view(&self, aggregator: &ObjectAggregator);
}

pub trait ErrorPresenter {
    fn present_error(&self, report: &ErrorReport);
}

/// External collaborators injected into every aggregator of an episode.
#[derive(Clone)]
pub struct Collaborators {
    pub transport: Arc<dyn Transport>,
    pub views: Arc<dyn ViewLayer>,
    pub errors: Arc<dyn ErrorPresenter>,
}

/// Shared contract of object and collection aggregators.
///
/// `update` is the sole entry point for asynchronous results. It dispatches
/// exhaustively over [`ResponsePayload`] and then runs [`Aggregator::after_update`].
pub trait Aggregator {
    fn target(&self) -> Target;

    fn error_presenter(&self) -> &dyn ErrorPresenter;

    /// Current best-known entity, if any object payload has arrived.
    fn object(&self) -> Option<&DomainObject>;

    fn handle_object(&mut self, obj: DomainObject) -> Result<(), AggregationError>;

    fn handle_result_object(&mut self, result: ResultObject) -> Result<(), AggregationError>;

    fn handle_layout(&mut self, layout: Layout) -> Result<(), AggregationError>;

    fn handle_grid(&mut self, grid: Grid) -> Result<(), AggregationError>;

    fn mark_failed(&mut self);

    /// Clear the rendered flag so the view may open again. Accumulated data
    /// is kept.
    fn reset(&mut self) -> &mut Self;

    /// Single-property updates have no merge strategy yet.
    fn handle_property(&mut self, property: Property) -> Result<(), AggregationError> {
        error!(aggregator = %self.target(), property = %property.id, "Property update not implemented");
        Err(AggregationError::UnsupportedPayload { kind: "property" })
    }

    fn after_update(&mut self) {}

    fn update(&mut self, payload: ResponsePayload, subtype: &str) -> Result<(), AggregationError> {
        let target = self.target();
        debug!(aggregator = %target, kind = payload.kind(), subtype, "Dispatching response");
        match payload {
            ResponsePayload::Object(obj) => self.handle_object(obj)?,
            ResponsePayload::ResultObject(result) => self.handle_result_object(result)?,
            ResponsePayload::Property(property) => self.handle_property(property)?,
            ResponsePayload::Layout(layout) => self.handle_layout(layout)?,
            ResponsePayload::Grid(grid) => self.handle_grid(grid)?,
            ResponsePayload::Error(failure) => {
                self.mark_failed();
                let report = ErrorReport::with_now(target, failure);
                self.error_presenter().present_error(&report);
            }
            ResponsePayload::Unrecognized { description } => {
                warn!(aggregator = %target, subtype, %description, "Ignoring unrecognized response");
            }
        }
        self.after_update();
        Ok(())
    }
}

/// Re-fetch a reference stub through its self link.
pub(crate) fn invoke_self_link(
    transport: &dyn Transport,
    obj: &DomainObject,
    target: Target,
) -> Result<(), AggregationError> {
    let link = obj.self_link().ok_or_else(|| AggregationError::MissingLink {
        relation: Relation::SelfRef,
        title: obj.title.clone(),
    })?;
    debug!(aggregator = %target, href = %link.href, "Fetching full representation");
    transport.invoke(link, target);
    Ok(())
}
