//! Restview: Response Aggregation for Object Views
//!
//! A single user action fans out into many REST requests whose responses
//! arrive in any order. Aggregators merge those responses into display
//! models and open the object view exactly once, when the object and all of
//! its parented collections are complete.

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod model;
pub mod payload;
pub mod render;
pub mod transport;

pub use aggregator::{
    Aggregator, CollectionAggregator, Collaborators, EpisodeId, ErrorPresenter, ErrorReport,
    ObjectAggregator, Target, Transport, ViewLayer,
};
pub use dispatch::{Delivery, Dispatcher};
pub use error::AggregationError;
pub use model::{CollectionModel, CollectionPolicy, ObjectModel};
pub use payload::{Link, Relation, ResponsePayload};
