//! Error types for the response aggregation engine.

use thiserror::Error;

use crate::payload::Relation;

/// Failures local to a single aggregation episode.
///
/// Transport-level failures are not represented here: they arrive as
/// [`crate::payload::ResponsePayload::Error`] and are routed to the error
/// presenter instead of aborting the `update` call.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("No merge strategy for {kind} payloads")]
    UnsupportedPayload { kind: &'static str },

    #[error("Object '{title}' has no {relation:?} link")]
    MissingLink { relation: Relation, title: String },

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for AggregationError {
    fn from(err: config::ConfigError) -> Self {
        AggregationError::Config(err.to_string())
    }
}
