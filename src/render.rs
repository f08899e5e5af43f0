//! View and error collaborators that record what they were shown.

use std::sync::Mutex;

use serde::Serialize;
use tracing::{error, info};

use crate::aggregator::{EpisodeId, ErrorPresenter, ErrorReport, ObjectAggregator, ViewLayer};
use crate::payload::DomainObject;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionSummary {
    pub key: String,
    pub listed: usize,
    pub resolved: usize,
}

/// Snapshot of an object view at the moment it was opened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedView {
    pub episode: EpisodeId,
    pub title: String,
    pub object: Option<DomainObject>,
    pub collections: Vec<CollectionSummary>,
}

impl RenderedView {
    pub fn capture(aggregator: &ObjectAggregator) -> Self {
        let mut collections: Vec<CollectionSummary> = aggregator
            .collections()
            .map(|c| CollectionSummary {
                key: c.key().to_string(),
                listed: c.model().listing().map(|l| l.len()).unwrap_or(0),
                resolved: c.model().item_count(),
            })
            .collect();
        collections.sort_by(|a, b| a.key.cmp(&b.key));
        Self {
            episode: aggregator.episode(),
            title: aggregator.model().title().to_string(),
            object: aggregator.model().object().cloned(),
            collections,
        }
    }
}

#[derive(Default)]
pub struct RenderLog {
    views: Mutex<Vec<RenderedView>>,
}

impl RenderLog {
    pub fn views(&self) -> Vec<RenderedView> {
        self.views.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count_for(&self, episode: EpisodeId) -> usize {
        self.views
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|v| v.episode == episode)
            .count()
    }
}

impl ViewLayer for RenderLog {
    fn open_object_view(&self, aggregator: &ObjectAggregator) {
        let view = RenderedView::capture(aggregator);
        info!(episode = %view.episode, title = %view.title, "Opening object view");
        self.views.lock().unwrap_or_else(|e| e.into_inner()).push(view);
    }
}

#[derive(Default)]
pub struct ErrorLog {
    reports: Mutex<Vec<ErrorReport>>,
}

impl ErrorLog {
    pub fn reports(&self) -> Vec<ErrorReport> {
        self.reports.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ErrorPresenter for ErrorLog {
    fn present_error(&self, report: &ErrorReport) {
        error!(
            aggregator = %report.target,
            url = %report.url,
            status = report.status,
            message = %report.message,
            "Request failed"
        );
        self.reports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(report.clone());
    }
}
