//! Display model for a single domain object view.

use tracing::debug;

use crate::payload::{DomainObject, Grid, Layout, ResultObject};

/// Accumulates the object, action result, layout and grid for one view.
///
/// Once `rendered` is set every mutator is a no-op returning `false`, so
/// content already surfaced to the view layer cannot change underneath it.
/// [`ObjectModel::reset`] lifts the freeze without discarding data.
#[derive(Debug, Clone, Default)]
pub struct ObjectModel {
    title: String,
    entity: Option<DomainObject>,
    reference: Option<DomainObject>,
    result: Option<ResultObject>,
    layout: Option<Layout>,
    grid: Option<Grid>,
    failed: bool,
    rendered: bool,
}

impl ObjectModel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Best-known entity: the full representation if one arrived, else the
    /// reference stub.
    pub fn object(&self) -> Option<&DomainObject> {
        self.entity.as_ref().or(self.reference.as_ref())
    }

    pub fn result(&self) -> Option<&ResultObject> {
        self.result.as_ref()
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    fn guard(&self, what: &'static str) -> bool {
        if self.rendered {
            debug!(model = %self.title, what, "Ignoring update to rendered model");
            return false;
        }
        true
    }

    pub fn add_data(&mut self, obj: DomainObject) -> bool {
        if !self.guard("object") {
            return false;
        }
        self.entity = Some(obj);
        true
    }

    pub fn add_reference(&mut self, obj: DomainObject) -> bool {
        if !self.guard("reference") {
            return false;
        }
        self.reference = Some(obj);
        true
    }

    pub fn add_result(&mut self, result: ResultObject) -> bool {
        if !self.guard("result") {
            return false;
        }
        self.result = Some(result);
        true
    }

    pub fn add_layout(&mut self, layout: Layout) -> bool {
        if !self.guard("layout") {
            return false;
        }
        self.layout = Some(layout);
        true
    }

    pub fn add_grid(&mut self, grid: Grid) -> bool {
        if !self.guard("grid") {
            return false;
        }
        self.grid = Some(grid);
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

    /// Object-displayability: a full entity with at least one property, its
    /// layout and grid, and no transport failure.
    pub fn can_be_displayed(&self) -> bool {
        !self.failed
            && self.entity.as_ref().is_some_and(|e| !e.is_reference())
            && self.layout.is_some()
            && self.grid.is_some()
    }
}
