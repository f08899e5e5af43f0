//! Display models: incrementally filled holders for one entity's rendered data.

pub mod collection;
pub mod object;

pub use collection::{CollectionModel, CollectionPolicy};
pub use object::ObjectModel;
