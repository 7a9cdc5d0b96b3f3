//! # Domain Module
//!
//! Family tree logic. The algorithms (generation inference, date validation,
//! the spouse child merge, graph building and layout) are pure functions over
//! in-memory member records. The services on top load and store data through
//! the storage traits.

pub mod child_merge;
pub mod date_validation;
pub mod generation;
pub mod graph_builder;
pub mod grid_layout;
pub mod layout;
pub mod life_event_service;
pub mod member_service;
pub mod models;
pub mod record_assembly;
pub mod relationship_service;
pub mod tree_service;
pub mod tree_view_service;

#[cfg(test)]
pub mod test_fixtures;

pub use life_event_service::LifeEventService;
pub use member_service::MemberService;
pub use relationship_service::RelationshipService;
pub use tree_service::TreeService;
pub use tree_view_service::TreeViewService;
