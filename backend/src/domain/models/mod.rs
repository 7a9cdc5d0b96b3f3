//! Domain models for family trees, their members and the records attached
//! to them.

pub mod life_event;
pub mod member;
pub mod tree;
