//! # Storage Module
//!
//! Persistence for trees, members, spouse relationships, life events and the
//! global configuration. The domain layer only sees the traits in
//! [`traits`]; [`csv`] is the file-backed implementation.

pub mod csv;
pub mod traits;

pub use traits::*;
