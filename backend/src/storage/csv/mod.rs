//! # CSV Storage Module
//!
//! File-based storage for family trees. Flat records (members, spouse
//! relationships) live in CSV files; nested records (tree metadata, life
//! events, global configuration) live in YAML files.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! ├── global_config.yaml
//! └── {tree_directory}/
//!     ├── tree.yaml
//!     ├── members.csv
//!     ├── spouse_relationships.csv
//!     └── life_events/
//!         └── {member_id}.yaml
//! ```
//!
//! Every write goes to a temporary file that is then renamed over the
//! target, so readers never see a half-written file.

pub mod connection;
pub mod global_config_repository;
pub mod life_event_repository;
pub mod member_repository;
pub mod spouse_repository;
pub mod tree_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::CsvConnection;
pub use global_config_repository::{GlobalConfig, GlobalConfigRepository};
pub use life_event_repository::LifeEventRepository;
pub use member_repository::MemberRepository;
pub use spouse_repository::SpouseRepository;
pub use tree_repository::TreeRepository;
