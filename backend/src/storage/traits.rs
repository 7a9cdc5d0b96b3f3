//! # Storage Traits
//!
//! Storage abstraction traits that let the domain services work against any
//! backend. All operations are synchronous.

use anyhow::Result;
use shared::{FamilyTreeConfig, MemberId};

use crate::domain::models::life_event::LifeEvents;
use crate::domain::models::member::{FamilyMember, SpouseRelationship};
use crate::domain::models::tree::FamilyTree;
use crate::storage::csv::GlobalConfig;

/// Trait defining the interface for family tree storage operations
pub trait TreeStorage: Send + Sync {
    /// Store a new tree
    fn store_tree(&self, tree: &FamilyTree) -> Result<()>;

    /// Retrieve a tree by ID
    fn get_tree(&self, tree_id: &str) -> Result<Option<FamilyTree>>;

    /// List all trees ordered by name
    fn list_trees(&self) -> Result<Vec<FamilyTree>>;

    /// Update an existing tree
    fn update_tree(&self, tree: &FamilyTree) -> Result<()>;

    /// Delete a tree and everything stored under it.
    /// Returns true if the tree existed.
    fn delete_tree(&self, tree_id: &str) -> Result<bool>;
}

/// Trait defining the interface for member storage operations
pub trait MemberStorage: Send + Sync {
    /// Store a new member
    fn store_member(&self, member: &FamilyMember) -> Result<()>;

    /// Retrieve a member of a tree by ID
    fn get_member(&self, tree_id: &str, member_id: MemberId) -> Result<Option<FamilyMember>>;

    /// List a tree's members in insertion order
    fn list_members(&self, tree_id: &str) -> Result<Vec<FamilyMember>>;

    /// Update an existing member
    fn update_member(&self, member: &FamilyMember) -> Result<()>;

    /// Delete a member. Returns true if the member was found.
    fn delete_member(&self, tree_id: &str, member_id: MemberId) -> Result<bool>;
}

/// Trait defining the interface for spouse relationship storage operations
pub trait SpouseRelationshipStorage: Send + Sync {
    /// Store a new relationship
    fn store_relationship(&self, relationship: &SpouseRelationship) -> Result<()>;

    /// Retrieve a relationship by ID
    fn get_relationship(&self, tree_id: &str, relationship_id: i64) -> Result<Option<SpouseRelationship>>;

    /// List a tree's relationships in insertion order
    fn list_relationships(&self, tree_id: &str) -> Result<Vec<SpouseRelationship>>;

    /// Update an existing relationship
    fn update_relationship(&self, relationship: &SpouseRelationship) -> Result<()>;

    /// Delete every relationship a member takes part in.
    /// Returns the number of relationships removed.
    fn delete_relationships_for_member(&self, tree_id: &str, member_id: MemberId) -> Result<u32>;
}

/// Trait defining the interface for life event storage operations
pub trait LifeEventStorage: Send + Sync {
    /// Retrieve a member's life events
    fn get_life_events(&self, tree_id: &str, member_id: MemberId) -> Result<Option<LifeEvents>>;

    /// Store (create or replace) a member's life events
    fn store_life_events(&self, tree_id: &str, events: &LifeEvents) -> Result<()>;

    /// List life events of every member of a tree
    fn list_life_events(&self, tree_id: &str) -> Result<Vec<LifeEvents>>;

    /// Delete a member's life events. Returns true if any were stored.
    fn delete_life_events(&self, tree_id: &str, member_id: MemberId) -> Result<bool>;
}

/// Trait defining the interface for global configuration and id allocation
pub trait GlobalConfigStorage: Send + Sync {
    /// Get the global configuration, defaults when none is stored
    fn get_global_config(&self) -> Result<GlobalConfig>;

    /// Replace the global configuration
    fn update_global_config(&self, config: &GlobalConfig) -> Result<()>;

    /// Get the family tree configuration
    fn get_tree_config(&self) -> Result<FamilyTreeConfig> {
        Ok(self.get_global_config()?.tree_config)
    }

    /// Allocate the next member ID
    fn next_member_id(&self) -> Result<MemberId>;

    /// Allocate the next spouse relationship ID
    fn next_relationship_id(&self) -> Result<i64>;
}
