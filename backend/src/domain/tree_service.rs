//! # Tree Service
//!
//! Creation and housekeeping of family trees. Deleting a tree removes every
//! member, relationship and life event stored under it.

use anyhow::{bail, Result};
use chrono::Utc;
use log::{info, warn};
use shared::CreateTreeRequest;
use std::sync::Arc;

use crate::domain::models::member::MemberValidationError;
use crate::domain::models::tree::FamilyTree;
use crate::storage::TreeStorage;

/// Service for managing family trees
#[derive(Clone)]
pub struct TreeService {
    tree_storage: Arc<dyn TreeStorage>,
}

impl TreeService {
    pub fn new(tree_storage: Arc<dyn TreeStorage>) -> Self {
        Self { tree_storage }
    }

    /// Create a new tree
    pub fn create_tree(&self, request: CreateTreeRequest) -> Result<FamilyTree> {
        let name = validate_tree_name(&request.name)?;
        info!("Creating family tree: {}", name);

        let now = Utc::now();
        // Two trees created within the same millisecond get consecutive ids
        let mut millis = now.timestamp_millis().max(0) as u64;
        while self.tree_storage.get_tree(&FamilyTree::generate_id(millis))?.is_some() {
            millis += 1;
        }

        let tree = FamilyTree {
            id: FamilyTree::generate_id(millis),
            name,
            created_at: now,
            updated_at: now,
        };
        self.tree_storage.store_tree(&tree)?;

        info!("Created family tree: {} with ID: {}", tree.name, tree.id);
        Ok(tree)
    }

    pub fn get_tree(&self, tree_id: &str) -> Result<Option<FamilyTree>> {
        let tree = self.tree_storage.get_tree(tree_id)?;
        if tree.is_none() {
            warn!("Family tree not found: {}", tree_id);
        }
        Ok(tree)
    }

    /// Fetch a tree, failing with [`MemberValidationError::TreeNotFound`]
    pub fn require_tree(&self, tree_id: &str) -> Result<FamilyTree> {
        self.tree_storage
            .get_tree(tree_id)?
            .ok_or_else(|| MemberValidationError::TreeNotFound(tree_id.to_string()).into())
    }

    /// List all trees ordered by name
    pub fn list_trees(&self) -> Result<Vec<FamilyTree>> {
        let trees = self.tree_storage.list_trees()?;
        info!("Found {} family trees", trees.len());
        Ok(trees)
    }

    pub fn rename_tree(&self, tree_id: &str, name: &str) -> Result<FamilyTree> {
        let mut tree = self.require_tree(tree_id)?;
        tree.name = validate_tree_name(name)?;
        tree.updated_at = Utc::now();
        self.tree_storage.update_tree(&tree)?;
        info!("Renamed family tree {} to {}", tree.id, tree.name);
        Ok(tree)
    }

    /// Returns true if the tree existed
    pub fn delete_tree(&self, tree_id: &str) -> Result<bool> {
        let deleted = self.tree_storage.delete_tree(tree_id)?;
        if deleted {
            info!("Deleted family tree {}", tree_id);
        } else {
            warn!("Cannot delete missing family tree {}", tree_id);
        }
        Ok(deleted)
    }
}

fn validate_tree_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Tree name cannot be empty");
    }
    if name.chars().count() > 100 {
        bail!("Tree name cannot exceed 100 characters");
    }
    Ok(name.to_string())
}
