//! # Tree Repository
//!
//! Each tree owns a directory named after its ID, discovered by scanning the
//! data directory for `tree.yaml` files.

use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use std::fs;

use super::connection::CsvConnection;
use crate::domain::models::tree::FamilyTree;
use crate::storage::traits::TreeStorage;

/// YAML-backed tree repository using filesystem discovery
#[derive(Clone)]
pub struct TreeRepository {
    connection: CsvConnection,
}

impl TreeRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Discover all trees by scanning directories
    fn discover_trees(&self) -> Result<Vec<FamilyTree>> {
        let base_dir = self.connection.base_directory();
        if !base_dir.exists() {
            debug!("Base directory doesn't exist, returning empty tree list");
            return Ok(Vec::new());
        }

        let mut trees = Vec::new();
        for entry in fs::read_dir(base_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let tree_file = path.join("tree.yaml");
            match self.connection.read_yaml::<FamilyTree>(&tree_file) {
                Ok(Some(tree)) => trees.push(tree),
                Ok(None) => debug!("Directory {:?} doesn't contain a tree", path),
                Err(e) => warn!("Error loading tree from {:?}: {}", path, e),
            }
        }

        trees.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(trees)
    }
}

impl TreeStorage for TreeRepository {
    fn store_tree(&self, tree: &FamilyTree) -> Result<()> {
        let _guard = self.connection.lock()?;
        let path = self.connection.tree_file_path(&tree.id);
        if path.exists() {
            return Err(anyhow!("Tree already exists: {}", tree.id));
        }
        self.connection.ensure_tree_directory(&tree.id)?;
        self.connection.write_yaml(&path, tree)?;
        info!("Stored tree {} ({})", tree.name, tree.id);
        Ok(())
    }

    fn get_tree(&self, tree_id: &str) -> Result<Option<FamilyTree>> {
        self.connection.read_yaml(&self.connection.tree_file_path(tree_id))
    }

    fn list_trees(&self) -> Result<Vec<FamilyTree>> {
        self.discover_trees()
    }

    fn update_tree(&self, tree: &FamilyTree) -> Result<()> {
        let _guard = self.connection.lock()?;
        let path = self.connection.tree_file_path(&tree.id);
        if !path.exists() {
            return Err(anyhow!("Tree not found: {}", tree.id));
        }
        self.connection.write_yaml(&path, tree)
    }

    fn delete_tree(&self, tree_id: &str) -> Result<bool> {
        let _guard = self.connection.lock()?;
        let tree_dir = self.connection.tree_directory(tree_id);
        if !self.connection.tree_file_path(tree_id).exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&tree_dir)?;
        info!("Deleted tree directory {:?}", tree_dir);
        Ok(true)
    }
}
