//! # Spouse Relationship Repository
//!
//! One `spouse_relationships.csv` per tree. Each row records a pairing
//! between two members with optional marriage and divorce dates.

use anyhow::{anyhow, Result};
use log::{debug, info};
use shared::MemberId;

use super::connection::CsvConnection;
use crate::domain::models::member::SpouseRelationship;
use crate::storage::traits::SpouseRelationshipStorage;

/// CSV-based spouse relationship repository
#[derive(Clone)]
pub struct SpouseRepository {
    connection: CsvConnection,
}

impl SpouseRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_relationships(&self, tree_id: &str) -> Result<Vec<SpouseRelationship>> {
        self.connection
            .read_csv(&self.connection.relationships_file_path(tree_id))
    }

    fn write_relationships(&self, tree_id: &str, relationships: &[SpouseRelationship]) -> Result<()> {
        self.connection.ensure_tree_directory(tree_id)?;
        self.connection
            .write_csv(&self.connection.relationships_file_path(tree_id), relationships)
    }
}

impl SpouseRelationshipStorage for SpouseRepository {
    fn store_relationship(&self, relationship: &SpouseRelationship) -> Result<()> {
        let _guard = self.connection.lock()?;
        let mut relationships = self.read_relationships(&relationship.tree_id)?;
        if relationships.iter().any(|r| r.id == relationship.id) {
            return Err(anyhow!("Relationship already exists: {}", relationship.id));
        }
        relationships.push(relationship.clone());
        self.write_relationships(&relationship.tree_id, &relationships)?;
        info!(
            "Stored spouse relationship {} between {} and {}",
            relationship.id, relationship.member1_id, relationship.member2_id
        );
        Ok(())
    }

    fn get_relationship(&self, tree_id: &str, relationship_id: i64) -> Result<Option<SpouseRelationship>> {
        Ok(self
            .read_relationships(tree_id)?
            .into_iter()
            .find(|r| r.id == relationship_id))
    }

    fn list_relationships(&self, tree_id: &str) -> Result<Vec<SpouseRelationship>> {
        let relationships = self.read_relationships(tree_id)?;
        debug!("Loaded {} spouse relationships for tree {}", relationships.len(), tree_id);
        Ok(relationships)
    }

    fn update_relationship(&self, relationship: &SpouseRelationship) -> Result<()> {
        let _guard = self.connection.lock()?;
        let mut relationships = self.read_relationships(&relationship.tree_id)?;
        let existing = relationships
            .iter_mut()
            .find(|r| r.id == relationship.id)
            .ok_or_else(|| anyhow!("Relationship not found: {}", relationship.id))?;
        *existing = relationship.clone();
        self.write_relationships(&relationship.tree_id, &relationships)
    }

    fn delete_relationships_for_member(&self, tree_id: &str, member_id: MemberId) -> Result<u32> {
        let _guard = self.connection.lock()?;
        let mut relationships = self.read_relationships(tree_id)?;
        let before = relationships.len();
        relationships.retain(|r| !r.involves(member_id));
        let removed = (before - relationships.len()) as u32;
        if removed > 0 {
            self.write_relationships(tree_id, &relationships)?;
        }
        Ok(removed)
    }
}
