//! # Member Repository
//!
//! One `members.csv` per tree, one row per member in insertion order.

use anyhow::{anyhow, Result};
use log::{debug, info};
use shared::MemberId;

use super::connection::CsvConnection;
use crate::domain::models::member::FamilyMember;
use crate::storage::traits::MemberStorage;

/// CSV-based member repository
#[derive(Clone)]
pub struct MemberRepository {
    connection: CsvConnection,
}

impl MemberRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_members(&self, tree_id: &str) -> Result<Vec<FamilyMember>> {
        self.connection.read_csv(&self.connection.members_file_path(tree_id))
    }

    fn write_members(&self, tree_id: &str, members: &[FamilyMember]) -> Result<()> {
        self.connection.ensure_tree_directory(tree_id)?;
        self.connection
            .write_csv(&self.connection.members_file_path(tree_id), members)
    }
}

impl MemberStorage for MemberRepository {
    fn store_member(&self, member: &FamilyMember) -> Result<()> {
        let _guard = self.connection.lock()?;
        let mut members = self.read_members(&member.tree_id)?;
        if members.iter().any(|m| m.id == member.id) {
            return Err(anyhow!("Member already exists: {}", member.id));
        }
        members.push(member.clone());
        self.write_members(&member.tree_id, &members)?;
        info!("Stored member {} ({}) in tree {}", member.full_name, member.id, member.tree_id);
        Ok(())
    }

    fn get_member(&self, tree_id: &str, member_id: MemberId) -> Result<Option<FamilyMember>> {
        Ok(self
            .read_members(tree_id)?
            .into_iter()
            .find(|m| m.id == member_id))
    }

    fn list_members(&self, tree_id: &str) -> Result<Vec<FamilyMember>> {
        let members = self.read_members(tree_id)?;
        debug!("Loaded {} members for tree {}", members.len(), tree_id);
        Ok(members)
    }

    fn update_member(&self, member: &FamilyMember) -> Result<()> {
        let _guard = self.connection.lock()?;
        let mut members = self.read_members(&member.tree_id)?;
        let existing = members
            .iter_mut()
            .find(|m| m.id == member.id)
            .ok_or_else(|| anyhow!("Member not found: {}", member.id))?;
        *existing = member.clone();
        self.write_members(&member.tree_id, &members)
    }

    fn delete_member(&self, tree_id: &str, member_id: MemberId) -> Result<bool> {
        let _guard = self.connection.lock()?;
        let mut members = self.read_members(tree_id)?;
        let before = members.len();
        members.retain(|m| m.id != member_id);
        if members.len() == before {
            return Ok(false);
        }
        self.write_members(tree_id, &members)?;
        Ok(true)
    }
}
