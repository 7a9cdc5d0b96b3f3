//! Temporary-directory test infrastructure for the CSV storage layer.
//!
//! The directory is removed when the environment drops, even if a test panics.

use anyhow::Result;
use chrono::Utc;
use shared::MemberId;
use tempfile::TempDir;

use super::connection::CsvConnection;
use super::global_config_repository::GlobalConfigRepository;
use super::life_event_repository::LifeEventRepository;
use super::member_repository::MemberRepository;
use super::spouse_repository::SpouseRepository;
use super::tree_repository::TreeRepository;
use crate::domain::models::member::FamilyMember;
use crate::domain::models::tree::FamilyTree;
use crate::storage::traits::TreeStorage;

/// Test environment that provides a temporary directory and connection
pub struct TestEnvironment {
    pub connection: CsvConnection,
    /// Base directory path for manual inspection if needed
    pub base_path: std::path::PathBuf,
    _temp_dir: TempDir,
}

/// Test helper that provides repository instances for a test environment
pub struct TestHelper {
    pub env: TestEnvironment,
    pub tree_repo: TreeRepository,
    pub member_repo: MemberRepository,
    pub spouse_repo: SpouseRepository,
    pub life_event_repo: LifeEventRepository,
    pub global_config_repo: GlobalConfigRepository,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let connection = CsvConnection::new(temp_dir.path())?;
        Ok(Self {
            connection,
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }
}

impl TestHelper {
    pub fn new() -> Result<Self> {
        Self::from_env(TestEnvironment::new()?)
    }

    pub fn from_env(env: TestEnvironment) -> Result<Self> {
        Ok(Self {
            tree_repo: TreeRepository::new(env.connection.clone()),
            member_repo: MemberRepository::new(env.connection.clone()),
            spouse_repo: SpouseRepository::new(env.connection.clone()),
            life_event_repo: LifeEventRepository::new(env.connection.clone()),
            global_config_repo: GlobalConfigRepository::new(env.connection.clone()),
            env,
        })
    }

    /// Store a tree with the given id and name
    pub fn create_test_tree(&self, tree_id: &str, name: &str) -> Result<FamilyTree> {
        let now = Utc::now();
        let tree = FamilyTree {
            id: tree_id.to_string(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.tree_repo.store_tree(&tree)?;
        Ok(tree)
    }

    /// A member with only the required fields set (not stored)
    pub fn build_member(&self, tree_id: &str, id: MemberId, full_name: &str) -> FamilyMember {
        build_member(tree_id, id, full_name)
    }
}

/// A member with only the required fields set
pub fn build_member(tree_id: &str, id: MemberId, full_name: &str) -> FamilyMember {
    let now = Utc::now();
    FamilyMember {
        id,
        tree_id: tree_id.to_string(),
        full_name: full_name.to_string(),
        gender: None,
        birthday: None,
        address: None,
        generation: None,
        is_root_person: false,
        is_adopted: false,
        parent_id: None,
        parent_relationship_date: None,
        created_at: now,
        updated_at: now,
    }
}
