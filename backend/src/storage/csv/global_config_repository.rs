//! # Global Config Repository
//!
//! A single `global_config.yaml` at the root of the data directory holds the
//! family tree configuration and the id counters shared by every tree.
//!
//! ## YAML Format
//!
//! ```yaml
//! data_format_version: "1.0"
//! next_member_id: 12
//! next_relationship_id: 4
//! tree_config:
//!   root_generation_baseline: zero
//!   min_marriage_age_years: 7
//! created_at: "2026-01-21T19:30:00Z"
//! updated_at: "2026-01-21T19:35:00Z"
//! ```

use anyhow::Result;
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use shared::{FamilyTreeConfig, MemberId};

use super::connection::CsvConnection;
use crate::storage::traits::GlobalConfigStorage;

/// Global configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Data format version for future migrations
    pub data_format_version: String,
    /// Next id handed out to a member, in any tree
    pub next_member_id: MemberId,
    pub next_relationship_id: i64,
    #[serde(default)]
    pub tree_config: FamilyTreeConfig,
    pub created_at: String,
    pub updated_at: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            data_format_version: "1.0".to_string(),
            next_member_id: 1,
            next_relationship_id: 1,
            tree_config: FamilyTreeConfig::default(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// YAML-based global config repository
#[derive(Clone)]
pub struct GlobalConfigRepository {
    connection: CsvConnection,
}

impl GlobalConfigRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Load global config from file, creating default if it doesn't exist.
    /// Callers hold the connection lock.
    fn load_or_create_global_config(&self) -> Result<GlobalConfig> {
        let config_path = self.connection.global_config_path();
        match self.connection.read_yaml::<GlobalConfig>(&config_path)? {
            Some(config) => {
                debug!("Loaded global config from {:?}", config_path);
                Ok(config)
            }
            None => {
                let config = GlobalConfig::default();
                self.connection.write_yaml(&config_path, &config)?;
                info!("Created default global config at {:?}", config_path);
                Ok(config)
            }
        }
    }

    fn save_global_config(&self, config: &GlobalConfig) -> Result<()> {
        let mut config = config.clone();
        config.updated_at = Utc::now().to_rfc3339();
        self.connection
            .write_yaml(&self.connection.global_config_path(), &config)
    }

    fn allocate<F>(&self, bump: F) -> Result<i64>
    where
        F: FnOnce(&mut GlobalConfig) -> i64,
    {
        let _guard = self.connection.lock()?;
        let mut config = self.load_or_create_global_config()?;
        let id = bump(&mut config);
        self.save_global_config(&config)?;
        Ok(id)
    }
}

impl GlobalConfigStorage for GlobalConfigRepository {
    fn get_global_config(&self) -> Result<GlobalConfig> {
        let _guard = self.connection.lock()?;
        self.load_or_create_global_config()
    }

    fn update_global_config(&self, config: &GlobalConfig) -> Result<()> {
        let _guard = self.connection.lock()?;
        self.save_global_config(config)?;
        info!("Updated global config");
        Ok(())
    }

    fn next_member_id(&self) -> Result<MemberId> {
        self.allocate(|config| {
            let id = config.next_member_id;
            config.next_member_id += 1;
            id
        })
    }

    fn next_relationship_id(&self) -> Result<i64> {
        self.allocate(|config| {
            let id = config.next_relationship_id;
            config.next_relationship_id += 1;
            id
        })
    }
}
