//! # Life Event Repository
//!
//! Life events are nested (burial places inside a passing record), so each
//! member gets its own YAML file under `life_events/`.

use anyhow::Result;
use log::{debug, warn};
use shared::MemberId;
use std::fs;

use super::connection::CsvConnection;
use crate::domain::models::life_event::LifeEvents;
use crate::storage::traits::LifeEventStorage;

/// YAML-based life event repository
#[derive(Clone)]
pub struct LifeEventRepository {
    connection: CsvConnection,
}

impl LifeEventRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }
}

impl LifeEventStorage for LifeEventRepository {
    fn get_life_events(&self, tree_id: &str, member_id: MemberId) -> Result<Option<LifeEvents>> {
        self.connection
            .read_yaml(&self.connection.life_events_file_path(tree_id, member_id))
    }

    fn store_life_events(&self, tree_id: &str, events: &LifeEvents) -> Result<()> {
        let _guard = self.connection.lock()?;
        fs::create_dir_all(self.connection.life_events_directory(tree_id))?;
        self.connection.write_yaml(
            &self.connection.life_events_file_path(tree_id, events.member_id),
            events,
        )?;
        debug!("Stored life events for member {} in tree {}", events.member_id, tree_id);
        Ok(())
    }

    fn list_life_events(&self, tree_id: &str) -> Result<Vec<LifeEvents>> {
        let directory = self.connection.life_events_directory(tree_id);
        if !directory.exists() {
            return Ok(Vec::new());
        }

        let mut all_events = Vec::new();
        for entry in fs::read_dir(&directory)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("yaml") {
                continue;
            }
            match self.connection.read_yaml::<LifeEvents>(&path) {
                Ok(Some(events)) => all_events.push(events),
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable life events file {:?}: {}", path, e),
            }
        }
        all_events.sort_by_key(|events| events.member_id);
        Ok(all_events)
    }

    fn delete_life_events(&self, tree_id: &str, member_id: MemberId) -> Result<bool> {
        let _guard = self.connection.lock()?;
        let path = self.connection.life_events_file_path(tree_id, member_id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }
}
