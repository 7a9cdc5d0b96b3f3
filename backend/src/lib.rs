//! # Family Tree Backend
//!
//! Domain services and file storage for family trees. All operations are
//! synchronous. The library logs through the `log` facade and leaves
//! installing a logger to the embedding binary.

use anyhow::Result;
use log::info;
use std::path::Path;
use std::sync::Arc;

pub mod domain;
pub mod storage;

pub use storage::csv::CsvConnection;

use domain::{LifeEventService, MemberService, RelationshipService, TreeService, TreeViewService};
use storage::csv::{
    GlobalConfigRepository, LifeEventRepository, MemberRepository, SpouseRepository, TreeRepository,
};
use storage::{GlobalConfigStorage, LifeEventStorage, MemberStorage, SpouseRelationshipStorage, TreeStorage};

/// Main backend struct that wires every service to one data directory
pub struct Backend {
    pub tree_service: TreeService,
    pub member_service: MemberService,
    pub relationship_service: RelationshipService,
    pub life_event_service: LifeEventService,
    pub tree_view_service: TreeViewService,
}

impl Backend {
    /// Create a backend storing its files under `data_directory`
    pub fn new<P: AsRef<Path>>(data_directory: P) -> Result<Self> {
        let connection = CsvConnection::new(data_directory)?;
        info!("Using data directory {:?}", connection.base_directory());
        Ok(Self::from_connection(connection))
    }

    pub fn from_connection(connection: CsvConnection) -> Self {
        let trees: Arc<dyn TreeStorage> = Arc::new(TreeRepository::new(connection.clone()));
        let members: Arc<dyn MemberStorage> = Arc::new(MemberRepository::new(connection.clone()));
        let relationships: Arc<dyn SpouseRelationshipStorage> = Arc::new(SpouseRepository::new(connection.clone()));
        let life_events: Arc<dyn LifeEventStorage> = Arc::new(LifeEventRepository::new(connection.clone()));
        let config: Arc<dyn GlobalConfigStorage> = Arc::new(GlobalConfigRepository::new(connection));

        let relationship_service = RelationshipService::new(members.clone(), relationships.clone(), config.clone());
        let member_service = MemberService::new(
            trees.clone(),
            members.clone(),
            life_events.clone(),
            config.clone(),
            relationship_service.clone(),
        );
        let life_event_service = LifeEventService::new(members.clone(), life_events.clone());
        let tree_view_service = TreeViewService::new(trees.clone(), members, relationships, life_events, config);

        Self {
            tree_service: TreeService::new(trees),
            member_service,
            relationship_service,
            life_event_service,
            tree_view_service,
        }
    }
}
