//! # Tree View Service
//!
//! Turns the stored contents of a tree into something drawable:
//! member records, then the merged child map, then the relationship graph,
//! then grid positions, then pixel geometry. The whole pipeline is rebuilt
//! on every call.

use anyhow::Result;
use log::info;
use shared::{FamilyGraph, FamilyTreeConfig, MemberRecord, TreeLayout, ViewFilter};
use std::sync::Arc;

use crate::domain::child_merge::merge_children_across_spouses;
use crate::domain::graph_builder::{build_graph, check_root, TreeShapeError};
use crate::domain::grid_layout::{GenerationalGridLayout, GridLayoutEngine};
use crate::domain::layout::{compute_layout, visible_members};
use crate::domain::models::member::MemberValidationError;
use crate::domain::record_assembly::assemble_member_records;
use crate::storage::{GlobalConfigStorage, LifeEventStorage, MemberStorage, SpouseRelationshipStorage, TreeStorage};

/// Run the layout pipeline over an in-memory record list
pub fn render_member_records(
    records: &[MemberRecord],
    config: &FamilyTreeConfig,
    filter: ViewFilter,
    engine: &dyn GridLayoutEngine,
) -> Result<TreeLayout, TreeShapeError> {
    let child_map = merge_children_across_spouses(records);
    let graph = build_graph(records, &child_map);
    if config.strict_root_check {
        check_root(&graph)?;
    }
    let positions = engine.assign_positions(&graph);
    Ok(compute_layout(
        &graph,
        &positions,
        &child_map,
        &config.spacing_for(filter),
        &visible_members(records, filter),
    ))
}

/// Service producing graphs and layouts for stored trees
#[derive(Clone)]
pub struct TreeViewService {
    tree_storage: Arc<dyn TreeStorage>,
    member_storage: Arc<dyn MemberStorage>,
    relationship_storage: Arc<dyn SpouseRelationshipStorage>,
    life_event_storage: Arc<dyn LifeEventStorage>,
    config_storage: Arc<dyn GlobalConfigStorage>,
}

impl TreeViewService {
    pub fn new(
        tree_storage: Arc<dyn TreeStorage>,
        member_storage: Arc<dyn MemberStorage>,
        relationship_storage: Arc<dyn SpouseRelationshipStorage>,
        life_event_storage: Arc<dyn LifeEventStorage>,
        config_storage: Arc<dyn GlobalConfigStorage>,
    ) -> Self {
        Self {
            tree_storage,
            member_storage,
            relationship_storage,
            life_event_storage,
            config_storage,
        }
    }

    /// Snapshot of a tree as member records
    pub fn load_member_records(&self, tree_id: &str) -> Result<Vec<MemberRecord>> {
        if self.tree_storage.get_tree(tree_id)?.is_none() {
            return Err(MemberValidationError::TreeNotFound(tree_id.to_string()).into());
        }
        let members = self.member_storage.list_members(tree_id)?;
        let relationships = self.relationship_storage.list_relationships(tree_id)?;
        let life_events = self.life_event_storage.list_life_events(tree_id)?;
        Ok(assemble_member_records(&members, &relationships, &life_events))
    }

    /// Member records of a tree in their camelCase JSON form
    pub fn export_member_records_json(&self, tree_id: &str) -> Result<String> {
        let records = self.load_member_records(tree_id)?;
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// Relationship graph of a stored tree
    pub fn build_graph(&self, tree_id: &str) -> Result<FamilyGraph> {
        let records = self.load_member_records(tree_id)?;
        let child_map = merge_children_across_spouses(&records);
        Ok(build_graph(&records, &child_map))
    }

    /// Layout of a stored tree, optionally limited to one generation
    pub fn render(&self, tree_id: &str, filter: ViewFilter) -> Result<TreeLayout> {
        info!("Rendering tree {} with filter {:?}", tree_id, filter);
        let config = self.config_storage.get_tree_config()?;
        let records = self.load_member_records(tree_id)?;
        let engine = GenerationalGridLayout::new(config.unspecified_gender_layout);
        let layout = render_member_records(&records, &config, filter, &engine)?;
        info!(
            "Rendered tree {}: {} nodes, {} diagnostics",
            tree_id,
            layout.nodes.len(),
            layout.diagnostics.len()
        );
        Ok(layout)
    }
}
