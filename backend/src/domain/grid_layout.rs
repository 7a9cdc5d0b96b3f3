//! Grid placement of graph nodes.
//!
//! [`GridLayoutEngine`] is the seam for a generic genealogical layout
//! algorithm. [`GenerationalGridLayout`] is the bundled implementation: each
//! couple sits on one row, children are laid out left to right below their
//! parents, and every subtree owns a contiguous block of columns so nodes
//! never overlap.

use std::collections::{HashMap, HashSet};

use log::debug;
use shared::{FamilyGraph, Gender, GraphNode, GridPosition};

use crate::domain::graph_builder::index_nodes;

/// Assigns integer grid cells to graph nodes. `top` grows one per
/// generation below the root; spouses share a row and are adjacent.
pub trait GridLayoutEngine {
    fn assign_positions(&self, graph: &FamilyGraph) -> Vec<GridPosition>;
}

/// Couples on a row, descendants beneath in contiguous column blocks
#[derive(Debug, Clone)]
pub struct GenerationalGridLayout {
    /// Side used for members with no recorded gender when ordering a couple
    unspecified_gender: Gender,
}

impl GenerationalGridLayout {
    pub fn new(unspecified_gender: Gender) -> Self {
        Self { unspecified_gender }
    }
}

impl Default for GenerationalGridLayout {
    fn default() -> Self {
        Self::new(Gender::Male)
    }
}

/// A couple (or single member) and the families of its children
struct FamilyUnit<'a> {
    members: Vec<&'a GraphNode>,
    children: Vec<FamilyUnit<'a>>,
}

impl<'a> FamilyUnit<'a> {
    fn width(&self) -> i32 {
        let children: i32 = self.children.iter().map(FamilyUnit::width).sum();
        (self.members.len() as i32).max(children)
    }
}

impl GenerationalGridLayout {
    fn build_unit<'a>(
        &self,
        anchor: &'a GraphNode,
        index: &HashMap<&str, &'a GraphNode>,
        claimed: &mut HashSet<&'a str>,
    ) -> FamilyUnit<'a> {
        claimed.insert(anchor.id.as_str());

        let mut members = vec![anchor];
        for spouse in &anchor.spouses {
            if let Some(&node) = index.get(spouse.id.as_str()) {
                if claimed.insert(node.id.as_str()) {
                    members.push(node);
                }
            }
        }
        // Men to the left of women; sort is stable so the anchor leads its side
        members.sort_by_key(|node| match node.gender.resolve_for_layout(self.unspecified_gender) {
            Gender::Male => 0,
            Gender::Female => 1,
        });

        let mut child_ids: Vec<&str> = Vec::new();
        for member in &members {
            for child in &member.children {
                if !child_ids.contains(&child.id.as_str()) {
                    child_ids.push(child.id.as_str());
                }
            }
        }

        let mut children = Vec::new();
        for child_id in child_ids {
            if let Some(&child) = index.get(child_id) {
                if !claimed.contains(child.id.as_str()) {
                    children.push(self.build_unit(child, index, claimed));
                }
            }
        }

        FamilyUnit { members, children }
    }

    fn place(unit: &FamilyUnit<'_>, left_edge: i32, depth: i32, out: &mut Vec<GridPosition>) {
        let width = unit.width();

        let mut left = left_edge + (width - unit.members.len() as i32) / 2;
        for member in &unit.members {
            out.push(GridPosition {
                id: member.id.clone(),
                left,
                top: depth,
            });
            left += 1;
        }

        let children_width: i32 = unit.children.iter().map(FamilyUnit::width).sum();
        let mut child_left = left_edge + (width - children_width) / 2;
        for child in &unit.children {
            Self::place(child, child_left, depth + 1, out);
            child_left += child.width();
        }
    }
}

impl GridLayoutEngine for GenerationalGridLayout {
    fn assign_positions(&self, graph: &FamilyGraph) -> Vec<GridPosition> {
        let index = index_nodes(graph);
        let mut claimed: HashSet<&str> = HashSet::new();
        let mut units = Vec::new();

        if let Some(root) = graph.root_id.as_deref().and_then(|id| index.get(id).copied()) {
            units.push(self.build_unit(root, &index, &mut claimed));
        }

        // Whatever the root does not reach is laid out to its right, tops of
        // other components first
        let parentless = graph
            .nodes
            .iter()
            .filter(|n| n.parents.iter().all(|p| !index.contains_key(p.id.as_str())));
        let remaining: Vec<&GraphNode> = parentless.chain(graph.nodes.iter()).collect();
        for node in remaining {
            if !claimed.contains(node.id.as_str()) {
                units.push(self.build_unit(node, &index, &mut claimed));
            }
        }

        let mut positions = Vec::with_capacity(graph.nodes.len());
        let mut left_edge = 0;
        for unit in &units {
            Self::place(unit, left_edge, 0, &mut positions);
            left_edge += unit.width();
        }

        debug!(
            "Placed {} nodes in {} components across {} columns",
            positions.len(),
            units.len(),
            left_edge
        );
        positions
    }
}
