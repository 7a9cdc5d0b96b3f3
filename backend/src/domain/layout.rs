//! Pixel geometry for a laid-out tree: node boxes, spouse connectors with
//! their midpoint marker, and parent-to-children bracket connectors.
//!
//! Only members in the visible set are positioned, and a connector is only
//! produced when both of its endpoints are visible.

use std::collections::{HashMap, HashSet};

use log::debug;
use shared::{
    ChildConnector, FamilyGraph, GridPosition, LayoutSpacing, LineSegment, MemberId, MemberRecord, Point,
    PositionedNode, SpouseConnector, TreeLayout, ViewFilter,
};

use crate::domain::child_merge::ChildMap;

/// Ids (stringified) of the members a view shows
pub type VisibleSet = HashSet<String>;

/// Members shown under `filter`. A generation filter drops members whose
/// generation is missing or not an integer.
pub fn visible_members(members: &[MemberRecord], filter: ViewFilter) -> VisibleSet {
    members
        .iter()
        .filter(|m| match filter {
            ViewFilter::All => true,
            ViewFilter::Generation(generation) => m.generation_number() == Some(generation),
        })
        .map(|m| m.id.to_string())
        .collect()
}

/// Convert one grid cell to a node box centred in its cell
pub fn to_pixels(position: &GridPosition, spacing: &LayoutSpacing) -> PositionedNode {
    let x = position.left as f64 * spacing.column_width
        + (spacing.column_width - spacing.node_width) / 2.0;
    let y = position.top as f64 * spacing.row_height + (spacing.row_height - spacing.node_height) / 2.0;
    PositionedNode {
        id: position.id.clone(),
        left: position.left,
        top: position.top,
        x,
        y,
        width: spacing.node_width,
        height: spacing.node_height,
    }
}

/// Derive the drawable layout from grid positions
pub fn compute_layout(
    graph: &FamilyGraph,
    positions: &[GridPosition],
    child_map: &ChildMap,
    spacing: &LayoutSpacing,
    visible: &VisibleSet,
) -> TreeLayout {
    let nodes: Vec<PositionedNode> = positions
        .iter()
        .filter(|p| visible.contains(&p.id))
        .map(|p| to_pixels(p, spacing))
        .collect();
    let by_id: HashMap<&str, &PositionedNode> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let spouse_connectors = spouse_connectors(graph, &by_id);
    let child_connectors = child_connectors(&nodes, child_map, &by_id);

    debug!(
        "Layout has {} nodes, {} spouse connectors, {} child connectors",
        nodes.len(),
        spouse_connectors.len(),
        child_connectors.len()
    );

    TreeLayout {
        root_id: graph.root_id.clone(),
        nodes,
        spouse_connectors,
        child_connectors,
        diagnostics: graph.diagnostics.clone(),
    }
}

fn spouse_connectors(graph: &FamilyGraph, by_id: &HashMap<&str, &PositionedNode>) -> Vec<SpouseConnector> {
    let mut drawn: HashSet<(String, String)> = HashSet::new();
    let mut connectors = Vec::new();

    for node in &graph.nodes {
        for spouse in &node.spouses {
            let (Some(a), Some(b)) = (by_id.get(node.id.as_str()), by_id.get(spouse.id.as_str())) else {
                continue;
            };
            let key = sorted_pair(&node.id, &spouse.id);
            if !drawn.insert(key.clone()) {
                continue;
            }
            let (first, second) = if a.id == key.0 { (a, b) } else { (b, a) };
            let from = first.center();
            let to = second.center();
            connectors.push(SpouseConnector {
                first_id: key.0,
                second_id: key.1,
                status: spouse.kind,
                line: LineSegment { from, to },
                midpoint: from.midpoint(to),
            });
        }
    }
    connectors
}

fn child_connectors(
    nodes: &[PositionedNode],
    child_map: &ChildMap,
    by_id: &HashMap<&str, &PositionedNode>,
) -> Vec<ChildConnector> {
    let mut connectors = Vec::new();

    for parent in nodes {
        let Ok(parent_id) = parent.id.parse::<MemberId>() else {
            continue;
        };
        let Some(children) = child_map.get(&parent_id) else {
            continue;
        };
        let mut visible_children: Vec<&PositionedNode> = children
            .iter()
            .filter_map(|child| by_id.get(child.id.to_string().as_str()).copied())
            .collect();
        if visible_children.is_empty() {
            continue;
        }
        visible_children.sort_by(|a, b| a.x.total_cmp(&b.x));

        let parent_bottom = parent.bottom_center();
        let child_top = visible_children
            .iter()
            .map(|c| c.y)
            .fold(f64::INFINITY, f64::min);
        let mid_y = (parent_bottom.y + child_top) / 2.0;

        let leftmost = visible_children[0].top_center().x;
        let rightmost = visible_children[visible_children.len() - 1].top_center().x;

        connectors.push(ChildConnector {
            parent_id: parent.id.clone(),
            child_ids: visible_children.iter().map(|c| c.id.clone()).collect(),
            parent_drop: LineSegment {
                from: parent_bottom,
                to: Point::new(parent_bottom.x, mid_y),
            },
            bar: LineSegment {
                from: Point::new(leftmost, mid_y),
                to: Point::new(rightmost, mid_y),
            },
            child_drops: visible_children
                .iter()
                .map(|c| {
                    let top = c.top_center();
                    LineSegment {
                        from: Point::new(top.x, mid_y),
                        to: top,
                    }
                })
                .collect(),
        });
    }
    connectors
}

fn sorted_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::child_merge::merge_children_across_spouses;
    use crate::domain::graph_builder::build_graph;
    use crate::domain::grid_layout::{GenerationalGridLayout, GridLayoutEngine};
    use crate::domain::test_fixtures::*;
    use shared::SpouseStatus;

    fn layout_for(members: &[MemberRecord], filter: ViewFilter) -> TreeLayout {
        let child_map = merge_children_across_spouses(members);
        let graph = build_graph(members, &child_map);
        let positions = GenerationalGridLayout::default().assign_positions(&graph);
        compute_layout(
            &graph,
            &positions,
            &child_map,
            &LayoutSpacing::tree_view(),
            &visible_members(members, filter),
        )
    }

    #[test]
    fn test_grid_to_pixels() {
        let spacing = LayoutSpacing::tree_view();
        let node = to_pixels(&GridPosition { id: "7".to_string(), left: 2, top: 1 }, &spacing);

        assert_eq!(node.x, 250.0);
        assert_eq!(node.y, 175.0);
        assert_eq!(node.center(), Point::new(300.0, 225.0));
        assert_eq!(node.bottom_center(), Point::new(300.0, 275.0));

        let tall = to_pixels(
            &GridPosition { id: "7".to_string(), left: 0, top: 1 },
            &LayoutSpacing::generation_view(),
        );
        assert_eq!(tall.y, 210.0);
    }

    #[test]
    fn test_spouse_connector_drawn_once_with_midpoint() {
        let layout = layout_for(&sample_tree(), ViewFilter::All);

        assert_eq!(layout.spouse_connectors.len(), 1);
        let connector = &layout.spouse_connectors[0];
        assert_eq!(connector.first_id, "2");
        assert_eq!(connector.second_id, "3");
        assert_eq!(connector.status, SpouseStatus::Married);
        assert_eq!(
            connector.midpoint,
            Point::new(
                (connector.line.from.x + connector.line.to.x) / 2.0,
                (connector.line.from.y + connector.line.to.y) / 2.0
            )
        );
    }

    #[test]
    fn test_child_brackets() {
        let layout = layout_for(&sample_tree(), ViewFilter::All);

        // Thomas -> Forrest, and Forrest and Geoffrey -> Ruben
        let parents: Vec<&str> = layout.child_connectors.iter().map(|c| c.parent_id.as_str()).collect();
        assert_eq!(parents.len(), 3);
        for id in ["1", "2", "3"] {
            assert!(parents.contains(&id));
        }

        let forrest = layout
            .child_connectors
            .iter()
            .find(|c| c.parent_id == "2")
            .unwrap();
        assert_eq!(forrest.child_ids, vec!["4".to_string()]);
        assert_eq!(forrest.parent_drop.to.y, forrest.bar.from.y);
        assert_eq!(forrest.child_drops.len(), 1);
        assert_eq!(forrest.child_drops[0].from.y, forrest.bar.from.y);
        assert!(forrest.parent_drop.from.y < forrest.bar.from.y);
        assert!(forrest.bar.from.y < forrest.child_drops[0].to.y);
    }

    #[test]
    fn test_bracket_spans_leftmost_to_rightmost_child() {
        let members = vec![
            as_root(member(1, "Root")),
            child_of(member(2, "A"), 1),
            child_of(member(3, "B"), 1),
            child_of(member(4, "C"), 1),
        ];
        let layout = layout_for(&members, ViewFilter::All);
        let bracket = &layout.child_connectors[0];

        let xs: Vec<f64> = bracket.child_drops.iter().map(|d| d.to.x).collect();
        assert_eq!(xs.len(), 3);
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(bracket.bar.from.x, xs[0]);
        assert_eq!(bracket.bar.to.x, xs[2]);
    }

    #[test]
    fn test_generation_filter_drops_cross_generation_connectors() {
        let layout = layout_for(&sample_tree(), ViewFilter::Generation(2));

        let ids: HashSet<&str> = layout.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, HashSet::from(["2", "3"]));
        assert!(layout.child_connectors.is_empty());
        assert_eq!(layout.spouse_connectors.len(), 1);

        for connector in &layout.spouse_connectors {
            assert!(ids.contains(connector.first_id.as_str()));
            assert!(ids.contains(connector.second_id.as_str()));
        }
    }

    #[test]
    fn test_generation_filter_with_no_spouses() {
        let layout = layout_for(&sample_tree(), ViewFilter::Generation(3));
        assert_eq!(layout.nodes.len(), 1);
        assert!(layout.spouse_connectors.is_empty());
        assert!(layout.child_connectors.is_empty());
    }

    #[test]
    fn test_visible_members_skips_unparseable_generation() {
        let mut members = sample_tree();
        members[0].generation = Some("first".to_string());
        assert!(!visible_members(&members, ViewFilter::Generation(1)).contains("1"));
        assert_eq!(visible_members(&members, ViewFilter::All).len(), 4);
    }
}
