//! Normalized relationship graph built from the flat member list and the
//! merged child map.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use shared::{
    ChildEdge, ChildKind, FamilyGraph, GraphDiagnostic, GraphNode, MemberId, MemberRecord,
    NodeGender, ParentEdge, Relation, SpouseEdge, SpouseStatus,
};

use crate::domain::child_merge::{children_of, ChildMap};

/// Root invariant violations surfaced when strict root checking is enabled
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TreeShapeError {
    #[error("The tree has no members")]
    Empty,
    #[error("The tree root is ambiguous: {0}")]
    AmbiguousRoot(GraphDiagnostic),
}

/// Outcome of choosing the layout root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSelection {
    pub root_id: Option<MemberId>,
    pub diagnostics: Vec<GraphDiagnostic>,
}

/// Choose the member the layout grows from.
///
/// A member carrying the root flag wins. Otherwise the candidates are the
/// parentless members that did not marry into the tree (no spouse with a
/// recorded parent), with a founding couple counted once. Ambiguity is
/// reported as a diagnostic next to the best-effort choice rather than being
/// resolved silently.
pub fn select_root(members: &[MemberRecord]) -> RootSelection {
    let mut diagnostics = Vec::new();
    let Some(first) = members.first() else {
        return RootSelection {
            root_id: None,
            diagnostics,
        };
    };

    let flagged = unique_ids(members.iter().filter(|m| m.is_root_person));
    if let Some(&chosen) = flagged.first() {
        if flagged.len() > 1 {
            diagnostics.push(GraphDiagnostic::MultipleRootFlags {
                flagged: flagged.clone(),
                chosen,
            });
        }
        if let Some(parent) = members.iter().find(|m| m.id == chosen).and_then(|m| m.parent_id) {
            diagnostics.push(GraphDiagnostic::RootHasParent { root: chosen, parent });
        }
        return RootSelection {
            root_id: Some(chosen),
            diagnostics,
        };
    }

    let has_parent: HashSet<MemberId> = members
        .iter()
        .filter(|m| m.parent_id.is_some())
        .map(|m| m.id)
        .collect();

    let mut candidates: Vec<&MemberRecord> = Vec::new();
    for member in members.iter().filter(|m| m.parent_id.is_none()) {
        if candidates.iter().any(|c| c.id == member.id) {
            continue;
        }
        let partners: Vec<MemberId> = member.spouse_links().map(|(partner, _)| partner).collect();
        let married_in = partners.iter().any(|p| has_parent.contains(p));
        let partner_of_candidate = partners.iter().any(|p| candidates.iter().any(|c| c.id == *p));
        if !married_in && !partner_of_candidate {
            candidates.push(member);
        }
    }

    let root_id = match candidates.as_slice() {
        [] => {
            diagnostics.push(GraphDiagnostic::NoRootCandidate { fallback: first.id });
            first.id
        }
        [only] => only.id,
        [chosen, ..] => {
            diagnostics.push(GraphDiagnostic::MultipleRootCandidates {
                candidates: candidates.iter().map(|c| c.id).collect(),
                chosen: chosen.id,
            });
            chosen.id
        }
    };

    RootSelection {
        root_id: Some(root_id),
        diagnostics,
    }
}

/// Convert members and their merged children into one node per unique id.
///
/// Calling this twice on the same input yields equal graphs.
pub fn build_graph(members: &[MemberRecord], child_map: &ChildMap) -> FamilyGraph {
    let selection = select_root(members);
    let mut diagnostics = selection.diagnostics;

    let mut seen: HashSet<MemberId> = HashSet::new();
    let mut reported: HashSet<MemberId> = HashSet::new();
    let mut nodes = Vec::with_capacity(members.len());

    for member in members {
        if !seen.insert(member.id) {
            if reported.insert(member.id) {
                warn!("Member {} appears more than once, keeping the first record", member.id);
                diagnostics.push(GraphDiagnostic::DuplicateMember { id: member.id });
            }
            continue;
        }
        nodes.push(build_node(member, child_map));
    }

    for diagnostic in &diagnostics {
        warn!("Family graph: {}", diagnostic);
    }
    debug!("Built family graph with {} nodes", nodes.len());

    FamilyGraph {
        nodes,
        root_id: selection.root_id.map(|id| id.to_string()),
        diagnostics,
    }
}

/// Fail on any root diagnostic. Duplicate members are not a root problem.
pub fn check_root(graph: &FamilyGraph) -> Result<(), TreeShapeError> {
    if graph.root_id.is_none() {
        return Err(TreeShapeError::Empty);
    }
    match graph
        .diagnostics
        .iter()
        .find(|d| !matches!(d, GraphDiagnostic::DuplicateMember { .. }))
    {
        Some(diagnostic) => Err(TreeShapeError::AmbiguousRoot(diagnostic.clone())),
        None => Ok(()),
    }
}

/// Index graph nodes by id
pub fn index_nodes(graph: &FamilyGraph) -> HashMap<&str, &GraphNode> {
    graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect()
}

fn build_node(member: &MemberRecord, child_map: &ChildMap) -> GraphNode {
    let parents: Vec<ParentEdge> = member
        .parent_id
        .map(|parent_id| Relation {
            id: parent_id.to_string(),
            kind: ChildKind::from_adopted(member.is_adopted),
        })
        .into_iter()
        .collect();

    let children: Vec<ChildEdge> = children_of(child_map, member.id)
        .iter()
        .map(|child| Relation {
            id: child.id.to_string(),
            kind: child.kind,
        })
        .collect();

    // One edge per partner; a couple that remarried counts as married
    let mut spouses: Vec<(MemberId, SpouseStatus)> = Vec::new();
    for (partner_id, divorce_date) in member.spouse_links() {
        let status = SpouseStatus::from_divorce_date(divorce_date);
        match spouses.iter_mut().find(|(id, _)| *id == partner_id) {
            Some((_, existing)) => {
                if status == SpouseStatus::Married {
                    *existing = SpouseStatus::Married;
                }
            }
            None => spouses.push((partner_id, status)),
        }
    }

    GraphNode {
        id: member.id.to_string(),
        gender: NodeGender::from(member.gender),
        parents,
        children,
        siblings: Vec::new(),
        spouses: spouses
            .into_iter()
            .map(|(id, kind)| SpouseEdge {
                id: id.to_string(),
                kind,
            })
            .collect(),
    }
}

fn unique_ids<'a>(members: impl Iterator<Item = &'a MemberRecord>) -> Vec<MemberId> {
    let mut ids: Vec<MemberId> = Vec::new();
    for member in members {
        if !ids.contains(&member.id) {
            ids.push(member.id);
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::child_merge::merge_children_across_spouses;
    use crate::domain::test_fixtures::*;
    use chrono::NaiveDate;
    use shared::Gender;

    fn graph_for(members: &[MemberRecord]) -> FamilyGraph {
        build_graph(members, &merge_children_across_spouses(members))
    }

    fn node<'a>(graph: &'a FamilyGraph, id: MemberId) -> &'a GraphNode {
        let id = id.to_string();
        graph.nodes.iter().find(|n| n.id == id).expect("node present")
    }

    #[test]
    fn test_sample_tree_graph() {
        let graph = graph_for(&sample_tree());

        assert_eq!(graph.root_id.as_deref(), Some("1"));
        assert!(graph.diagnostics.is_empty());
        assert_eq!(graph.nodes.len(), 4);

        let forrest = node(&graph, FORREST);
        assert_eq!(
            forrest.spouses,
            vec![Relation { id: GEOFFREY.to_string(), kind: SpouseStatus::Married }]
        );
        assert_eq!(
            forrest.parents,
            vec![Relation { id: THOMAS.to_string(), kind: ChildKind::Blood }]
        );
        assert_eq!(
            forrest.children,
            vec![Relation { id: RUBEN.to_string(), kind: ChildKind::Blood }]
        );
        assert!(forrest.siblings.is_empty());

        let geoffrey = node(&graph, GEOFFREY);
        assert_eq!(geoffrey.children, forrest.children);
        assert!(geoffrey.parents.is_empty());
        assert_eq!(geoffrey.spouses[0].id, FORREST.to_string());
    }

    #[test]
    fn test_unset_gender_stays_unspecified() {
        let graph = graph_for(&sample_tree());
        assert_eq!(node(&graph, RUBEN).gender, NodeGender::Unspecified);
        assert_eq!(node(&graph, THOMAS).gender, NodeGender::Male);
    }

    #[test]
    fn test_adopted_parent_edge() {
        let members = vec![as_root(member(1, "A")), adopted_by(member(2, "B"), 1)];
        let graph = graph_for(&members);
        assert_eq!(node(&graph, 2).parents[0].kind, ChildKind::Adopted);
        assert_eq!(node(&graph, 1).children[0].kind, ChildKind::Adopted);
    }

    #[test]
    fn test_divorced_spouse_edge() {
        let mut members = vec![as_root(member(1, "A")), member(2, "B")];
        marry(&mut members, 1, 2, NaiveDate::from_ymd_opt(2001, 1, 1));
        let graph = graph_for(&members);
        assert_eq!(node(&graph, 1).spouses[0].kind, SpouseStatus::Divorced);
        assert_eq!(node(&graph, 2).spouses[0].kind, SpouseStatus::Divorced);
    }

    #[test]
    fn test_remarried_couple_counts_as_married() {
        let mut members = vec![as_root(member(1, "A")), member(2, "B")];
        marry(&mut members, 1, 2, NaiveDate::from_ymd_opt(2001, 1, 1));
        marry(&mut members, 2, 1, None);
        let graph = graph_for(&members);
        assert_eq!(
            node(&graph, 1).spouses,
            vec![Relation { id: "2".to_string(), kind: SpouseStatus::Married }]
        );
    }

    #[test]
    fn test_graph_has_unique_ids() {
        let mut members = sample_tree();
        members.push(members[1].clone());
        members.push(members[3].clone());

        let graph = graph_for(&members);
        let unique: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(unique.len(), graph.nodes.len());
        assert_eq!(graph.nodes.len(), 4);
        assert!(graph
            .diagnostics
            .contains(&GraphDiagnostic::DuplicateMember { id: FORREST }));
        assert!(check_root(&graph).is_ok());
    }

    #[test]
    fn test_build_graph_is_idempotent() {
        let members = sample_tree();
        let child_map = merge_children_across_spouses(&members);
        assert_eq!(build_graph(&members, &child_map), build_graph(&members, &child_map));
    }

    #[test]
    fn test_root_flag_wins() {
        let members = vec![member(1, "A"), as_root(member(2, "B"))];
        let selection = select_root(&members);
        assert_eq!(selection.root_id, Some(2));
        assert!(selection.diagnostics.is_empty());
    }

    #[test]
    fn test_multiple_root_flags_are_reported() {
        let members = vec![as_root(member(1, "A")), as_root(member(2, "B"))];
        let selection = select_root(&members);
        assert_eq!(selection.root_id, Some(1));
        assert_eq!(
            selection.diagnostics,
            vec![GraphDiagnostic::MultipleRootFlags { flagged: vec![1, 2], chosen: 1 }]
        );
    }

    #[test]
    fn test_flagged_root_with_parent_is_reported() {
        let members = vec![member(1, "A"), as_root(child_of(member(2, "B"), 1))];
        let selection = select_root(&members);
        assert_eq!(selection.root_id, Some(2));
        assert_eq!(
            selection.diagnostics,
            vec![GraphDiagnostic::RootHasParent { root: 2, parent: 1 }]
        );
    }

    #[test]
    fn test_founding_couple_is_one_candidate() {
        let mut members = vec![
            with_gender(member(1, "A"), Gender::Female),
            member(2, "B"),
            child_of(member(3, "C"), 1),
        ];
        marry(&mut members, 1, 2, None);
        let selection = select_root(&members);
        assert_eq!(selection.root_id, Some(1));
        assert!(selection.diagnostics.is_empty());
    }

    #[test]
    fn test_unrelated_parentless_members_are_reported() {
        let members = vec![member(1, "A"), member(2, "B"), child_of(member(3, "C"), 2)];
        let graph = graph_for(&members);

        assert_eq!(graph.root_id.as_deref(), Some("1"));
        assert_eq!(
            graph.diagnostics,
            vec![GraphDiagnostic::MultipleRootCandidates { candidates: vec![1, 2], chosen: 1 }]
        );
        assert!(matches!(check_root(&graph), Err(TreeShapeError::AmbiguousRoot(_))));
    }

    #[test]
    fn test_no_candidate_falls_back_with_diagnostic() {
        // A parent cycle leaves no parentless member
        let members = vec![child_of(member(1, "A"), 2), child_of(member(2, "B"), 1)];
        let selection = select_root(&members);
        assert_eq!(selection.root_id, Some(1));
        assert_eq!(
            selection.diagnostics,
            vec![GraphDiagnostic::NoRootCandidate { fallback: 1 }]
        );
    }

    #[test]
    fn test_empty_tree() {
        let graph = graph_for(&[]);
        assert!(graph.nodes.is_empty());
        assert_eq!(graph.root_id, None);
        assert_eq!(check_root(&graph), Err(TreeShapeError::Empty));
    }
}
