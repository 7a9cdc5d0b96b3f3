//! Parent/child reconstruction from one-directional `parent_id` pointers,
//! with children shared across spouse relationships.
//!
//! Both partners of a couple are treated as co-parents of every child recorded
//! under either of them. Spouse links are followed transitively: a member with
//! sequential spouses sees the children of all of them, and so does each of
//! those spouses. Divorce dates are not considered, so children of an ended
//! relationship stay visible under the current partner.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use shared::{ChildKind, ChildRef, MemberId, MemberRecord};

/// Member id to its deduplicated children, ordered by child id.
/// Members without children are absent; treat a lookup miss as empty.
pub type ChildMap = HashMap<MemberId, Vec<ChildRef>>;

/// Build the merged parent -> children map for a tree
pub fn merge_children_across_spouses(members: &[MemberRecord]) -> ChildMap {
    // Step 1: invert parent_id pointers
    let mut recorded: HashMap<MemberId, BTreeMap<MemberId, ChildKind>> = HashMap::new();
    for member in members {
        if let Some(parent_id) = member.parent_id {
            recorded
                .entry(parent_id)
                .or_default()
                .insert(member.id, ChildKind::from_adopted(member.is_adopted));
        }
    }

    // Step 2: union child sets over every spouse edge until stable
    let mut couples = SpouseClusters::default();
    for member in members {
        for (partner_id, _) in member.spouse_links() {
            couples.union(member.id, partner_id);
        }
    }

    let mut merged: HashMap<MemberId, BTreeMap<MemberId, ChildKind>> = HashMap::new();
    for (parent_id, children) in &recorded {
        let cluster = couples.find(*parent_id);
        merged
            .entry(cluster)
            .or_default()
            .extend(children.iter().map(|(id, kind)| (*id, *kind)));
    }

    let mut child_map = ChildMap::new();
    for member_id in recorded.keys().copied().chain(couples.members()) {
        if child_map.contains_key(&member_id) {
            continue;
        }
        let cluster = couples.find(member_id);
        if let Some(children) = merged.get(&cluster) {
            if !children.is_empty() {
                child_map.insert(
                    member_id,
                    children
                        .iter()
                        .map(|(id, kind)| ChildRef { id: *id, kind: *kind })
                        .collect(),
                );
            }
        }
    }

    debug!(
        "Merged children for {} members ({} with recorded children)",
        child_map.len(),
        recorded.len()
    );
    child_map
}

/// Children of `member_id`, empty when the member has none
pub fn children_of(child_map: &ChildMap, member_id: MemberId) -> &[ChildRef] {
    child_map.get(&member_id).map(Vec::as_slice).unwrap_or(&[])
}

/// Disjoint sets of members joined by spouse links
#[derive(Default)]
struct SpouseClusters {
    parent: HashMap<MemberId, MemberId>,
}

impl SpouseClusters {
    fn find(&self, member_id: MemberId) -> MemberId {
        let mut current = member_id;
        while let Some(&next) = self.parent.get(&current) {
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn union(&mut self, a: MemberId, b: MemberId) {
        self.parent.entry(a).or_insert(a);
        self.parent.entry(b).or_insert(b);
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            // Smallest id wins so the representative does not depend on edge order
            let (keep, absorb) = if root_a < root_b { (root_a, root_b) } else { (root_b, root_a) };
            self.parent.insert(absorb, keep);
        }
    }

    fn members(&self) -> Vec<MemberId> {
        self.parent.keys().copied().collect()
    }
}
