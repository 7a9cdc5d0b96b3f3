//! Builds the flat member records the relationship graph consumes from the
//! stored members, spouse relationships and life events of one tree.

use std::collections::HashMap;

use log::{debug, warn};
use shared::{MemberId, MemberRecord, MemberSummary, SpouseAsFirst, SpouseAsSecond};

use crate::domain::models::life_event::LifeEvents;
use crate::domain::models::member::{FamilyMember, SpouseRelationship};

/// One record per member, in member order. Parent, children and spouse
/// summaries pointing at members that are not in `members` are left out.
pub fn assemble_member_records(
    members: &[FamilyMember],
    relationships: &[SpouseRelationship],
    life_events: &[LifeEvents],
) -> Vec<MemberRecord> {
    let summaries: HashMap<MemberId, MemberSummary> = members.iter().map(|m| (m.id, m.summary())).collect();
    let events: HashMap<MemberId, &LifeEvents> = life_events.iter().map(|e| (e.member_id, e)).collect();

    let mut children: HashMap<MemberId, Vec<MemberSummary>> = HashMap::new();
    for member in members {
        if let Some(parent_id) = member.parent_id {
            children.entry(parent_id).or_default().push(member.summary());
        }
    }

    let mut spouse1: HashMap<MemberId, Vec<SpouseAsFirst>> = HashMap::new();
    let mut spouse2: HashMap<MemberId, Vec<SpouseAsSecond>> = HashMap::new();
    for relationship in relationships {
        let (Some(first), Some(second)) = (
            summaries.get(&relationship.member1_id),
            summaries.get(&relationship.member2_id),
        ) else {
            warn!(
                "Skipping spouse relationship {} with a missing member",
                relationship.id
            );
            continue;
        };
        spouse1.entry(first.id).or_default().push(SpouseAsFirst {
            divorce_date: relationship.divorce_date,
            family_member2: second.clone(),
        });
        spouse2.entry(second.id).or_default().push(SpouseAsSecond {
            divorce_date: relationship.divorce_date,
            family_member1: first.clone(),
        });
    }

    let records: Vec<MemberRecord> = members
        .iter()
        .map(|member| {
            let parent = member.parent_id.and_then(|id| summaries.get(&id).cloned());
            if member.parent_id.is_some() && parent.is_none() {
                warn!("Member {} points at missing parent {:?}", member.id, member.parent_id);
            }
            let member_events = events.get(&member.id);
            MemberRecord {
                id: member.id,
                full_name: member.full_name.clone(),
                gender: member.gender,
                birthday: member.birthday,
                generation: member.generation.clone(),
                is_adopted: member.is_adopted,
                is_root_person: member.is_root_person,
                parent_id: parent.as_ref().map(|p| p.id),
                parent,
                children: children.remove(&member.id).unwrap_or_default(),
                spouse1: spouse1.remove(&member.id).unwrap_or_default(),
                spouse2: spouse2.remove(&member.id).unwrap_or_default(),
                passing_records: member_events.map(|e| e.passing_summaries()).unwrap_or_default(),
                achievements: member_events.map(|e| e.achievement_summaries()).unwrap_or_default(),
            }
        })
        .collect();

    debug!("Assembled {} member records", records.len());
    records
}
