//! Builders for member record lists used across the domain tests

use chrono::NaiveDate;
use shared::{Gender, MemberId, MemberRecord, MemberSummary, SpouseAsFirst, SpouseAsSecond};

pub fn member(id: MemberId, name: &str) -> MemberRecord {
    MemberRecord {
        id,
        full_name: name.to_string(),
        gender: None,
        birthday: None,
        generation: None,
        is_adopted: false,
        is_root_person: false,
        parent_id: None,
        parent: None,
        children: Vec::new(),
        spouse1: Vec::new(),
        spouse2: Vec::new(),
        passing_records: Vec::new(),
        achievements: Vec::new(),
    }
}

pub fn with_generation(mut record: MemberRecord, generation: i32) -> MemberRecord {
    record.generation = Some(generation.to_string());
    record
}

pub fn with_gender(mut record: MemberRecord, gender: Gender) -> MemberRecord {
    record.gender = Some(gender);
    record
}

pub fn as_root(mut record: MemberRecord) -> MemberRecord {
    record.is_root_person = true;
    record
}

pub fn child_of(mut record: MemberRecord, parent_id: MemberId) -> MemberRecord {
    record.parent_id = Some(parent_id);
    record
}

pub fn adopted_by(record: MemberRecord, parent_id: MemberId) -> MemberRecord {
    let mut record = child_of(record, parent_id);
    record.is_adopted = true;
    record
}

fn find(members: &mut [MemberRecord], id: MemberId) -> &mut MemberRecord {
    members
        .iter_mut()
        .find(|m| m.id == id)
        .unwrap_or_else(|| panic!("no fixture member {}", id))
}

/// Record a spouse relationship with `first` stored as member1
pub fn marry(members: &mut [MemberRecord], first: MemberId, second: MemberId, divorce_date: Option<NaiveDate>) {
    let first_summary = summary(members, first);
    let second_summary = summary(members, second);
    find(members, first).spouse1.push(SpouseAsFirst {
        divorce_date,
        family_member2: second_summary,
    });
    find(members, second).spouse2.push(SpouseAsSecond {
        divorce_date,
        family_member1: first_summary,
    });
}

fn summary(members: &mut [MemberRecord], id: MemberId) -> MemberSummary {
    let record = find(members, id);
    MemberSummary {
        id: record.id,
        full_name: record.full_name.clone(),
    }
}

pub const THOMAS: MemberId = 1;
pub const FORREST: MemberId = 2;
pub const GEOFFREY: MemberId = 3;
pub const RUBEN: MemberId = 4;

/// Thomas (gen 1) -> Forrest (gen 2) -> Ruben (gen 3), with Forrest married
/// to Geoffrey (gen 2). Ruben is only recorded under Forrest.
pub fn sample_tree() -> Vec<MemberRecord> {
    let mut members = vec![
        with_gender(with_generation(member(THOMAS, "Thomas"), 1), Gender::Male),
        with_gender(with_generation(child_of(member(FORREST, "Forrest"), THOMAS), 2), Gender::Male),
        with_gender(with_generation(member(GEOFFREY, "Geoffrey"), 2), Gender::Male),
        with_generation(child_of(member(RUBEN, "Ruben"), FORREST), 3),
    ];
    marry(&mut members, FORREST, GEOFFREY, None);
    members
}
