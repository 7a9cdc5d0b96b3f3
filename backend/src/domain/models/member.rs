use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{parse_generation, Gender, MemberId, MemberSummary};

/// Domain model for one person in one tree.
///
/// `parent_id` is the only persisted direction of the parent link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: MemberId,
    pub tree_id: String,
    pub full_name: String,
    pub gender: Option<Gender>,
    pub birthday: Option<NaiveDate>,
    pub address: Option<String>,
    /// String-encoded integer
    pub generation: Option<String>,
    pub is_root_person: bool,
    /// Only meaningful together with `parent_id`
    pub is_adopted: bool,
    pub parent_id: Option<MemberId>,
    /// Date the parent bond was formally established
    pub parent_relationship_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FamilyMember {
    pub fn generation_number(&self) -> Option<i32> {
        parse_generation(self.generation.as_deref())
    }

    pub fn summary(&self) -> MemberSummary {
        MemberSummary {
            id: self.id,
            full_name: self.full_name.clone(),
        }
    }
}

/// A dated pairing between two members of the same tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpouseRelationship {
    pub id: i64,
    pub tree_id: String,
    pub member1_id: MemberId,
    pub member2_id: MemberId,
    pub marriage_date: Option<NaiveDate>,
    pub divorce_date: Option<NaiveDate>,
}

impl SpouseRelationship {
    pub fn involves(&self, member_id: MemberId) -> bool {
        self.member1_id == member_id || self.member2_id == member_id
    }

    /// The other side of the relationship, if `member_id` is one of its sides
    pub fn partner_of(&self, member_id: MemberId) -> Option<MemberId> {
        if self.member1_id == member_id {
            Some(self.member2_id)
        } else if self.member2_id == member_id {
            Some(self.member1_id)
        } else {
            None
        }
    }

    pub fn is_active(&self) -> bool {
        self.divorce_date.is_none()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MemberValidationError {
    #[error("Full name cannot be empty")]
    EmptyName,
    #[error("Full name cannot exceed {0} characters")]
    NameTooLong(usize),
    #[error("Tree {0} already has a root member")]
    RootAlreadyExists(String),
    #[error("The root member {0} cannot be deleted")]
    CannotDeleteRoot(MemberId),
    #[error("The root member {0} cannot be given a parent")]
    RootCannotHaveParent(MemberId),
    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),
    #[error("Related member not found: {0}")]
    RelatedMemberNotFound(MemberId),
    #[error("A member cannot be related to themselves")]
    SelfRelationship,
    #[error("Member {0} cannot become its own ancestor")]
    ParentCycle(MemberId),
    #[error("A link between two members needs a parent or spouse relationship type")]
    MissingRelationshipType,
    #[error("Members {0} and {1} are already married")]
    AlreadyMarried(MemberId, MemberId),
    #[error("Spouse relationship not found: {0}")]
    RelationshipNotFound(i64),
    #[error("Tree not found: {0}")]
    TreeNotFound(String),
}
