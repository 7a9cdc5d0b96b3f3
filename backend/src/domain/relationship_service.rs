//! # Relationship Service
//!
//! Spouse relationships between two members of the same tree. A member may
//! have several spouses over time; only one active (undivorced) relationship
//! per pair is allowed.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use log::{info, warn};
use shared::{LinkSpousesRequest, MemberId, RelationshipType};
use std::sync::Arc;

use crate::domain::date_validation::DateValidationService;
use crate::domain::models::member::{FamilyMember, MemberValidationError, SpouseRelationship};
use crate::storage::{GlobalConfigStorage, MemberStorage, SpouseRelationshipStorage};

/// Service for linking members as spouses and recording divorces
#[derive(Clone)]
pub struct RelationshipService {
    member_storage: Arc<dyn MemberStorage>,
    relationship_storage: Arc<dyn SpouseRelationshipStorage>,
    config_storage: Arc<dyn GlobalConfigStorage>,
}

impl RelationshipService {
    pub fn new(
        member_storage: Arc<dyn MemberStorage>,
        relationship_storage: Arc<dyn SpouseRelationshipStorage>,
        config_storage: Arc<dyn GlobalConfigStorage>,
    ) -> Self {
        Self {
            member_storage,
            relationship_storage,
            config_storage,
        }
    }

    /// Date validator using the configured minimum marriage age
    pub fn date_validator(&self) -> Result<DateValidationService> {
        let config = self.config_storage.get_tree_config()?;
        Ok(DateValidationService::with_min_marriage_age(
            config.min_marriage_age_years,
        ))
    }

    /// Link two existing members as spouses
    pub fn link_spouses(&self, tree_id: &str, request: LinkSpousesRequest) -> Result<SpouseRelationship> {
        info!(
            "Linking members {} and {} as spouses in tree {}",
            request.member1_id, request.member2_id, tree_id
        );

        let first = self.require_member(tree_id, request.member1_id)?;
        let second = self.require_member(tree_id, request.member2_id)?;
        self.validate_marriage(tree_id, &first, &second, request.marriage_date)?;
        self.store_marriage(tree_id, first.id, second.id, request.marriage_date)
    }

    /// Check that two members may be married on `marriage_date`
    pub fn validate_marriage(
        &self,
        tree_id: &str,
        first: &FamilyMember,
        second: &FamilyMember,
        marriage_date: Option<NaiveDate>,
    ) -> Result<()> {
        if first.id == second.id {
            return Err(MemberValidationError::SelfRelationship.into());
        }
        let already_married = self
            .relationship_storage
            .list_relationships(tree_id)?
            .iter()
            .any(|r| r.is_active() && r.involves(first.id) && r.involves(second.id));
        if already_married {
            return Err(MemberValidationError::AlreadyMarried(first.id, second.id).into());
        }
        self.validate_marriage_dates(first.birthday, second.birthday, marriage_date)
    }

    /// The marriage date must respect the minimum marriage age of both
    /// partners. Unknown dates are not checked.
    pub fn validate_marriage_dates(
        &self,
        first_birthday: Option<NaiveDate>,
        second_birthday: Option<NaiveDate>,
        marriage_date: Option<NaiveDate>,
    ) -> Result<()> {
        let Some(marriage_date) = marriage_date else {
            return Ok(());
        };
        let validator = self.date_validator()?;
        for birthday in [first_birthday, second_birthday].into_iter().flatten() {
            validator.validate_relationship_dates(birthday, RelationshipType::Spouse, marriage_date)?;
        }
        Ok(())
    }

    /// Persist a relationship that has already been validated
    pub fn store_marriage(
        &self,
        tree_id: &str,
        member1_id: MemberId,
        member2_id: MemberId,
        marriage_date: Option<NaiveDate>,
    ) -> Result<SpouseRelationship> {
        let relationship = self.prepare_marriage(tree_id, member1_id, member2_id, marriage_date)?;
        self.save_marriage(&relationship)?;
        Ok(relationship)
    }

    /// Allocate the id of a relationship without writing it yet
    pub fn prepare_marriage(
        &self,
        tree_id: &str,
        member1_id: MemberId,
        member2_id: MemberId,
        marriage_date: Option<NaiveDate>,
    ) -> Result<SpouseRelationship> {
        Ok(SpouseRelationship {
            id: self.config_storage.next_relationship_id()?,
            tree_id: tree_id.to_string(),
            member1_id,
            member2_id,
            marriage_date,
            divorce_date: None,
        })
    }

    pub fn save_marriage(&self, relationship: &SpouseRelationship) -> Result<()> {
        self.relationship_storage.store_relationship(relationship)?;
        info!(
            "Created spouse relationship {} between {} and {}",
            relationship.id, relationship.member1_id, relationship.member2_id
        );
        Ok(())
    }

    /// Record the divorce date of an active relationship
    pub fn record_divorce(
        &self,
        tree_id: &str,
        relationship_id: i64,
        divorce_date: NaiveDate,
    ) -> Result<SpouseRelationship> {
        info!("Recording divorce for relationship {} in tree {}", relationship_id, tree_id);

        let mut relationship = self
            .relationship_storage
            .get_relationship(tree_id, relationship_id)?
            .ok_or(MemberValidationError::RelationshipNotFound(relationship_id))?;
        if let Some(existing) = relationship.divorce_date {
            bail!("Relationship {} already ended in divorce on {}", relationship_id, existing);
        }
        if let Some(marriage_date) = relationship.marriage_date {
            self.date_validator()?
                .validate_divorce_date(marriage_date, divorce_date)?;
        }

        relationship.divorce_date = Some(divorce_date);
        self.relationship_storage.update_relationship(&relationship)?;
        Ok(relationship)
    }

    pub fn list_relationships(&self, tree_id: &str) -> Result<Vec<SpouseRelationship>> {
        self.relationship_storage.list_relationships(tree_id)
    }

    /// Every relationship, active or not, that `member_id` takes part in
    pub fn relationships_for_member(&self, tree_id: &str, member_id: MemberId) -> Result<Vec<SpouseRelationship>> {
        Ok(self
            .relationship_storage
            .list_relationships(tree_id)?
            .into_iter()
            .filter(|r| r.involves(member_id))
            .collect())
    }

    /// Drop a member's relationships ahead of deleting the member
    pub fn remove_member_relationships(&self, tree_id: &str, member_id: MemberId) -> Result<u32> {
        let removed = self
            .relationship_storage
            .delete_relationships_for_member(tree_id, member_id)?;
        if removed > 0 {
            warn!("Removed {} spouse relationships of member {}", removed, member_id);
        }
        Ok(removed)
    }

    fn require_member(&self, tree_id: &str, member_id: MemberId) -> Result<FamilyMember> {
        self.member_storage
            .get_member(tree_id, member_id)?
            .ok_or_else(|| MemberValidationError::MemberNotFound(member_id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::date_validation::DateOrderingError;
    use crate::storage::csv::test_utils::{build_member, TestEnvironment};
    use crate::storage::csv::MemberRepository;
    use crate::Backend;
    use shared::{CreateMemberRequest, CreateTreeRequest};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn person(name: &str, birthday: Option<NaiveDate>) -> CreateMemberRequest {
        CreateMemberRequest {
            full_name: name.to_string(),
            gender: None,
            birthday,
            address: None,
            is_adopted: false,
            relationship: None,
        }
    }

    /// A tree with a root (born 1950) and an unlinked second member (born 1952)
    fn setup() -> (Backend, TestEnvironment, String, MemberId, MemberId) {
        let env = TestEnvironment::new().unwrap();
        let backend = Backend::from_connection(env.connection.clone());
        let tree = backend
            .tree_service
            .create_tree(CreateTreeRequest { name: "Test".to_string() })
            .unwrap();
        let root = backend
            .member_service
            .create_root_member(&tree.id, person("Thomas", Some(date(1950, 1, 1))))
            .unwrap();
        let mut other = build_member(&tree.id, 99, "Martha");
        other.birthday = Some(date(1952, 5, 5));
        MemberRepository::new(env.connection.clone())
            .store_member(&other)
            .unwrap();
        (backend, env, tree.id, root.id, other.id)
    }

    #[test]
    fn test_link_spouses_and_divorce() {
        let (backend, _env, tree_id, a, b) = setup();
        let service = &backend.relationship_service;

        let rel = service
            .link_spouses(
                &tree_id,
                LinkSpousesRequest {
                    member1_id: a,
                    member2_id: b,
                    marriage_date: Some(date(1975, 6, 1)),
                },
            )
            .unwrap();
        assert!(rel.is_active());
        assert_eq!(service.relationships_for_member(&tree_id, b).unwrap().len(), 1);

        let divorced = service.record_divorce(&tree_id, rel.id, date(1980, 1, 1)).unwrap();
        assert_eq!(divorced.divorce_date, Some(date(1980, 1, 1)));
        assert!(service.record_divorce(&tree_id, rel.id, date(1981, 1, 1)).is_err());

        // Divorced couples may marry again
        assert!(service
            .link_spouses(
                &tree_id,
                LinkSpousesRequest {
                    member1_id: b,
                    member2_id: a,
                    marriage_date: None,
                },
            )
            .is_ok());
    }

    #[test]
    fn test_marriage_rules() {
        let (backend, _env, tree_id, a, b) = setup();
        let service = &backend.relationship_service;
        let link = |first, second, marriage_date| LinkSpousesRequest {
            member1_id: first,
            member2_id: second,
            marriage_date,
        };

        let err = service.link_spouses(&tree_id, link(a, a, None)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MemberValidationError>(),
            Some(&MemberValidationError::SelfRelationship)
        );

        // Martha is only 6 on this date
        let err = service
            .link_spouses(&tree_id, link(a, b, Some(date(1959, 1, 1))))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DateOrderingError>(),
            Some(DateOrderingError::MarriageTooEarly { min_years: 7, .. })
        ));

        service.link_spouses(&tree_id, link(a, b, None)).unwrap();
        let err = service.link_spouses(&tree_id, link(b, a, None)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MemberValidationError>(),
            Some(&MemberValidationError::AlreadyMarried(b, a))
        );

        let err = service.link_spouses(&tree_id, link(a, 404, None)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MemberValidationError>(),
            Some(&MemberValidationError::MemberNotFound(404))
        );
    }

    #[test]
    fn test_divorce_must_follow_marriage() {
        let (backend, _env, tree_id, a, b) = setup();
        let service = &backend.relationship_service;
        let rel = service
            .link_spouses(
                &tree_id,
                LinkSpousesRequest {
                    member1_id: a,
                    member2_id: b,
                    marriage_date: Some(date(1975, 6, 1)),
                },
            )
            .unwrap();

        let err = service.record_divorce(&tree_id, rel.id, date(1975, 6, 1)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DateOrderingError>(),
            Some(DateOrderingError::DivorceNotAfterMarriage { .. })
        ));

        let err = service.record_divorce(&tree_id, 404, date(1990, 1, 1)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MemberValidationError>(),
            Some(&MemberValidationError::RelationshipNotFound(404))
        );
    }
}
