//! # Member Service
//!
//! Lifecycle of the people in a tree. Every member other than the root joins
//! the tree through a parent or spouse link to an existing member, which
//! determines its generation. Date rules are checked before anything is
//! written.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use log::{debug, info, warn};
use shared::{
    CreateMemberRequest, FamilyTreeConfig, MemberId, RelationshipLink, RelationshipType, UpdateMemberRequest,
};
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::date_validation::DateValidationService;
use crate::domain::generation::{encode_generation, infer_generation, infer_generation_for};
use crate::domain::models::member::{FamilyMember, MemberValidationError};
use crate::domain::relationship_service::RelationshipService;
use crate::storage::{GlobalConfigStorage, LifeEventStorage, MemberStorage, TreeStorage};

/// Service for creating, editing and removing tree members
#[derive(Clone)]
pub struct MemberService {
    tree_storage: Arc<dyn TreeStorage>,
    member_storage: Arc<dyn MemberStorage>,
    life_event_storage: Arc<dyn LifeEventStorage>,
    config_storage: Arc<dyn GlobalConfigStorage>,
    relationship_service: RelationshipService,
}

impl MemberService {
    pub fn new(
        tree_storage: Arc<dyn TreeStorage>,
        member_storage: Arc<dyn MemberStorage>,
        life_event_storage: Arc<dyn LifeEventStorage>,
        config_storage: Arc<dyn GlobalConfigStorage>,
        relationship_service: RelationshipService,
    ) -> Self {
        Self {
            tree_storage,
            member_storage,
            life_event_storage,
            config_storage,
            relationship_service,
        }
    }

    /// Create a member, as the root when the request carries no link
    pub fn create_member(&self, tree_id: &str, request: CreateMemberRequest) -> Result<FamilyMember> {
        let is_linked = request
            .relationship
            .as_ref()
            .is_some_and(|link| link.relationship_type != RelationshipType::None);
        if is_linked {
            self.create_related_member(tree_id, request)
        } else {
            self.create_root_member(tree_id, request)
        }
    }

    /// Create the member a tree grows from. A tree has at most one.
    pub fn create_root_member(&self, tree_id: &str, request: CreateMemberRequest) -> Result<FamilyMember> {
        info!("Creating root member {} in tree {}", request.full_name, tree_id);
        self.require_tree(tree_id)?;
        let config = self.config_storage.get_tree_config()?;
        let full_name = validate_full_name(&request.full_name, config.max_name_length)?;

        if self
            .member_storage
            .list_members(tree_id)?
            .iter()
            .any(|m| m.is_root_person)
        {
            return Err(MemberValidationError::RootAlreadyExists(tree_id.to_string()).into());
        }

        let generation = infer_generation(RelationshipType::None, None, config.root_generation_baseline);
        let now = Utc::now();
        let member = FamilyMember {
            id: self.config_storage.next_member_id()?,
            tree_id: tree_id.to_string(),
            full_name,
            gender: request.gender,
            birthday: request.birthday,
            address: normalize_address(request.address),
            generation: Some(encode_generation(generation)),
            is_root_person: true,
            is_adopted: false,
            parent_id: None,
            parent_relationship_date: None,
            created_at: now,
            updated_at: now,
        };
        self.member_storage.store_member(&member)?;

        info!("Created root member {} with ID: {}", member.full_name, member.id);
        Ok(member)
    }

    /// Create a member linked as child or spouse of an existing member
    pub fn create_related_member(&self, tree_id: &str, request: CreateMemberRequest) -> Result<FamilyMember> {
        let link = match request.relationship.clone() {
            Some(link) if link.relationship_type != RelationshipType::None => link,
            _ => return Err(MemberValidationError::MissingRelationshipType.into()),
        };
        info!(
            "Creating member {} as {} of {} in tree {}",
            request.full_name, link.relationship_type, link.related_member_id, tree_id
        );

        self.require_tree(tree_id)?;
        let config = self.config_storage.get_tree_config()?;
        let validator = date_validator(&config);
        let full_name = validate_full_name(&request.full_name, config.max_name_length)?;
        let related = self.require_related(tree_id, link.related_member_id)?;

        match link.relationship_type {
            RelationshipType::Parent => {
                if let (Some(birthday), Some(date)) = (request.birthday, link.relationship_date) {
                    validator.validate_relationship_dates(birthday, RelationshipType::Parent, date)?;
                }
            }
            RelationshipType::Spouse => {
                self.relationship_service.validate_marriage_dates(
                    request.birthday,
                    related.birthday,
                    link.relationship_date,
                )?;
            }
            RelationshipType::None => {}
        }

        let generation = infer_generation_for(
            link.relationship_type,
            Some(&related),
            config.root_generation_baseline,
        );
        let is_parent_link = link.relationship_type == RelationshipType::Parent;
        let member_id = self.config_storage.next_member_id()?;
        let marriage = if link.relationship_type == RelationshipType::Spouse {
            Some(self.relationship_service.prepare_marriage(
                tree_id,
                related.id,
                member_id,
                link.relationship_date,
            )?)
        } else {
            None
        };
        let now = Utc::now();
        let member = FamilyMember {
            id: member_id,
            tree_id: tree_id.to_string(),
            full_name,
            gender: request.gender,
            birthday: request.birthday,
            address: normalize_address(request.address),
            generation: Some(encode_generation(generation)),
            is_root_person: false,
            is_adopted: is_parent_link && request.is_adopted,
            parent_id: is_parent_link.then_some(related.id),
            parent_relationship_date: if is_parent_link { link.relationship_date } else { None },
            created_at: now,
            updated_at: now,
        };
        self.member_storage.store_member(&member)?;

        if let Some(marriage) = &marriage {
            if let Err(e) = self.relationship_service.save_marriage(marriage) {
                warn!("Removing member {} after its spouse link failed: {}", member.id, e);
                self.member_storage.delete_member(tree_id, member.id)?;
                return Err(e);
            }
        }

        info!("Created member {} with ID: {}", member.full_name, member.id);
        Ok(member)
    }

    pub fn get_member(&self, tree_id: &str, member_id: MemberId) -> Result<Option<FamilyMember>> {
        let member = self.member_storage.get_member(tree_id, member_id)?;
        if member.is_none() {
            warn!("Member not found: {} in tree {}", member_id, tree_id);
        }
        Ok(member)
    }

    pub fn list_members(&self, tree_id: &str) -> Result<Vec<FamilyMember>> {
        let members = self.member_storage.list_members(tree_id)?;
        debug!("Found {} members in tree {}", members.len(), tree_id);
        Ok(members)
    }

    /// Edit a member. A relationship in the request relinks the member and
    /// recomputes its generation from the new relative.
    pub fn update_member(
        &self,
        tree_id: &str,
        member_id: MemberId,
        request: UpdateMemberRequest,
    ) -> Result<FamilyMember> {
        info!("Updating member {} in tree {}", member_id, tree_id);

        let config = self.config_storage.get_tree_config()?;
        let mut member = self
            .member_storage
            .get_member(tree_id, member_id)?
            .ok_or(MemberValidationError::MemberNotFound(member_id))?;
        let previous = member.clone();

        if let Some(full_name) = &request.full_name {
            member.full_name = validate_full_name(full_name, config.max_name_length)?;
        }
        if let Some(gender) = request.gender {
            member.gender = Some(gender);
        }
        if let Some(birthday) = request.birthday {
            member.birthday = Some(birthday);
        }
        if request.address.is_some() {
            member.address = normalize_address(request.address.clone());
        }
        let new_spouse = match &request.relationship {
            Some(link) => self.relink(tree_id, &mut member, link, &config)?,
            None => None,
        };
        if let Some(is_adopted) = request.is_adopted {
            member.is_adopted = is_adopted;
        }
        if member.parent_id.is_none() {
            member.is_adopted = false;
        }
        if request.birthday.is_some() || request.relationship.is_some() {
            self.revalidate_dates(tree_id, &member, &date_validator(&config))?;
        }

        let marriage = match new_spouse {
            Some((spouse_id, marriage_date)) => Some(self.relationship_service.prepare_marriage(
                tree_id,
                spouse_id,
                member.id,
                marriage_date,
            )?),
            None => None,
        };

        member.updated_at = Utc::now();
        self.member_storage.update_member(&member)?;
        if let Some(marriage) = &marriage {
            if let Err(e) = self.relationship_service.save_marriage(marriage) {
                warn!("Restoring member {} after its spouse link failed: {}", member.id, e);
                self.member_storage.update_member(&previous)?;
                return Err(e);
            }
        }

        info!("Updated member {} with ID: {}", member.full_name, member.id);
        Ok(member)
    }

    /// Remove a member together with its spouse relationships and life
    /// events. Children of the member stay in the tree without a parent.
    /// Returns the ids of those children.
    pub fn delete_member(&self, tree_id: &str, member_id: MemberId) -> Result<Vec<MemberId>> {
        info!("Deleting member {} from tree {}", member_id, tree_id);

        let member = self
            .member_storage
            .get_member(tree_id, member_id)?
            .ok_or(MemberValidationError::MemberNotFound(member_id))?;
        if member.is_root_person {
            return Err(MemberValidationError::CannotDeleteRoot(member_id).into());
        }

        self.relationship_service
            .remove_member_relationships(tree_id, member_id)?;
        self.life_event_storage.delete_life_events(tree_id, member_id)?;

        let mut orphaned = Vec::new();
        for mut child in self.member_storage.list_members(tree_id)? {
            if child.parent_id != Some(member_id) {
                continue;
            }
            warn!(
                "Member {} loses its parent link to deleted member {}",
                child.id, member_id
            );
            child.parent_id = None;
            child.parent_relationship_date = None;
            child.is_adopted = false;
            child.updated_at = Utc::now();
            self.member_storage.update_member(&child)?;
            orphaned.push(child.id);
        }

        self.member_storage.delete_member(tree_id, member_id)?;
        info!("Deleted member {} ({})", member.full_name, member_id);
        Ok(orphaned)
    }

    /// Apply a new parent or spouse link to `member`. A spouse link is
    /// returned so it can be stored once the member update succeeded.
    fn relink(
        &self,
        tree_id: &str,
        member: &mut FamilyMember,
        link: &RelationshipLink,
        config: &FamilyTreeConfig,
    ) -> Result<Option<(MemberId, Option<NaiveDate>)>> {
        if link.relationship_type == RelationshipType::None {
            return Err(MemberValidationError::MissingRelationshipType.into());
        }
        if link.related_member_id == member.id {
            return Err(MemberValidationError::SelfRelationship.into());
        }
        let related = self.require_related(tree_id, link.related_member_id)?;

        let new_spouse = match link.relationship_type {
            RelationshipType::Parent => {
                if member.is_root_person {
                    return Err(MemberValidationError::RootCannotHaveParent(member.id).into());
                }
                self.ensure_not_descendant(tree_id, member.id, related.id)?;
                member.parent_id = Some(related.id);
                member.parent_relationship_date = link.relationship_date;
                None
            }
            RelationshipType::Spouse => {
                self.relationship_service
                    .validate_marriage(tree_id, member, &related, link.relationship_date)?;
                Some((related.id, link.relationship_date))
            }
            RelationshipType::None => None,
        };

        let generation = infer_generation_for(
            link.relationship_type,
            Some(&related),
            config.root_generation_baseline,
        );
        member.generation = Some(encode_generation(generation));
        Ok(new_spouse)
    }

    /// Fail when `ancestor_id` would become a parent of one of its own
    /// ancestors
    fn ensure_not_descendant(&self, tree_id: &str, ancestor_id: MemberId, candidate_id: MemberId) -> Result<()> {
        let members = self.member_storage.list_members(tree_id)?;
        let mut visited = HashSet::new();
        let mut current = Some(candidate_id);
        while let Some(id) = current {
            if id == ancestor_id {
                return Err(MemberValidationError::ParentCycle(ancestor_id).into());
            }
            if !visited.insert(id) {
                break;
            }
            current = members.iter().find(|m| m.id == id).and_then(|m| m.parent_id);
        }
        Ok(())
    }

    /// Check every stored date that depends on the member's birthday
    fn revalidate_dates(
        &self,
        tree_id: &str,
        member: &FamilyMember,
        validator: &DateValidationService,
    ) -> Result<()> {
        let Some(birthday) = member.birthday else {
            return Ok(());
        };

        if let Some(date) = member.parent_relationship_date {
            validator.validate_relationship_dates(birthday, RelationshipType::Parent, date)?;
        }
        for relationship in self.relationship_service.relationships_for_member(tree_id, member.id)? {
            if let Some(marriage_date) = relationship.marriage_date {
                validator.validate_relationship_dates(birthday, RelationshipType::Spouse, marriage_date)?;
            }
        }
        if let Some(events) = self.life_event_storage.get_life_events(tree_id, member.id)? {
            if let Some(passing) = events.date_of_passing() {
                validator.validate_passing_date(birthday, passing)?;
            }
            for achievement in &events.achievements {
                validator.validate_achievement_date(
                    Some(birthday),
                    achievement.achievement_date,
                    events.date_of_passing(),
                )?;
            }
        }
        Ok(())
    }

    fn require_tree(&self, tree_id: &str) -> Result<()> {
        if self.tree_storage.get_tree(tree_id)?.is_none() {
            return Err(MemberValidationError::TreeNotFound(tree_id.to_string()).into());
        }
        Ok(())
    }

    fn require_related(&self, tree_id: &str, member_id: MemberId) -> Result<FamilyMember> {
        self.member_storage
            .get_member(tree_id, member_id)?
            .ok_or_else(|| MemberValidationError::RelatedMemberNotFound(member_id).into())
    }
}

/// Trim a full name and check it is present and not longer than `max_length`
/// characters
pub fn validate_full_name(full_name: &str, max_length: usize) -> Result<String, MemberValidationError> {
    let trimmed = full_name.trim();
    if trimmed.is_empty() {
        return Err(MemberValidationError::EmptyName);
    }
    if trimmed.chars().count() > max_length {
        return Err(MemberValidationError::NameTooLong(max_length));
    }
    Ok(trimmed.to_string())
}

fn normalize_address(address: Option<String>) -> Option<String> {
    address
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
}

fn date_validator(config: &FamilyTreeConfig) -> DateValidationService {
    DateValidationService::with_min_marriage_age(config.min_marriage_age_years)
}
