//! # Life Event Service
//!
//! Passing records, achievements, occupations and places of origin. Every
//! date is checked against the member's birth and passing dates.

use anyhow::{bail, Result};
use log::info;
use shared::{AddAchievementRequest, AddDatedEntryRequest, DateRange, MemberId, RecordPassingRequest};
use std::sync::Arc;

use crate::domain::date_validation::DateValidationService;
use crate::domain::models::life_event::{Achievement, BurialPlace, DatedEntry, LifeEvents, PassingRecord};
use crate::domain::models::member::{FamilyMember, MemberValidationError};
use crate::storage::{LifeEventStorage, MemberStorage};

/// Which dated list an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DatedKind {
    Occupation,
    PlaceOfOrigin,
}

/// Service for recording what happened during a member's life
#[derive(Clone)]
pub struct LifeEventService {
    member_storage: Arc<dyn MemberStorage>,
    life_event_storage: Arc<dyn LifeEventStorage>,
    date_validator: DateValidationService,
}

impl LifeEventService {
    pub fn new(member_storage: Arc<dyn MemberStorage>, life_event_storage: Arc<dyn LifeEventStorage>) -> Self {
        Self {
            member_storage,
            life_event_storage,
            date_validator: DateValidationService::new(),
        }
    }

    /// Life events of a member, empty when nothing was recorded
    pub fn get_life_events(&self, tree_id: &str, member_id: MemberId) -> Result<LifeEvents> {
        Ok(self
            .life_event_storage
            .get_life_events(tree_id, member_id)?
            .unwrap_or_else(|| LifeEvents::empty(member_id)))
    }

    /// Record (or replace) the passing of a member
    pub fn record_passing(
        &self,
        tree_id: &str,
        member_id: MemberId,
        request: RecordPassingRequest,
    ) -> Result<LifeEvents> {
        info!("Recording passing of member {} on {}", member_id, request.date_of_passing);

        let member = self.require_member(tree_id, member_id)?;
        let mut events = self.get_life_events(tree_id, member_id)?;
        let date_of_passing = request.date_of_passing;

        if let Some(birthday) = member.birthday {
            self.date_validator.validate_passing_date(birthday, date_of_passing)?;
        }
        for achievement in &events.achievements {
            self.date_validator.validate_achievement_date(
                member.birthday,
                achievement.achievement_date,
                Some(date_of_passing),
            )?;
        }

        let mut burial_places = Vec::with_capacity(request.burial_places.len());
        for place in request.burial_places {
            let location = required_text(&place.location, "Burial location")?;
            self.validate_range(&place.range)?;
            if let Some(start_date) = place.range.start_date {
                self.date_validator.validate_burial_start(date_of_passing, start_date)?;
            }
            burial_places.push(BurialPlace {
                location,
                start_date: place.range.start_date,
                end_date: place.range.end_date,
            });
        }

        events.passing_record = Some(PassingRecord {
            date_of_passing,
            causes_of_death: request
                .causes_of_death
                .iter()
                .map(|cause| cause.trim().to_string())
                .filter(|cause| !cause.is_empty())
                .collect(),
            burial_places,
        });
        self.life_event_storage.store_life_events(tree_id, &events)?;
        Ok(events)
    }

    pub fn add_achievement(
        &self,
        tree_id: &str,
        member_id: MemberId,
        request: AddAchievementRequest,
    ) -> Result<LifeEvents> {
        let member = self.require_member(tree_id, member_id)?;
        let mut events = self.get_life_events(tree_id, member_id)?;
        let title = required_text(&request.title, "Achievement title")?;

        self.date_validator.validate_achievement_date(
            member.birthday,
            request.achievement_date,
            events.date_of_passing(),
        )?;

        events.achievements.push(Achievement {
            title,
            description: request
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            achievement_date: request.achievement_date,
        });
        events.achievements.sort_by_key(|a| a.achievement_date);
        self.life_event_storage.store_life_events(tree_id, &events)?;
        info!("Added achievement to member {}", member_id);
        Ok(events)
    }

    pub fn add_occupation(&self, tree_id: &str, member_id: MemberId, request: AddDatedEntryRequest) -> Result<LifeEvents> {
        self.add_dated_entry(tree_id, member_id, request, DatedKind::Occupation)
    }

    pub fn add_place_of_origin(
        &self,
        tree_id: &str,
        member_id: MemberId,
        request: AddDatedEntryRequest,
    ) -> Result<LifeEvents> {
        self.add_dated_entry(tree_id, member_id, request, DatedKind::PlaceOfOrigin)
    }

    fn add_dated_entry(
        &self,
        tree_id: &str,
        member_id: MemberId,
        request: AddDatedEntryRequest,
        kind: DatedKind,
    ) -> Result<LifeEvents> {
        self.require_member(tree_id, member_id)?;
        let mut events = self.get_life_events(tree_id, member_id)?;
        let label = required_text(&request.label, "Label")?;
        self.validate_range(&request.range)?;

        let entry = DatedEntry {
            label,
            start_date: request.range.start_date,
            end_date: request.range.end_date,
        };
        match kind {
            DatedKind::Occupation => events.occupations.push(entry),
            DatedKind::PlaceOfOrigin => events.places_of_origin.push(entry),
        }
        self.life_event_storage.store_life_events(tree_id, &events)?;
        info!("Added {:?} entry to member {}", kind, member_id);
        Ok(events)
    }

    fn validate_range(&self, range: &DateRange) -> Result<()> {
        self.date_validator
            .validate_date_range(range.start_date, range.end_date)?;
        Ok(())
    }

    fn require_member(&self, tree_id: &str, member_id: MemberId) -> Result<FamilyMember> {
        self.member_storage
            .get_member(tree_id, member_id)?
            .ok_or_else(|| MemberValidationError::MemberNotFound(member_id).into())
    }
}

fn required_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{} cannot be empty", field);
    }
    Ok(trimmed.to_string())
}
