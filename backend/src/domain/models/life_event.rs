//! Dependent records owned by exactly one member. The relationship graph only
//! needs to tolerate their presence; their date rules live in
//! `date_validation`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{AchievementSummary, MemberId, PassingRecordSummary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurialPlace {
    pub location: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassingRecord {
    pub date_of_passing: NaiveDate,
    pub causes_of_death: Vec<String>,
    pub burial_places: Vec<BurialPlace>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub title: String,
    pub description: Option<String>,
    pub achievement_date: NaiveDate,
}

/// Occupation or place of origin held over a date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedEntry {
    pub label: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Everything recorded about a member's life besides the member row itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeEvents {
    pub member_id: MemberId,
    #[serde(default)]
    pub passing_record: Option<PassingRecord>,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    #[serde(default)]
    pub occupations: Vec<DatedEntry>,
    #[serde(default)]
    pub places_of_origin: Vec<DatedEntry>,
}

impl LifeEvents {
    pub fn empty(member_id: MemberId) -> Self {
        Self {
            member_id,
            passing_record: None,
            achievements: Vec::new(),
            occupations: Vec::new(),
            places_of_origin: Vec::new(),
        }
    }

    pub fn date_of_passing(&self) -> Option<NaiveDate> {
        self.passing_record.as_ref().map(|p| p.date_of_passing)
    }

    pub fn passing_summaries(&self) -> Vec<PassingRecordSummary> {
        self.passing_record
            .iter()
            .map(|p| PassingRecordSummary {
                date_of_passing: p.date_of_passing,
                causes_of_death: p.causes_of_death.clone(),
            })
            .collect()
    }

    pub fn achievement_summaries(&self) -> Vec<AchievementSummary> {
        self.achievements
            .iter()
            .map(|a| AchievementSummary {
                title: a.title.clone(),
                achievement_date: a.achievement_date,
            })
            .collect()
    }
}
