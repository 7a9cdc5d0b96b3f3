//! Temporal ordering rules between birth, relationship, marriage, divorce,
//! passing, achievement and burial dates.
//!
//! Validation is stateless: the same inputs always produce the same result,
//! so the create and update paths share it unchanged.

use chrono::{Datelike, NaiveDate};
use shared::RelationshipType;

/// Minimum years between a spouse's birth and the marriage date
pub const DEFAULT_MIN_MARRIAGE_AGE_YEARS: u32 = 7;

/// A violated date ordering constraint. The message is shown to the user.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DateOrderingError {
    #[error("Relationship date {relationship_date} cannot be before the birth date {birth_date}")]
    RelationshipBeforeBirth {
        birth_date: NaiveDate,
        relationship_date: NaiveDate,
    },
    #[error("Marriage date {marriage_date} must be at least {min_years} years after the birth date {birth_date}")]
    MarriageTooEarly {
        birth_date: NaiveDate,
        marriage_date: NaiveDate,
        min_years: u32,
    },
    #[error("Date of passing {date_of_passing} must be after the birth date {birth_date}")]
    PassingNotAfterBirth {
        birth_date: NaiveDate,
        date_of_passing: NaiveDate,
    },
    #[error("Achievement date {achievement_date} must be after the birth date {birth_date}")]
    AchievementNotAfterBirth {
        birth_date: NaiveDate,
        achievement_date: NaiveDate,
    },
    #[error("Achievement date {achievement_date} must be before the date of passing {date_of_passing}")]
    AchievementNotBeforePassing {
        achievement_date: NaiveDate,
        date_of_passing: NaiveDate,
    },
    #[error("Divorce date {divorce_date} must be after the marriage date {marriage_date}")]
    DivorceNotAfterMarriage {
        marriage_date: NaiveDate,
        divorce_date: NaiveDate,
    },
    #[error("Burial start date {start_date} cannot be before the date of passing {date_of_passing}")]
    BurialBeforePassing {
        date_of_passing: NaiveDate,
        start_date: NaiveDate,
    },
    #[error("End date {end_date} cannot be before the start date {start_date}")]
    RangeEndBeforeStart {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

/// Date validation rules for member and life-event records
#[derive(Debug, Clone)]
pub struct DateValidationService {
    min_marriage_age_years: u32,
}

impl DateValidationService {
    pub fn new() -> Self {
        Self {
            min_marriage_age_years: DEFAULT_MIN_MARRIAGE_AGE_YEARS,
        }
    }

    pub fn with_min_marriage_age(min_marriage_age_years: u32) -> Self {
        Self { min_marriage_age_years }
    }

    pub fn min_marriage_age_years(&self) -> u32 {
        self.min_marriage_age_years
    }

    /// Check a relationship date against the birth date of one of its members.
    ///
    /// Parent links may not predate the child's birth. Spouse links must be at
    /// least the minimum marriage age after birth, computed on the year
    /// component so month and day carry over.
    pub fn validate_relationship_dates(
        &self,
        birth_date: NaiveDate,
        relationship_type: RelationshipType,
        relationship_date: NaiveDate,
    ) -> Result<(), DateOrderingError> {
        match relationship_type {
            RelationshipType::None => Ok(()),
            RelationshipType::Parent => {
                if relationship_date < birth_date {
                    Err(DateOrderingError::RelationshipBeforeBirth {
                        birth_date,
                        relationship_date,
                    })
                } else {
                    Ok(())
                }
            }
            RelationshipType::Spouse => {
                let earliest = add_years(birth_date, self.min_marriage_age_years);
                if relationship_date < earliest {
                    Err(DateOrderingError::MarriageTooEarly {
                        birth_date,
                        marriage_date: relationship_date,
                        min_years: self.min_marriage_age_years,
                    })
                } else {
                    Ok(())
                }
            }
        }
    }

    pub fn validate_passing_date(
        &self,
        birth_date: NaiveDate,
        date_of_passing: NaiveDate,
    ) -> Result<(), DateOrderingError> {
        if date_of_passing <= birth_date {
            return Err(DateOrderingError::PassingNotAfterBirth {
                birth_date,
                date_of_passing,
            });
        }
        Ok(())
    }

    /// Achievements fall strictly between birth and passing. Either bound may
    /// be unknown.
    pub fn validate_achievement_date(
        &self,
        birth_date: Option<NaiveDate>,
        achievement_date: NaiveDate,
        date_of_passing: Option<NaiveDate>,
    ) -> Result<(), DateOrderingError> {
        if let Some(birth_date) = birth_date {
            if achievement_date <= birth_date {
                return Err(DateOrderingError::AchievementNotAfterBirth {
                    birth_date,
                    achievement_date,
                });
            }
        }
        if let Some(date_of_passing) = date_of_passing {
            if achievement_date >= date_of_passing {
                return Err(DateOrderingError::AchievementNotBeforePassing {
                    achievement_date,
                    date_of_passing,
                });
            }
        }
        Ok(())
    }

    pub fn validate_divorce_date(
        &self,
        marriage_date: NaiveDate,
        divorce_date: NaiveDate,
    ) -> Result<(), DateOrderingError> {
        if divorce_date <= marriage_date {
            return Err(DateOrderingError::DivorceNotAfterMarriage {
                marriage_date,
                divorce_date,
            });
        }
        Ok(())
    }

    pub fn validate_burial_start(
        &self,
        date_of_passing: NaiveDate,
        start_date: NaiveDate,
    ) -> Result<(), DateOrderingError> {
        if start_date < date_of_passing {
            return Err(DateOrderingError::BurialBeforePassing {
                date_of_passing,
                start_date,
            });
        }
        Ok(())
    }

    /// Closed ranges must not end before they start; open ranges always pass
    pub fn validate_date_range(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<(), DateOrderingError> {
        match (start_date, end_date) {
            (Some(start_date), Some(end_date)) if end_date < start_date => {
                Err(DateOrderingError::RangeEndBeforeStart { start_date, end_date })
            }
            _ => Ok(()),
        }
    }
}

impl Default for DateValidationService {
    fn default() -> Self {
        Self::new()
    }
}

/// Add whole years to the year component. February 29th rolls forward to
/// March 1st when the target year is not a leap year.
fn add_years(date: NaiveDate, years: u32) -> NaiveDate {
    let years = i32::try_from(years).unwrap_or(i32::MAX);
    let target_year = date.year().saturating_add(years);
    date.with_year(target_year)
        .or_else(|| NaiveDate::from_ymd_opt(target_year, 3, 1))
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_spouse_requires_minimum_age() {
        let service = DateValidationService::new();
        let birth = date(2000, 1, 1);

        let result = service.validate_relationship_dates(birth, RelationshipType::Spouse, date(2006, 12, 31));
        assert!(matches!(result, Err(DateOrderingError::MarriageTooEarly { min_years: 7, .. })));

        assert!(service
            .validate_relationship_dates(birth, RelationshipType::Spouse, date(2007, 1, 1))
            .is_ok());
        assert!(service
            .validate_relationship_dates(birth, RelationshipType::Spouse, date(2030, 5, 5))
            .is_ok());
    }

    #[test]
    fn test_huge_minimum_age_rejects_every_marriage() {
        let birth = date(2000, 1, 1);
        for min_years in [u32::MAX, i32::MAX as u32 + 1, 1_000_000] {
            let service = DateValidationService::with_min_marriage_age(min_years);
            let result = service.validate_relationship_dates(birth, RelationshipType::Spouse, date(2090, 1, 1));
            assert_eq!(
                result,
                Err(DateOrderingError::MarriageTooEarly {
                    birth_date: birth,
                    marriage_date: date(2090, 1, 1),
                    min_years,
                })
            );
        }
    }

    #[test]
    fn test_parent_relationship_not_before_birth() {
        let service = DateValidationService::new();
        let birth = date(2010, 6, 15);

        let result = service.validate_relationship_dates(birth, RelationshipType::Parent, date(2010, 6, 14));
        assert_eq!(
            result,
            Err(DateOrderingError::RelationshipBeforeBirth {
                birth_date: birth,
                relationship_date: date(2010, 6, 14),
            })
        );
        assert!(service
            .validate_relationship_dates(birth, RelationshipType::Parent, date(2010, 6, 15))
            .is_ok());
        assert!(service
            .validate_relationship_dates(birth, RelationshipType::Parent, date(2012, 1, 1))
            .is_ok());
    }

    #[test]
    fn test_root_relationship_always_valid() {
        let service = DateValidationService::new();
        assert!(service
            .validate_relationship_dates(date(2000, 1, 1), RelationshipType::None, date(1900, 1, 1))
            .is_ok());
    }

    #[test]
    fn test_validation_is_repeatable() {
        let service = DateValidationService::new();
        let first = service.validate_relationship_dates(date(2000, 3, 3), RelationshipType::Spouse, date(2007, 3, 2));
        let second = service.validate_relationship_dates(date(2000, 3, 3), RelationshipType::Spouse, date(2007, 3, 2));
        assert_eq!(first, second);
        assert!(first.is_err());
    }

    #[test]
    fn test_leap_day_birth_rolls_forward() {
        let service = DateValidationService::new();
        let birth = date(2000, 2, 29);

        assert!(service
            .validate_relationship_dates(birth, RelationshipType::Spouse, date(2007, 2, 28))
            .is_err());
        assert!(service
            .validate_relationship_dates(birth, RelationshipType::Spouse, date(2007, 3, 1))
            .is_ok());
    }

    #[test]
    fn test_custom_marriage_age() {
        let service = DateValidationService::with_min_marriage_age(16);
        assert_eq!(service.min_marriage_age_years(), 16);
        assert!(service
            .validate_relationship_dates(date(2000, 1, 1), RelationshipType::Spouse, date(2010, 1, 1))
            .is_err());
    }

    #[test]
    fn test_passing_strictly_after_birth() {
        let service = DateValidationService::new();
        let birth = date(1950, 1, 1);
        assert!(service.validate_passing_date(birth, birth).is_err());
        assert!(service.validate_passing_date(birth, date(1949, 12, 31)).is_err());
        assert!(service.validate_passing_date(birth, date(1950, 1, 2)).is_ok());
    }

    #[test]
    fn test_achievement_between_birth_and_passing() {
        let service = DateValidationService::new();
        let birth = Some(date(1950, 1, 1));
        let passing = Some(date(2000, 1, 1));

        assert!(service.validate_achievement_date(birth, date(1975, 1, 1), passing).is_ok());
        assert!(matches!(
            service.validate_achievement_date(birth, date(1950, 1, 1), passing),
            Err(DateOrderingError::AchievementNotAfterBirth { .. })
        ));
        assert!(matches!(
            service.validate_achievement_date(birth, date(2000, 1, 1), passing),
            Err(DateOrderingError::AchievementNotBeforePassing { .. })
        ));
        assert!(service.validate_achievement_date(None, date(1800, 1, 1), None).is_ok());
    }

    #[test]
    fn test_divorce_strictly_after_marriage() {
        let service = DateValidationService::new();
        let marriage = date(1980, 6, 1);
        assert!(service.validate_divorce_date(marriage, marriage).is_err());
        assert!(service.validate_divorce_date(marriage, date(1990, 1, 1)).is_ok());
    }

    #[test]
    fn test_burial_on_or_after_passing() {
        let service = DateValidationService::new();
        let passing = date(2001, 9, 1);
        assert!(service.validate_burial_start(passing, passing).is_ok());
        assert!(service.validate_burial_start(passing, date(2001, 8, 31)).is_err());
    }

    #[test]
    fn test_date_ranges() {
        let service = DateValidationService::new();
        assert!(service.validate_date_range(Some(date(2000, 1, 1)), Some(date(1999, 1, 1))).is_err());
        assert!(service.validate_date_range(Some(date(2000, 1, 1)), Some(date(2000, 1, 1))).is_ok());
        assert!(service.validate_date_range(None, Some(date(1999, 1, 1))).is_ok());
        assert!(service.validate_date_range(Some(date(2000, 1, 1)), None).is_ok());
    }

    #[test]
    fn test_error_messages_name_the_constraint() {
        let error = DateOrderingError::DivorceNotAfterMarriage {
            marriage_date: date(1980, 6, 1),
            divorce_date: date(1979, 1, 1),
        };
        assert_eq!(
            error.to_string(),
            "Divorce date 1979-01-01 must be after the marriage date 1980-06-01"
        );
    }
}
