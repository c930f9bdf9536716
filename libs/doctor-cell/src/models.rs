use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// WEEKLY AVAILABILITY
// ==============================================================================

/// Day of the week a doctor holds consultations on.
///
/// Serialized as the full English day name ("Monday"), matching the
/// `availability` column. The mapping from calendar dates is pinned here so
/// it can never drift with locale or platform formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

// ==============================================================================
// DOCTOR ROSTER MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    pub gender: Gender,
    pub location: String,
    pub availability: Vec<Weekday>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub specialization: String,
    pub gender: Gender,
    pub location: String,
    pub availability: Vec<Weekday>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub gender: Option<Gender>,
    pub location: Option<String>,
    pub availability: Option<Vec<Weekday>>,
}

impl UpdateDoctorRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.specialization.is_none()
            && self.gender.is_none()
            && self.location.is_none()
            && self.availability.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorSearchQuery {
    pub specialization: Option<String>,
    pub location: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_serializes_as_full_day_name() {
        assert_eq!(
            serde_json::to_string(&Weekday::Wednesday).unwrap(),
            "\"Wednesday\""
        );
        let parsed: Weekday = serde_json::from_str("\"Sunday\"").unwrap();
        assert_eq!(parsed, Weekday::Sunday);
    }

    #[test]
    fn weekday_rejects_names_outside_the_seven_days() {
        assert!(serde_json::from_str::<Weekday>("\"Funday\"").is_err());
        assert!(serde_json::from_str::<Weekday>("\"monday\"").is_err());
    }

    #[test]
    fn weekday_from_date_is_pinned_to_the_calendar() {
        // 2024-06-03 was a Monday.
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(Weekday::from_date(monday), Weekday::Monday);
        assert_eq!(
            Weekday::from_date(monday.succ_opt().unwrap()),
            Weekday::Tuesday
        );
    }
}
