use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// TIME SLOTS
// ==============================================================================

/// The bookable grid: half-hour slots from 09:00 through 17:30 with a
/// 13:00-13:59 lunch gap. Conflict detection relies on appointments only
/// ever landing on this grid, so exact (date, time) equality is enough.
pub fn is_recognized_slot(time: NaiveTime) -> bool {
    if time.second() != 0 || time.nanosecond() != 0 {
        return false;
    }
    let morning = (9..=12).contains(&time.hour());
    let afternoon = (14..=17).contains(&time.hour());
    (morning || afternoon) && matches!(time.minute(), 0 | 30)
}

/// Slot times travel as "HH:MM" from the dashboard and "HH:MM:SS" from
/// PostgREST; both are accepted, and we always write "HH:MM:SS".
pub mod slot_time {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const WRITE_FORMAT: &str = "%H:%M:%S";

    pub fn parse(value: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(value, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
    }

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(WRITE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        parse(&value).map_err(serde::de::Error::custom)
    }
}

pub mod slot_time_opt {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => super::slot_time::serialize(t, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        value
            .map(|v| super::slot_time::parse(&v).map_err(serde::de::Error::custom))
            .transpose()
    }
}

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub appointment_date: NaiveDate,
    #[serde(with = "slot_time")]
    pub appointment_time: NaiveTime,
    pub doctor_id: Uuid,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Booked,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Cancelled bookings release their slot; the other two hold it.
    pub fn blocks_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Booked => write!(f, "booked"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub appointment_date: NaiveDate,
    #[serde(with = "slot_time")]
    pub appointment_time: NaiveTime,
    pub doctor_id: Uuid,
}

/// Partial update: absent fields keep their stored values. Supplying any of
/// the scheduling fields (date, time, doctor) makes this a reschedule and
/// re-runs availability and conflict checks against the merged values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: Option<AppointmentStatus>,
    pub appointment_date: Option<NaiveDate>,
    #[serde(default, with = "slot_time_opt")]
    pub appointment_time: Option<NaiveTime>,
    pub doctor_id: Option<Uuid>,
}

impl UpdateAppointmentRequest {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.appointment_date.is_none()
            && self.appointment_time.is_none()
            && self.doctor_id.is_none()
    }

    pub fn is_reschedule(&self) -> bool {
        self.appointment_date.is_some()
            || self.appointment_time.is_some()
            || self.doctor_id.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentSearchQuery {
    pub date: Option<NaiveDate>,
    pub doctor_id: Option<Uuid>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("{doctor_name} is not available on {weekday}")]
    DoctorUnavailableOnDay {
        doctor_name: String,
        weekday: &'static str,
    },

    #[error("Doctor is not available at the selected date and time")]
    SlotTaken,

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn recognizes_the_sixteen_half_hour_slots() {
        let expected = [
            (9, 0),
            (9, 30),
            (10, 0),
            (10, 30),
            (11, 0),
            (11, 30),
            (12, 0),
            (12, 30),
            (14, 0),
            (14, 30),
            (15, 0),
            (15, 30),
            (16, 0),
            (16, 30),
            (17, 0),
            (17, 30),
        ];
        for (h, m) in expected {
            assert!(is_recognized_slot(time(h, m)), "{:02}:{:02}", h, m);
        }
    }

    #[test]
    fn rejects_lunch_hour_and_off_grid_times() {
        assert!(!is_recognized_slot(time(13, 0)));
        assert!(!is_recognized_slot(time(13, 30)));
        assert!(!is_recognized_slot(time(8, 30)));
        assert!(!is_recognized_slot(time(18, 0)));
        assert!(!is_recognized_slot(time(10, 15)));
        assert!(!is_recognized_slot(NaiveTime::from_hms_opt(10, 0, 30).unwrap()));
    }

    #[test]
    fn slot_time_accepts_both_wire_formats() {
        assert_eq!(slot_time::parse("09:00").unwrap(), time(9, 0));
        assert_eq!(slot_time::parse("09:00:00").unwrap(), time(9, 0));
        assert!(slot_time::parse("9am").is_err());
    }

    #[test]
    fn appointment_time_round_trips_as_postgres_time() {
        let request: BookAppointmentRequest = serde_json::from_value(serde_json::json!({
            "patient_name": "Jo Smith",
            "patient_phone": "555-0100",
            "appointment_date": "2024-06-03",
            "appointment_time": "10:30",
            "doctor_id": Uuid::new_v4(),
        }))
        .unwrap();

        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded["appointment_time"], "10:30:00");
    }

    #[test]
    fn cancelled_status_releases_the_slot() {
        assert!(AppointmentStatus::Booked.blocks_slot());
        assert!(AppointmentStatus::Completed.blocks_slot());
        assert!(!AppointmentStatus::Cancelled.blocks_slot());
    }
}
