use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{slot_time, AppointmentError};

/// Detects double bookings by exact (doctor, date, time) equality.
///
/// Slots come from a fixed half-hour grid, so an indexed equality lookup is
/// all that is needed; there is no interval overlap to compute. Cancelled
/// appointments do not hold their slot.
pub struct ConflictService {
    supabase: Arc<SupabaseClient>,
}

impl ConflictService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Returns true when another active appointment already occupies the
    /// slot. `exclude_appointment_id` keeps a reschedule from colliding
    /// with the booking being moved.
    pub async fn slot_is_taken(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        exclude_appointment_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<bool, AppointmentError> {
        debug!(
            "Checking conflicts for doctor {} on {} at {}",
            doctor_id, date, time
        );

        let mut query_parts = vec![
            format!("doctor_id=eq.{}", doctor_id),
            format!("appointment_date=eq.{}", date),
            format!(
                "appointment_time=eq.{}",
                time.format(slot_time::WRITE_FORMAT)
            ),
            "status=neq.cancelled".to_string(),
        ];

        if let Some(exclude_id) = exclude_appointment_id {
            query_parts.push(format!("id=neq.{}", exclude_id));
        }

        let path = format!(
            "/rest/v1/appointments?{}&limit=1",
            query_parts.join("&")
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let taken = !result.is_empty();
        if taken {
            warn!(
                "Slot conflict for doctor {} on {} at {}",
                doctor_id, date, time
            );
        }

        Ok(taken)
    }
}
