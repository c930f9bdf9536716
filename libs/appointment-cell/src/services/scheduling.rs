use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use doctor_cell::models::{DoctorError, Weekday};
use doctor_cell::services::availability::is_available_on;
use doctor_cell::services::doctor::DoctorService;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    is_recognized_slot, slot_time, Appointment, AppointmentError, AppointmentSearchQuery,
    AppointmentStatus, BookAppointmentRequest, UpdateAppointmentRequest,
};
use crate::services::conflict::ConflictService;

/// Books, reschedules and closes out appointments. Every booking path runs
/// the same gauntlet: active doctor, weekly availability, slot conflict,
/// then a single write.
pub struct SchedulingService {
    supabase: Arc<SupabaseClient>,
    conflict_service: ConflictService,
    doctor_service: DoctorService,
}

impl SchedulingService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let conflict_service = ConflictService::new(Arc::clone(&supabase));
        let doctor_service = DoctorService::with_client(Arc::clone(&supabase));

        Self {
            supabase,
            conflict_service,
            doctor_service,
        }
    }

    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment with doctor {} on {} at {}",
            request.doctor_id, request.appointment_date, request.appointment_time
        );

        self.validate_booking_request(&request)?;

        let doctor = self
            .find_active_doctor(request.doctor_id, auth_token)
            .await?;

        if !is_available_on(&doctor.availability, request.appointment_date) {
            let weekday = Weekday::from_date(request.appointment_date);
            return Err(AppointmentError::DoctorUnavailableOnDay {
                doctor_name: doctor.name,
                weekday: weekday.name(),
            });
        }

        let taken = self
            .conflict_service
            .slot_is_taken(
                request.doctor_id,
                request.appointment_date,
                request.appointment_time,
                None,
                auth_token,
            )
            .await?;
        if taken {
            return Err(AppointmentError::SlotTaken);
        }

        let appointment_data = json!({
            "patient_name": request.patient_name,
            "patient_phone": request.patient_phone,
            "patient_email": request.patient_email,
            "appointment_date": request.appointment_date,
            "appointment_time": request.appointment_time.format(slot_time::WRITE_FORMAT).to_string(),
            "doctor_id": request.doctor_id,
            "status": AppointmentStatus::Booked.to_string(),
        });

        let result: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(auth_token),
                Some(appointment_data),
                Some(representation_headers()),
            )
            .await
            .map_err(|e| {
                // The slot index is the backstop for two bookings racing
                // past the conflict check.
                if e.is_unique_violation() {
                    AppointmentError::SlotTaken
                } else {
                    AppointmentError::DatabaseError(e.to_string())
                }
            })?;

        let appointment = result.into_iter().next().ok_or_else(|| {
            AppointmentError::DatabaseError("Failed to create appointment".to_string())
        })?;

        info!("Appointment {} booked", appointment.id);
        Ok(appointment)
    }

    /// Partial update. A reschedule (any of date/time/doctor supplied)
    /// re-runs the full booking gauntlet against the merged values,
    /// excluding this appointment from the conflict check, and resets the
    /// status to booked unless the caller set one explicitly.
    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment {}", appointment_id);

        if request.is_empty() {
            return Err(AppointmentError::NoFieldsToUpdate);
        }

        let current = self.get_appointment(appointment_id, auth_token).await?;

        let mut update_data = Map::new();

        if let Some(status) = request.status {
            update_data.insert("status".to_string(), json!(status));
        }

        if request.is_reschedule() {
            let doctor_id = request.doctor_id.unwrap_or(current.doctor_id);
            let date = request.appointment_date.unwrap_or(current.appointment_date);
            let time = request.appointment_time.unwrap_or(current.appointment_time);

            if !is_recognized_slot(time) {
                return Err(AppointmentError::ValidationError(format!(
                    "{} is not a bookable time slot",
                    time.format("%H:%M")
                )));
            }

            let doctor = self.find_active_doctor(doctor_id, auth_token).await?;

            if !is_available_on(&doctor.availability, date) {
                let weekday = Weekday::from_date(date);
                return Err(AppointmentError::DoctorUnavailableOnDay {
                    doctor_name: doctor.name,
                    weekday: weekday.name(),
                });
            }

            let taken = self
                .conflict_service
                .slot_is_taken(doctor_id, date, time, Some(appointment_id), auth_token)
                .await?;
            if taken {
                return Err(AppointmentError::SlotTaken);
            }

            update_data.insert("doctor_id".to_string(), json!(doctor_id));
            update_data.insert("appointment_date".to_string(), json!(date));
            update_data.insert(
                "appointment_time".to_string(),
                json!(time.format(slot_time::WRITE_FORMAT).to_string()),
            );
            if request.status.is_none() {
                update_data.insert("status".to_string(), json!(AppointmentStatus::Booked));
            }
        }

        let updated = self
            .write_update(appointment_id, update_data, auth_token)
            .await?;

        info!("Appointment {} updated", appointment_id);
        Ok(updated)
    }

    /// Plain status write: a cancelled booking releases its slot.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Cancelling appointment {}", appointment_id);
        self.set_status(appointment_id, AppointmentStatus::Cancelled, auth_token)
            .await
    }

    /// Plain status write: no re-validation on completion.
    pub async fn complete_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Completing appointment {}", appointment_id);
        self.set_status(appointment_id, AppointmentStatus::Completed, auth_token)
            .await
    }

    /// Hard delete of an appointment record.
    pub async fn delete_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                Some(auth_token),
                None,
                Some(representation_headers()),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        info!("Appointment {} deleted", appointment_id);
        Ok(())
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);

        let result: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    /// Day sheet: all appointments, optionally narrowed to a date or a
    /// doctor, ordered by date then time.
    pub async fn list_appointments(
        &self,
        query: AppointmentSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut query_parts = Vec::new();

        if let Some(date) = query.date {
            query_parts.push(format!("appointment_date=eq.{}", date));
        }
        if let Some(doctor_id) = query.doctor_id {
            query_parts.push(format!("doctor_id=eq.{}", doctor_id));
        }
        query_parts.push("order=appointment_date.asc,appointment_time.asc".to_string());

        let path = format!("/rest/v1/appointments?{}", query_parts.join("&"));

        self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }

    // ==============================================================================
    // PRIVATE HELPERS
    // ==============================================================================

    fn validate_booking_request(
        &self,
        request: &BookAppointmentRequest,
    ) -> Result<(), AppointmentError> {
        if request.patient_name.trim().is_empty() {
            return Err(AppointmentError::ValidationError(
                "Patient name is required".to_string(),
            ));
        }
        if request.patient_phone.trim().is_empty() {
            return Err(AppointmentError::ValidationError(
                "Patient phone is required".to_string(),
            ));
        }
        if !is_recognized_slot(request.appointment_time) {
            return Err(AppointmentError::ValidationError(format!(
                "{} is not a bookable time slot",
                request.appointment_time.format("%H:%M")
            )));
        }
        Ok(())
    }

    async fn find_active_doctor(
        &self,
        doctor_id: Uuid,
        auth_token: &str,
    ) -> Result<doctor_cell::models::Doctor, AppointmentError> {
        self.doctor_service
            .find_active_doctor(doctor_id, auth_token)
            .await
            .map_err(|e| match e {
                DoctorError::NotFound => AppointmentError::DoctorNotFound,
                other => AppointmentError::DatabaseError(other.to_string()),
            })
    }

    async fn set_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let mut update_data = Map::new();
        update_data.insert("status".to_string(), json!(status));
        self.write_update(appointment_id, update_data, auth_token)
            .await
    }

    async fn write_update(
        &self,
        appointment_id: Uuid,
        mut update_data: Map<String, Value>,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);

        let result: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(Value::Object(update_data)),
                Some(representation_headers()),
            )
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    AppointmentError::SlotTaken
                } else {
                    AppointmentError::DatabaseError(e.to_string())
                }
            })?;

        result.into_iter().next().ok_or(AppointmentError::NotFound)
    }
}

fn representation_headers() -> reqwest::header::HeaderMap {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        "Prefer",
        reqwest::header::HeaderValue::from_static("return=representation"),
    );
    headers
}
