use reqwest::Method;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    CreateDoctorRequest, Doctor, DoctorError, DoctorSearchQuery, UpdateDoctorRequest,
};

pub struct DoctorService {
    supabase: Arc<SupabaseClient>,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// List the active roster, optionally narrowed by specialization or
    /// location substring.
    pub async fn list_doctors(
        &self,
        query: DoctorSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<Doctor>, DoctorError> {
        let mut query_parts = vec!["is_active=eq.true".to_string()];

        if let Some(specialization) = &query.specialization {
            let pattern = urlencoding::encode(specialization).into_owned();
            query_parts.push(format!("specialization=ilike.*{}*", pattern));
        }
        if let Some(location) = &query.location {
            let pattern = urlencoding::encode(location).into_owned();
            query_parts.push(format!("location=ilike.*{}*", pattern));
        }

        let path = format!(
            "/rest/v1/doctors?{}&order=name.asc",
            query_parts.join("&")
        );

        self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))
    }

    /// Look up a doctor that is still accepting bookings. Soft-deleted
    /// doctors are treated as absent.
    pub async fn find_active_doctor(
        &self,
        doctor_id: Uuid,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        let path = format!(
            "/rest/v1/doctors?id=eq.{}&is_active=eq.true",
            doctor_id
        );

        let result: Vec<Doctor> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        result.into_iter().next().ok_or(DoctorError::NotFound)
    }

    pub async fn create_doctor(
        &self,
        request: CreateDoctorRequest,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        if request.name.trim().is_empty() {
            return Err(DoctorError::ValidationError(
                "Doctor name is required".to_string(),
            ));
        }

        let doctor_data = json!({
            "name": request.name,
            "specialization": request.specialization,
            "gender": request.gender,
            "location": request.location,
            "availability": request.availability,
            "is_active": true,
        });

        let result: Vec<Doctor> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/doctors",
                Some(auth_token),
                Some(doctor_data),
                Some(representation_headers()),
            )
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let doctor = result
            .into_iter()
            .next()
            .ok_or_else(|| DoctorError::DatabaseError("Failed to create doctor".to_string()))?;

        info!("Doctor {} added to the roster", doctor.id);
        Ok(doctor)
    }

    pub async fn update_doctor(
        &self,
        doctor_id: Uuid,
        request: UpdateDoctorRequest,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        if request.is_empty() {
            return Err(DoctorError::ValidationError(
                "No fields to update".to_string(),
            ));
        }

        let mut update_data = Map::new();
        if let Some(name) = request.name {
            update_data.insert("name".to_string(), json!(name));
        }
        if let Some(specialization) = request.specialization {
            update_data.insert("specialization".to_string(), json!(specialization));
        }
        if let Some(gender) = request.gender {
            update_data.insert("gender".to_string(), json!(gender));
        }
        if let Some(location) = request.location {
            update_data.insert("location".to_string(), json!(location));
        }
        if let Some(availability) = request.availability {
            update_data.insert("availability".to_string(), json!(availability));
        }

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Doctor> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(Value::Object(update_data)),
                Some(representation_headers()),
            )
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        result.into_iter().next().ok_or(DoctorError::NotFound)
    }

    /// Soft delete. The row stays behind so appointment history keeps a
    /// valid doctor reference.
    pub async fn deactivate_doctor(
        &self,
        doctor_id: Uuid,
        auth_token: &str,
    ) -> Result<(), DoctorError> {
        debug!("Deactivating doctor {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Doctor> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "is_active": false })),
                Some(representation_headers()),
            )
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(DoctorError::NotFound);
        }

        Ok(())
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
