use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_front_desk;

use crate::models::{CreateDoctorRequest, DoctorError, DoctorSearchQuery, UpdateDoctorRequest};
use crate::services::doctor::DoctorService;

fn map_doctor_error(e: DoctorError) -> AppError {
    match e {
        DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
        DoctorError::ValidationError(msg) => AppError::BadRequest(msg),
        DoctorError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<DoctorSearchQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_front_desk(&user)?;

    let service = DoctorService::new(&state);
    let doctors = service
        .list_doctors(query, auth.token())
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_front_desk(&user)?;

    let service = DoctorService::new(&state);
    let doctor = service
        .create_doctor(request, auth.token())
        .await
        .map_err(map_doctor_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Doctor created successfully",
            "doctor": doctor
        })),
    ))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    require_front_desk(&user)?;

    let service = DoctorService::new(&state);
    let doctor = service
        .update_doctor(doctor_id, request, auth.token())
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!({
        "message": "Doctor updated successfully",
        "doctor": doctor
    })))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_front_desk(&user)?;

    let service = DoctorService::new(&state);
    service
        .deactivate_doctor(doctor_id, auth.token())
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!({
        "message": "Doctor deleted successfully"
    })))
}
