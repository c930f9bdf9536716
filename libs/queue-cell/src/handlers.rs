use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
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

use crate::models::{AddToQueueRequest, QueueError, UpdateQueueStatusRequest};
use crate::services::queue::WalkInQueueService;

fn map_queue_error(e: QueueError) -> AppError {
    match e {
        QueueError::NotFound => AppError::NotFound("Queue item not found".to_string()),
        QueueError::ValidationError(msg) => AppError::BadRequest(msg),
        QueueError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn add_to_queue(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<AddToQueueRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_front_desk(&user)?;

    let service = WalkInQueueService::new(&state);
    let entry = service
        .add_to_queue(request, auth.token())
        .await
        .map_err(map_queue_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Patient added to queue",
            "entry": entry
        })),
    ))
}

#[axum::debug_handler]
pub async fn list_queue(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_front_desk(&user)?;

    let service = WalkInQueueService::new(&state);
    let entries = service
        .list_queue(auth.token())
        .await
        .map_err(map_queue_error)?;

    Ok(Json(json!(entries)))
}

#[axum::debug_handler]
pub async fn update_queue_status(
    State(state): State<Arc<AppConfig>>,
    Path(entry_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateQueueStatusRequest>,
) -> Result<Json<Value>, AppError> {
    require_front_desk(&user)?;

    let service = WalkInQueueService::new(&state);
    let entry = service
        .update_status(entry_id, request.status, auth.token())
        .await
        .map_err(map_queue_error)?;

    Ok(Json(json!({
        "message": "Queue status updated",
        "entry": entry
    })))
}

#[axum::debug_handler]
pub async fn remove_from_queue(
    State(state): State<Arc<AppConfig>>,
    Path(entry_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_front_desk(&user)?;

    let service = WalkInQueueService::new(&state);
    service
        .remove_from_queue(entry_id, auth.token())
        .await
        .map_err(map_queue_error)?;

    Ok(Json(json!({
        "message": "Patient removed from queue"
    })))
}

#[axum::debug_handler]
pub async fn clear_queue(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_front_desk(&user)?;

    let service = WalkInQueueService::new(&state);
    let removed = service.clear_queue(auth.token()).await.map_err(map_queue_error)?;

    Ok(Json(json!({
        "message": "Queue cleared",
        "removed": removed
    })))
}
