use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// WALK-IN QUEUE MODELS
// ==============================================================================

/// One patient waiting at the front desk. `queue_number` is allocated by
/// the store and strictly increases for as long as the queue table has
/// rows; removals never free a number for reuse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: Uuid,
    pub queue_number: i32,
    pub patient_name: String,
    pub patient_phone: Option<String>,
    pub is_priority: bool,
    pub status: QueueStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Waiting,
    WithDoctor,
    Completed,
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueStatus::Waiting => write!(f, "waiting"),
            QueueStatus::WithDoctor => write!(f, "with_doctor"),
            QueueStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToQueueRequest {
    pub patient_name: String,
    pub patient_phone: Option<String>,
    #[serde(default)]
    pub is_priority: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateQueueStatusRequest {
    pub status: QueueStatus,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum QueueError {
    #[error("Queue item not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
