use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AddToQueueRequest, QueueEntry, QueueError, QueueStatus};

/// Front-desk walk-in queue.
///
/// Admission goes through the `enqueue_patient` database function, which
/// computes `coalesce(max(queue_number), 0) + 1` and inserts in the same
/// statement. Concurrent check-ins therefore cannot be handed the same
/// number, and numbers are never reused until the table is cleared.
pub struct WalkInQueueService {
    supabase: Arc<SupabaseClient>,
}

impl WalkInQueueService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub async fn add_to_queue(
        &self,
        request: AddToQueueRequest,
        auth_token: &str,
    ) -> Result<QueueEntry, QueueError> {
        if request.patient_name.trim().is_empty() {
            return Err(QueueError::ValidationError(
                "Patient name is required".to_string(),
            ));
        }

        let body = json!({
            "p_patient_name": request.patient_name,
            "p_patient_phone": request.patient_phone,
            "p_is_priority": request.is_priority,
        });

        let entry: QueueEntry = self
            .supabase
            .request(
                Method::POST,
                "/rest/v1/rpc/enqueue_patient",
                Some(auth_token),
                Some(body),
            )
            .await
            .map_err(|e| QueueError::DatabaseError(e.to_string()))?;

        info!(
            "Patient added to queue as number {} (priority: {})",
            entry.queue_number, entry.is_priority
        );
        Ok(entry)
    }

    /// Serving order: priority entries first, then by queue number. A
    /// late-arriving priority patient jumps every regular patient but
    /// waits behind earlier priority arrivals.
    pub async fn list_queue(&self, auth_token: &str) -> Result<Vec<QueueEntry>, QueueError> {
        let path = "/rest/v1/queue?order=is_priority.desc,queue_number.asc";

        self.supabase
            .request(Method::GET, path, Some(auth_token), None)
            .await
            .map_err(|e| QueueError::DatabaseError(e.to_string()))
    }

    pub async fn update_status(
        &self,
        entry_id: Uuid,
        status: QueueStatus,
        auth_token: &str,
    ) -> Result<QueueEntry, QueueError> {
        debug!("Updating queue entry {} to {}", entry_id, status);

        let path = format!("/rest/v1/queue?id=eq.{}", entry_id);

        let result: Vec<QueueEntry> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "status": status })),
                Some(representation_headers()),
            )
            .await
            .map_err(|e| QueueError::DatabaseError(e.to_string()))?;

        result.into_iter().next().ok_or(QueueError::NotFound)
    }

    pub async fn remove_from_queue(
        &self,
        entry_id: Uuid,
        auth_token: &str,
    ) -> Result<(), QueueError> {
        let path = format!("/rest/v1/queue?id=eq.{}", entry_id);

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
            .map_err(|e| QueueError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(QueueError::NotFound);
        }

        info!("Queue entry {} removed", entry_id);
        Ok(())
    }

    /// Empties the queue. With the table empty, the next admission is
    /// handed number 1 again.
    pub async fn clear_queue(&self, auth_token: &str) -> Result<usize, QueueError> {
        // PostgREST requires a filter on DELETE; match every row.
        let path = "/rest/v1/queue?id=not.is.null";

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                path,
                Some(auth_token),
                None,
                Some(representation_headers()),
            )
            .await
            .map_err(|e| QueueError::DatabaseError(e.to_string()))?;

        info!("Queue cleared ({} entries removed)", result.len());
        Ok(result.len())
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
