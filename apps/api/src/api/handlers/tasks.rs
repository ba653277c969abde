use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::domain::task::TaskRecord;

/// Number of records returned by the listing endpoint
pub const RECENT_LIMIT: usize = 20;

/// A stored task as returned by the task endpoints
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: Uuid,
    pub task: String,
    pub response: String,
    pub steps: Vec<String>,
    pub agents_involved: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&TaskRecord> for TaskResponse {
    fn from(record: &TaskRecord) -> Self {
        Self {
            id: record.id(),
            task: record.task().to_string(),
            response: record.response().to_string(),
            steps: record.steps().to_vec(),
            agents_involved: record.agents_involved().to_vec(),
            created_at: record.created_at(),
        }
    }
}

/// List the most recent tasks, newest first
///
/// GET /api/tasks
pub async fn recent_tasks(
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let records = state
        .tasks
        .recent(RECENT_LIMIT)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Failed to list tasks: {}", e)))?;

    Ok(Json(records.iter().map(TaskResponse::from).collect()))
}

/// Get a task by ID
///
/// GET /api/tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskResponse>, ApiError> {
    let record = state
        .tasks
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Failed to find task: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Task not found"))?;

    Ok(Json(TaskResponse::from(&record)))
}
