use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::agents::interceptor::{is_sensitive, redact};
use crate::agents::ChainBudget;
use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::domain::task::TaskRecord;

pub const MAX_TASK_CHARS: usize = 500;

/// A validated orchestration request
#[derive(Debug, PartialEq)]
pub struct OrchestrateRequest {
    pub task: String,
    pub budget: ChainBudget,
}

impl OrchestrateRequest {
    /// Validates a raw JSON body
    ///
    /// # Returns
    /// * `Err(String)` naming the first invalid field
    pub fn from_value(body: &Value) -> Result<Self, String> {
        let body = body
            .as_object()
            .ok_or_else(|| "Request body must be a JSON object".to_string())?;

        let task = body
            .get("task")
            .and_then(Value::as_str)
            .ok_or_else(|| "'task' is required and must be a string".to_string())?
            .trim();

        let length = task.chars().count();
        if length == 0 || length > MAX_TASK_CHARS {
            return Err(format!(
                "'task' must be between 1 and {} characters",
                MAX_TASK_CHARS
            ));
        }

        let budget = match body.get("max_chains") {
            None | Some(Value::Null) => ChainBudget::default(),
            Some(value) => {
                let max_chains = value
                    .as_i64()
                    .ok_or_else(|| "'max_chains' must be an integer".to_string())?;
                ChainBudget::new(max_chains).map_err(|e| e.to_string())?
            }
        };

        Ok(Self {
            task: task.to_string(),
            budget,
        })
    }
}

/// Response from an orchestration run
#[derive(Debug, Serialize)]
pub struct OrchestrateResponse {
    pub id: Uuid,
    pub task: String,
    pub steps: Vec<String>,
    pub response: String,
    pub agents_involved: Vec<String>,
}

impl From<&TaskRecord> for OrchestrateResponse {
    fn from(record: &TaskRecord) -> Self {
        Self {
            id: record.id(),
            task: record.task().to_string(),
            steps: record.steps().to_vec(),
            response: record.response().to_string(),
            agents_involved: record.agents_involved().to_vec(),
        }
    }
}

/// Run a task through the agent chain
///
/// POST /orchestrate
///
/// Agent failures degrade to a fallback result, so a valid request always
/// gets a 200.
pub async fn orchestrate(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<OrchestrateResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let request = OrchestrateRequest::from_value(&body).map_err(ApiError::bad_request)?;

    // Cancelled if the client goes away and this future is dropped
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let result = state
        .orchestrator
        .orchestrate_with_cancel(&request.task, request.budget, &cancel)
        .await;

    // Secrets never reach the store or the response
    let task = if is_sensitive(&request.task) {
        redact(&request.task)
    } else {
        request.task
    };
    let record = TaskRecord::new(task, &result).map_err(ApiError::bad_request)?;

    if let Err(e) = state.tasks.save(&record).await {
        tracing::error!(task_id = %record.id(), error = %e, "Failed to persist task");
    }

    tracing::info!(
        task_id = %record.id(),
        agents = ?record.agents_involved(),
        "Task orchestrated"
    );

    Ok(Json(OrchestrateResponse::from(&record)))
}
