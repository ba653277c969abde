use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::repositories::TaskRepository;
use crate::domain::task::TaskRecord;

/// PostgreSQL implementation of TaskRepository
///
/// Steps and agents are stored as JSONB arrays of strings.
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new PostgresTaskRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `tasks` table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), String> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id UUID PRIMARY KEY,
                task TEXT NOT NULL,
                response TEXT NOT NULL,
                steps JSONB NOT NULL,
                agents_involved JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create tasks table: {}", e))?;

        Ok(())
    }

    fn record_from_row(row: &PgRow) -> Result<TaskRecord, sqlx::Error> {
        let steps: Json<Vec<String>> = row.try_get("steps")?;
        let agents: Json<Vec<String>> = row.try_get("agents_involved")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        Ok(TaskRecord::from_persistence(
            row.try_get("id")?,
            row.try_get("task")?,
            row.try_get("response")?,
            steps.0,
            agents.0,
            created_at,
        ))
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn save(&self, record: &TaskRecord) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, task, response, steps, agents_involved, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                response = EXCLUDED.response,
                steps = EXCLUDED.steps,
                agents_involved = EXCLUDED.agents_involved
            "#,
        )
        .bind(record.id())
        .bind(record.task())
        .bind(record.response())
        .bind(Json(record.steps()))
        .bind(Json(record.agents_involved()))
        .bind(record.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to save task: {}", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TaskRecord>, String> {
        let row = sqlx::query(
            r#"
            SELECT id, task, response, steps, agents_involved, created_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("Failed to find task by id: {}", e))?;

        row.as_ref()
            .map(Self::record_from_row)
            .transpose()
            .map_err(|e| format!("Failed to decode task: {}", e))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<TaskRecord>, String> {
        let rows = sqlx::query(
            r#"
            SELECT id, task, response, steps, agents_involved, created_at
            FROM tasks
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| format!("Failed to list tasks: {}", e))?;

        rows.iter()
            .map(Self::record_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("Failed to decode task: {}", e))
    }
}
