//! Integration tests for the PostgreSQL task repository
//!
//! These tests need a reachable database in `DATABASE_URL` and are skipped
//! when it is not set.

use officecube_api::agents::interceptor::intercept;
use officecube_api::domain::repositories::TaskRepository;
use officecube_api::domain::task::TaskRecord;
use officecube_api::infrastructure::repositories::PostgresTaskRepository;
use sqlx::PgPool;
use uuid::Uuid;

/// Set up the repository, or `None` when no database is configured
async fn setup_repo() -> Option<(PgPool, PostgresTaskRepository)> {
    let database_url = std::env::var("DATABASE_URL").ok()?;

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    let repo = PostgresTaskRepository::new(pool.clone());
    repo.ensure_schema().await.expect("Failed to create schema");

    Some((pool, repo))
}

/// Clean up test data
async fn cleanup(pool: &PgPool, id: Uuid) {
    sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .expect("Failed to cleanup test task");
}

fn test_record() -> TaskRecord {
    let result = intercept("my api_key=abc123").expect("sensitive task");
    TaskRecord::new("my api_key=abc123".to_string(), &result).expect("valid record")
}

#[tokio::test]
async fn test_save_and_find_task() {
    let Some((pool, repo)) = setup_repo().await else {
        return;
    };
    let record = test_record();

    repo.save(&record).await.expect("Failed to save task");

    let found = repo
        .find_by_id(record.id())
        .await
        .expect("Failed to find task")
        .expect("Task should exist");

    assert_eq!(found.id(), record.id());
    assert_eq!(found.task(), record.task());
    assert_eq!(found.steps(), record.steps());
    assert_eq!(found.agents_involved(), record.agents_involved());

    cleanup(&pool, record.id()).await;
}

#[tokio::test]
async fn test_find_missing_task() {
    let Some((_pool, repo)) = setup_repo().await else {
        return;
    };

    let found = repo
        .find_by_id(Uuid::new_v4())
        .await
        .expect("Failed to query task");

    assert!(found.is_none());
}

#[tokio::test]
async fn test_recent_includes_new_task() {
    let Some((pool, repo)) = setup_repo().await else {
        return;
    };
    let record = test_record();
    repo.save(&record).await.expect("Failed to save task");

    let recent = repo.recent(20).await.expect("Failed to list tasks");

    assert!(recent.len() <= 20);
    assert!(recent.iter().any(|task| task.id() == record.id()));

    cleanup(&pool, record.id()).await;
}
