use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::repositories::TaskRepository;
use crate::domain::task::TaskRecord;

/// Process-local TaskRepository, used when no database is configured
#[derive(Default)]
pub struct InMemoryTaskRepository {
    records: RwLock<HashMap<Uuid, TaskRecord>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn save(&self, record: &TaskRecord) -> Result<(), String> {
        self.records
            .write()
            .await
            .insert(record.id(), record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TaskRecord>, String> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<TaskRecord>, String> {
        let mut records: Vec<TaskRecord> = self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        records.truncate(limit);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::interceptor::intercept;

    fn record(task: &str) -> TaskRecord {
        let result = intercept("password=hunter2").unwrap();
        TaskRecord::new(task.to_string(), &result).unwrap()
    }

    #[tokio::test]
    async fn save_and_find() {
        let repo = InMemoryTaskRepository::new();
        let saved = record("first");

        repo.save(&saved).await.unwrap();

        assert_eq!(repo.find_by_id(saved.id()).await.unwrap(), Some(saved));
        assert_eq!(repo.find_by_id(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_limited() {
        let repo = InMemoryTaskRepository::new();
        for task in ["one", "two", "three"] {
            repo.save(&record(task)).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let recent = repo.recent(2).await.unwrap();

        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].task(), "three");
        assert_eq!(recent[1].task(), "two");
    }
}
