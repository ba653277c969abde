use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::task::TaskRecord;

/// Repository trait for completed tasks
///
/// Implementations should handle storage-specific details.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Save a task record (insert or update)
    async fn save(&self, record: &TaskRecord) -> Result<(), String>;

    /// Find a task record by its ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TaskRecord>, String>;

    /// Most recent records first, at most `limit`
    async fn recent(&self, limit: usize) -> Result<Vec<TaskRecord>, String>;
}
