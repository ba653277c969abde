use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::agents::OrchestrationResult;

/// A task and the orchestration result it produced
///
/// # Invariants
/// - Task text cannot be blank
/// - Steps and agents are stored as rendered strings, in order
///
/// # Example
/// ```
/// use officecube_api::agents::interceptor::intercept;
/// use officecube_api::domain::task::TaskRecord;
///
/// let result = intercept("api_key=abc").expect("intercepted");
/// let record = TaskRecord::new("api_key=abc".to_string(), &result).expect("valid record");
///
/// assert_eq!(record.agents_involved(), ["SecretService".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    id: Uuid,
    task: String,
    response: String,
    steps: Vec<String>,
    agents_involved: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TaskRecord {
    /// Creates a record for a finished orchestration
    ///
    /// # Returns
    /// * `Err(String)` if the task text is blank
    pub fn new(task: String, result: &OrchestrationResult) -> Result<Self, String> {
        if task.trim().is_empty() {
            return Err("Task cannot be empty".to_string());
        }

        Ok(Self {
            id: Uuid::new_v4(),
            task,
            response: result.response().to_string(),
            steps: result.step_descriptions(),
            agents_involved: result.agents_involved().to_vec(),
            created_at: Utc::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn agents_involved(&self) -> &[String] {
        &self.agents_involved
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Reconstructs a record from persistence layer data
    ///
    /// # Note
    /// Only to be used by repository implementations.
    pub fn from_persistence(
        id: Uuid,
        task: String,
        response: String,
        steps: Vec<String>,
        agents_involved: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task,
            response,
            steps,
            agents_involved,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{Role, Step};

    fn result() -> OrchestrationResult {
        OrchestrationResult::new(
            vec![
                Step::Routed {
                    agent: Role::Architect,
                    subtask: "Design a new office layout".into(),
                },
                Step::Chained {
                    agent: Role::Manager,
                },
            ],
            "Manager output".into(),
            vec!["Architect".into(), "Manager".into()],
        )
    }

    #[test]
    fn record_copies_result() {
        let record = TaskRecord::new("Design a new office layout".into(), &result()).unwrap();

        assert_eq!(record.response(), "Manager output");
        assert_eq!(
            record.steps(),
            [
                "Routed to Architect for 'Design a new office layout'".to_string(),
                "Chained to Manager".to_string()
            ]
        );
        assert_eq!(record.agents_involved().len(), 2);
    }

    #[test]
    fn blank_task_is_rejected() {
        assert!(TaskRecord::new("   ".into(), &result()).is_err());
    }

    #[test]
    fn each_record_gets_its_own_id() {
        let a = TaskRecord::new("a".into(), &result()).unwrap();
        let b = TaskRecord::new("b".into(), &result()).unwrap();
        assert_ne!(a.id(), b.id());
    }
}
