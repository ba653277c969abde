use super::errors::AgentError;
use super::types::{OrchestrationResult, Role, Step};

/// Degraded result returned when a chain fails
///
/// The shape is the same whichever stage failed: one step, the meta-role as
/// the only agent, and a response quoting the original task and the error.
pub fn fallback(task: &str, error: &AgentError) -> OrchestrationResult {
    tracing::error!(error = %error, "Orchestration failed, returning fallback response");

    OrchestrationResult::new(
        vec![Step::Fallback],
        format!("Task '{}' processed via fallback. (Error: {})", task, error),
        vec![Role::Orchestrator.to_string()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fallback_shape_is_fixed() {
        let errors = [
            AgentError::LlmError("503 Service Unavailable".into()),
            AgentError::Timeout(Duration::from_secs(30)),
            AgentError::AgentNotFound("Architect".into()),
            AgentError::ConfigError("no model".into()),
        ];

        for error in errors {
            let result = fallback("Plan the offsite", &error);

            assert_eq!(result.steps(), [Step::Fallback]);
            assert_eq!(result.agents_involved(), ["Orchestrator".to_string()]);
            assert!(result.response().contains("Plan the offsite"));
            assert!(result.response().contains(&error.to_string()));
        }
    }
}
