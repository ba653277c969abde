// Secure intake for tasks that look like they carry credentials
//
// Runs before the router so a matching task never reaches a model.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{OrchestrationResult, Step};

/// Agent name reported for intercepted tasks
pub const SECRET_SERVICE: &str = "SecretService";

pub const REDACTED: &str = "[REDACTED]";

static SENSITIVE_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(password|api_key|credit_card)").expect("valid regex"));

static SENSITIVE_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(password|api_key|credit_card)\s*[:=]?\s*\S+").expect("valid regex")
});

pub fn is_sensitive(task: &str) -> bool {
    SENSITIVE_KEYWORD.is_match(task)
}

/// Replaces each keyword and the token following it with `[REDACTED]`
pub fn redact(task: &str) -> String {
    SENSITIVE_VALUE.replace_all(task, REDACTED).into_owned()
}

/// Returns the secure-intake result when the task is sensitive
///
/// # Example
/// ```
/// use officecube_api::agents::interceptor::intercept;
///
/// let result = intercept("my password: secret123").expect("intercepted");
/// assert!(result.response().contains("[REDACTED]"));
/// assert!(intercept("Plan the offsite").is_none());
/// ```
pub fn intercept(task: &str) -> Option<OrchestrationResult> {
    if !is_sensitive(task) {
        return None;
    }

    let redacted = redact(task);
    tracing::info!(task = %redacted, "Sensitive task routed to secure intake");

    Some(OrchestrationResult::new(
        vec![Step::SecureIntake],
        format!("Sensitive task '{}' has been processed securely.", redacted),
        vec![SECRET_SERVICE.to_string()],
    ))
}
