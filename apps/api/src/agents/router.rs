use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::errors::{AgentError, AgentResult};
use super::executor::AgentExecutor;
use super::messages::{render_history, AgentMessage};
use super::prompts::library;
use super::types::{Role, RouteTarget, RoutingDecision};

static JSON_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```").expect("valid regex"));

/// Asks the orchestrator role who should act next
///
/// The orchestrator's output is untrusted text. The router only validates
/// and normalizes it; what to do with a bad decision is up to the caller.
#[derive(Clone)]
pub struct Router {
    executor: Arc<dyn AgentExecutor>,
}

impl Router {
    pub fn new(executor: Arc<dyn AgentExecutor>) -> Self {
        Self { executor }
    }

    /// Produces a routing decision for `task` given the exchanges so far
    ///
    /// # Errors
    /// * `ParseError` / `UnknownRole` when the output is not a usable decision
    /// * any executor error from the underlying call, unchanged
    pub async fn route(&self, task: &str, history: &[AgentMessage]) -> AgentResult<RoutingDecision> {
        let template = library::for_role(Role::Orchestrator);
        let mut variables = HashMap::new();
        variables.insert("history".to_string(), render_history(history));
        variables.insert("task".to_string(), task.to_string());

        let raw = self
            .executor
            .route(task, &template.render(&variables))
            .await?;

        let decision = parse_decision(&raw, task)?;
        tracing::debug!(?decision, "Router decision");
        Ok(decision)
    }
}

/// Parses raw orchestrator output into a decision
pub fn parse_decision(raw: &str, task: &str) -> AgentResult<RoutingDecision> {
    let value = extract_json(raw).ok_or_else(|| {
        AgentError::ParseError(format!("no JSON object in router output: {}", preview(raw)))
    })?;
    decision_from_value(&value, task)
}

/// Validates a JSON payload as a decision, filling optional fields
pub fn decision_from_value(value: &Value, task: &str) -> AgentResult<RoutingDecision> {
    let object = value
        .as_object()
        .ok_or_else(|| AgentError::ParseError("router output is not a JSON object".to_string()))?;

    let agent = object
        .get("agent")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|agent| !agent.is_empty())
        .ok_or_else(|| AgentError::ParseError("missing 'agent' field".to_string()))?;

    let target = if agent.to_uppercase().contains("FINISH") {
        RouteTarget::Finish
    } else {
        let role: Role = agent.parse()?;
        if role.is_meta() {
            return Err(AgentError::UnknownRole(format!(
                "{} (not a chain target)",
                agent
            )));
        }
        RouteTarget::Agent(role)
    };

    let subtask = object
        .get("subtask")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|subtask| !subtask.is_empty())
        .unwrap_or(task)
        .to_string();

    let chain_next = match object.get("chain_next") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(flag)) if flag.eq_ignore_ascii_case("true") => true,
        Some(Value::String(flag)) if flag.eq_ignore_ascii_case("false") => false,
        Some(other) => {
            return Err(AgentError::ParseError(format!(
                "'chain_next' must be a boolean, got {}",
                other
            )))
        }
    };

    let next_agent = object
        .get("next_agent")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    Ok(RoutingDecision {
        target,
        subtask,
        chain_next: chain_next && target != RouteTarget::Finish,
        next_agent,
    })
}

/// Finds the first JSON object in model output: bare, fenced, or embedded
fn extract_json(raw: &str) -> Option<Value> {
    let raw = raw.trim();

    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return Some(value);
    }

    if let Some(block) = JSON_BLOCK.captures(raw).and_then(|c| c.get(1)) {
        if let Ok(value) = serde_json::from_str::<Value>(block.as_str().trim()) {
            return Some(value);
        }
    }

    // First object that parses from any opening brace; trailing text is ignored
    raw.match_indices('{').find_map(|(start, _)| {
        serde_json::Deserializer::from_str(&raw[start..])
            .into_iter::<Value>()
            .next()
            .and_then(Result::ok)
            .filter(Value::is_object)
    })
}

fn preview(raw: &str) -> String {
    const LIMIT: usize = 80;
    let mut preview: String = raw.chars().take(LIMIT).collect();
    if raw.chars().count() > LIMIT {
        preview.push_str("...");
    }
    preview
}
