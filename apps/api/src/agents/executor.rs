use async_trait::async_trait;
use std::collections::HashMap;

use super::errors::AgentResult;
use super::llm::LlmClient;
use super::prompts::library;
use super::types::Role;

/// Capability that produces an agent's reply for a piece of text
///
/// Implementations must not carry state between calls that the chain
/// controller could observe; the same `(role, text)` pair may be sent again
/// by a later request.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    async fn invoke(&self, role: Role, text: &str) -> AgentResult<String>;

    /// Answers a rendered routing prompt. `task` is the text the prompt was
    /// rendered for, untouched.
    async fn route(&self, _task: &str, prompt: &str) -> AgentResult<String> {
        self.invoke(Role::Orchestrator, prompt).await
    }
}

/// Executor backed by a remote language model
pub struct LlmExecutor {
    client: LlmClient,
}

impl LlmExecutor {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AgentExecutor for LlmExecutor {
    async fn invoke(&self, role: Role, text: &str) -> AgentResult<String> {
        let template = library::for_role(role);

        // The router renders its own template because it needs the history
        let user = if role.is_meta() {
            text.to_string()
        } else {
            let mut variables = HashMap::new();
            variables.insert("task".to_string(), text.to_string());
            template.render(&variables)
        };

        tracing::debug!(agent = %role, prompt = %template.name, version = %template.version, "Calling model");
        self.client.complete(&template.system, &user).await
    }
}

/// Offline executor: canned replies for agents, keyword routing for the
/// orchestrator
#[derive(Debug, Default, Clone)]
pub struct TemplateExecutor;

impl TemplateExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Picks the role whose keywords appear in the task
    pub fn route_by_keywords(task: &str) -> Role {
        let task = task.to_lowercase();
        let table: [(Role, &[&str]); 7] = [
            (Role::Architect, &["design", "layout", "architecture", "blueprint"]),
            (Role::Accountant, &["budget", "cost", "invoice", "expense", "roi"]),
            (Role::Hr, &["hire", "hiring", "onboard", "recruit", "policy"]),
            (Role::ItSupport, &["bug", "laptop", "network", "printer", "vpn", "wifi"]),
            (Role::SalesRep, &["sell", "sales", "customer", "pitch", "deal"]),
            (Role::Secretary, &["email", "meeting", "schedule", "memo", "agenda"]),
            (Role::Ceo, &["strategy", "vision", "company goal", "roadmap"]),
        ];

        table
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| task.contains(keyword)))
            .map(|(role, _)| *role)
            .unwrap_or(Role::Manager)
    }

    fn focus(role: Role) -> &'static str {
        match role {
            Role::Ceo => "align it with our vision and set measurable goals",
            Role::Manager => "break it into milestones with clear owners",
            Role::Accountant => "estimate costs and check the budget",
            Role::Hr => "plan the staffing and policy impact",
            Role::ItSupport => "troubleshoot step by step and document the fix",
            Role::SalesRep => "shape the customer messaging and next steps",
            Role::Secretary => "organize the communication and schedule follow-ups",
            Role::Architect => "sketch the design and a phased rollout",
            Role::Orchestrator => "route it to the right specialist",
        }
    }
}

#[async_trait]
impl AgentExecutor for TemplateExecutor {
    /// For the orchestrator role `text` is taken as the task itself
    async fn invoke(&self, role: Role, text: &str) -> AgentResult<String> {
        if role.is_meta() {
            let task = text.trim();
            let decision = serde_json::json!({
                "agent": Self::route_by_keywords(task).as_str(),
                "subtask": task,
                "chain_next": false,
            });
            return Ok(decision.to_string());
        }

        Ok(format!(
            "As {}, here is my take on '{}': {}.",
            role,
            text,
            Self::focus(role)
        ))
    }

    async fn route(&self, task: &str, _prompt: &str) -> AgentResult<String> {
        self.invoke(Role::Orchestrator, task).await
    }
}
