use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::chain::{ChainController, ChainOutcome};
use super::errors::AgentResult;
use super::executor::{AgentExecutor, LlmExecutor, TemplateExecutor};
use super::fallback::fallback;
use super::interceptor::intercept;
use super::llm::LlmClient;
use super::registry::AgentRegistry;
use super::router::Router;
use super::types::{ChainBudget, OrchestrationResult};
use crate::config::{AgentBackend, AppConfig};

/// Entry point of the agent system
///
/// Runs the secure-intake check, then the chain, and converts any chain
/// failure into a fallback result. `orchestrate` never fails.
#[derive(Clone)]
pub struct Orchestrator {
    chain: ChainController,
}

impl Orchestrator {
    pub fn new(registry: Arc<AgentRegistry>, router: Router, hop_timeout: Duration) -> Self {
        Self {
            chain: ChainController::new(registry, router, hop_timeout),
        }
    }

    /// Uses one executor for every agent and for routing
    pub fn with_executor(executor: Arc<dyn AgentExecutor>, hop_timeout: Duration) -> Self {
        let registry = Arc::new(AgentRegistry::uniform(Arc::clone(&executor)));
        Self::new(registry, Router::new(executor), hop_timeout)
    }

    /// Builds the orchestrator for the configured backend
    ///
    /// # Errors
    /// * `ConfigError` if the model client cannot be constructed
    pub fn from_config(config: &AppConfig) -> AgentResult<Self> {
        let executor: Arc<dyn AgentExecutor> = match &config.backend {
            AgentBackend::Llm(settings) => {
                let client = LlmClient::new(settings.clone())?;
                tracing::info!(provider = ?client.provider(), model = %client.model(), "Using model backend");
                Arc::new(LlmExecutor::new(client))
            }
            AgentBackend::Template => {
                tracing::warn!("Using template backend, agent replies are canned");
                Arc::new(TemplateExecutor::new())
            }
        };

        Ok(Self::with_executor(executor, config.hop_timeout))
    }

    pub fn registry(&self) -> &AgentRegistry {
        self.chain.registry()
    }

    pub async fn orchestrate(&self, task: &str, budget: ChainBudget) -> OrchestrationResult {
        self.orchestrate_with_cancel(task, budget, &CancellationToken::new())
            .await
    }

    /// Like [`orchestrate`](Self::orchestrate), stopping at the next hop
    /// boundary (or mid-call) once `cancel` fires
    pub async fn orchestrate_with_cancel(
        &self,
        task: &str,
        budget: ChainBudget,
        cancel: &CancellationToken,
    ) -> OrchestrationResult {
        if let Some(result) = intercept(task) {
            return result;
        }

        match self.chain.run(task, budget, cancel).await {
            ChainOutcome::Done(result) => result,
            ChainOutcome::Failed(error) => fallback(task, &error),
        }
    }
}
