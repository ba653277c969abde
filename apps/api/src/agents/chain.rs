use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::errors::{AgentError, AgentResult};
use super::messages::AgentMessage;
use super::registry::AgentRegistry;
use super::router::Router;
use super::state::ChainPhase;
use super::types::{ChainBudget, OrchestrationResult, Role, RouteTarget, RoutingDecision, Step};

/// Prefix of the sub-task handed to each continuation agent
pub const CONTINUE_PREFIX: &str = "Continue from the following result: ";

/// How a chain ended
#[derive(Debug)]
pub enum ChainOutcome {
    Done(OrchestrationResult),
    Failed(AgentError),
}

/// What happens after an agent has answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    Stop,
    HandOff(Role),
    UnknownAgent(String),
    MissingAgent,
    LimitReached,
}

/// Decides whether the chain continues after the hop governed by `decision`.
/// Consumes one unit of budget only when a hand-off is granted.
pub fn decide_continuation(
    decision: &RoutingDecision,
    registry: &AgentRegistry,
    budget: &mut ChainBudget,
) -> Continuation {
    if !decision.wants_continuation() {
        return Continuation::Stop;
    }

    let Some(name) = decision.next_agent.as_deref() else {
        return Continuation::MissingAgent;
    };

    let next = match registry.resolve(name) {
        Ok(role) => role,
        Err(_) => return Continuation::UnknownAgent(name.to_string()),
    };

    if budget.try_consume() {
        Continuation::HandOff(next)
    } else {
        Continuation::LimitReached
    }
}

enum Hop {
    Initial,
    Continuation { target: Role, subtask: String },
}

enum ChainState {
    Start,
    Routing(Hop),
    Executing {
        agent: Role,
        subtask: String,
        decision: RoutingDecision,
    },
    Done,
    Failed(AgentError),
}

impl ChainState {
    fn phase(&self) -> ChainPhase {
        match self {
            ChainState::Start => ChainPhase::Start,
            ChainState::Routing(_) => ChainPhase::Routing,
            ChainState::Executing { .. } => ChainPhase::Executing,
            ChainState::Done => ChainPhase::Done,
            ChainState::Failed(_) => ChainPhase::Failed,
        }
    }
}

/// Mutable record of one chain; never shared between calls
struct ChainRun<'a> {
    task: &'a str,
    budget: ChainBudget,
    steps: Vec<Step>,
    visited: Vec<String>,
    history: Vec<AgentMessage>,
    response: Option<String>,
}

impl ChainRun<'_> {
    fn finish(self) -> OrchestrationResult {
        let response = self.response.unwrap_or_else(|| self.task.to_string());
        OrchestrationResult::new(self.steps, response, self.visited)
    }
}

/// Drives router and agent calls until the chain terminates
#[derive(Clone)]
pub struct ChainController {
    registry: Arc<AgentRegistry>,
    router: Router,
    hop_timeout: Duration,
}

impl ChainController {
    pub fn new(registry: Arc<AgentRegistry>, router: Router, hop_timeout: Duration) -> Self {
        Self {
            registry,
            router,
            hop_timeout,
        }
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Runs a chain for `task` to a terminal phase
    ///
    /// The first hop is always taken; `budget` only limits the continuation
    /// hops after it, so at most `budget.ceiling() + 1` agents are visited.
    pub async fn run(
        &self,
        task: &str,
        budget: ChainBudget,
        cancel: &CancellationToken,
    ) -> ChainOutcome {
        let mut run = ChainRun {
            task,
            budget,
            steps: Vec::new(),
            visited: Vec::new(),
            history: Vec::new(),
            response: None,
        };
        let mut state = ChainState::Start;

        loop {
            let from = state.phase();
            let next = match state {
                ChainState::Start => ChainState::Routing(Hop::Initial),
                ChainState::Routing(hop) => self.route(&mut run, hop, cancel).await,
                ChainState::Executing {
                    agent,
                    subtask,
                    decision,
                } => self.execute(&mut run, agent, subtask, decision, cancel).await,
                ChainState::Done => return ChainOutcome::Done(run.finish()),
                ChainState::Failed(err) => return ChainOutcome::Failed(err),
            };

            debug_assert!(
                from.can_transition_to(next.phase()),
                "invalid chain transition {} -> {}",
                from,
                next.phase()
            );
            tracing::trace!(from = %from, to = %next.phase(), "Chain transition");
            state = next;
        }
    }

    async fn route(&self, run: &mut ChainRun<'_>, hop: Hop, cancel: &CancellationToken) -> ChainState {
        match hop {
            Hop::Initial => {
                let routed = self
                    .guarded(cancel, self.router.route(run.task, &run.history))
                    .await;

                match routed {
                    Ok(decision) => match decision.target {
                        RouteTarget::Finish => {
                            tracing::info!("Router finished before delegating");
                            run.steps.push(Step::RouterFinished);
                            ChainState::Done
                        }
                        RouteTarget::Agent(agent) => {
                            tracing::info!(agent = %agent, "Routed task");
                            run.steps.push(Step::Routed {
                                agent,
                                subtask: decision.subtask.clone(),
                            });
                            ChainState::Executing {
                                agent,
                                subtask: decision.subtask.clone(),
                                decision,
                            }
                        }
                    },
                    // Nothing has run yet, so there is no partial result to keep
                    Err(err) => ChainState::Failed(err),
                }
            }
            Hop::Continuation { target, subtask } => {
                let routed = self
                    .guarded(cancel, self.router.route(&subtask, &run.history))
                    .await;

                match routed {
                    Ok(decision) => {
                        if decision.target != RouteTarget::Agent(target) {
                            tracing::debug!(
                                hand_off = %target,
                                router_choice = ?decision.target,
                                "Keeping hand-off target over router choice"
                            );
                        }
                        ChainState::Executing {
                            agent: target,
                            subtask,
                            decision,
                        }
                    }
                    Err(err) if err.is_routing_malformed() => {
                        tracing::warn!(error = %err, "Malformed routing decision, ending chain");
                        run.steps.push(Step::ChainFailed {
                            reason: err.to_string(),
                        });
                        ChainState::Done
                    }
                    Err(err) => ChainState::Failed(err),
                }
            }
        }
    }

    async fn execute(
        &self,
        run: &mut ChainRun<'_>,
        agent: Role,
        subtask: String,
        decision: RoutingDecision,
        cancel: &CancellationToken,
    ) -> ChainState {
        let executor = match self.registry.get(agent) {
            Ok(executor) => executor,
            Err(err) => return ChainState::Failed(err),
        };

        let output = match self.guarded(cancel, executor.invoke(agent, &subtask)).await {
            Ok(output) => output,
            Err(err) => return ChainState::Failed(err),
        };

        run.visited.push(agent.to_string());
        run.history.push(AgentMessage::request(subtask));
        run.history.push(AgentMessage::reply(agent, output.clone()));
        tracing::info!(
            agent = %agent,
            hop = run.visited.len(),
            remaining_budget = run.budget.remaining(),
            "Agent responded"
        );

        let next = match decide_continuation(&decision, &self.registry, &mut run.budget) {
            Continuation::Stop => ChainState::Done,
            Continuation::HandOff(next) => {
                run.steps.push(Step::Chained { agent: next });
                ChainState::Routing(Hop::Continuation {
                    target: next,
                    subtask: format!("{}{}", CONTINUE_PREFIX, output),
                })
            }
            Continuation::UnknownAgent(name) => {
                tracing::warn!(next_agent = %name, "Chaining failed: unknown agent");
                run.steps.push(Step::ChainUnknownAgent { name });
                ChainState::Done
            }
            Continuation::MissingAgent => {
                run.steps.push(Step::ChainMissingAgent);
                ChainState::Done
            }
            Continuation::LimitReached => {
                tracing::info!(ceiling = run.budget.ceiling(), "Max chain limit reached");
                run.steps.push(Step::ChainLimitReached);
                ChainState::Done
            }
        };

        run.response = Some(output);
        next
    }

    /// Bounds one router or agent call by the hop timeout and the caller's
    /// cancellation token
    async fn guarded<T, F>(&self, cancel: &CancellationToken, call: F) -> AgentResult<T>
    where
        F: Future<Output = AgentResult<T>>,
    {
        if cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        tokio::select! {
            _ = cancel.cancelled() => Err(AgentError::Cancelled),
            result = tokio::time::timeout(self.hop_timeout, call) => {
                result.unwrap_or_else(|_| Err(AgentError::Timeout(self.hop_timeout)))
            }
        }
    }
}
