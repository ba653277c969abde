// Agent system modules
//
// Routes a task to role-specialized agents, optionally chains the result
// through further agents, and always hands back a well-formed result.

pub mod chain;
pub mod errors;
pub mod executor;
pub mod fallback;
pub mod interceptor;
pub mod llm;
pub mod messages;
pub mod orchestrator;
pub mod prompts;
pub mod registry;
pub mod router;
pub mod state;
pub mod types;

// Re-export main types
pub use errors::{AgentError, AgentResult};
pub use executor::AgentExecutor;
pub use orchestrator::Orchestrator;
pub use registry::AgentRegistry;
pub use router::Router;
pub use types::{ChainBudget, OrchestrationResult, Role, RoutingDecision, Step};
