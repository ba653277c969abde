use serde::{Deserialize, Serialize, Serializer};
use std::str::FromStr;

use super::errors::{AgentError, AgentResult};

/// Agent roles known to the office
///
/// `Orchestrator` is the routing meta-role. It decides who acts next and is
/// never itself a chain target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "CEO")]
    Ceo,
    Manager,
    Accountant,
    #[serde(rename = "HR")]
    Hr,
    #[serde(rename = "IT Support")]
    ItSupport,
    #[serde(rename = "Sales Rep")]
    SalesRep,
    Secretary,
    Architect,
    Orchestrator,
}

impl Role {
    /// Every role that can be handed work, in prompt-library order
    pub const ORDINARY: [Role; 8] = [
        Role::Ceo,
        Role::Manager,
        Role::Accountant,
        Role::Hr,
        Role::ItSupport,
        Role::SalesRep,
        Role::Secretary,
        Role::Architect,
    ];

    pub fn is_meta(&self) -> bool {
        matches!(self, Role::Orchestrator)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Ceo => "CEO",
            Role::Manager => "Manager",
            Role::Accountant => "Accountant",
            Role::Hr => "HR",
            Role::ItSupport => "IT Support",
            Role::SalesRep => "Sales Rep",
            Role::Secretary => "Secretary",
            Role::Architect => "Architect",
            Role::Orchestrator => "Orchestrator",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AgentError;

    /// Parses a role name as a model might spell it: case, spaces,
    /// underscores and hyphens are ignored ("it_support", "Sales-Rep").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "ceo" => Ok(Role::Ceo),
            "manager" => Ok(Role::Manager),
            "accountant" => Ok(Role::Accountant),
            "hr" => Ok(Role::Hr),
            "itsupport" => Ok(Role::ItSupport),
            "salesrep" => Ok(Role::SalesRep),
            "secretary" => Ok(Role::Secretary),
            "architect" => Ok(Role::Architect),
            "orchestrator" | "orchestration" => Ok(Role::Orchestrator),
            _ => Err(AgentError::UnknownRole(s.trim().to_string())),
        }
    }
}

/// Who the router wants to act next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    Agent(Role),
    /// The objective is satisfied; do not route further
    Finish,
}

/// Validated decision produced by the router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDecision {
    pub target: RouteTarget,
    pub subtask: String,
    pub chain_next: bool,
    /// Raw hand-off name as the model wrote it. Resolved by the chain
    /// controller so an unknown name ends the chain instead of the request.
    pub next_agent: Option<String>,
}

impl RoutingDecision {
    /// A decision that sends `subtask` to `role` and stops afterwards
    pub fn single(role: Role, subtask: impl Into<String>) -> Self {
        Self {
            target: RouteTarget::Agent(role),
            subtask: subtask.into(),
            chain_next: false,
            next_agent: None,
        }
    }

    /// Whether this decision asks for another hop once its agent has run
    pub fn wants_continuation(&self) -> bool {
        self.chain_next && self.target != RouteTarget::Finish
    }
}

/// One entry of the orchestration audit trail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Routed { agent: Role, subtask: String },
    Chained { agent: Role },
    ChainUnknownAgent { name: String },
    ChainMissingAgent,
    ChainFailed { reason: String },
    ChainLimitReached,
    RouterFinished,
    SecureIntake,
    Fallback,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Routed { agent, subtask } => write!(f, "Routed to {} for '{}'", agent, subtask),
            Step::Chained { agent } => write!(f, "Chained to {}", agent),
            Step::ChainUnknownAgent { name } => {
                write!(f, "Chaining failed: role '{}' not found (unknown agent)", name)
            }
            Step::ChainMissingAgent => write!(f, "Chaining failed: no next agent named"),
            Step::ChainFailed { reason } => write!(f, "Chaining failed: {}", reason),
            Step::ChainLimitReached => write!(f, "Max chain limit reached"),
            Step::RouterFinished => write!(f, "Router finished without delegating"),
            Step::SecureIntake => write!(f, "Handled by Secret Service (secure-intake path)"),
            Step::Fallback => write!(f, "Fallback: direct response"),
        }
    }
}

impl Serialize for Step {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome handed back to the caller of an orchestration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrchestrationResult {
    steps: Vec<Step>,
    response: String,
    agents_involved: Vec<String>,
}

impl OrchestrationResult {
    pub fn new(steps: Vec<Step>, response: String, agents_involved: Vec<String>) -> Self {
        Self {
            steps,
            response,
            agents_involved,
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn agents_involved(&self) -> &[String] {
        &self.agents_involved
    }

    /// Steps rendered as the strings stored and returned over HTTP
    pub fn step_descriptions(&self) -> Vec<String> {
        self.steps.iter().map(ToString::to_string).collect()
    }
}

/// Number of continuation hops an orchestration may still take
///
/// # Example
/// ```
/// use officecube_api::agents::types::ChainBudget;
///
/// let mut budget = ChainBudget::new(1).expect("valid budget");
/// assert!(budget.try_consume());
/// assert!(!budget.try_consume());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainBudget {
    ceiling: u8,
    remaining: u8,
}

impl ChainBudget {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;
    pub const DEFAULT: u8 = 5;

    /// Creates a budget, rejecting values outside `[1, 10]`
    pub fn new(max_chain: i64) -> AgentResult<Self> {
        if max_chain < i64::from(Self::MIN) || max_chain > i64::from(Self::MAX) {
            return Err(AgentError::ConfigError(format!(
                "max_chain must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                max_chain
            )));
        }

        let ceiling = max_chain as u8;
        Ok(Self {
            ceiling,
            remaining: ceiling,
        })
    }

    pub fn ceiling(&self) -> u8 {
        self.ceiling
    }

    pub fn remaining(&self) -> u8 {
        self.remaining
    }

    /// Takes one unit if any is left
    pub fn try_consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

impl Default for ChainBudget {
    fn default() -> Self {
        Self {
            ceiling: Self::DEFAULT,
            remaining: Self::DEFAULT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_roles_exclude_meta_role() {
        assert!(!Role::ORDINARY.is_empty());
        assert!(Role::ORDINARY.iter().all(|role| !role.is_meta()));
        assert!(Role::Orchestrator.is_meta());
    }

    #[test]
    fn role_parsing_is_lenient() {
        assert_eq!("CEO".parse::<Role>().unwrap(), Role::Ceo);
        assert_eq!("it_support".parse::<Role>().unwrap(), Role::ItSupport);
        assert_eq!("Sales-Rep".parse::<Role>().unwrap(), Role::SalesRep);
        assert_eq!(" architect ".parse::<Role>().unwrap(), Role::Architect);
        assert!(matches!(
            "Janitor".parse::<Role>(),
            Err(AgentError::UnknownRole(name)) if name == "Janitor"
        ));
    }

    #[test]
    fn role_display_round_trips() {
        for role in Role::ORDINARY {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn step_descriptions() {
        let step = Step::Routed {
            agent: Role::Architect,
            subtask: "Design a new office layout".into(),
        };
        assert_eq!(
            step.to_string(),
            "Routed to Architect for 'Design a new office layout'"
        );

        let unknown = Step::ChainUnknownAgent {
            name: "Janitor".into(),
        }
        .to_string();
        assert!(unknown.contains("failed"));
        assert!(unknown.contains("unknown"));
    }

    #[test]
    fn result_serializes_steps_as_strings() {
        let result = OrchestrationResult::new(
            vec![Step::Chained {
                agent: Role::SalesRep,
            }],
            "done".into(),
            vec!["Sales Rep".into()],
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["steps"][0], "Chained to Sales Rep");
        assert_eq!(json["response"], "done");
        assert_eq!(json["agents_involved"][0], "Sales Rep");
    }

    #[test]
    fn budget_bounds() {
        assert!(ChainBudget::new(0).is_err());
        assert!(ChainBudget::new(11).is_err());
        assert!(ChainBudget::new(-3).is_err());
        assert_eq!(ChainBudget::new(10).unwrap().ceiling(), 10);
        assert_eq!(ChainBudget::default().remaining(), 5);
    }

    #[test]
    fn budget_is_never_replenished() {
        let mut budget = ChainBudget::new(2).unwrap();
        assert!(budget.try_consume());
        assert!(budget.try_consume());
        assert!(!budget.try_consume());
        assert_eq!(budget.remaining(), 0);
        assert_eq!(budget.ceiling(), 2);
    }

    #[test]
    fn finish_never_continues() {
        let decision = RoutingDecision {
            target: RouteTarget::Finish,
            subtask: "x".into(),
            chain_next: true,
            next_agent: Some("Manager".into()),
        };
        assert!(!decision.wants_continuation());
    }
}
