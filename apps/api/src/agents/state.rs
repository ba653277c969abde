use serde::{Deserialize, Serialize};

/// Phase of a single orchestration chain
///
/// # Phase Transitions
/// ```text
/// Start -> Routing -> Executing -> Routing (next hop)
///             |            |-----> Done
///             |            └-----> Failed
///             |-----> Done  (malformed continuation, FINISH)
///             └-----> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainPhase {
    Start,
    Routing,
    Executing,
    Done,
    Failed,
}

impl ChainPhase {
    /// Checks if a transition from the current phase to `next` is valid
    ///
    /// # Example
    /// ```
    /// use officecube_api::agents::state::ChainPhase;
    ///
    /// assert!(ChainPhase::Start.can_transition_to(ChainPhase::Routing));
    /// assert!(!ChainPhase::Start.can_transition_to(ChainPhase::Executing));
    /// ```
    pub fn can_transition_to(&self, next: ChainPhase) -> bool {
        use ChainPhase::*;
        matches!(
            (self, next),
            (Start, Routing)
                | (Routing, Executing)
                | (Routing, Done)
                | (Routing, Failed)
                | (Executing, Routing)
                | (Executing, Done)
                | (Executing, Failed)
        )
    }

}

impl std::fmt::Display for ChainPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainPhase::Start => write!(f, "start"),
            ChainPhase::Routing => write!(f, "routing"),
            ChainPhase::Executing => write!(f, "executing"),
            ChainPhase::Done => write!(f, "done"),
            ChainPhase::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use ChainPhase::*;
        for (from, to) in [
            (Start, Routing),
            (Routing, Executing),
            (Routing, Done),
            (Routing, Failed),
            (Executing, Routing),
            (Executing, Done),
            (Executing, Failed),
        ] {
            assert!(from.can_transition_to(to), "{} -> {}", from, to);
        }
    }

    #[test]
    fn start_cannot_skip_routing() {
        assert!(!ChainPhase::Start.can_transition_to(ChainPhase::Executing));
        assert!(!ChainPhase::Start.can_transition_to(ChainPhase::Done));
    }

    #[test]
    fn terminal_phases_are_final() {
        use ChainPhase::*;
        for terminal in [Done, Failed] {
            for next in [Start, Routing, Executing, Done, Failed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn phase_display() {
        assert_eq!(ChainPhase::Routing.to_string(), "routing");
        assert_eq!(ChainPhase::Failed.to_string(), "failed");
    }
}
