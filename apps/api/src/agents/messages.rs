// Conversation history passed to the router
//
// Each hop of a chain adds the text handed to an agent and the agent's reply.

use serde::{Deserialize, Serialize};

use super::types::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// Text handed to an agent (the task or a synthesized sub-task)
    Request,
    Agent(Role),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub speaker: Speaker,
    pub content: String,
}

impl AgentMessage {
    pub fn request(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Request,
            content: content.into(),
        }
    }

    pub fn reply(role: Role, content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Agent(role),
            content: content.into(),
        }
    }
}

/// Renders history as the plain-text transcript embedded in router prompts
pub fn render_history(history: &[AgentMessage]) -> String {
    if history.is_empty() {
        return "(none)".to_string();
    }

    history
        .iter()
        .map(|message| match message.speaker {
            Speaker::Request => format!("Request: {}", message.content),
            Speaker::Agent(role) => format!("{}: {}", role, message.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_renders_placeholder() {
        assert_eq!(render_history(&[]), "(none)");
    }

    #[test]
    fn history_renders_in_order() {
        let history = vec![
            AgentMessage::request("Plan the offsite"),
            AgentMessage::reply(Role::Manager, "Milestones drafted"),
        ];

        assert_eq!(
            render_history(&history),
            "Request: Plan the offsite\nManager: Milestones drafted"
        );
    }
}
