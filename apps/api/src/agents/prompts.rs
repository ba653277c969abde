// Prompt templates for LLM interactions
//
// One template per role. Templates are versioned so a stored task can be
// traced back to the wording that produced it.

use std::collections::HashMap;

use super::types::Role;

/// Prompt template structure
pub struct PromptTemplate {
    pub name: String,
    pub version: String,
    pub system: String,
    pub user_template: String,
}

impl PromptTemplate {
    /// Render the user template, replacing each `{{key}}` with its value.
    /// Unknown placeholders are left untouched.
    pub fn render(&self, variables: &HashMap<String, String>) -> String {
        variables
            .iter()
            .fold(self.user_template.clone(), |rendered, (key, value)| {
                rendered.replace(&format!("{{{{{}}}}}", key), value)
            })
    }
}

const HAND_OFF: &str = "Your response may be passed to the next agent in the chain, \
                        so keep it clear, concise and self-contained.";

const AGENT_USER_TEMPLATE: &str = "User Task: {{task}}\n\nAgent Response:";

pub mod library {
    use super::{PromptTemplate, Role, AGENT_USER_TEMPLATE, HAND_OFF};

    /// Prompt for any role
    pub fn for_role(role: Role) -> PromptTemplate {
        let duties = match role {
            Role::Orchestrator => return orchestrator(),
            Role::Ceo => {
                "You are the CEO of a fast-moving technology company. Set strategic direction: \
                 clarify ambitious but achievable goals, name the risks and trade-offs, define \
                 success metrics with timelines and owners, and explain your rationale briefly."
            }
            Role::Manager => {
                "You are a department manager turning strategy into work. Break goals into \
                 milestones and deliverables, list the people, budget and tools needed, flag \
                 dependencies and risks, and assign tasks with acceptance criteria."
            }
            Role::Accountant => {
                "You are the office accountant. Produce cost analyses, budgets and ROI estimates \
                 with line items and stated assumptions, run a quick sensitivity check, and flag \
                 policy or compliance issues."
            }
            Role::Hr => {
                "You are the HR specialist. Write hiring plans and job descriptions, design \
                 interview loops and onboarding, and give policy guidance that is legally \
                 compliant and fair."
            }
            Role::ItSupport => {
                "You are the IT support specialist. Diagnose problems methodically, give \
                 step-by-step troubleshooting, state root-cause hypotheses, and recommend \
                 preventive measures and tooling."
            }
            Role::SalesRep => {
                "You are a sales representative. Write customer-facing messaging around our \
                 value proposition, prepare discovery questions, tailor the proposal to the \
                 customer's pain points, and propose next steps."
            }
            Role::Secretary => {
                "You are the office secretary. Organize information, draft professional emails \
                 and memos, schedule meetings with agendas, and summarize action items."
            }
            Role::Architect => {
                "You are the Architect. Produce system and process designs with interfaces and \
                 data flows described in words, record design decisions and trade-offs, and \
                 outline a phased rollout."
            }
        };

        PromptTemplate {
            name: role.as_str().to_lowercase().replace(' ', "_"),
            version: "1.0.0".to_string(),
            system: format!("{} {}", duties, HAND_OFF),
            user_template: AGENT_USER_TEMPLATE.to_string(),
        }
    }

    fn orchestrator() -> PromptTemplate {
        PromptTemplate {
            name: "orchestrator".to_string(),
            version: "1.0.0".to_string(),
            system: "You are the Orchestration agent. Read the request and the conversation \
                     history and decide which specialist acts next: CEO, Manager, Accountant, \
                     HR, IT Support, Sales Rep, Secretary or Architect. If the objective is \
                     already satisfied, answer with agent \"FINISH\". To hand the result on \
                     after this agent, set chain_next to true and name next_agent. \
                     Output strict JSON with keys: agent, subtask, chain_next, next_agent."
                .to_string(),
            user_template: "Conversation History: {{history}}\n\nTask: {{task}}\n\nOutput JSON:"
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_variables() {
        let template = library::for_role(Role::Architect);
        let mut variables = HashMap::new();
        variables.insert("task".to_string(), "Design a new office layout".to_string());

        assert_eq!(
            template.render(&variables),
            "User Task: Design a new office layout\n\nAgent Response:"
        );
    }

    #[test]
    fn render_leaves_unknown_placeholders() {
        let template = library::for_role(Role::Orchestrator);
        let mut variables = HashMap::new();
        variables.insert("task".to_string(), "Hire a designer".to_string());

        let rendered = template.render(&variables);
        assert!(rendered.contains("Task: Hire a designer"));
        assert!(rendered.contains("{{history}}"));
    }

    #[test]
    fn every_role_has_a_detailed_prompt() {
        for role in Role::ORDINARY {
            let template = library::for_role(role);
            assert!(template.system.len() > 100, "{} prompt too short", role);
            assert!(template.system.starts_with("You are"));
        }
    }

    #[test]
    fn orchestrator_prompt_mentions_finish() {
        let template = library::for_role(Role::Orchestrator);
        assert!(template.system.contains("FINISH"));
        assert_eq!(template.name, "orchestrator");
    }
}
