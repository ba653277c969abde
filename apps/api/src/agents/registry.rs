use std::collections::HashMap;
use std::sync::Arc;

use super::errors::{AgentError, AgentResult};
use super::executor::AgentExecutor;
use super::types::Role;

/// Fixed table from role to the executor that answers for it
///
/// Built once at startup and shared read-only between requests. Only
/// ordinary roles can be registered.
#[derive(Clone)]
pub struct AgentRegistry {
    executors: HashMap<Role, Arc<dyn AgentExecutor>>,
}

impl AgentRegistry {
    /// Builds a registry from explicit entries
    ///
    /// # Errors
    /// * `ConfigError` if no entries are given or the meta-role is included
    pub fn new(
        entries: impl IntoIterator<Item = (Role, Arc<dyn AgentExecutor>)>,
    ) -> AgentResult<Self> {
        let mut executors = HashMap::new();
        for (role, executor) in entries {
            if role.is_meta() {
                return Err(AgentError::ConfigError(format!(
                    "{} is the routing role and cannot be registered as an agent",
                    role
                )));
            }
            executors.insert(role, executor);
        }

        if executors.is_empty() {
            return Err(AgentError::ConfigError(
                "agent registry needs at least one role".to_string(),
            ));
        }

        Ok(Self { executors })
    }

    /// Registers every ordinary role against the same executor
    pub fn uniform(executor: Arc<dyn AgentExecutor>) -> Self {
        let executors = Role::ORDINARY
            .iter()
            .map(|role| (*role, Arc::clone(&executor)))
            .collect();

        Self { executors }
    }

    pub fn contains(&self, role: Role) -> bool {
        self.executors.contains_key(&role)
    }

    /// Looks up the executor for a role
    pub fn get(&self, role: Role) -> AgentResult<Arc<dyn AgentExecutor>> {
        self.executors
            .get(&role)
            .cloned()
            .ok_or_else(|| AgentError::AgentNotFound(role.to_string()))
    }

    /// Resolves a name to a registered, chainable role
    pub fn resolve(&self, name: &str) -> AgentResult<Role> {
        let role: Role = name.parse()?;
        if role.is_meta() || !self.contains(role) {
            return Err(AgentError::UnknownRole(name.trim().to_string()));
        }
        Ok(role)
    }

    /// Registered roles in prompt-library order
    pub fn roles(&self) -> Vec<Role> {
        Role::ORDINARY
            .iter()
            .copied()
            .filter(|role| self.contains(*role))
            .collect()
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("roles", &self.roles())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::executor::TemplateExecutor;

    fn executor() -> Arc<dyn AgentExecutor> {
        Arc::new(TemplateExecutor::new())
    }

    #[test]
    fn uniform_registers_all_ordinary_roles() {
        let registry = AgentRegistry::uniform(executor());

        assert_eq!(registry.roles(), Role::ORDINARY.to_vec());
        assert!(!registry.contains(Role::Orchestrator));
    }

    #[test]
    fn meta_role_cannot_be_registered() {
        let result = AgentRegistry::new(vec![(Role::Orchestrator, executor())]);
        assert!(matches!(result, Err(AgentError::ConfigError(_))));
    }

    #[test]
    fn empty_registry_is_rejected() {
        let result = AgentRegistry::new(Vec::new());
        assert!(matches!(result, Err(AgentError::ConfigError(_))));
    }

    #[test]
    fn lookup_of_missing_role_is_typed() {
        let registry = AgentRegistry::new(vec![(Role::Ceo, executor())]).unwrap();

        assert!(registry.get(Role::Ceo).is_ok());
        assert!(matches!(
            registry.get(Role::Hr),
            Err(AgentError::AgentNotFound(name)) if name == "HR"
        ));
    }

    #[test]
    fn resolve_rejects_unknown_and_meta_names() {
        let registry = AgentRegistry::uniform(executor());

        assert_eq!(registry.resolve("sales rep").unwrap(), Role::SalesRep);
        assert!(matches!(
            registry.resolve("Janitor"),
            Err(AgentError::UnknownRole(_))
        ));
        assert!(matches!(
            registry.resolve("Orchestrator"),
            Err(AgentError::UnknownRole(_))
        ));
    }
}
