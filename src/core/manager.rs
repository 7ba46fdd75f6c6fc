// EN: src/core/manager.rs

use crate::core::action::{ActionExecutor, Executor, Toolbox};
use crate::core::context::ExecutionContext;
use crate::core::elevation::ElevatedExecutor;
use crate::errors::{ActionError, ErrorKind};
use crate::models::{ActionConfig, ActionKind, ExecutionOutcome, Grimoire};
use crate::state::ActionRegistry;

/// Entry point of the engine: resolves spell names against the active grimoire and
/// runs them.
///
/// `ActionManager` is `Sync`; share it behind an `Arc` and call [`execute`] and
/// [`update_actions`] from any thread.
///
/// [`execute`]: ActionManager::execute
/// [`update_actions`]: ActionManager::update_actions
#[derive(Debug)]
pub struct ActionManager {
    registry: ActionRegistry,
    toolbox: Toolbox,
}

impl ActionManager {
    /// A manager serving `grimoire` with the given collaborators.
    pub fn new(grimoire: Grimoire, toolbox: Toolbox) -> Self {
        Self {
            registry: ActionRegistry::new(grimoire),
            toolbox,
        }
    }

    /// Runs the spell `name`.
    ///
    /// Lookup and type errors are returned as `Config` errors. Anything that fails
    /// while running is wrapped in a `System` error naming the spell, with the
    /// executor's error as its source.
    pub fn execute(
        &self,
        ctx: &ExecutionContext,
        name: &str,
    ) -> Result<ExecutionOutcome, ActionError> {
        let (config, kind) = self.resolve(name)?;
        let executor = self.executor_for(config, kind);
        log::debug!("Casting '{}': {}", name, executor.describe());

        match executor.execute(ctx) {
            Ok(outcome) => {
                log::debug!("Spell '{}' finished ({})", name, outcome);
                Ok(outcome)
            }
            Err(err) => {
                let message = format!("failed to execute spell '{}': {}", name, err);
                Err(ActionError::wrap(ErrorKind::System, message, err)
                    .with_context("spell_name", name)
                    .with_context("action_name", name)
                    .with_context("action_type", kind.as_str()))
            }
        }
    }

    /// Replaces the whole grimoire. Executions already running keep the generation
    /// they started with.
    pub fn update_actions(&self, grimoire: Grimoire) {
        log::debug!("Publishing grimoire with {} spell(s)", grimoire.len());
        self.registry.replace(grimoire);
    }

    /// Every spell name of the active grimoire, sorted.
    pub fn spell_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// The configuration of the spell `name` in the active grimoire.
    pub fn action_config(&self, name: &str) -> Option<ActionConfig> {
        self.registry.get(name)
    }

    /// The one-line description of the spell `name`.
    pub fn describe(&self, name: &str) -> Result<String, ActionError> {
        let (config, kind) = self.resolve(name)?;
        Ok(self.executor_for(config, kind).describe())
    }

    /// Builds the executor for `name` without running it.
    pub fn build_executor(&self, name: &str) -> Result<Box<dyn Executor>, ActionError> {
        let (config, kind) = self.resolve(name)?;
        Ok(self.executor_for(config, kind))
    }

    fn resolve(&self, name: &str) -> Result<(ActionConfig, ActionKind), ActionError> {
        // One snapshot per call: lookup and error report see the same generation.
        let grimoire = self.registry.snapshot();
        let Some(config) = grimoire.get(name) else {
            return Err(ActionError::config(format!("spell '{}' not found in grimoire", name))
                .with_context("spell_name", name)
                .with_context("available_spells", crate::state::sorted_names(&grimoire))
                .with_context("error_type", "spell_not_found"));
        };
        let kind = config
            .action_type
            .parse::<ActionKind>()
            .map_err(|e| e.with_context("spell_name", name))?;
        Ok((config.clone(), kind))
    }

    fn executor_for(&self, config: ActionConfig, kind: ActionKind) -> Box<dyn Executor> {
        let admin = config.admin;
        let executor = ActionExecutor::build(kind, config, self.toolbox.clone());
        if admin {
            Box::new(ElevatedExecutor::new(executor, self.toolbox.clone()))
        } else {
            Box::new(executor)
        }
    }
}
