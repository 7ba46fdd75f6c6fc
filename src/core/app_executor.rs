// EN: src/core/app_executor.rs

use crate::core::action::{
    ElevationRequest, Executor, Toolbox, expanded_env, expanded_working_dir, working_dir_context,
};
use crate::core::context::ExecutionContext;
use crate::core::expand::expand_env;
use crate::errors::{ActionError, ErrorKind};
use crate::models::{ActionConfig, ExecutionOutcome};
use crate::system::executor::{self, ProcessSpec};
use crate::system::launcher::AppLauncher;
use std::path::Path;

/// Starts an application (or opens a document) and leaves it running.
#[derive(Debug)]
pub struct AppExecutor {
    config: ActionConfig,
    toolbox: Toolbox,
}

impl AppExecutor {
    /// An executor for one application spell.
    pub fn new(config: ActionConfig, toolbox: Toolbox) -> Self {
        Self { config, toolbox }
    }

    /// Checks that the application exists and builds the process that starts it.
    pub fn prepare(&self) -> Result<ProcessSpec, ActionError> {
        let path = expand_env(&self.config.command).trim().to_string();
        if path.is_empty() {
            return Err(ActionError::config("empty application path")
                .with_context("command", self.config.command.as_str())
                .with_context("action_type", "app")
                .with_context("error_type", "empty_command"));
        }

        let launcher = AppLauncher::new(self.toolbox.platform);
        if !launcher.is_special_path(&path) {
            self.check_exists(&path)?;
        }

        let mut spec = launcher.prepare(&path, &self.config.args);
        spec.working_dir = expanded_working_dir(&self.config);
        spec.env = expanded_env(&self.config);
        Ok(spec)
    }

    fn check_exists(&self, path: &str) -> Result<(), ActionError> {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            if candidate.exists() {
                return Ok(());
            }
            return Err(self.not_found("application file does not exist", path));
        }
        if candidate.exists() || self.toolbox.locator.is_available(path) {
            return Ok(());
        }
        Err(self.not_found("application not found in PATH", path))
    }

    fn not_found(&self, message: &str, path: &str) -> ActionError {
        ActionError::system(message)
            .with_context("command", self.config.command.as_str())
            .with_context("resolved_path", path)
            .with_context("action_type", "app")
            .with_context("error_type", "not_found")
    }
}

impl Executor for AppExecutor {
    fn execute(&self, _ctx: &ExecutionContext) -> Result<ExecutionOutcome, ActionError> {
        let spec = self.prepare()?;
        let running = executor::spawn(&spec, 0).map_err(|e| {
            ActionError::wrap(ErrorKind::System, "failed to start application", e)
                .with_context("command", self.config.command.as_str())
                .with_context("action_type", "app")
                .with_context("working_dir", working_dir_context(&spec))
                .with_context("error_type", "start_failed")
        })?;
        let pid = running.detach();
        log::debug!("Launched '{}' (PID: {})", spec.command_line(), pid);
        Ok(ExecutionOutcome::Detached { pid })
    }

    fn describe(&self) -> String {
        match self.config.label() {
            Some(label) => label.to_string(),
            None => format!("Launch {}", self.config.command),
        }
    }

    fn elevation_request(&self) -> Result<ElevationRequest, ActionError> {
        Ok(ElevationRequest::from_spec(&self.prepare()?))
    }
}
