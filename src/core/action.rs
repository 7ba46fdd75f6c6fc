// EN: src/core/action.rs

//! The executor seam shared by the three action kinds.
//!
//! An [`Executor`] turns one [`ActionConfig`] into a running OS process. The concrete
//! executors live in `app_executor`, `script_executor` and `url_executor`; the
//! [`ActionExecutor`] enum is the closed set the manager dispatches over, and
//! `elevation::ElevatedExecutor` decorates any of them.

use crate::core::app_executor::AppExecutor;
use crate::core::context::ExecutionContext;
use crate::core::expand::{expand_env, expand_path};
use crate::core::script_executor::ScriptExecutor;
use crate::core::settings::EngineSettings;
use crate::core::url_executor::UrlExecutor;
use crate::errors::ActionError;
use crate::models::{ActionConfig, ActionKind, ExecutionOutcome};
use crate::notify::{Notification, Notifier};
use crate::system::Platform;
use crate::system::executor::{ProcessSpec, posix_quote};
use crate::system::privilege::{PrivilegeProbe, ProcessPrivilege};
use crate::system::probe::{PathLocator, ToolLocator};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Runs one resolved action.
pub trait Executor: fmt::Debug + Send + Sync {
    /// Performs the action. Detached processes report [`ExecutionOutcome::Detached`].
    fn execute(&self, ctx: &ExecutionContext) -> Result<ExecutionOutcome, ActionError>;

    /// One human-readable line describing the action.
    fn describe(&self) -> String;

    /// The command an elevation front-end should run in place of this executor.
    ///
    /// The default hands over the description line, which only works for executors
    /// whose description is itself a command.
    fn elevation_request(&self) -> Result<ElevationRequest, ActionError> {
        Ok(ElevationRequest::from_text(self.describe()))
    }
}

/// A command prepared for a privilege-escalation front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevationRequest {
    /// `sh -c` form: working directory and environment folded into the line.
    pub posix_command: String,
    /// `cmd /c` form of the same command.
    pub windows_command: String,
    /// The un-elevated action would have captured and reported its output.
    pub captures_output: bool,
}

impl ElevationRequest {
    /// A request whose command is `text` verbatim on every platform.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            posix_command: text.clone(),
            windows_command: text,
            captures_output: false,
        }
    }

    /// Flattens a prepared process into single command lines.
    pub fn from_spec(spec: &ProcessSpec) -> Self {
        let mut posix = String::new();
        let mut windows = String::new();
        if let Some(dir) = &spec.working_dir {
            let dir = dir.to_string_lossy();
            posix.push_str(&format!("cd {} && ", posix_quote(&dir)));
            windows.push_str(&format!("cd /d \"{}\" && ", dir));
        }
        if !spec.env.is_empty() {
            posix.push_str("env");
            for (key, value) in &spec.env {
                posix.push(' ');
                posix.push_str(&posix_quote(&format!("{}={}", key, value)));
                windows.push_str(&format!("set \"{}={}\" && ", key, value));
            }
            posix.push(' ');
        }
        posix.push_str(&spec.command_line());
        windows.push_str(&spec.windows_command_line());
        Self {
            posix_command: posix,
            windows_command: windows,
            captures_output: spec.capture_output,
        }
    }
}

/// The collaborators every executor needs, shared behind `Arc`s.
#[derive(Debug, Clone)]
pub struct Toolbox {
    /// Launch model to follow.
    pub platform: Platform,
    /// Engine policy.
    pub settings: Arc<EngineSettings>,
    /// Tool discovery (terminals, browsers, elevation front-ends).
    pub locator: Arc<dyn ToolLocator>,
    /// Receives script output reports.
    pub notifier: Arc<dyn Notifier>,
    /// Current privilege level.
    pub privilege: Arc<dyn PrivilegeProbe>,
}

impl Toolbox {
    /// A toolbox for the running host: `PATH` lookup and the live privilege check.
    pub fn new(settings: EngineSettings, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            platform: Platform::current(),
            settings: Arc::new(settings),
            locator: Arc::new(PathLocator),
            notifier,
            privilege: Arc::new(ProcessPrivilege),
        }
    }

    /// Follows `platform`'s launch model instead of the host's.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Replaces tool discovery.
    pub fn with_locator(mut self, locator: Arc<dyn ToolLocator>) -> Self {
        self.locator = locator;
        self
    }

    /// Replaces the privilege check.
    pub fn with_privilege(mut self, privilege: Arc<dyn PrivilegeProbe>) -> Self {
        self.privilege = privilege;
        self
    }

    /// Delivers `notification`; failures are logged and swallowed.
    pub fn notify(&self, notification: Notification) {
        if let Err(e) = self.notifier.notify(&notification) {
            log::warn!(
                "Failed to deliver {} notification '{}': {}",
                notification.level,
                notification.title,
                e
            );
        }
    }
}

/// The closed set of executors, one variant per [`ActionKind`].
#[derive(Debug)]
pub enum ActionExecutor {
    /// `type = "app"`.
    App(AppExecutor),
    /// `type = "script"`.
    Script(ScriptExecutor),
    /// `type = "url"`.
    Url(UrlExecutor),
}

impl ActionExecutor {
    /// Builds the executor for `kind`. Pure: nothing is checked or spawned yet.
    pub fn build(kind: ActionKind, config: ActionConfig, toolbox: Toolbox) -> Self {
        match kind {
            ActionKind::App => ActionExecutor::App(AppExecutor::new(config, toolbox)),
            ActionKind::Script => ActionExecutor::Script(ScriptExecutor::new(config, toolbox)),
            ActionKind::Url => ActionExecutor::Url(UrlExecutor::new(config, toolbox)),
        }
    }

    fn inner(&self) -> &dyn Executor {
        match self {
            ActionExecutor::App(executor) => executor,
            ActionExecutor::Script(executor) => executor,
            ActionExecutor::Url(executor) => executor,
        }
    }
}

impl Executor for ActionExecutor {
    fn execute(&self, ctx: &ExecutionContext) -> Result<ExecutionOutcome, ActionError> {
        self.inner().execute(ctx)
    }

    fn describe(&self) -> String {
        self.inner().describe()
    }

    fn elevation_request(&self) -> Result<ElevationRequest, ActionError> {
        self.inner().elevation_request()
    }
}

/// Expanded environment overlay of `config`, in key order.
pub(crate) fn expanded_env(config: &ActionConfig) -> Vec<(String, String)> {
    config
        .env
        .iter()
        .map(|(key, value)| (key.clone(), expand_env(value).into_owned()))
        .collect()
}

/// Expanded working directory of `config`, if one is set.
pub(crate) fn expanded_working_dir(config: &ActionConfig) -> Option<PathBuf> {
    config
        .working_dir
        .as_deref()
        .map(str::trim)
        .filter(|dir| !dir.is_empty())
        .map(expand_path)
}

/// `working_dir` context value: the path, or an empty string when inherited.
pub(crate) fn working_dir_context(spec: &ProcessSpec) -> String {
    spec.working_dir
        .as_ref()
        .map(|dir| dir.display().to_string())
        .unwrap_or_default()
}
