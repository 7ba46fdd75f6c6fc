// EN: src/models.rs

use crate::errors::ActionError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// The declarative description of one action, as supplied by the configuration loader.
///
/// The `type` tag stays a plain string here: an unknown value must surface as a
/// configuration error when the action is resolved, not as a deserialization failure
/// of the whole grimoire.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ActionConfig {
    /// One of `app`, `script` or `url`.
    #[serde(rename = "type")]
    pub action_type: String,
    /// Executable path/name, shell command line, or URL, depending on the type.
    pub command: String,
    /// Extra arguments. For scripts, a non-empty list bypasses the shell.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Working directory override (environment variables and `~` are expanded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    /// Environment overlay. Values are expanded before use.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Interpreter override for scripts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
    /// Seconds before a waited-on script is killed. `0` means no deadline.
    pub timeout: u64,
    /// Capture combined output and report it through the notifier.
    pub show_output: bool,
    /// Keep the terminal window open after the command finishes.
    pub keep_open: bool,
    /// Run inside a visible terminal window.
    pub terminal: bool,
    /// Run inside a visible terminal even for non-interactive commands.
    pub force_terminal: bool,
    /// Require administrator/root privileges.
    pub admin: bool,
    /// Human label used by `describe()`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ActionConfig {
    /// The configured description, if it is present and not blank.
    pub fn label(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// The active name → action mapping for one configuration generation.
pub type Grimoire = HashMap<String, ActionConfig>;

/// The closed set of action kinds. Resolved once from [`ActionConfig::action_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Launch an application or open a document with the OS.
    App,
    /// Run a shell command or script.
    Script,
    /// Open a URL in the default browser.
    Url,
}

impl ActionKind {
    /// The tag used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::App => "app",
            ActionKind::Script => "script",
            ActionKind::Url => "url",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app" => Ok(ActionKind::App),
            "script" => Ok(ActionKind::Script),
            "url" => Ok(ActionKind::Url),
            other => Err(ActionError::config(format!("unknown action type: {}", other))
                .with_context("action_type", other)
                .with_context("error_type", "unknown_type")
                .with_context(
                    "valid_types",
                    crate::constants::VALID_ACTION_TYPES.to_vec(),
                )),
        }
    }
}

/// How an execution ended, from the engine's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The process was started and released. Its exit status is never observed.
    Detached {
        /// OS process id at spawn time.
        pid: u32,
    },
    /// The process was waited on and exited successfully.
    Completed {
        /// Exit code reported by the OS.
        exit_code: i32,
    },
    /// The command ran through a privilege-escalation front-end.
    Elevated {
        /// The front-end that succeeded (`pkexec`, `osascript`, `powershell`, ...).
        tool: String,
    },
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionOutcome::Detached { pid } => write!(f, "detached: pid {}", pid),
            ExecutionOutcome::Completed { exit_code } => {
                write!(f, "completed: exit code {}", exit_code)
            }
            ExecutionOutcome::Elevated { tool } => write!(f, "elevated via {}", tool),
        }
    }
}
