// EN: src/core/script_executor.rs

use crate::core::action::{
    ElevationRequest, Executor, Toolbox, expanded_env, expanded_working_dir, working_dir_context,
};
use crate::core::context::ExecutionContext;
use crate::core::expand::expand_env;
use crate::errors::{ActionError, ErrorKind};
use crate::models::{ActionConfig, ExecutionOutcome};
use crate::notify::{Level, Notification};
use crate::system::executor::{self, FinishedProcess, ProcessError, ProcessSpec};
use crate::system::shell::{ShellAdapter, ShellCommand};
use std::time::Duration;

/// Runs a shell command or a directly-executed program.
#[derive(Debug)]
pub struct ScriptExecutor {
    config: ActionConfig,
    toolbox: Toolbox,
}

/// Every launch decision for one script, made before anything is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedScript {
    /// The command after variable expansion.
    pub command: String,
    /// The process as it would run without a terminal window.
    pub base: ProcessSpec,
    /// The process actually started (the terminal wrapper, when one is used).
    pub launch: ProcessSpec,
    /// The script runs inside a terminal window.
    pub in_terminal: bool,
    /// Wait for exit instead of detaching.
    pub wait: bool,
}

impl ScriptExecutor {
    /// An executor for one script spell.
    pub fn new(config: ActionConfig, toolbox: Toolbox) -> Self {
        Self { config, toolbox }
    }

    /// Resolves interpreter, argv, directory, environment, terminal and wait policy.
    pub fn prepare(&self) -> Result<PreparedScript, ActionError> {
        // 1. Expand and validate the command.
        let command = expand_env(&self.config.command).trim().to_string();
        let mut tokens = command.split_whitespace();
        let Some(program) = tokens.next() else {
            return Err(self.empty_command_error());
        };

        // 2. Args bypass the shell entirely; otherwise hand the line to an interpreter.
        let shell = ShellAdapter::new(self.toolbox.platform);
        let mut base = if self.config.args.is_empty() {
            let interpreter = match self.config.shell.as_deref().map(str::trim) {
                Some(custom) if !custom.is_empty() => ShellCommand::custom(custom),
                _ => shell.default_shell(),
            };
            interpreter.invoke(&command)
        } else {
            ProcessSpec::new(program)
                .args(tokens)
                .args(self.config.args.iter().cloned())
        };

        // 3. Directory, environment and capture.
        base.working_dir = expanded_working_dir(&self.config).or_else(dirs::home_dir);
        base.env = expanded_env(&self.config);
        base.capture_output = self.config.show_output;

        // 4. Terminal window.
        let wants_terminal = self.config.terminal
            || self.config.force_terminal
            || self.config.keep_open
            || shell.is_interactive_command(&command, &self.toolbox.settings.interactive_commands);
        let wrapped = if wants_terminal {
            shell.wrap_in_terminal(&base, self.config.keep_open, self.toolbox.locator.as_ref())
        } else {
            None
        };
        if wants_terminal && wrapped.is_none() {
            log::debug!("No terminal available for '{}'; running it directly", command);
        }

        // 5. Wait policy.
        let wait = self.config.show_output || self.toolbox.settings.is_quick_command(program);

        Ok(PreparedScript {
            in_terminal: wrapped.is_some(),
            launch: wrapped.unwrap_or_else(|| base.clone()),
            base,
            command,
            wait,
        })
    }

    fn empty_command_error(&self) -> ActionError {
        ActionError::config("empty command")
            .with_context("command", self.config.command.as_str())
            .with_context("action_type", "script")
            .with_context("error_type", "empty_command")
            .with_context("suggested_action", "provide a command for this spell")
    }

    fn title(&self) -> String {
        self.config
            .label()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Script: {}", self.config.command))
    }

    /// Adds the context every script failure carries.
    fn failure(&self, err: ActionError, error_type: &str, spec: &ProcessSpec) -> ActionError {
        err.with_context("command", self.config.command.as_str())
            .with_context("action_type", "script")
            .with_context("working_dir", working_dir_context(spec))
            .with_context("error_type", error_type)
    }

    /// Reports captured output: error on failure, success on non-empty output, info
    /// otherwise. Exactly one notification per waited run.
    fn report(&self, outcome: Result<&FinishedProcess, &ProcessError>, output: &str) {
        let title = self.title();
        let notification = match outcome {
            Ok(finished) if finished.success => {
                if output.is_empty() {
                    Notification::new(Level::Info, title, "Command completed with no output")
                } else {
                    Notification::new(Level::Success, title, output)
                }
            }
            Ok(finished) => Notification::new(
                Level::Error,
                title,
                format!("Failed: {}\n\nOutput:\n{}", exit_description(finished), output),
            ),
            Err(e) => Notification::new(
                Level::Error,
                title,
                format!("Failed: {}\n\nOutput:\n{}", e, output),
            ),
        };
        self.toolbox.notify(notification);
    }
}

fn exit_description(finished: &FinishedProcess) -> String {
    match finished.exit_code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl Executor for ScriptExecutor {
    fn execute(&self, ctx: &ExecutionContext) -> Result<ExecutionOutcome, ActionError> {
        let ctx = match self.config.timeout {
            0 => ctx.clone(),
            secs => ctx.with_timeout(Duration::from_secs(secs)),
        };
        let prepared = self.prepare()?;
        let spec = &prepared.launch;
        if prepared.in_terminal {
            log::debug!("Running '{}' in a terminal window", prepared.command);
        }

        let running = executor::spawn(spec, self.toolbox.settings.output_limit).map_err(|e| {
            self.failure(
                ActionError::wrap(ErrorKind::System, "failed to start script", e),
                "start_failed",
                spec,
            )
            .with_context("suggested_action", "check that the command exists and is executable")
        })?;

        if !prepared.wait {
            let pid = running.detach();
            log::debug!("Detached '{}' (PID: {})", prepared.command, pid);
            return Ok(ExecutionOutcome::Detached { pid });
        }

        let output = running.output_handle();
        let result = running.wait(&ctx);
        if self.config.show_output {
            let captured = output.map(|o| o.contents()).unwrap_or_default();
            self.report(result.as_ref(), &captured);
        }

        match result {
            Ok(finished) if finished.success => Ok(ExecutionOutcome::Completed {
                exit_code: finished.exit_code.unwrap_or(0),
            }),
            Ok(finished) => {
                let message = format!("script execution failed: {}", exit_description(&finished));
                let mut err = self
                    .failure(ActionError::system(message), "execution_failed", spec)
                    .with_context("suggested_action", "check command syntax and arguments");
                if let Some(code) = finished.exit_code {
                    err = err.with_context("exit_code", code);
                }
                Err(err)
            }
            Err(e @ ProcessError::TimedOut(_)) => Err(self
                .failure(
                    ActionError::wrap(ErrorKind::System, "script timed out", e),
                    "timeout",
                    spec,
                )
                .with_context("timeout", self.config.timeout)),
            Err(e @ ProcessError::Cancelled(_)) => Err(self.failure(
                ActionError::wrap(ErrorKind::System, "script cancelled", e),
                "cancelled",
                spec,
            )),
            Err(e) => Err(self.failure(
                ActionError::wrap(ErrorKind::System, "script execution failed", e),
                "execution_failed",
                spec,
            )),
        }
    }

    fn describe(&self) -> String {
        self.config
            .label()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Run script: {}", self.config.command))
    }

    fn elevation_request(&self) -> Result<ElevationRequest, ActionError> {
        Ok(ElevationRequest::from_spec(&self.prepare()?.base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::EngineSettings;
    use crate::notify::{Notifier, NotifyError};
    use crate::system::Platform;
    use crate::system::probe::FixedLocator;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<Notification>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    fn toolbox(notifier: Arc<RecordingNotifier>) -> Toolbox {
        Toolbox::new(EngineSettings::for_platform(Platform::Linux), notifier)
            .with_platform(Platform::Linux)
            .with_locator(Arc::new(FixedLocator::new()))
    }

    fn script(command: &str) -> ActionConfig {
        ActionConfig {
            action_type: "script".to_string(),
            command: command.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_blank_command_is_config_error() {
        let executor = ScriptExecutor::new(script("   "), toolbox(Arc::default()));
        let err = executor.execute(&ExecutionContext::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.find_context_str("error_type"), Some("empty_command"));
    }

    #[test]
    fn test_args_bypass_the_shell() {
        let config = ActionConfig {
            args: vec!["b".to_string()],
            ..script("echo a")
        };
        let prepared = ScriptExecutor::new(config, toolbox(Arc::default()))
            .prepare()
            .unwrap();
        assert_eq!(prepared.launch.argv(), vec!["echo", "a", "b"]);
        assert!(prepared.wait);
    }

    #[test]
    fn test_custom_shell_picks_its_flag() {
        let config = ActionConfig {
            shell: Some("pwsh".to_string()),
            ..script("Get-Date")
        };
        let prepared = ScriptExecutor::new(config, toolbox(Arc::default()))
            .prepare()
            .unwrap();
        assert_eq!(prepared.base.argv(), vec!["pwsh", "-Command", "Get-Date"]);
    }

    #[test]
    fn test_defaults_to_home_directory_and_detaches_slow_commands() {
        let prepared = ScriptExecutor::new(script("make -j8"), toolbox(Arc::default()))
            .prepare()
            .unwrap();
        assert_eq!(prepared.base.working_dir, dirs::home_dir());
        assert!(!prepared.wait);
        assert!(!prepared.in_terminal);
    }

    #[test]
    fn test_interactive_command_without_terminal_runs_unwrapped() {
        let prepared = ScriptExecutor::new(script("htop"), toolbox(Arc::default()))
            .prepare()
            .unwrap();
        assert!(!prepared.in_terminal);
        assert_eq!(prepared.launch, prepared.base);
    }

    #[test]
    fn test_interactive_command_uses_installed_terminal() {
        let tb = toolbox(Arc::default())
            .with_locator(Arc::new(FixedLocator::new().with("konsole", "/usr/bin/konsole")));
        let prepared = ScriptExecutor::new(script("htop"), tb).prepare().unwrap();
        assert!(prepared.in_terminal);
        assert_eq!(prepared.launch.program, "konsole");
    }

    #[test]
    fn test_describe() {
        let executor = ScriptExecutor::new(script("ls -la"), toolbox(Arc::default()));
        assert_eq!(executor.describe(), "Run script: ls -la");
        let labelled = ActionConfig {
            description: Some("List files".to_string()),
            ..script("ls -la")
        };
        assert_eq!(
            ScriptExecutor::new(labelled, toolbox(Arc::default())).describe(),
            "List files"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_show_output_sends_one_success_notification() {
        // --- Setup ---
        let notifier = Arc::new(RecordingNotifier::default());
        let config = ActionConfig {
            show_output: true,
            working_dir: Some("/tmp".to_string()),
            ..script("echo test")
        };
        let executor = ScriptExecutor::new(config, toolbox(Arc::clone(&notifier)));

        // --- Execute ---
        let outcome = executor.execute(&ExecutionContext::new()).unwrap();

        // --- Assert ---
        assert_eq!(outcome, ExecutionOutcome::Completed { exit_code: 0 });
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].level, Level::Success);
        assert_eq!(sent[0].title, "Script: echo test");
        assert!(sent[0].body.contains("test"));
    }

    #[cfg(unix)]
    #[test]
    fn test_silent_success_is_info() {
        let notifier = Arc::new(RecordingNotifier::default());
        let config = ActionConfig {
            show_output: true,
            working_dir: Some("/tmp".to_string()),
            ..script("true")
        };
        ScriptExecutor::new(config, toolbox(Arc::clone(&notifier)))
            .execute(&ExecutionContext::new())
            .unwrap();
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].level, Level::Info);
        assert_eq!(sent[0].body, "Command completed with no output");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_reports_and_fails() {
        // --- Setup ---
        let notifier = Arc::new(RecordingNotifier::default());
        let config = ActionConfig {
            show_output: true,
            working_dir: Some("/tmp".to_string()),
            ..script("echo broken; exit 4")
        };
        let executor = ScriptExecutor::new(config, toolbox(Arc::clone(&notifier)));

        // --- Execute ---
        let err = executor.execute(&ExecutionContext::new()).unwrap_err();

        // --- Assert ---
        assert_eq!(err.kind(), ErrorKind::System);
        assert_eq!(err.find_context_str("error_type"), Some("execution_failed"));
        assert_eq!(err.find_context("exit_code"), Some(&serde_json::json!(4)));
        assert_eq!(err.find_context_str("working_dir"), Some("/tmp"));
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].level, Level::Error);
        assert!(sent[0].body.starts_with("Failed: exit status 4"));
        assert!(sent[0].body.contains("broken"));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_waited_script() {
        let config = ActionConfig {
            show_output: true,
            timeout: 1,
            working_dir: Some("/tmp".to_string()),
            ..script("sleep 30")
        };
        let started = std::time::Instant::now();
        let err = ScriptExecutor::new(config, toolbox(Arc::default()))
            .execute(&ExecutionContext::new())
            .unwrap_err();
        assert_eq!(err.find_context_str("error_type"), Some("timeout"));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_working_dir_is_start_failure() {
        let config = ActionConfig {
            working_dir: Some("/definitely/not/here".to_string()),
            ..script("echo hi")
        };
        let err = ScriptExecutor::new(config, toolbox(Arc::default()))
            .execute(&ExecutionContext::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::System);
        assert_eq!(err.find_context_str("error_type"), Some("start_failed"));
        assert_eq!(err.find_context_str("working_dir"), Some("/definitely/not/here"));
    }

    #[test]
    fn test_elevation_request_uses_unwrapped_process() {
        let config = ActionConfig {
            working_dir: Some("/etc".to_string()),
            terminal: true,
            ..script("cat shadow")
        };
        let tb = toolbox(Arc::default())
            .with_locator(Arc::new(FixedLocator::new().with("xterm", "/usr/bin/xterm")));
        let request = ScriptExecutor::new(config, tb).elevation_request().unwrap();
        assert!(request.posix_command.starts_with("cd /etc && "));
        assert!(request.posix_command.ends_with("-c 'cat shadow'"));
        assert!(!request.posix_command.contains("xterm"));
    }
}
