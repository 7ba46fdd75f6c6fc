// EN: src/core/elevation.rs

//! Runs an executor with administrator rights.
//!
//! When the process is already privileged the wrapped executor runs unchanged.
//! Otherwise its [`ElevationRequest`] is handed to a platform front-end: the first
//! working one of pkexec, gksudo, kdesudo and `sudo -A` on Linux, an AppleScript
//! `with administrator privileges` prompt on macOS, or `Start-Process -Verb RunAs` on
//! Windows. The front-end is always waited on; output capture and notifications of the
//! wrapped action do not survive the privilege boundary.

use crate::core::action::{ElevationRequest, Executor, Toolbox};
use crate::core::context::ExecutionContext;
use crate::errors::{ActionError, ErrorKind};
use crate::models::ExecutionOutcome;
use crate::system::Platform;
use crate::system::executor::{self, ProcessError, ProcessSpec};
use crate::system::probe::{Candidate, ProbeChain};
use crate::system::shell::escape_for_applescript;

/// One Linux privilege front-end and the arguments placed before `sh -c <command>`.
#[derive(Debug, Clone, Copy)]
struct ElevationTool {
    name: &'static str,
    prefix: &'static [&'static str],
}

impl Candidate for ElevationTool {
    fn name(&self) -> &str {
        self.name
    }
}

const LINUX_TOOLS: &[ElevationTool] = &[
    ElevationTool {
        name: "pkexec",
        prefix: &["sh", "-c"],
    },
    ElevationTool {
        name: "gksudo",
        prefix: &["--", "sh", "-c"],
    },
    ElevationTool {
        name: "kdesudo",
        prefix: &["--", "sh", "-c"],
    },
    ElevationTool {
        name: "sudo",
        prefix: &["-A", "sh", "-c"],
    },
];

/// Decorates an executor so it runs elevated.
#[derive(Debug)]
pub struct ElevatedExecutor<E> {
    inner: E,
    toolbox: Toolbox,
}

impl<E: Executor> ElevatedExecutor<E> {
    /// Wraps `inner`; the privilege check happens on each `execute`.
    pub fn new(inner: E, toolbox: Toolbox) -> Self {
        Self { inner, toolbox }
    }

    /// The wrapped executor.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    fn escalate(&self, ctx: &ExecutionContext) -> Result<ExecutionOutcome, ActionError> {
        let request = self.inner.elevation_request()?;
        if request.captures_output {
            log::warn!(
                "'{}' asked for its output, which is not captured when running elevated",
                self.inner.describe()
            );
        }
        match self.toolbox.platform {
            Platform::Linux => self.escalate_linux(&request, ctx),
            Platform::MacOs => {
                log::debug!("Requesting administrator privileges for: {}", request.posix_command);
                let script = format!(
                    "do shell script \"{}\" with administrator privileges",
                    escape_for_applescript(&request.posix_command)
                );
                let spec = ProcessSpec::new("osascript").args(["-e".to_string(), script]);
                self.run_front_end("osascript", &spec, ctx)
            }
            Platform::Windows => {
                log::debug!("Requesting Administrator privileges for: {}", request.windows_command);
                let script = format!(
                    "Start-Process cmd -ArgumentList '/c {}' -Verb RunAs -Wait",
                    escape_for_powershell(&request.windows_command)
                );
                let spec = ProcessSpec::new("powershell").args(["-Command".to_string(), script]);
                self.run_front_end("powershell", &spec, ctx)
            }
        }
    }

    fn escalate_linux(
        &self,
        request: &ElevationRequest,
        ctx: &ExecutionContext,
    ) -> Result<ExecutionOutcome, ActionError> {
        log::debug!("Requesting elevated privileges for: {}", request.posix_command);
        let chain = ProbeChain::new("elevation", LINUX_TOOLS);
        let attempt = chain.first_success(|tool| {
            // Stop spawning prompts once the caller has given up.
            ctx.check().map_err(|reason| format!("skipped: {:?}", reason))?;
            let path = self
                .toolbox
                .locator
                .locate(tool.name)
                .ok_or_else(|| "not installed".to_string())?;
            let mut spec = ProcessSpec::new(path.to_string_lossy())
                .args(tool.prefix.iter().copied())
                .arg(request.posix_command.as_str());
            if tool.name == "sudo" {
                spec.env
                    .push(("SUDO_ASKPASS".to_string(), self.toolbox.settings.sudo_askpass.clone()));
            }
            match executor::run_to_completion(&spec, ctx) {
                Ok(finished) if finished.success => Ok(tool.name),
                Ok(finished) => Err(format!("exited with {:?}", finished.exit_code)),
                Err(e) => Err(e.to_string()),
            }
        });

        match attempt {
            Ok(tool) => Ok(ExecutionOutcome::Elevated {
                tool: tool.to_string(),
            }),
            Err(exhausted) => {
                if let Err(reason) = ctx.check() {
                    return Err(ActionError::system(format!("elevation interrupted: {:?}", reason))
                        .with_context("error_type", "cancelled")
                        .with_context("tried_tools", exhausted.tried()));
                }
                for failure in &exhausted.failures {
                    log::warn!("Elevation with {} failed: {}", failure.candidate, failure.reason);
                }
                Err(ActionError::permission("no suitable elevation tool found")
                    .with_context("tried_tools", exhausted.tried())
                    .with_context("error_type", "elevation_unavailable"))
            }
        }
    }

    fn run_front_end(
        &self,
        tool: &str,
        spec: &ProcessSpec,
        ctx: &ExecutionContext,
    ) -> Result<ExecutionOutcome, ActionError> {
        match executor::run_to_completion(spec, ctx) {
            Ok(finished) if finished.success => Ok(ExecutionOutcome::Elevated {
                tool: tool.to_string(),
            }),
            Ok(finished) => {
                let err = ActionError::system(format!("{} exited with an error", tool))
                    .with_context("tool", tool)
                    .with_context("error_type", "elevation_failed");
                Err(match finished.exit_code {
                    Some(code) => err.with_context("exit_code", code),
                    None => err,
                })
            }
            Err(e @ (ProcessError::Cancelled(_) | ProcessError::TimedOut(_))) => {
                Err(ActionError::wrap(ErrorKind::System, "elevation interrupted", e)
                    .with_context("tool", tool)
                    .with_context("error_type", "cancelled"))
            }
            Err(e) => Err(ActionError::wrap(
                ErrorKind::System,
                format!("failed to start {}", tool),
                e,
            )
            .with_context("tool", tool)
            .with_context("error_type", "start_failed")),
        }
    }
}

impl<E: Executor> Executor for ElevatedExecutor<E> {
    fn execute(&self, ctx: &ExecutionContext) -> Result<ExecutionOutcome, ActionError> {
        if self.toolbox.privilege.is_privileged() {
            log::debug!("Already privileged; running '{}' directly", self.inner.describe());
            return self.inner.execute(ctx);
        }
        self.escalate(ctx)
    }

    fn describe(&self) -> String {
        format!("[Admin] {}", self.inner.describe())
    }

    fn elevation_request(&self) -> Result<ElevationRequest, ActionError> {
        self.inner.elevation_request()
    }
}

/// Escapes a string for use inside a single-quoted PowerShell string.
pub fn escape_for_powershell(s: &str) -> String {
    s.replace('\'', "''")
        .replace('\n', "`n")
        .replace('\r', "`r")
        .replace('"', "`\"")
}
