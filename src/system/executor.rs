// EN: src/system/executor.rs

use crate::core::context::{ExecutionContext, Interruption};
use crate::system::output::SharedOutput;
use std::borrow::Cow;
use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

/// How often a waited-on process is polled for exit, cancellation and deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Failures while spawning or supervising a child process.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The OS refused to start the program.
    #[error("Command '{0}' could not be started")]
    Spawn(String, #[source] io::Error),
    /// A stdout/stderr pipe could not be read.
    #[error("Output of '{0}' could not be captured")]
    Capture(String, #[source] io::Error),
    /// Polling the child for its exit status failed.
    #[error("Failed to wait for '{0}'")]
    Wait(String, #[source] io::Error),
    /// The caller cancelled; the child was killed.
    #[error("Command '{0}' was cancelled.")]
    Cancelled(String),
    /// The deadline passed; the child was killed.
    #[error("Command '{0}' did not finish before its deadline.")]
    TimedOut(String),
}

/// A fully prepared, inspectable description of one process start.
///
/// Executors and adapters only ever build these; nothing is spawned until
/// [`spawn`] is called, which keeps every launch decision testable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSpec {
    /// Program name or path.
    pub program: String,
    /// Arguments, not including the program.
    pub args: Vec<String>,
    /// Working directory; `None` inherits the caller's.
    pub working_dir: Option<PathBuf>,
    /// Variables layered over the inherited environment, applied in order.
    pub env: Vec<(String, String)>,
    /// Pipe stdout and stderr into a shared buffer instead of discarding them.
    pub capture_output: bool,
}

impl ProcessSpec {
    /// A spec for `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// `[program, args...]`, the argv the OS will see.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// The argv as one POSIX-quoted line, for logs and for re-wrapping in another shell.
    pub fn command_line(&self) -> String {
        self.argv()
            .iter()
            .map(|part| posix_quote(part).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The argv as one `cmd.exe` line, quoting parts that contain whitespace.
    pub fn windows_command_line(&self) -> String {
        self.argv()
            .iter()
            .map(|part| {
                if part.is_empty() || part.contains(char::is_whitespace) {
                    format!("\"{}\"", part.replace('"', "\\\""))
                } else {
                    part.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Builds the `std::process::Command` for this spec. stdin is always closed.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).stdin(Stdio::null());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dunce::simplified(dir));
        }
        for (key, value) in &self.env {
            command.env(key, value);
        }
        if self.capture_output {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }
        command
    }
}

/// Quotes `s` for a POSIX shell. NUL bytes cannot be represented and are dropped.
pub fn posix_quote(s: &str) -> Cow<'_, str> {
    match shlex::try_quote(s) {
        Ok(quoted) => quoted,
        Err(_) => Cow::Owned(
            shlex::try_quote(&s.replace('\0', ""))
                .map(Cow::into_owned)
                .unwrap_or_default(),
        ),
    }
}

/// A started child process.
#[derive(Debug)]
pub struct RunningProcess {
    child: Child,
    command: String,
    output: Option<SharedOutput>,
    readers: Vec<JoinHandle<()>>,
}

/// What a waited-on process left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedProcess {
    /// Exit code, or `None` when the process was ended by a signal.
    pub exit_code: Option<i32>,
    /// Whether the process reported success.
    pub success: bool,
    /// Captured output, when the spec asked for capture.
    pub output: Option<String>,
}

/// Starts the process described by `spec`.
///
/// With `capture_output`, both pipes are drained into one buffer capped at
/// `output_limit` bytes.
pub fn spawn(spec: &ProcessSpec, output_limit: usize) -> Result<RunningProcess, ProcessError> {
    let command_line = spec.command_line();
    log::debug!("Spawning: {}", command_line);

    let mut child = spec
        .to_command()
        .spawn()
        .map_err(|e| ProcessError::Spawn(command_line.clone(), e))?;

    let mut readers = Vec::new();
    let output = if spec.capture_output {
        let sink = SharedOutput::new(output_limit);
        if let Some(stdout) = child.stdout.take() {
            readers.push(
                sink.drain(stdout)
                    .map_err(|e| ProcessError::Capture(command_line.clone(), e))?,
            );
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(
                sink.drain(stderr)
                    .map_err(|e| ProcessError::Capture(command_line.clone(), e))?,
            );
        }
        Some(sink)
    } else {
        None
    };

    Ok(RunningProcess {
        child,
        command: command_line,
        output,
        readers,
    })
}

/// Spawns `spec` without capture and waits for it under `ctx`.
pub fn run_to_completion(
    spec: &ProcessSpec,
    ctx: &ExecutionContext,
) -> Result<FinishedProcess, ProcessError> {
    spawn(spec, 0)?.wait(ctx)
}

impl RunningProcess {
    /// OS process id.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// A handle on the capture buffer; still readable after [`wait`](Self::wait) fails.
    pub fn output_handle(&self) -> Option<SharedOutput> {
        self.output.clone()
    }

    /// Releases the process: the caller stops tracking it and cancellation no longer
    /// reaches it. A reaper thread collects the exit status so no zombie is left.
    pub fn detach(self) -> u32 {
        let RunningProcess {
            mut child,
            command,
            readers,
            ..
        } = self;
        let pid = child.id();
        let reaper = thread::Builder::new()
            .name(format!("spellcast-reaper-{}", pid))
            .spawn(move || {
                match child.wait() {
                    Ok(status) => log::trace!("Detached '{}' exited: {}", command, status),
                    Err(e) => log::debug!("Could not reap detached '{}': {}", command, e),
                }
                for reader in readers {
                    reader.join().ok();
                }
            });
        if let Err(e) = reaper {
            log::warn!("Failed to start reaper for pid {}: {}", pid, e);
        }
        pid
    }

    /// Waits for exit while honouring `ctx`. On cancellation or deadline expiry the
    /// child is killed before returning.
    pub fn wait(mut self, ctx: &ExecutionContext) -> Result<FinishedProcess, ProcessError> {
        let status = self.wait_for_status(ctx)?;
        self.wait_for_readers(ctx)?;
        Ok(FinishedProcess {
            exit_code: status.code(),
            success: status.success(),
            output: self.output.as_ref().map(SharedOutput::contents),
        })
    }

    fn wait_for_status(&mut self, ctx: &ExecutionContext) -> Result<ExitStatus, ProcessError> {
        // Non-blocking wait loop to allow for cancellation and deadlines.
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if let Err(reason) = ctx.check() {
                        log::debug!(
                            "Stopping '{}' (PID: {}): {:?}",
                            self.command,
                            self.child.id(),
                            reason
                        );
                        if let Err(e) = self.child.kill() {
                            log::warn!("Failed to kill child process {}: {}", self.child.id(), e);
                        }
                        // Reap it so the kill is final before we report.
                        self.child.wait().ok();
                        return Err(self.interrupted(reason));
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(ProcessError::Wait(self.command.clone(), e)),
            }
        }
    }

    /// Waits for the pipe readers to hit EOF. A backgrounded grandchild can hold the
    /// pipes open after the child exited, so this wait is bounded by `ctx` as well.
    fn wait_for_readers(&mut self, ctx: &ExecutionContext) -> Result<(), ProcessError> {
        while self.readers.iter().any(|reader| !reader.is_finished()) {
            if let Err(reason) = ctx.check() {
                log::debug!(
                    "'{}' exited but its output pipes are still open: {:?}",
                    self.command,
                    reason
                );
                // The readers stay detached; whatever they already captured is kept.
                self.readers.clear();
                return Err(self.interrupted(reason));
            }
            thread::sleep(POLL_INTERVAL);
        }
        for reader in self.readers.drain(..) {
            reader.join().ok();
        }
        Ok(())
    }

    fn interrupted(&self, reason: Interruption) -> ProcessError {
        match reason {
            Interruption::Cancelled => ProcessError::Cancelled(self.command.clone()),
            Interruption::DeadlineExceeded => ProcessError::TimedOut(self.command.clone()),
        }
    }
}
