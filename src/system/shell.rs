// EN: src/system/shell.rs

use crate::system::Platform;
use crate::system::executor::{ProcessSpec, posix_quote};
use crate::system::probe::{ProbeChain, ToolLocator};
use lazy_static::lazy_static;
use regex::Regex;
use std::env;

/// Terminal emulators tried on Linux, in order.
const LINUX_TERMINALS: &[&str] = &["gnome-terminal", "konsole", "xterm", "xfce4-terminal"];

/// Appended to commands whose terminal must stay open until the user reacts.
const PRESS_ENTER_SUFFIX: &str = "; echo ''; echo 'Press Enter to close...'; read _";

lazy_static! {
    // Separators between the programs of a pipeline or command list.
    static ref COMMAND_SEPARATORS: Regex = Regex::new(r"[\s|;&()]+").expect("Invalid command separator regex.");
}

/// An interpreter and the flag that makes it run a single command string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    /// Interpreter program.
    pub program: String,
    /// "Run this string" flag (`-c`, `/c`, `-Command`).
    pub flag: String,
}

impl ShellCommand {
    /// An interpreter override; the flag is derived from the program's name.
    pub fn custom(program: &str) -> Self {
        Self {
            program: program.to_string(),
            flag: flag_for_shell(program).to_string(),
        }
    }

    /// `[program, flag, command]` as a process spec.
    pub fn invoke(&self, command: &str) -> ProcessSpec {
        ProcessSpec::new(self.program.clone()).args([self.flag.clone(), command.to_string()])
    }
}

/// Picks the run-a-string flag by matching the interpreter's file name.
pub fn flag_for_shell(shell: &str) -> &'static str {
    match program_name(shell.trim()).to_ascii_lowercase().as_str() {
        "powershell" | "pwsh" => "-Command",
        "cmd" => "/c",
        // Bourne shells, fish, csh and interpreters all accept -c.
        _ => "-c",
    }
}

/// The bare program name of a path written for any platform (`/usr/bin/vim` → `vim`,
/// `C:\Windows\System32\cmd.exe` → `cmd`). Both separators are honoured whatever the
/// host is.
pub fn program_name(path: &str) -> &str {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    name.strip_suffix(".exe")
        .or_else(|| name.strip_suffix(".EXE"))
        .unwrap_or(name)
}

/// Per-platform shell knowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellAdapter {
    platform: Platform,
}

impl ShellAdapter {
    /// The adapter for `platform`.
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// The adapter's platform.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The default interactive shell: `$SHELL` (or `/bin/sh`) with `-c` on Unix,
    /// `cmd /c` on Windows.
    pub fn default_shell(&self) -> ShellCommand {
        match self.platform {
            Platform::Windows => ShellCommand {
                program: "cmd".to_string(),
                flag: "/c".to_string(),
            },
            Platform::Linux | Platform::MacOs => {
                let program = env::var("SHELL")
                    .ok()
                    .filter(|shell| !shell.trim().is_empty())
                    .unwrap_or_else(|| "/bin/sh".to_string());
                ShellCommand {
                    program,
                    flag: "-c".to_string(),
                }
            }
        }
    }

    /// Whether `command` runs one of the known full-screen programs (editors, pagers,
    /// monitors) and therefore needs a terminal to be usable.
    ///
    /// Every program position of the line is checked, so `git log | less` matches
    /// while `topology-report` does not.
    pub fn is_interactive_command(&self, command: &str, interactive_programs: &[String]) -> bool {
        let case_insensitive = self.platform == Platform::Windows;
        COMMAND_SEPARATORS
            .split(command)
            .filter(|token| !token.is_empty())
            .map(program_name)
            .any(|name| {
                interactive_programs.iter().any(|program| {
                    if case_insensitive {
                        program.eq_ignore_ascii_case(name)
                    } else {
                        program == name
                    }
                })
            })
    }

    /// Re-wraps `spec` so it runs inside a visible terminal window.
    ///
    /// Returns `None` when no terminal emulator could be found (Linux only); the caller
    /// then runs the command un-wrapped.
    pub fn wrap_in_terminal(
        &self,
        spec: &ProcessSpec,
        keep_open: bool,
        locator: &dyn ToolLocator,
    ) -> Option<ProcessSpec> {
        let wrapped = match self.platform {
            Platform::Linux => wrap_linux(spec, keep_open, locator)?,
            Platform::MacOs => wrap_macos(spec, keep_open),
            Platform::Windows => wrap_windows(spec, keep_open),
        };
        Some(ProcessSpec {
            working_dir: spec.working_dir.clone(),
            env: spec.env.clone(),
            capture_output: spec.capture_output,
            ..wrapped
        })
    }
}

fn wrap_linux(spec: &ProcessSpec, keep_open: bool, locator: &dyn ToolLocator) -> Option<ProcessSpec> {
    let (terminal, _) = match ProbeChain::new("terminal", LINUX_TERMINALS).first_installed(locator) {
        Ok(found) => found,
        Err(exhausted) => {
            log::debug!(
                "No terminal emulator found (tried {:?}); running without one",
                exhausted.tried()
            );
            return None;
        }
    };
    let terminal = *terminal;
    let wrapped = match (terminal, keep_open) {
        ("gnome-terminal", true) => ProcessSpec::new(terminal).args([
            "--".to_string(),
            "bash".to_string(),
            "-c".to_string(),
            format!("{}{}", spec.command_line(), PRESS_ENTER_SUFFIX),
        ]),
        ("gnome-terminal", false) => ProcessSpec::new(terminal).arg("--").args(spec.argv()),
        ("xterm", true) => ProcessSpec::new(terminal).args(["-hold", "-e"]).args(spec.argv()),
        ("xfce4-terminal", true) => ProcessSpec::new(terminal).args(["--hold", "-x"]).args(spec.argv()),
        ("xfce4-terminal", false) => ProcessSpec::new(terminal).arg("-x").args(spec.argv()),
        (_, true) => ProcessSpec::new(terminal).args(["--hold", "-e"]).args(spec.argv()),
        (_, false) => ProcessSpec::new(terminal).arg("-e").args(spec.argv()),
    };
    log::debug!("Wrapping command in {}", terminal);
    Some(wrapped)
}

fn wrap_macos(spec: &ProcessSpec, keep_open: bool) -> ProcessSpec {
    // Terminal.app starts a fresh login shell, so directory and environment travel inline.
    let mut line = String::new();
    if let Some(dir) = &spec.working_dir {
        line.push_str("cd ");
        line.push_str(&posix_quote(&dir.to_string_lossy()));
        line.push_str(" && ");
    }
    if !spec.env.is_empty() {
        line.push_str("env");
        for (key, value) in &spec.env {
            line.push(' ');
            line.push_str(&posix_quote(&format!("{}={}", key, value)));
        }
        line.push(' ');
    }
    line.push_str(&spec.command_line());
    if keep_open {
        line.push_str(PRESS_ENTER_SUFFIX);
    }
    let script = format!(
        "tell application \"Terminal\" to do script \"{}\"",
        escape_for_applescript(&line)
    );
    ProcessSpec::new("osascript").args(["-e".to_string(), script])
}

fn wrap_windows(spec: &ProcessSpec, keep_open: bool) -> ProcessSpec {
    // /k keeps the window open, /c closes it after execution.
    let flag = if keep_open { "/k" } else { "/c" };
    ProcessSpec::new("cmd").args([
        "/c".to_string(),
        "start".to_string(),
        "cmd".to_string(),
        flag.to_string(),
        spec.windows_command_line(),
    ])
}

/// Escapes a string for use inside an AppleScript string literal.
pub fn escape_for_applescript(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::probe::FixedLocator;

    fn programs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flag_for_shell() {
        assert_eq!(flag_for_shell("powershell"), "-Command");
        assert_eq!(flag_for_shell("pwsh"), "-Command");
        assert_eq!(flag_for_shell("C:\\Windows\\System32\\cmd.exe"), "/c");
        assert_eq!(flag_for_shell("cmd"), "/c");
        assert_eq!(flag_for_shell("/usr/bin/zsh"), "-c");
        assert_eq!(flag_for_shell("python3"), "-c");
        assert_eq!(flag_for_shell("D:/tools/PowerShell/pwsh.exe"), "-Command");
    }

    #[test]
    fn test_program_name_ignores_host_separator() {
        assert_eq!(program_name("C:\\Windows\\System32\\cmd.exe"), "cmd");
        assert_eq!(program_name("C:\\Tools\\VIM.EXE"), "VIM");
        assert_eq!(program_name("/usr/bin/vim"), "vim");
        assert_eq!(program_name("htop"), "htop");
    }

    #[test]
    fn test_windows_default_shell() {
        let shell = ShellAdapter::new(Platform::Windows).default_shell();
        assert_eq!(shell.program, "cmd");
        assert_eq!(shell.flag, "/c");
    }

    #[test]
    fn test_unix_default_shell_uses_dash_c() {
        let shell = ShellAdapter::new(Platform::Linux).default_shell();
        assert_eq!(shell.flag, "-c");
        assert!(!shell.program.is_empty());
    }

    #[test]
    fn test_interactive_heuristic_matches_program_positions() {
        let adapter = ShellAdapter::new(Platform::Linux);
        let list = programs(&["vim", "less", "top"]);
        assert!(adapter.is_interactive_command("vim ~/.bashrc", &list));
        assert!(adapter.is_interactive_command("git log | less", &list));
        assert!(adapter.is_interactive_command("/usr/bin/vim notes.md", &list));
        assert!(!adapter.is_interactive_command("topology-report --all", &list));
        assert!(!adapter.is_interactive_command("echo hello", &list));
    }

    #[test]
    fn test_interactive_heuristic_is_case_insensitive_on_windows() {
        let adapter = ShellAdapter::new(Platform::Windows);
        assert!(adapter.is_interactive_command("EDIT.EXE config.sys", &programs(&["edit"])));
    }

    #[test]
    fn test_linux_wrap_prefers_first_installed_terminal() {
        let adapter = ShellAdapter::new(Platform::Linux);
        let locator = FixedLocator::new().with("xterm", "/usr/bin/xterm");
        let spec = ProcessSpec::new("sh").args(["-c", "htop"]);
        let wrapped = adapter.wrap_in_terminal(&spec, true, &locator).unwrap();
        assert_eq!(wrapped.argv(), vec!["xterm", "-hold", "-e", "sh", "-c", "htop"]);
    }

    #[test]
    fn test_gnome_terminal_keep_open_waits_for_enter() {
        let adapter = ShellAdapter::new(Platform::Linux);
        let locator = FixedLocator::new()
            .with("gnome-terminal", "/usr/bin/gnome-terminal")
            .with("xterm", "/usr/bin/xterm");
        let spec = ProcessSpec::new("sh").args(["-c", "make"]);
        let wrapped = adapter.wrap_in_terminal(&spec, true, &locator).unwrap();
        assert_eq!(wrapped.program, "gnome-terminal");
        let last = wrapped.args.last().unwrap();
        assert!(last.starts_with("sh -c make"));
        assert!(last.contains("Press Enter to close..."));
    }

    #[test]
    fn test_linux_wrap_without_terminal_returns_none() {
        let adapter = ShellAdapter::new(Platform::Linux);
        let spec = ProcessSpec::new("vim");
        assert!(adapter.wrap_in_terminal(&spec, false, &FixedLocator::new()).is_none());
    }

    #[test]
    fn test_wrap_preserves_working_dir_and_env() {
        let adapter = ShellAdapter::new(Platform::Windows);
        let spec = ProcessSpec {
            working_dir: Some("C:\\work".into()),
            env: vec![("A".to_string(), "1".to_string())],
            ..ProcessSpec::new("cmd").args(["/c", "dir"])
        };
        let wrapped = adapter.wrap_in_terminal(&spec, true, &FixedLocator::new()).unwrap();
        assert_eq!(
            wrapped.argv(),
            vec!["cmd", "/c", "start", "cmd", "/k", "cmd /c dir"]
        );
        assert_eq!(wrapped.working_dir, spec.working_dir);
        assert_eq!(wrapped.env, spec.env);
    }

    #[test]
    fn test_macos_wrap_uses_terminal_app() {
        let adapter = ShellAdapter::new(Platform::MacOs);
        let spec = ProcessSpec::new("sh").args(["-c", "say \"hi\""]);
        let wrapped = adapter.wrap_in_terminal(&spec, false, &FixedLocator::new()).unwrap();
        assert_eq!(wrapped.program, "osascript");
        let script = &wrapped.args[1];
        assert!(script.starts_with("tell application \"Terminal\" to do script \""));
        assert!(script.contains("\\\"hi\\\""));
    }

    #[test]
    fn test_macos_wrap_carries_env_and_working_dir() {
        let adapter = ShellAdapter::new(Platform::MacOs);
        let spec = ProcessSpec {
            working_dir: Some("/tmp/work dir".into()),
            env: vec![("MODE".to_string(), "full sync".to_string())],
            ..ProcessSpec::new("sh").args(["-c", "make"])
        };
        let wrapped = adapter.wrap_in_terminal(&spec, false, &FixedLocator::new()).unwrap();
        let script = &wrapped.args[1];
        assert_eq!(
            script,
            "tell application \"Terminal\" to do script \"cd '/tmp/work dir' && env 'MODE=full sync' sh -c make\""
        );
    }

    #[test]
    fn test_escape_for_applescript() {
        assert_eq!(escape_for_applescript("a\"b\\c\n"), "a\\\"b\\\\c\\n");
    }
}
