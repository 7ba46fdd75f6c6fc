//! # System Interaction Layer
//!
//! This module is the boundary between the action engine and the operating system.
//! Everything that knows about process creation, shells, terminal emulators, URL
//! openers or privilege levels lives here; the executors in `core` only describe what
//! they want and hand it to these helpers.
//!
//! ## Modules
//!
//! - **`executor`**: the prepared [`executor::ProcessSpec`] and the spawn / detach /
//!   cancellation-aware wait logic built on `std::process`.
//! - **`shell`**: default shells, shell flags, the interactive-command heuristic and
//!   terminal wrapping for each platform.
//! - **`launcher`**: decides how an application path is opened on each platform.
//! - **`output`**: the bounded in-memory sink used when a script's output is captured.
//! - **`probe`**: PATH lookup and the ordered probe chain used for best-effort tool
//!   discovery (terminals, browsers, elevation front-ends).
//! - **`privilege`**: live checks of the current process' privilege level.

use std::fmt;

pub mod executor;
pub mod launcher;
pub mod output;
pub mod privilege;
pub mod probe;
pub mod shell;

/// The process-launch model an adapter follows.
///
/// Adapters take the platform as a value rather than compiling it in, so the Windows
/// and macOS rules can be exercised on any host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Linux and other freedesktop-style Unix systems.
    Linux,
    /// macOS.
    MacOs,
    /// Windows.
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
        };
        f.write_str(name)
    }
}
