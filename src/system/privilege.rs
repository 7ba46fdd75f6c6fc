// EN: src/system/privilege.rs

use crate::system::Platform;
use std::fmt;
use std::fs;
use std::process::{Command, Stdio};

/// Answers whether the current process already runs with administrator rights.
pub trait PrivilegeProbe: fmt::Debug + Send + Sync {
    fn is_privileged(&self) -> bool;
}

/// Checks the real process on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessPrivilege;

impl PrivilegeProbe for ProcessPrivilege {
    fn is_privileged(&self) -> bool {
        is_running_as_admin()
    }
}

/// A fixed answer, for hosts where the live check is not wanted.
#[derive(Debug, Clone, Copy)]
pub struct FixedPrivilege(pub bool);

impl PrivilegeProbe for FixedPrivilege {
    fn is_privileged(&self) -> bool {
        self.0
    }
}

/// Whether this process is elevated.
///
/// Windows: the raw disk device can only be opened by administrators.
/// Unix: the effective UID is 0, read from `/proc/self/status` with `id -u` as fallback.
pub fn is_running_as_admin() -> bool {
    match Platform::current() {
        Platform::Windows => fs::File::open(r"\\.\PHYSICALDRIVE0").is_ok(),
        Platform::Linux | Platform::MacOs => effective_uid() == Some(0),
    }
}

fn effective_uid() -> Option<u32> {
    if let Some(uid) = fs::read_to_string("/proc/self/status")
        .ok()
        .and_then(|status| parse_effective_uid(&status))
    {
        return Some(uid);
    }

    // No procfs (macOS); ask `id`.
    let output = Command::new("id")
        .arg("-u")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        log::debug!("`id -u` exited with {}", output.status);
        return None;
    }
    String::from_utf8_lossy(&output.stdout).trim().parse().ok()
}

/// Extracts the effective UID from the `Uid:` line of a procfs status file
/// (`Uid: real effective saved filesystem`).
pub fn parse_effective_uid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("Uid:"))
        .and_then(|ids| ids.split_whitespace().nth(1))
        .and_then(|euid| euid.parse().ok())
}
