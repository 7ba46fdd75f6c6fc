// EN: src/system/probe.rs

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Finds external tools by name.
pub trait ToolLocator: fmt::Debug + Send + Sync {
    /// Returns the resolved path of `program`, or `None` when it is not installed.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Whether `program` can be found at all.
    fn is_available(&self, program: &str) -> bool {
        self.locate(program).is_some()
    }
}

/// Looks tools up on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathLocator;

impl ToolLocator for PathLocator {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

/// A fixed name → path table. Nothing outside the table is found.
///
/// Useful to pin tool locations (or to make probing deterministic in tests).
#[derive(Debug, Default, Clone)]
pub struct FixedLocator {
    tools: HashMap<String, PathBuf>,
}

impl FixedLocator {
    /// An empty table: every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one entry.
    pub fn with(mut self, program: &str, path: impl Into<PathBuf>) -> Self {
        self.tools.insert(program.to_string(), path.into());
        self
    }
}

impl ToolLocator for FixedLocator {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        self.tools.get(program).cloned()
    }
}

/// Something a [`ProbeChain`] can try.
pub trait Candidate {
    /// Name used in logs and in the exhaustion report.
    fn name(&self) -> &str;
}

impl Candidate for &str {
    fn name(&self) -> &str {
        self
    }
}

impl Candidate for String {
    fn name(&self) -> &str {
        self
    }
}

/// Why one candidate was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    /// The candidate's name.
    pub candidate: String,
    /// Human-readable reason.
    pub reason: String,
}

/// Every candidate of a chain failed (or the chain was empty).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("none of {} candidate(s) succeeded", .failures.len())]
pub struct ChainExhausted {
    /// One entry per candidate, in the order they were tried.
    pub failures: Vec<ProbeFailure>,
}

impl ChainExhausted {
    /// Names of the candidates that were tried.
    pub fn tried(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.candidate.clone()).collect()
    }
}

/// An ordered list of independently fallible attempts. The first success wins.
#[derive(Debug, Clone, Copy)]
pub struct ProbeChain<'a, C> {
    label: &'a str,
    candidates: &'a [C],
}

impl<'a, C: Candidate> ProbeChain<'a, C> {
    /// Creates a chain over `candidates`. `label` only shows up in logs.
    pub fn new(label: &'a str, candidates: &'a [C]) -> Self {
        Self { label, candidates }
    }

    /// Runs `attempt` on each candidate in order and returns the first success.
    pub fn first_success<T, E: fmt::Display>(
        &self,
        mut attempt: impl FnMut(&'a C) -> Result<T, E>,
    ) -> Result<T, ChainExhausted> {
        let mut failures = Vec::with_capacity(self.candidates.len());
        for candidate in self.candidates {
            match attempt(candidate) {
                Ok(value) => {
                    log::debug!("{}: using '{}'", self.label, candidate.name());
                    return Ok(value);
                }
                Err(reason) => {
                    log::debug!(
                        "{}: '{}' unavailable ({}), trying next",
                        self.label,
                        candidate.name(),
                        reason
                    );
                    failures.push(ProbeFailure {
                        candidate: candidate.name().to_string(),
                        reason: reason.to_string(),
                    });
                }
            }
        }
        Err(ChainExhausted { failures })
    }

    /// The common case: the first candidate that `locator` can find on this system.
    pub fn first_installed(
        &self,
        locator: &dyn ToolLocator,
    ) -> Result<(&'a C, PathBuf), ChainExhausted> {
        self.first_success(|candidate| {
            locator
                .locate(candidate.name())
                .map(|path| (candidate, path))
                .ok_or("not found on PATH")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_success_short_circuits() {
        let candidates = ["a", "b", "c"];
        let mut tried = Vec::new();
        let result = ProbeChain::new("test", &candidates).first_success(|c| {
            tried.push(c.to_string());
            if *c == "b" { Ok(c.to_uppercase()) } else { Err("nope") }
        });
        assert_eq!(result.unwrap(), "B");
        assert_eq!(tried, vec!["a", "b"]);
    }

    #[test]
    fn test_exhausted_chain_reports_every_candidate() {
        let candidates = ["x", "y"];
        let err = ProbeChain::new("test", &candidates)
            .first_success(|_| Err::<(), _>("missing"))
            .unwrap_err();
        assert_eq!(err.tried(), vec!["x", "y"]);
        assert_eq!(err.failures[0].reason, "missing");
    }

    #[test]
    fn test_first_installed_uses_locator_order() {
        let locator = FixedLocator::new()
            .with("konsole", "/usr/bin/konsole")
            .with("xterm", "/usr/bin/xterm");
        let candidates = ["gnome-terminal", "konsole", "xterm"];
        let (name, path) = ProbeChain::new("terminal", &candidates)
            .first_installed(&locator)
            .unwrap();
        assert_eq!(*name, "konsole");
        assert_eq!(path, PathBuf::from("/usr/bin/konsole"));
    }

    #[test]
    fn test_first_installed_with_nothing_installed() {
        let candidates = ["pkexec", "sudo"];
        let err = ProbeChain::new("elevation", &candidates)
            .first_installed(&FixedLocator::new())
            .unwrap_err();
        assert_eq!(err.tried(), vec!["pkexec", "sudo"]);
    }
}
