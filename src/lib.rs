//! # spellcast
//!
//! Resolves a named action ("spell") from the active grimoire into a concrete OS
//! operation (launch an application, run a script, open a URL), decides how to run it
//! (shell or direct exec, terminal or background, elevated or not) and reports a
//! context-rich result.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Shared cancellation flag. Setting it to `true` asks every wait loop observing it to
/// kill its child process and return.
pub type CancellationToken = Arc<AtomicBool>;

pub mod cli;
pub mod constants;
pub mod core;
pub mod errors;
pub mod models;
pub mod notify;
pub mod state;
pub mod system;
