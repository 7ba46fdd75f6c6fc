// EN: src/cli/handlers/commons.rs

// This module contains shared functions used by multiple handlers.

use crate::{
    constants::GRIMOIRE_FILENAME,
    core::{
        action::Toolbox,
        manager::ActionManager,
        settings::{self, EngineSettings},
    },
    models::Grimoire,
    notify::ConsoleNotifier,
};
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// On-disk layout of a grimoire: one `[spells.<name>]` table per action.
#[derive(Deserialize, Debug, Default)]
struct GrimoireFile {
    #[serde(default)]
    spells: Grimoire,
}

/// What every handler needs to know about the invocation.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// `--grimoire` override.
    pub grimoire: Option<PathBuf>,
}

impl Invocation {
    /// The grimoire file this invocation reads.
    pub fn grimoire_path(&self) -> Result<PathBuf> {
        match &self.grimoire {
            Some(path) => Ok(path.clone()),
            None => Ok(settings::config_dir()?.join(GRIMOIRE_FILENAME)),
        }
    }

    /// Loads settings and the grimoire and builds a manager for them.
    pub fn manager(&self) -> Result<ActionManager> {
        let settings = settings::load_settings().unwrap_or_else(|e| {
            log::warn!("Could not load engine settings, using defaults: {}", e);
            EngineSettings::default()
        });
        let grimoire = load_grimoire(&self.grimoire_path()?)?;
        let toolbox = Toolbox::new(settings, Arc::new(ConsoleNotifier::default()));
        Ok(ActionManager::new(grimoire, toolbox))
    }
}

/// Reads and parses a grimoire file.
pub fn load_grimoire(path: &Path) -> Result<Grimoire> {
    if !path.exists() {
        return Err(anyhow!(
            "Grimoire not found at '{}'. Create it with one [spells.<name>] table per spell, or pass --grimoire <file>.",
            path.display()
        ));
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read grimoire '{}'", path.display()))?;
    let file: GrimoireFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse grimoire '{}'", path.display()))?;
    log::debug!(
        "Loaded {} spell(s) from {}",
        file.spells.len(),
        path.display()
    );
    Ok(file.spells)
}
