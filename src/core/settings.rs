// EN: src/core/settings.rs

use crate::constants::{
    APP_DIR, DEFAULT_OUTPUT_LIMIT, DEFAULT_SUDO_ASKPASS, SETTINGS_FILENAME,
};
use crate::system::Platform;
use crate::system::shell::program_name;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

lazy_static! {
    static ref SPELLCAST_CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

/// Failures locating, reading or writing the settings file.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The platform has no config directory.
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    /// The spellcast directory could not be created.
    #[error("Could not create config directory at '{path}': {source}")]
    ConfigDirCreation {
        /// Directory that was being created.
        path: String,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// Reading or writing the settings file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not valid TOML for [`EngineSettings`].
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    /// The defaults could not be written out.
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Engine-wide policy, independent of any single action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Programs whose scripts are waited for even without `show_output`.
    pub quick_commands: Vec<String>,
    /// Full-screen programs that force a terminal window.
    pub interactive_commands: Vec<String>,
    /// Cap on captured output, in bytes. `0` disables the cap.
    pub output_limit: usize,
    /// Helper `sudo -A` uses to prompt for a password.
    pub sudo_askpass: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::for_platform(Platform::current())
    }
}

impl EngineSettings {
    /// Defaults for `platform`.
    pub fn for_platform(platform: Platform) -> Self {
        let interactive: &[&str] = match platform {
            Platform::Windows => &["vim", "nano", "more", "edit"],
            Platform::Linux | Platform::MacOs => {
                &["vim", "nano", "emacs", "htop", "top", "less", "more"]
            }
        };
        Self {
            quick_commands: ["git", "echo", "date", "pwd", "ls", "true", "false"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            interactive_commands: interactive.iter().map(|s| s.to_string()).collect(),
            output_limit: DEFAULT_OUTPUT_LIMIT,
            sudo_askpass: DEFAULT_SUDO_ASKPASS.to_string(),
        }
    }

    /// Whether a script starting with `program` should be waited for.
    pub fn is_quick_command(&self, program: &str) -> bool {
        let name = program_name(program);
        self.quick_commands.iter().any(|quick| quick == name)
    }
}

/// Returns the spellcast configuration directory (`<config_dir>/spellcast`),
/// creating it if needed. The result is cached after the first call.
pub fn config_dir() -> Result<PathBuf, SettingsError> {
    let mut cached = SPELLCAST_CONFIG_DIR
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(path) = &*cached {
        return Ok(path.clone());
    }

    let path = dirs::config_dir()
        .ok_or(SettingsError::ConfigDirNotFound)?
        .join(APP_DIR);
    if !path.exists() {
        fs::create_dir_all(&path).map_err(|e| SettingsError::ConfigDirCreation {
            path: path.display().to_string(),
            source: e,
        })?;
    }

    *cached = Some(path.clone());
    Ok(path)
}

/// Loads `engine.toml` from the configuration directory, writing the defaults there
/// first if it does not exist yet.
pub fn load_settings() -> Result<EngineSettings, SettingsError> {
    load_settings_from(&config_dir()?.join(SETTINGS_FILENAME))
}

/// Loads settings from `path`, generating a default file when it is missing.
pub fn load_settings_from(path: &Path) -> Result<EngineSettings, SettingsError> {
    if !path.exists() {
        let defaults = EngineSettings::default();
        let toml_string = toml::to_string_pretty(&defaults)?;
        fs::write(path, toml_string)?;
        log::debug!("Wrote default engine settings to {}", path.display());
        Ok(defaults)
    } else {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
