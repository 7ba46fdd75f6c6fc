// EN: src/constants.rs

/// The name of the directory (under the system config dir) holding spellcast files.
pub const APP_DIR: &str = "spellcast";

/// The name of the engine settings file (inside the spellcast config dir).
pub const SETTINGS_FILENAME: &str = "engine.toml";

/// The name of the default grimoire file used by the CLI (inside the spellcast config dir).
pub const GRIMOIRE_FILENAME: &str = "grimoire.toml";

/// Action types understood by the engine, in the order they are reported to users.
pub const VALID_ACTION_TYPES: &[&str] = &["app", "script", "url"];

/// URL schemes the URL executor is allowed to hand to the OS opener.
pub const ALLOWED_URL_SCHEMES: &[&str] = &["http", "https", "file", "ftp", "mailto"];

/// Default cap for captured script output, in bytes.
pub const DEFAULT_OUTPUT_LIMIT: usize = 1024 * 1024;

/// Marker appended to captured output that hit the size cap.
pub const TRUNCATION_MARKER: &str = "\n... (output truncated)";

/// Askpass helper handed to `sudo -A` when no `SUDO_ASKPASS` is configured.
pub const DEFAULT_SUDO_ASKPASS: &str = "/usr/bin/ssh-askpass";
