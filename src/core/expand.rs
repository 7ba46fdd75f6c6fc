// EN: src/core/expand.rs

use std::borrow::Cow;
use std::env;
use std::path::PathBuf;

/// Expands `$VAR` and `${VAR}` against the process environment.
///
/// Unset variables expand to the empty string, so a config value never fails to
/// expand; this matches how a POSIX shell treats them.
pub fn expand_env(input: &str) -> Cow<'_, str> {
    shellexpand::env_with_context_no_errors(input, lookup_var)
}

/// Expands a leading `~` and environment variables in a path.
pub fn expand_path(input: &str) -> PathBuf {
    let expanded = shellexpand::full_with_context_no_errors(input, home_dir, lookup_var);
    PathBuf::from(expanded.into_owned())
}

fn home_dir() -> Option<String> {
    dirs::home_dir().map(|home| home.to_string_lossy().into_owned())
}

fn lookup_var(name: &str) -> Option<String> {
    Some(env::var(name).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_known_and_unknown_vars() {
        let path = env::var("PATH").unwrap();
        assert_eq!(expand_env("$PATH"), path);
        assert_eq!(expand_env("${PATH}/x"), format!("{}/x", path));
        assert_eq!(expand_env("a${SPELLCAST_SURELY_UNSET_VAR_42}b"), "ab");
        assert_eq!(expand_env("no vars here"), "no vars here");
    }

    #[test]
    fn test_expand_path_tilde() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_path("~/projects"), home.join("projects"));
        assert_eq!(expand_path("/tmp/plain"), PathBuf::from("/tmp/plain"));
    }

    #[test]
    fn test_expand_path_tilde_and_vars_together() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let path = env::var("PATH").unwrap();
        assert_eq!(
            expand_path("~/$PATH/${SPELLCAST_SURELY_UNSET_VAR_42}x"),
            PathBuf::from(format!("{}/{}/x", home.to_string_lossy(), path))
        );
    }
}
