// EN: src/system/launcher.rs

use crate::system::Platform;
use crate::system::executor::ProcessSpec;

const URL_SCHEMES: &[&str] = &["http://", "https://", "file://", "mailto:"];

/// Files that open in their default application rather than being executed.
const DOCUMENT_EXTENSIONS: &[&str] = &[
    ".pdf", ".html", ".htm", ".png", ".jpg", ".jpeg", ".gif", ".txt", ".md",
];

/// Decides how an application path is started on one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLauncher {
    platform: Platform,
}

impl AppLauncher {
    /// A launcher following `platform`'s launch model.
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Paths that are handed to the platform opener without an existence check.
    pub fn is_special_path(&self, path: &str) -> bool {
        match self.platform {
            Platform::Linux => has_url_scheme(path) || is_document(path),
            Platform::MacOs => {
                has_url_scheme(path)
                    || path.starts_with("/System/")
                    || path.starts_with("/Applications/")
                    || is_app_bundle(path)
            }
            Platform::Windows => {
                let lower = path.to_ascii_lowercase();
                has_url_scheme(path)
                    || lower.starts_with("ms-")
                    || lower.ends_with(".url")
                    || lower.ends_with(".lnk")
                    || is_document(path)
            }
        }
    }

    /// Paths that must go through the platform opener instead of being executed.
    pub fn requires_shell(&self, path: &str) -> bool {
        match self.platform {
            Platform::Linux => {
                self.is_special_path(path) || path.to_ascii_lowercase().ends_with(".desktop")
            }
            Platform::MacOs => has_url_scheme(path) || is_app_bundle(path),
            Platform::Windows => self.is_special_path(path),
        }
    }

    /// Builds the process that starts `path` with `args`.
    pub fn prepare(&self, path: &str, args: &[String]) -> ProcessSpec {
        if !self.requires_shell(path) {
            return ProcessSpec::new(path).args(args.iter().cloned());
        }
        match self.platform {
            // xdg-open takes exactly one target.
            Platform::Linux => ProcessSpec::new("xdg-open").arg(path),
            Platform::MacOs => {
                if is_app_bundle(path) && !args.is_empty() {
                    ProcessSpec::new("open")
                        .args(["-a", path, "--args"])
                        .args(args.iter().cloned())
                } else {
                    ProcessSpec::new("open").arg(path)
                }
            }
            // The empty string is `start`'s window title.
            Platform::Windows => ProcessSpec::new("cmd")
                .args(["/c", "start", "", path])
                .args(args.iter().cloned()),
        }
    }
}

fn has_url_scheme(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    URL_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

fn is_document(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    DOCUMENT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn is_app_bundle(path: &str) -> bool {
    path.trim_end_matches('/').ends_with(".app")
}
