// EN: src/core/url_executor.rs

use crate::constants::ALLOWED_URL_SCHEMES;
use crate::core::action::{ElevationRequest, Executor, Toolbox};
use crate::core::context::ExecutionContext;
use crate::core::expand::expand_env;
use crate::errors::{ActionError, ErrorKind};
use crate::models::{ActionConfig, ExecutionOutcome};
use crate::system::Platform;
use crate::system::executor::{self, ProcessSpec};
use crate::system::probe::ProbeChain;
use url::Url;

/// Openers tried on Linux, in order. `xdg-open` also serves as the fallback.
const LINUX_OPENERS: &[&str] = &[
    "xdg-open",
    "firefox",
    "google-chrome",
    "chromium",
    "brave-browser",
    "opera",
    "vivaldi",
];

/// Opens a URL with the system's default handler.
#[derive(Debug)]
pub struct UrlExecutor {
    config: ActionConfig,
    toolbox: Toolbox,
}

impl UrlExecutor {
    /// An executor for one URL spell.
    pub fn new(config: ActionConfig, toolbox: Toolbox) -> Self {
        Self { config, toolbox }
    }

    /// Validates the configured URL and builds the opener process.
    pub fn prepare(&self) -> Result<ProcessSpec, ActionError> {
        let url = validate_url(&expand_env(&self.config.command))?;
        Ok(self.opener(&url))
    }

    fn opener(&self, url: &str) -> ProcessSpec {
        match self.toolbox.platform {
            Platform::Windows => ProcessSpec::new("cmd").args(["/c", "start", "", url]),
            Platform::MacOs => ProcessSpec::new("open").arg(url),
            Platform::Linux => {
                let chain = ProbeChain::new("url opener", LINUX_OPENERS);
                match chain.first_installed(self.toolbox.locator.as_ref()) {
                    Ok((name, _)) => ProcessSpec::new(*name).arg(url),
                    Err(_) => ProcessSpec::new("xdg-open").arg(url),
                }
            }
        }
    }
}

/// Checks `raw` and returns the URL that will be opened.
///
/// Input without a scheme gets `https://` prepended (`example.com`,
/// `localhost:8080/x`); the result only passes if it parses and its scheme is one of
/// http, https, file, ftp or mailto. The returned text is the (possibly prefixed)
/// input, so validating it again yields the same string.
pub fn validate_url(raw: &str) -> Result<String, ActionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ActionError::config("empty URL")
            .with_context("url", raw)
            .with_context("action_type", "url")
            .with_context("error_type", "empty_url"));
    }

    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = Url::parse(&candidate).map_err(|e| {
        ActionError::wrap(ErrorKind::Config, "Invalid URL", e)
            .with_context("url", candidate.as_str())
            .with_context("action_type", "url")
            .with_context("error_type", "invalid_url")
    })?;

    if !ALLOWED_URL_SCHEMES.contains(&parsed.scheme()) {
        return Err(ActionError::config(format!(
            "unsupported URL scheme: {}",
            parsed.scheme()
        ))
        .with_context("url", candidate.as_str())
        .with_context("scheme", parsed.scheme())
        .with_context("allowed_schemes", ALLOWED_URL_SCHEMES.to_vec())
        .with_context("action_type", "url")
        .with_context("error_type", "unsupported_scheme"));
    }

    Ok(candidate)
}

/// Whether `input` starts with a real `scheme:`. A dotted "scheme" (`example.com:443`)
/// or a numeric port after the colon (`localhost:8080`) means a schemeless host.
fn has_scheme(input: &str) -> bool {
    let Some((scheme, rest)) = input.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let well_formed = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !well_formed || scheme.contains('.') {
        return false;
    }
    let port = rest.split(['/', '?', '#']).next().unwrap_or_default();
    port.is_empty() || !port.chars().all(|c| c.is_ascii_digit())
}

impl Executor for UrlExecutor {
    fn execute(&self, _ctx: &ExecutionContext) -> Result<ExecutionOutcome, ActionError> {
        let spec = self.prepare()?;
        let running = executor::spawn(&spec, 0).map_err(|e| {
            ActionError::wrap(ErrorKind::System, "failed to open URL", e)
                .with_context("url", self.config.command.as_str())
                .with_context("opener", spec.program.as_str())
                .with_context("action_type", "url")
                .with_context("error_type", "start_failed")
        })?;
        let pid = running.detach();
        log::debug!("Opened URL with {} (PID: {})", spec.program, pid);
        Ok(ExecutionOutcome::Detached { pid })
    }

    fn describe(&self) -> String {
        match self.config.label() {
            Some(label) => label.to_string(),
            None => format!("Open URL: {}", self.config.command),
        }
    }

    fn elevation_request(&self) -> Result<ElevationRequest, ActionError> {
        Ok(ElevationRequest::from_spec(&self.prepare()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::EngineSettings;
    use crate::notify::ConsoleNotifier;
    use crate::system::probe::FixedLocator;
    use std::sync::Arc;

    fn executor(url: &str, platform: Platform, locator: FixedLocator) -> UrlExecutor {
        let toolbox = Toolbox::new(
            EngineSettings::for_platform(platform),
            Arc::new(ConsoleNotifier::default()),
        )
        .with_platform(platform)
        .with_locator(Arc::new(locator));
        UrlExecutor::new(
            ActionConfig {
                action_type: "url".to_string(),
                command: url.to_string(),
                ..Default::default()
            },
            toolbox,
        )
    }

    #[test]
    fn test_schemeless_input_gets_https() {
        assert_eq!(validate_url("example.com").unwrap(), "https://example.com");
        assert_eq!(
            validate_url("  example.com/docs?q=1 ").unwrap(),
            "https://example.com/docs?q=1"
        );
        assert_eq!(
            validate_url("localhost:8080/health").unwrap(),
            "https://localhost:8080/health"
        );
        assert_eq!(
            validate_url("example.com:443").unwrap(),
            "https://example.com:443"
        );
    }

    #[test]
    fn test_allowed_schemes_pass_unchanged() {
        assert_eq!(validate_url("mailto:a@b.com").unwrap(), "mailto:a@b.com");
        assert_eq!(
            validate_url("ftp://files.example.com/pub").unwrap(),
            "ftp://files.example.com/pub"
        );
        assert_eq!(validate_url("file:///tmp/index.html").unwrap(), "file:///tmp/index.html");
    }

    #[test]
    fn test_validation_is_idempotent() {
        for input in ["example.com", "http://example.com/a b", "mailto:x@y.z"] {
            let once = validate_url(input).unwrap();
            assert_eq!(validate_url(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_dangerous_schemes_are_rejected() {
        for input in ["javascript:alert(1)", "data:text/html,hi", "vbscript:msgbox"] {
            let err = validate_url(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
            assert_eq!(err.find_context_str("error_type"), Some("unsupported_scheme"));
        }
    }

    #[test]
    fn test_empty_and_unparseable() {
        let empty = validate_url("   ").unwrap_err();
        assert_eq!(empty.find_context_str("error_type"), Some("empty_url"));

        let invalid = validate_url("https://").unwrap_err();
        assert_eq!(invalid.message(), "Invalid URL");
        assert_eq!(invalid.find_context_str("error_type"), Some("invalid_url"));
    }

    #[test]
    fn test_rejected_url_never_reaches_an_opener() {
        let exec = executor("javascript:alert(1)", Platform::Linux, FixedLocator::new());
        let err = exec.execute(&ExecutionContext::new()).unwrap_err();
        assert_eq!(err.find_context_str("error_type"), Some("unsupported_scheme"));
    }

    #[test]
    fn test_linux_opener_chain() {
        let with_browser = executor(
            "example.com",
            Platform::Linux,
            FixedLocator::new().with("chromium", "/usr/bin/chromium"),
        );
        assert_eq!(
            with_browser.prepare().unwrap().argv(),
            vec!["chromium", "https://example.com"]
        );

        let bare = executor("example.com", Platform::Linux, FixedLocator::new());
        assert_eq!(bare.prepare().unwrap().program, "xdg-open");
    }

    #[test]
    fn test_platform_openers() {
        let mac = executor("https://example.com", Platform::MacOs, FixedLocator::new());
        assert_eq!(mac.prepare().unwrap().argv(), vec!["open", "https://example.com"]);

        let win = executor("https://example.com", Platform::Windows, FixedLocator::new());
        assert_eq!(
            win.prepare().unwrap().argv(),
            vec!["cmd", "/c", "start", "", "https://example.com"]
        );
    }

    #[test]
    fn test_describe() {
        let exec = executor("example.com", Platform::Linux, FixedLocator::new());
        assert_eq!(exec.describe(), "Open URL: example.com");
    }
}
