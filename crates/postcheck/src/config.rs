//! Scenario configuration.
//!
//! Credentials come from the environment and are loaded once at the entry
//! point. Everything else (wait bounds, image, lookup strategy, browser
//! options) has defaults and may be overridden from a YAML file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::browser::BrowserConfig;
use crate::post::DEFAULT_IMAGE_PATH;
use crate::result::{CheckError, CheckResult};
use crate::wait::WaitPolicy;

/// Environment variable holding the login name
pub const ENV_USERNAME: &str = "APP_USERNAME";
/// Environment variable holding the password
pub const ENV_PASSWORD: &str = "APP_PASSWORD";
/// Environment variable holding the entry URL
pub const ENV_BASE_URL: &str = "APP_BASE_URL";

/// Login credentials and entry point.
///
/// Can only be constructed with all three values present, so holding one is
/// proof the precondition was checked.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
    base_url: String,
}

impl Credentials {
    /// Build from explicit values, rejecting empty ones
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        base_url: impl Into<String>,
    ) -> CheckResult<Self> {
        let lookup = [
            (ENV_USERNAME, username.into()),
            (ENV_PASSWORD, password.into()),
            (ENV_BASE_URL, base_url.into()),
        ];
        Self::from_lookup(|name| {
            lookup
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.clone())
        })
    }

    /// Load from `APP_USERNAME`, `APP_PASSWORD` and `APP_BASE_URL`
    pub fn from_env() -> CheckResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup.
    ///
    /// Every missing or blank variable is named in the error.
    pub fn from_lookup<F>(lookup: F) -> CheckResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let username = read(ENV_USERNAME);
        let password = read(ENV_PASSWORD);
        let base_url = read(ENV_BASE_URL);

        match (username, password, base_url) {
            (Some(username), Some(password), Some(base_url)) => Ok(Self {
                username,
                password,
                base_url,
            }),
            (username, password, base_url) => {
                let missing: Vec<&str> = [
                    (ENV_USERNAME, username.is_none()),
                    (ENV_PASSWORD, password.is_none()),
                    (ENV_BASE_URL, base_url.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(CheckError::configuration(format!(
                    "environment variables not defined: {}",
                    missing.join(", ")
                )))
            }
        }
    }

    /// Login name
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Entry URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// How the new post is found in the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocateStrategy {
    /// Match the list entry whose image carries the captured key
    #[default]
    CorrelationKey,
    /// Match the list entry heading by title text
    Title,
}

impl fmt::Display for LocateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CorrelationKey => f.write_str("correlation-key"),
            Self::Title => f.write_str("title"),
        }
    }
}

/// Tunable parts of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Wait bounds
    pub waits: WaitPolicy,
    /// Image attached to the post
    pub image_path: PathBuf,
    /// Listing lookup strategy
    pub strategy: LocateStrategy,
    /// Browser launch options
    pub browser: BrowserConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            waits: WaitPolicy::default(),
            image_path: PathBuf::from(DEFAULT_IMAGE_PATH),
            strategy: LocateStrategy::default(),
            browser: BrowserConfig::default(),
        }
    }
}

impl ScenarioConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from YAML text; omitted keys keep their defaults
    pub fn from_yaml(text: &str) -> CheckResult<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Read and parse a YAML file
    pub fn load(path: &Path) -> CheckResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CheckError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&text)
    }

    /// Set the wait policy
    #[must_use]
    pub fn with_waits(mut self, waits: WaitPolicy) -> Self {
        self.waits = waits;
        self
    }

    /// Set the image path
    #[must_use]
    pub fn with_image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = path.into();
        self
    }

    /// Set the lookup strategy
    #[must_use]
    pub const fn with_strategy(mut self, strategy: LocateStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    mod credentials_tests {
        use super::*;

        #[test]
        fn test_all_present() {
            let vars = env(&[
                (ENV_USERNAME, "editor"),
                (ENV_PASSWORD, "s3cret"),
                (ENV_BASE_URL, "https://cms.test"),
            ]);
            let creds = Credentials::from_lookup(|k| vars.get(k).cloned()).unwrap();
            assert_eq!(creds.username(), "editor");
            assert_eq!(creds.password(), "s3cret");
            assert_eq!(creds.base_url(), "https://cms.test");
        }

        #[test]
        fn test_missing_password_is_configuration_error() {
            let vars = env(&[(ENV_USERNAME, "editor"), (ENV_BASE_URL, "https://cms.test")]);
            let err = Credentials::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
            match err {
                CheckError::Configuration { message } => {
                    assert!(message.contains(ENV_PASSWORD));
                    assert!(!message.contains(ENV_USERNAME));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_blank_counts_as_missing() {
            let err = Credentials::new("editor", "  ", "https://cms.test").unwrap_err();
            assert!(matches!(err, CheckError::Configuration { .. }));
        }

        #[test]
        fn test_all_missing_named() {
            let err = Credentials::from_lookup(|_| None).unwrap_err();
            let msg = err.to_string();
            assert!(msg.contains(ENV_USERNAME));
            assert!(msg.contains(ENV_PASSWORD));
            assert!(msg.contains(ENV_BASE_URL));
        }

        #[test]
        fn test_debug_redacts_password() {
            let creds = Credentials::new("editor", "s3cret", "https://cms.test").unwrap();
            let debug = format!("{creds:?}");
            assert!(!debug.contains("s3cret"));
            assert!(debug.contains("<redacted>"));
        }
    }

    mod scenario_config_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = ScenarioConfig::default();
            assert_eq!(config.strategy, LocateStrategy::CorrelationKey);
            assert_eq!(config.image_path, PathBuf::from(DEFAULT_IMAGE_PATH));
            assert_eq!(config.waits, WaitPolicy::default());
        }

        #[test]
        fn test_partial_yaml() {
            let config = ScenarioConfig::from_yaml(
                "strategy: title\nwaits:\n  record_lookup_ms: 2500\nbrowser:\n  headless: false\n",
            )
            .unwrap();
            assert_eq!(config.strategy, LocateStrategy::Title);
            assert_eq!(config.waits.record_lookup_ms, 2500);
            assert_eq!(config.waits.listing_ms, 20_000);
            assert!(!config.browser.headless);
        }

        #[test]
        fn test_load_from_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "image_path: /srv/fixtures/dog.png").unwrap();
            let config = ScenarioConfig::load(file.path()).unwrap();
            assert_eq!(config.image_path, PathBuf::from("/srv/fixtures/dog.png"));
        }

        #[test]
        fn test_load_missing_file() {
            let err = ScenarioConfig::load(Path::new("/nonexistent/postcheck.yaml")).unwrap_err();
            assert!(matches!(err, CheckError::Configuration { .. }));
        }

        #[test]
        fn test_invalid_yaml() {
            let err = ScenarioConfig::from_yaml("strategy: [oops").unwrap_err();
            assert!(matches!(err, CheckError::Yaml(_)));
        }

        #[test]
        fn test_builders() {
            let config = ScenarioConfig::new()
                .with_strategy(LocateStrategy::Title)
                .with_image_path("/tmp/x.jpg")
                .with_waits(WaitPolicy::new().with_record_lookup(1));
            assert_eq!(config.strategy, LocateStrategy::Title);
            assert_eq!(config.waits.record_lookup_ms, 1);
        }

        #[test]
        fn test_strategy_display() {
            assert_eq!(LocateStrategy::CorrelationKey.to_string(), "correlation-key");
            assert_eq!(LocateStrategy::Title.to_string(), "title");
        }
    }
}
