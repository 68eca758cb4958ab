use crate::constants::{
    DEFAULT_AUTH_EXEMPT_PREFIXES, DEFAULT_AUTHORIZE_PATH, DEFAULT_DEVDOCS_START_PATH,
    DEFAULT_LOCALE_URL_TEMPLATE, DEFAULT_LOGIN_PATH, DEFAULT_LOGOUT_PATH, ENV_DEVELOPMENT,
    ENV_PRODUCTION, FEATURE_DEV_INSTRUMENTATION,
};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known routes the boot middleware redirects to or intercepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "PathsConfig::default_logout")]
    pub logout: String,
    #[serde(default = "PathsConfig::default_login")]
    pub login: String,
    #[serde(default = "PathsConfig::default_authorize")]
    pub authorize: String,
    #[serde(default = "PathsConfig::default_devdocs_start")]
    pub devdocs_start: String,
}

impl PathsConfig {
    fn default_logout() -> String {
        DEFAULT_LOGOUT_PATH.to_string()
    }

    fn default_login() -> String {
        DEFAULT_LOGIN_PATH.to_string()
    }

    fn default_authorize() -> String {
        DEFAULT_AUTHORIZE_PATH.to_string()
    }

    fn default_devdocs_start() -> String {
        DEFAULT_DEVDOCS_START_PATH.to_string()
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            logout: Self::default_logout(),
            login: Self::default_login(),
            authorize: Self::default_authorize(),
            devdocs_start: Self::default_devdocs_start(),
        }
    }
}

/// Runtime configuration read once at boot.
///
/// Feature lookups never fail: unknown names are disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_env_id")]
    pub env_id: String,
    #[serde(default)]
    pub features: BTreeMap<String, bool>,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default = "Config::default_auth_exempt_prefixes")]
    pub auth_exempt_prefixes: Vec<String>,
    #[serde(default)]
    pub base: String,
    #[serde(default = "Config::default_locale_url_template")]
    pub locale_url_template: String,
}

impl Config {
    fn default_env_id() -> String {
        ENV_PRODUCTION.to_string()
    }

    fn default_auth_exempt_prefixes() -> Vec<String> {
        DEFAULT_AUTH_EXEMPT_PREFIXES
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn default_locale_url_template() -> String {
        DEFAULT_LOCALE_URL_TEMPLATE.to_string()
    }

    /// Parse and validate configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, the router base is not
    /// absolute, or the locale template has no `{slug}` placeholder.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde defaults cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base.is_empty() && !self.base.starts_with('/') {
            return Err(ConfigError::InvalidBase(self.base.clone()));
        }
        if !self.locale_url_template.contains("{slug}") {
            return Err(ConfigError::InvalidLocaleTemplate(
                self.locale_url_template.clone(),
            ));
        }
        Ok(())
    }

    /// Builder-style helper that toggles a feature flag.
    #[must_use]
    pub fn with_feature(mut self, name: &str, enabled: bool) -> Self {
        self.features.insert(name.to_string(), enabled);
        self
    }

    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.features.get(name).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        self.env_id == ENV_DEVELOPMENT
    }

    /// Development instrumentation loads in development builds or when forced on.
    #[must_use]
    pub fn wants_dev_instrumentation(&self) -> bool {
        self.is_development() || self.is_enabled(FEATURE_DEV_INSTRUMENTATION)
    }

    /// Router base without a trailing slash; empty when the app is served at the root.
    #[must_use]
    pub fn router_base(&self) -> &str {
        self.base.trim_end_matches('/')
    }

    #[must_use]
    pub fn locale_url(&self, slug: &str) -> String {
        self.locale_url_template.replace("{slug}", slug)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env_id: Self::default_env_id(),
            features: BTreeMap::new(),
            paths: PathsConfig::default(),
            auth_exempt_prefixes: Self::default_auth_exempt_prefixes(),
            base: String::new(),
            locale_url_template: Self::default_locale_url_template(),
        }
    }
}
