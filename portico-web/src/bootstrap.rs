//! Server-provided globals read once at startup.
//!
//! The page template may set `window.configData`, `window.currentUser` and
//! `window.i18nLocaleStrings`; the OAuth token lives in `localStorage`. Each
//! is optional. Unusable values are logged and replaced by defaults.

use portico_core::{Config, SectionRegistry, User};
use serde_json::Value;

const SECTIONS_JSON: &str = include_str!("../static/data/sections.json");

/// Section table shipped with the app.
#[must_use]
pub fn builtin_sections() -> SectionRegistry {
    SectionRegistry::from_json(SECTIONS_JSON).unwrap_or_else(|err| {
        log::error!("bundled sections.json is invalid: {err}");
        SectionRegistry::default()
    })
}

/// Everything the boot sequence needs from the page.
#[derive(Debug, Clone, Default)]
pub struct Bootstrap {
    pub config: Config,
    pub user: Option<User>,
    /// Raw Jed-format JSON of the bootstrapped locale.
    pub locale_strings: Option<String>,
}

impl Bootstrap {
    /// Build from already-decoded globals.
    #[must_use]
    pub fn from_parts(
        config: Option<Value>,
        user: Option<Value>,
        locale_strings: Option<Value>,
    ) -> Self {
        Self {
            config: config.map_or_else(Config::default, parse_config),
            user: user.and_then(parse_user),
            locale_strings: locale_strings.and_then(locale_payload),
        }
    }
}

fn parse_config(value: Value) -> Config {
    let parsed = serde_json::from_value::<Config>(value)
        .map_err(portico_core::ConfigError::from)
        .and_then(|config| config.validate().map(|()| config));
    parsed.unwrap_or_else(|err| {
        log::warn!("configData unusable, using defaults: {err}");
        Config::default()
    })
}

fn parse_user(value: Value) -> Option<User> {
    if value.is_null() || value.as_bool() == Some(false) {
        return None;
    }
    serde_json::from_value(value)
        .map_err(|err| log::warn!("currentUser unusable: {err}"))
        .ok()
}

/// The template embeds the payload either as a JSON string or as an object.
fn locale_payload(value: Value) -> Option<String> {
    match value {
        Value::String(raw) if raw.trim().is_empty() => None,
        Value::String(raw) => Some(raw),
        Value::Object(_) => Some(value.to_string()),
        _ => {
            log::warn!("i18nLocaleStrings ignored: not a JSON object");
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::Bootstrap;
    use crate::dom;
    use portico_core::TokenStore;
    use portico_core::constants::TOKEN_STORAGE_KEY;
    use serde_json::Value;

    fn global_json(name: &str) -> Option<Value> {
        let value = dom::global(name)?;
        serde_wasm_bindgen::from_value::<Value>(value)
            .map_err(|err| log::warn!("window.{name} unreadable: {err}"))
            .ok()
    }

    impl Bootstrap {
        /// Read the page globals.
        #[must_use]
        pub fn from_window() -> Self {
            Self::from_parts(
                global_json("configData"),
                global_json("currentUser"),
                global_json("i18nLocaleStrings"),
            )
        }
    }

    /// Token persisted by the OAuth login page.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct LocalStorageToken;

    impl TokenStore for LocalStorageToken {
        fn token(&self) -> Option<String> {
            dom::local_storage()
                .ok()?
                .get_item(TOKEN_STORAGE_KEY)
                .ok()
                .flatten()
                .filter(|token| !token.is_empty())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::LocalStorageToken;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtin_sections_open_login_to_visitors() {
        let sections = builtin_sections();
        assert_eq!(sections.logged_out_match("/log-in"), Some("/log-in"));
        assert_eq!(sections.logged_out_match("/settings"), None);
        assert_eq!(
            sections.section_for("/read/feeds/1").map(|s| s.name.as_str()),
            Some("reader")
        );
    }

    #[test]
    fn absent_globals_mean_defaults() {
        let boot = Bootstrap::from_parts(None, None, None);
        assert_eq!(boot.config, Config::default());
        assert!(boot.user.is_none());
        assert!(boot.locale_strings.is_none());
    }

    #[test]
    fn reads_server_shaped_globals() {
        let boot = Bootstrap::from_parts(
            Some(json!({"env_id": "development", "features": {"oauth": true}})),
            Some(json!({"ID": 7, "username": "ada", "localeSlug": "fr"})),
            Some(json!({"": {"localeSlug": "fr"}, "Home": ["Accueil"]})),
        );
        assert!(boot.config.is_development());
        assert!(boot.config.is_enabled("oauth"));
        assert_eq!(boot.user.as_ref().and_then(User::locale), Some("fr"));
        let payload = boot.locale_strings.expect("payload");
        assert!(payload.contains("Accueil"));
    }

    #[test]
    fn unusable_globals_fall_back() {
        let boot = Bootstrap::from_parts(
            Some(json!({"features": "everything"})),
            Some(json!(false)),
            Some(json!(42)),
        );
        assert_eq!(boot.config, Config::default());
        assert!(boot.user.is_none());
        assert!(boot.locale_strings.is_none());

        let blank = Bootstrap::from_parts(None, None, Some(json!("  ")));
        assert!(blank.locale_strings.is_none());
    }
}
