//! Helpers for URLs that respect the deployment base path.
//!
//! The base comes from `Config::base`. When `PUBLIC_URL` is set at compile
//! time it wins, so static builds under a subdirectory need no runtime config.
//! [`resolve_base`] folds that override into the config once at boot; every
//! other consumer reads `Config::router_base`.

use portico_core::Config;

/// Apply the compile-time `PUBLIC_URL` override to `config.base`.
#[must_use]
pub fn resolve_base(config: Config) -> Config {
    with_public_url(config, option_env!("PUBLIC_URL"))
}

fn with_public_url(mut config: Config, public_url: Option<&str>) -> Config {
    let Some(public) = public_url.map(str::trim).filter(|public| !public.is_empty()) else {
        return config;
    };
    if !public.starts_with('/') {
        log::warn!("ignoring PUBLIC_URL `{public}`: base must be absolute");
        return config;
    }
    config.base = public.to_string();
    config
}

/// Base path for the router; `None` when the app is served at the root.
#[must_use]
pub fn router_base(config: &Config) -> Option<String> {
    let base = config.router_base().trim();
    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}

/// URL for a static asset: root-anchored under the base path, or untouched
/// when it already names another origin.
#[must_use]
pub fn asset_path(base: &str, asset: &str) -> String {
    if asset.contains("://") || asset.starts_with("//") {
        asset.to_string()
    } else {
        with_base(base, asset)
    }
}

/// Prefix an app path with the base, keeping exactly one slash between them.
#[must_use]
pub fn with_base(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let rel = path.trim_start_matches('/');

    if base.is_empty() {
        format!("/{rel}")
    } else {
        format!("{base}/{rel}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_core::{MemoryHost, Services};
    use std::rc::Rc;

    #[test]
    fn builds_root_prefixed_path_when_base_missing() {
        assert_eq!(with_base("", "languages/fr.json"), "/languages/fr.json");
        assert_eq!(with_base("", "/languages/fr.json"), "/languages/fr.json");
    }

    #[test]
    fn builds_paths_with_base() {
        assert_eq!(with_base("/app", "dev/instrumentation.js"), "/app/dev/instrumentation.js");
        assert_eq!(with_base("/app/", "/read?x=1"), "/app/read?x=1");
    }

    #[test]
    fn assets_on_other_origins_are_left_alone() {
        assert_eq!(asset_path("/app", "languages/ar.json"), "/app/languages/ar.json");
        assert_eq!(asset_path("/app", "https://cdn.test/ar.json"), "https://cdn.test/ar.json");
        assert_eq!(asset_path("/app", "//cdn.test/ar.json"), "//cdn.test/ar.json");
    }

    #[test]
    fn router_base_follows_config() {
        assert_eq!(router_base(&Config::default()), None);
        let config = Config::from_json(r#"{"base":"/app/"}"#).unwrap();
        assert_eq!(router_base(&config), Some(String::from("/app")));
    }

    #[test]
    fn public_url_overrides_config_base() {
        let config = Config::from_json(r#"{"base":"/ignored"}"#).unwrap();
        assert_eq!(with_public_url(config.clone(), Some("/app")).router_base(), "/app");
        assert_eq!(with_public_url(config.clone(), None).router_base(), "/ignored");
        assert_eq!(with_public_url(config.clone(), Some(" ")).router_base(), "/ignored");
        assert_eq!(with_public_url(config, Some("app")).router_base(), "/ignored");
    }

    #[test]
    fn public_url_reaches_the_core_router() {
        let config = with_public_url(Config::default(), Some("/app"));
        let services = Services::new(config, Rc::new(MemoryHost::new()));
        let mut router = services.new_router();
        let outcome = router.navigate("/app/settings").unwrap();
        assert!(outcome.is_completed());
        assert_eq!(outcome.path(), "/settings");
    }
}
