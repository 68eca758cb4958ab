//! Drives the core router from yew-router's location.

use portico_core::{Context, Outcome};

/// Full URL path (base included) for a browser location.
#[must_use]
pub fn location_target(path: &str, query: &str, hash: &str) -> String {
    let mut target = path.to_string();
    if !query.is_empty() && query != "?" {
        if !query.starts_with('?') {
            target.push('?');
        }
        target.push_str(query);
    }
    if !hash.is_empty() && hash != "#" {
        if !hash.starts_with('#') {
            target.push('#');
        }
        target.push_str(hash);
    }
    target
}

/// Whether a location change needs a navigation. URL updates made after a
/// redirect or a blocked leave point at the page already on screen.
#[must_use]
pub fn should_navigate(target: &str, base: &str, current: Option<&str>) -> bool {
    current != Some(Context::new(target, base).path.as_str())
}

/// Address bar correction after a navigation that ended elsewhere.
#[must_use]
pub fn redirected_to(outcome: &Outcome) -> Option<&str> {
    match outcome {
        Outcome::Completed { path, redirects } if !redirects.is_empty() => Some(path),
        _ => None,
    }
}

#[cfg(target_arch = "wasm32")]
mod hook {
    use super::{location_target, redirected_to, should_navigate};
    use crate::app::Portal;
    use yew::prelude::*;
    use yew_router::prelude::use_location;

    /// Navigate the core router whenever the browser location changes.
    #[hook]
    pub fn use_router_sync(portal: &Portal) {
        let target = use_location()
            .map(|location| location_target(location.path(), location.query_str(), location.hash()));
        let portal = portal.clone();
        use_effect_with(target, move |target| {
            if let Some(target) = target {
                drive(&portal, target);
            }
        });
    }

    fn drive(portal: &Portal, target: &str) {
        let base = portal.services.config.router_base();
        let outcome = {
            let mut router = portal.router.borrow_mut();
            if !should_navigate(target, base, router.current_path()) {
                return;
            }
            router.navigate(target)
        };
        match outcome {
            Ok(outcome) => {
                if let Some(path) = redirected_to(&outcome) {
                    portal.host.replace_url(path);
                }
            }
            Err(err) => log::error!("navigation to {target} failed: {err}"),
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use hook::use_router_sync;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_target_joins_parts() {
        assert_eq!(location_target("/read", "", ""), "/read");
        assert_eq!(location_target("/read", "?feed=1", "#c"), "/read?feed=1#c");
        assert_eq!(location_target("/read", "feed=1", "c"), "/read?feed=1#c");
        assert_eq!(location_target("/read", "?", "#"), "/read");
    }

    #[test]
    fn skips_locations_already_on_screen() {
        assert!(should_navigate("/read", "", None));
        assert!(!should_navigate("/read#top", "", Some("/read")));
        assert!(!should_navigate("/app/read?x=1", "/app", Some("/read?x=1")));
        assert!(should_navigate("/app/settings", "/app", Some("/read")));
    }

    #[test]
    fn only_redirected_completions_rewrite_the_url() {
        let direct = Outcome::Completed {
            path: "/read".into(),
            redirects: vec![],
        };
        let redirected = Outcome::Completed {
            path: "/log-in".into(),
            redirects: vec!["/log-in".into()],
        };
        let halted = Outcome::Halted {
            path: "/settings".into(),
            by: "logged-out".into(),
            redirects: vec![],
        };
        assert_eq!(redirected_to(&direct), None);
        assert_eq!(redirected_to(&redirected), Some("/log-in"));
        assert_eq!(redirected_to(&halted), None);
    }
}
