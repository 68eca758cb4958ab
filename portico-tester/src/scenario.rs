//! Scenario model, runner and the built-in catalog.
//!
//! A scenario boots the core against a [`MemoryHost`], then applies its
//! steps in order. Every step is checked; the scenario passes only when all
//! of them do.

use portico_core::constants::{
    FEATURE_DESKTOP, FEATURE_DEVDOCS_REDIRECT, FEATURE_NETWORK_CONNECTION, FEATURE_OAUTH,
};
use portico_core::{
    Action, BootHandles, Config, CurrentUser, HostEvent, I18n, LocaleData, MemoryHost, Outcome,
    Router, SectionRegistry, Services, StaticLocaleSource, StaticToken, Store, User, run,
};
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

const LOCALE_TABLES: [&str; 2] = [
    include_str!("../../portico-web/static/languages/fr.json"),
    include_str!("../../portico-web/static/languages/ar.json"),
];
pub const BUILTIN_SECTIONS: &str = include_str!("../../portico-web/static/data/sections.json");

/// Inputs the boot sequence reads from the page.
#[derive(Debug, Clone, Default)]
pub struct Setup {
    pub config: Config,
    pub sections: SectionRegistry,
    pub user: Option<User>,
    pub token: Option<String>,
    pub locale_strings: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expect {
    /// Record the outcome without judging it.
    Any,
    Completed(String),
    Halted(String),
    Blocked,
    FullPageLoad(String),
}

#[derive(Debug, Clone)]
pub enum Step {
    Navigate { path: String, expect: Expect },
    ChangeForm(String),
    AnswerConfirm(bool),
    SetOnline(bool),
    SetUser(Option<User>),
    ExpectLocale(String),
    ExpectNotices(usize),
}

impl Step {
    fn navigate(path: &str, expect: Expect) -> Self {
        Self::Navigate {
            path: path.to_string(),
            expect,
        }
    }

    fn label(&self) -> String {
        match self {
            Self::Navigate { path, .. } => format!("navigate {path}"),
            Self::ChangeForm(form) => format!("edit form {form}"),
            Self::AnswerConfirm(answer) => format!("answer confirm with {answer}"),
            Self::SetOnline(online) => format!("set online {online}"),
            Self::SetUser(Some(user)) => format!("sign in {}", user.username),
            Self::SetUser(None) => "sign out".to_string(),
            Self::ExpectLocale(slug) => format!("expect locale {slug}"),
            Self::ExpectNotices(count) => format!("expect {count} notice(s)"),
        }
    }
}

pub struct Scenario {
    pub key: &'static str,
    pub description: &'static str,
    pub setup: Setup,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub step: String,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub passed: bool,
    pub steps: Vec<StepResult>,
    pub failures: Vec<String>,
    pub duration_ms: f64,
}

/// A booted app with its in-memory host.
pub struct World {
    pub host: Rc<MemoryHost>,
    pub services: Services,
    pub store: Store,
    pub router: Router,
    route_dispatches: Rc<Cell<usize>>,
    _handles: BootHandles,
}

impl World {
    #[must_use]
    pub fn boot(setup: &Setup) -> Self {
        let host = Rc::new(MemoryHost::new().with_location("/"));
        let source = LOCALE_TABLES
            .iter()
            .filter_map(|raw| {
                LocaleData::from_json(raw)
                    .map_err(|err| log::error!("bundled locale is invalid: {err}"))
                    .ok()
            })
            .fold(StaticLocaleSource::new(), StaticLocaleSource::with);
        let services = Services::new(setup.config.clone(), host.clone())
            .with_i18n(I18n::with_source(source))
            .with_user(CurrentUser::new(setup.user.clone()))
            .with_tokens(Rc::new(StaticToken(setup.token.clone())))
            .with_sections(setup.sections.clone())
            .with_bootstrap_locale(setup.locale_strings.clone());

        let store = Store::default();
        let route_dispatches = Rc::new(Cell::new(0));
        let counter = Rc::clone(&route_dispatches);
        store.observe_actions(move |action| {
            if matches!(action, Action::RouteSet { .. }) {
                counter.set(counter.get() + 1);
            }
        });

        let mut router = services.new_router();
        let handles = run(&services, &store, &mut router);
        Self {
            host,
            services,
            store,
            router,
            route_dispatches,
            _handles: handles,
        }
    }

    fn apply(&mut self, step: &Step) -> Result<String, String> {
        match step {
            Step::Navigate { path, expect } => self.navigate(path, expect),
            Step::ChangeForm(form) => {
                self.services.forms.mark_changed(form);
                Ok(String::new())
            }
            Step::AnswerConfirm(answer) => {
                self.host.set_confirm_answer(*answer);
                Ok(String::new())
            }
            Step::SetOnline(online) => {
                self.host.set_online(*online);
                Ok(format!("connection {:?}", self.store.state().connection))
            }
            Step::SetUser(user) => {
                self.services.user.set(user.clone());
                Ok(format!("locale {}", self.services.i18n.slug()))
            }
            Step::ExpectLocale(slug) => {
                let state = self.store.state().locale;
                if &state.slug == slug && self.services.i18n.slug() == *slug {
                    Ok(format!("locale {slug} (rtl: {})", state.rtl))
                } else {
                    Err(format!(
                        "store locale {}, runtime locale {}",
                        state.slug,
                        self.services.i18n.slug()
                    ))
                }
            }
            Step::ExpectNotices(count) => {
                let visible = self.store.state().visible_notices().count();
                if visible == *count {
                    Ok(format!("{visible} visible"))
                } else {
                    Err(format!("{visible} visible"))
                }
            }
        }
    }

    fn navigate(&mut self, path: &str, expect: &Expect) -> Result<String, String> {
        self.host.clear_events();
        let before = self.route_dispatches.get();
        let outcome = self.router.navigate(path).map_err(|err| err.to_string())?;
        let dispatched = self.route_dispatches.get() - before;
        let detail = describe(&outcome);

        let expected_dispatches = usize::from(outcome.is_completed());
        if dispatched != expected_dispatches {
            return Err(format!(
                "{detail}: {dispatched} route dispatches, expected {expected_dispatches}"
            ));
        }

        let matched = match (expect, &outcome) {
            (Expect::Any, _) | (Expect::Blocked, Outcome::Blocked { .. }) => true,
            (Expect::Completed(want), Outcome::Completed { path, .. }) => want == path,
            (Expect::Halted(want), Outcome::Halted { by, .. }) => want == by,
            (Expect::FullPageLoad(url), Outcome::Halted { .. }) => self
                .host
                .events()
                .contains(&HostEvent::FullPageLoad(url.clone())),
            _ => false,
        };
        if matched {
            Ok(detail)
        } else {
            Err(format!("{detail}, expected {expect:?}"))
        }
    }
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Completed { path, redirects } if redirects.is_empty() => {
            format!("completed at {path}")
        }
        Outcome::Completed { path, redirects } => {
            format!("completed at {path} via {}", redirects.join(" -> "))
        }
        Outcome::Halted { path, by, .. } => format!("halted at {path} by {by}"),
        Outcome::Blocked { path, by } => format!("blocked on {path} by {by}"),
    }
}

impl Scenario {
    pub fn run(&self) -> ScenarioResult {
        let started = Instant::now();
        let mut world = World::boot(&self.setup);
        let mut steps = Vec::with_capacity(self.steps.len());
        let mut failures = Vec::new();

        for step in &self.steps {
            let label = step.label();
            let (passed, detail) = match world.apply(step) {
                Ok(detail) => (true, detail),
                Err(detail) => {
                    failures.push(format!("{label}: {detail}"));
                    (false, detail)
                }
            };
            log::debug!("[{}] {label}: {detail}", self.key);
            steps.push(StepResult {
                step: label,
                passed,
                detail,
            });
        }

        ScenarioResult {
            scenario_name: self.key.to_string(),
            passed: failures.is_empty(),
            steps,
            failures,
            duration_ms: started.elapsed().as_secs_f64() * 1000.0,
        }
    }
}

/// Catalog entries with their one-line descriptions.
#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog(&Setup::default())
        .into_iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

#[must_use]
pub fn get_scenario(key: &str, base: &Setup) -> Option<Scenario> {
    catalog(base).into_iter().find(|scenario| scenario.key == key)
}

fn ada() -> User {
    User::new(1, "ada")
}

/// Built-in scenarios layered over `base` (config and sections).
#[must_use]
pub fn catalog(base: &Setup) -> Vec<Scenario> {
    let with = |features: &[&str], user: Option<User>| {
        let mut setup = Setup {
            user,
            token: None,
            locale_strings: None,
            ..base.clone()
        };
        for feature in features {
            setup.config = setup.config.with_feature(feature, true);
        }
        setup
    };

    vec![
        Scenario {
            key: "logged-out",
            description: "Visitors are kept inside logged-out sections",
            setup: with(&[FEATURE_DEVDOCS_REDIRECT], None),
            steps: vec![
                Step::navigate("/", Expect::Completed("/devdocs/start".into())),
                Step::navigate("/settings", Expect::Halted("logged-out".into())),
                Step::navigate("/log-in", Expect::Completed("/log-in".into())),
            ],
        },
        Scenario {
            key: "oauth",
            description: "Without a token every page lands on the login page",
            setup: with(&[FEATURE_OAUTH], None),
            steps: vec![
                Step::navigate("/read", Expect::Completed("/log-in".into())),
                Step::navigate("/authorize?code=1", Expect::Completed("/authorize?code=1".into())),
            ],
        },
        Scenario {
            key: "oauth-token",
            description: "Token holders skip the login page",
            setup: Setup {
                token: Some("token".into()),
                ..with(&[FEATURE_OAUTH], Some(ada()))
            },
            steps: vec![
                Step::navigate("/log-in", Expect::Completed("/".into())),
                Step::navigate("/settings", Expect::Completed("/settings".into())),
            ],
        },
        Scenario {
            key: "desktop-token",
            description: "A stored token without a user still reaches the login page",
            setup: Setup {
                token: Some("token".into()),
                ..with(&[FEATURE_OAUTH, FEATURE_DESKTOP], None)
            },
            steps: vec![
                Step::navigate("/", Expect::Completed("/log-in".into())),
                Step::navigate("/log-in", Expect::Completed("/log-in".into())),
            ],
        },
        Scenario {
            key: "signed-in",
            description: "Signed-in navigation records route state once per page",
            setup: with(&[], Some(ada())),
            steps: vec![
                Step::navigate("/read?feed=12", Expect::Completed("/read?feed=12".into())),
                Step::navigate("/me#tab=profile", Expect::Completed("/me".into())),
                Step::navigate("/read#post=%C3%28", Expect::Completed("/read".into())),
            ],
        },
        Scenario {
            key: "logout",
            description: "The logout path reloads the page from the server",
            setup: with(&[], Some(ada())),
            steps: vec![
                Step::navigate("/read", Expect::Completed("/read".into())),
                Step::navigate("/log-out", Expect::FullPageLoad("/log-out".into())),
            ],
        },
        Scenario {
            key: "unsaved-form",
            description: "Leaving a changed form asks first",
            setup: with(&[], Some(ada())),
            steps: vec![
                Step::navigate("/post/1", Expect::Completed("/post/1".into())),
                Step::ChangeForm("post-editor".into()),
                Step::AnswerConfirm(false),
                Step::navigate("/read", Expect::Blocked),
                Step::AnswerConfirm(true),
                Step::navigate("/read", Expect::Completed("/read".into())),
            ],
        },
        Scenario {
            key: "connection",
            description: "Connectivity changes post status notices",
            setup: with(&[FEATURE_NETWORK_CONNECTION], Some(ada())),
            steps: vec![
                Step::navigate("/read", Expect::Completed("/read".into())),
                Step::SetOnline(false),
                Step::ExpectNotices(1),
                Step::navigate("/settings", Expect::Completed("/settings".into())),
                Step::ExpectNotices(1),
                Step::SetOnline(true),
                Step::ExpectNotices(1),
                Step::navigate("/read", Expect::Completed("/read".into())),
                Step::ExpectNotices(0),
            ],
        },
        Scenario {
            key: "locale",
            description: "The user's locale preference drives translations",
            setup: with(&[], Some(ada())),
            steps: vec![
                Step::ExpectLocale("en".into()),
                Step::SetUser(Some(ada().with_locale("fr"))),
                Step::ExpectLocale("fr".into()),
                Step::SetUser(Some(ada().with_locale("ar"))),
                Step::ExpectLocale("ar".into()),
            ],
        },
        Scenario {
            key: "bootstrap-locale",
            description: "Bootstrapped strings apply before any user preference",
            setup: Setup {
                locale_strings: Some(LOCALE_TABLES[0].to_string()),
                ..with(&[], None)
            },
            steps: vec![
                Step::ExpectLocale("fr".into()),
                Step::navigate("/log-in", Expect::Completed("/log-in".into())),
                Step::ExpectLocale("fr".into()),
            ],
        },
    ]
}

/// Navigate through `paths` without judging outcomes.
#[must_use]
pub fn ad_hoc(setup: Setup, paths: &[String]) -> Scenario {
    Scenario {
        key: "paths",
        description: "Ad-hoc navigation",
        setup,
        steps: paths
            .iter()
            .map(|path| Step::navigate(path, Expect::Any))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Setup {
        Setup {
            sections: SectionRegistry::from_json(BUILTIN_SECTIONS).unwrap(),
            ..Setup::default()
        }
    }

    #[test]
    fn every_catalog_scenario_passes() {
        for scenario in catalog(&base()) {
            let result = scenario.run();
            assert!(
                result.passed,
                "{} failed: {:?}",
                result.scenario_name, result.failures
            );
        }
    }

    #[test]
    fn wrong_expectation_is_reported() {
        let scenario = Scenario {
            key: "wrong",
            description: "",
            setup: base(),
            steps: vec![Step::navigate("/settings", Expect::Completed("/settings".into()))],
        };
        let result = scenario.run();
        assert!(!result.passed);
        assert_eq!(result.failures.len(), 1);
        assert!(result.failures[0].contains("halted at /settings by logged-out"));
    }

    #[test]
    fn ad_hoc_runs_record_outcomes() {
        let setup = Setup {
            user: Some(ada()),
            ..base()
        };
        let result = ad_hoc(setup, &["/read".to_string(), "/log-out".to_string()]).run();
        assert!(result.passed);
        assert_eq!(result.steps[0].detail, "completed at /read");
        assert_eq!(result.steps[1].detail, "halted at /log-out by context");
    }

    #[test]
    fn catalog_keys_are_unique() {
        let keys: Vec<_> = list_scenarios().into_iter().map(|(key, _)| key).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(keys.len(), sorted.len());
        assert!(get_scenario("logout", &base()).is_some());
        assert!(get_scenario("nope", &base()).is_none());
    }
}
