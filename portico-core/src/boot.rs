//! Startup entry points.
//!
//! The bootstrap calls [`locales`], [`utils`], [`configure_store`] and
//! [`setup_middlewares`] once, in that order, against one shared [`Store`].
//! [`run`] does exactly that.

use crate::config::Config;
use crate::connection::ConnectionWatcher;
use crate::constants::{CLASS_NO_TOUCH, CLASS_TOUCH, FEATURE_NETWORK_CONNECTION, FEATURE_OAUTH};
use crate::forms::{FormGuard, ProtectedForms};
use crate::host::Host;
use crate::i18n::{I18n, LocaleTarget};
use crate::listeners::SubscriptionId;
use crate::locale::LocaleInitializer;
use crate::middleware::{
    AttachStore, AuthGate, ClearNotices, ContextEnrichment, LoggedOutAccess, RouteStateDispatch,
    UnsavedFormGuard,
};
use crate::router::Router;
use crate::sections::SectionRegistry;
use crate::store::{Action, Store};
use crate::user::CurrentUser;
use std::rc::Rc;

/// Source of the OAuth bearer token.
pub trait TokenStore {
    fn token(&self) -> Option<String>;
}

/// Token fixed at construction; used natively and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl TokenStore for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Collaborators the setup functions share.
#[derive(Clone)]
pub struct Services {
    pub config: Rc<Config>,
    pub host: Rc<dyn Host>,
    pub i18n: I18n,
    /// Receives locale changes; the i18n runtime itself unless a platform
    /// loader wraps it.
    pub locale_target: Rc<dyn LocaleTarget>,
    pub user: CurrentUser,
    pub tokens: Rc<dyn TokenStore>,
    pub sections: Rc<SectionRegistry>,
    pub forms: ProtectedForms,
    pub form_guard: Rc<dyn FormGuard>,
    /// Raw bootstrapped locale JSON.
    pub bootstrap_locale: Option<String>,
}

impl Services {
    #[must_use]
    pub fn new(config: Config, host: Rc<dyn Host>) -> Self {
        let i18n = I18n::new();
        let forms = ProtectedForms::new(Rc::clone(&host));
        Self {
            config: Rc::new(config),
            locale_target: Rc::new(i18n.clone()),
            i18n,
            user: CurrentUser::default(),
            tokens: Rc::new(StaticToken::default()),
            sections: Rc::new(SectionRegistry::default()),
            form_guard: Rc::new(forms.clone()),
            forms,
            host,
            bootstrap_locale: None,
        }
    }

    /// Replace the i18n runtime; the locale target follows unless set later.
    #[must_use]
    pub fn with_i18n(mut self, i18n: I18n) -> Self {
        self.locale_target = Rc::new(i18n.clone());
        self.i18n = i18n;
        self
    }

    #[must_use]
    pub fn with_locale_target(mut self, target: Rc<dyn LocaleTarget>) -> Self {
        self.locale_target = target;
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: CurrentUser) -> Self {
        self.user = user;
        self
    }

    #[must_use]
    pub fn with_tokens(mut self, tokens: Rc<dyn TokenStore>) -> Self {
        self.tokens = tokens;
        self
    }

    #[must_use]
    pub fn with_sections(mut self, sections: SectionRegistry) -> Self {
        self.sections = Rc::new(sections);
        self
    }

    #[must_use]
    pub fn with_form_guard(mut self, guard: Rc<dyn FormGuard>) -> Self {
        self.form_guard = guard;
        self
    }

    #[must_use]
    pub fn with_bootstrap_locale(mut self, payload: Option<String>) -> Self {
        self.bootstrap_locale = payload;
        self
    }

    /// Router rooted at the configured base path.
    #[must_use]
    pub fn new_router(&self) -> Router {
        Router::new(self.config.router_base(), Rc::clone(&self.host))
    }
}

/// Apply bootstrapped translations and follow the user's locale preference.
pub fn locales(store: &Store, services: &Services) -> LocaleInitializer {
    LocaleInitializer::install(
        Rc::clone(&services.locale_target),
        &services.user,
        store,
        services.bootstrap_locale.as_deref(),
    )
}

/// Tag the document root for touch input, install accessible focus, and
/// load development instrumentation when configured.
pub fn utils(services: &Services) {
    let host = &services.host;
    if host.supports_touch() {
        host.add_root_class(CLASS_TOUCH);
    } else {
        host.add_root_class(CLASS_NO_TOUCH);
    }
    host.install_accessible_focus();
    if services.config.wants_dev_instrumentation() {
        log::info!("loading development instrumentation");
        host.load_dev_instrumentation();
    }
}

/// Mirror the i18n runtime's locale into the store.
pub fn bind_locale_state(store: &Store, i18n: &I18n) -> SubscriptionId {
    let current = i18n.locale_state();
    if store.select(|state| state.locale != current) {
        store.dispatch(Action::LocaleSet {
            slug: current.slug,
            rtl: current.rtl,
        });
    }
    let store = store.clone();
    i18n.on_change(move |locale| {
        store.dispatch(Action::LocaleSet {
            slug: locale.slug.clone(),
            rtl: locale.rtl,
        });
    })
}

/// Bind locale state and, when enabled, the connectivity watcher.
pub fn configure_store(store: &Store, services: &Services) {
    bind_locale_state(store, &services.i18n);
    if services.config.is_enabled(FEATURE_NETWORK_CONNECTION) {
        ConnectionWatcher::init(store, &services.host);
    }
}

/// Install the navigation middleware chain in its fixed order.
pub fn setup_middlewares(router: &mut Router, store: &Store, services: &Services) {
    let config = &services.config;
    router.on(
        "*",
        ContextEnrichment::new(store.clone(), Rc::clone(&services.host), &config.paths.logout),
    );
    router.exit("*", AttachStore::new(store.clone()));

    if config.is_enabled(FEATURE_OAUTH) {
        router.on(
            "*",
            AuthGate::new(
                Rc::clone(config),
                Rc::clone(&services.tokens),
                services.user.clone(),
            ),
        );
    }

    router.on(
        "*",
        LoggedOutAccess::new(
            Rc::clone(config),
            services.user.clone(),
            Rc::clone(&services.sections),
        ),
    );
    router.on("*", RouteStateDispatch::new(store.clone()));
    router.on("*", ClearNotices::new(store.clone()));
    router.exit("*", UnsavedFormGuard::new(Rc::clone(&services.form_guard)));
    log::debug!("middleware chain: {:?}", router.handler_names());
}

/// Handles that must outlive the boot call.
pub struct BootHandles {
    pub locale: LocaleInitializer,
}

/// Run every setup step in order.
pub fn run(services: &Services, store: &Store, router: &mut Router) -> BootHandles {
    log::info!("booting (env: {})", services.config.env_id);
    let locale = locales(store, services);
    utils(services);
    configure_store(store, services);
    setup_middlewares(router, store, services);
    BootHandles { locale }
}
