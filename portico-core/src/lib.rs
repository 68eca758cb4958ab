//! Portico boot core
//!
//! Platform-agnostic startup logic for the Portico single-page app.
//! This crate owns configuration, the application store, the i18n runtime,
//! and the navigation router with its middleware chain. Browser side effects
//! go through the [`Host`] trait so the whole sequence runs natively in tests
//! and in the tester CLI.

pub mod boot;
pub mod config;
pub mod connection;
pub mod constants;
pub mod context;
pub mod error;
pub mod forms;
pub mod host;
pub mod i18n;
pub mod listeners;
pub mod locale;
pub mod middleware;
pub mod query;
pub mod router;
pub mod sections;
pub mod store;
pub mod user;

// Re-export commonly used types
pub use boot::{
    BootHandles, Services, StaticToken, TokenStore, bind_locale_state, configure_store, locales,
    run, setup_middlewares, utils,
};
pub use config::{Config, PathsConfig};
pub use connection::ConnectionWatcher;
pub use context::Context;
pub use error::{ConfigError, LocaleError, QueryError, RouterError};
pub use forms::{FormGuard, ProtectedForms};
pub use host::{FocusInput, Host, HostEvent, MemoryHost, handle_focus_input};
pub use i18n::{I18n, LocaleData, LocaleSource, LocaleTarget, StaticLocaleSource};
pub use listeners::SubscriptionId;
pub use locale::LocaleInitializer;
pub use query::{HashParams, ParamValue, QueryParams};
pub use router::{Flow, Middleware, Outcome, Pattern, Router};
pub use sections::{Section, SectionRegistry};
pub use store::{
    Action, AppState, ConnectionState, LocaleState, Notice, NoticeStatus, RouteState, Store,
};
pub use user::{CurrentUser, User};
