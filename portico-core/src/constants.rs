//! Named feature flags, default routes, and store keys shared by the boot
//! sequence. Routes here are defaults only; deployments override them
//! through [`crate::config::PathsConfig`].

// Feature flags ------------------------------------------------------------
pub const FEATURE_OAUTH: &str = "oauth";
pub const FEATURE_DESKTOP: &str = "desktop";
pub const FEATURE_DEVDOCS_REDIRECT: &str = "devdocs/redirect-loggedout-homepage";
pub const FEATURE_NETWORK_CONNECTION: &str = "network-connection";
pub const FEATURE_DEV_INSTRUMENTATION: &str = "dev/instrumentation";

// Environment ------------------------------------------------------------
pub const ENV_DEVELOPMENT: &str = "development";
pub const ENV_PRODUCTION: &str = "production";

// Routes -----------------------------------------------------------------
pub const ROOT_PATH: &str = "/";
pub const DEFAULT_LOGOUT_PATH: &str = "/log-out";
pub const DEFAULT_LOGIN_PATH: &str = "/log-in";
pub const DEFAULT_AUTHORIZE_PATH: &str = "/authorize";
pub const DEFAULT_DEVDOCS_START_PATH: &str = "/devdocs/start";
pub const DEFAULT_AUTH_EXEMPT_PREFIXES: &[&str] =
    &["/log-in", "/authorize", "/start", "/api/oauth/token"];
pub const DEFAULT_LOCALE_URL_TEMPLATE: &str = "/languages/{slug}.json";

// Document root classes --------------------------------------------------
pub const CLASS_TOUCH: &str = "touch";
pub const CLASS_NO_TOUCH: &str = "notouch";
pub const CLASS_ACCESSIBLE_FOCUS: &str = "accessible-focus";

// Notices ----------------------------------------------------------------
pub const NOTICE_CONNECTION_STATUS: &str = "connection-status";
pub const NOTICE_CONNECTION_LOST: &str = "You are offline. Changes will not be saved until the connection returns.";
pub const NOTICE_CONNECTION_RESTORED: &str = "You are back online.";
pub const UNSAVED_FORM_PROMPT: &str =
    "You have unsaved changes. Are you sure you want to leave this page?";

// Router -----------------------------------------------------------------
pub const MAX_REDIRECTS: usize = 8;

// Locale -----------------------------------------------------------------
pub const DEFAULT_LOCALE_SLUG: &str = "en";
pub const RTL_LOCALE_SLUGS: &[&str] = &["ar", "he", "fa", "ur"];
pub const LOCALE_META_KEY: &str = "";

// Storage ----------------------------------------------------------------
pub const TOKEN_STORAGE_KEY: &str = "portico.token";
