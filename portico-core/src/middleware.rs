//! Route-interception handlers installed by [`crate::boot::setup_middlewares`].

use crate::boot::TokenStore;
use crate::config::Config;
use crate::constants::{FEATURE_DESKTOP, FEATURE_DEVDOCS_REDIRECT, ROOT_PATH};
use crate::context::Context;
use crate::forms::FormGuard;
use crate::host::Host;
use crate::query::{HashParams, decode_component, parse_hash, parse_query};
use crate::router::{Flow, Middleware};
use crate::sections::SectionRegistry;
use crate::store::{Action, Store};
use crate::user::CurrentUser;
use std::rc::Rc;

/// Decodes the URL pieces, attaches the store and hands the logout path to
/// the server.
pub struct ContextEnrichment {
    store: Store,
    host: Rc<dyn Host>,
    logout_path: String,
}

impl ContextEnrichment {
    pub const NAME: &'static str = "context";

    #[must_use]
    pub fn new(store: Store, host: Rc<dyn Host>, logout_path: &str) -> Self {
        Self {
            store,
            host,
            logout_path: logout_path.to_string(),
        }
    }
}

impl Middleware for ContextEnrichment {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn handle(&self, ctx: &mut Context) -> Flow {
        ctx.pathname = decode_component(&ctx.pathname).unwrap_or_else(|err| {
            log::debug!("keeping undecodable pathname {}: {err}", ctx.pathname);
            ctx.pathname.clone()
        });
        ctx.store = Some(self.store.clone());

        if ctx.pathname == self.logout_path {
            self.host.full_page_load(&ctx.canonical_path);
            return Flow::Halt;
        }

        ctx.query = parse_query(ctx.canonical_querystring());
        ctx.prev_path = self.host.current_path().filter(|prev| *prev != ctx.path);
        ctx.hash = parse_hash(&ctx.hashstring).unwrap_or_else(|err| {
            log::warn!("failed to parse fragment `{}`: {err}", ctx.hashstring);
            HashParams::new()
        });
        Flow::Next
    }
}

/// Exit handler that makes sure contexts which never passed through
/// [`ContextEnrichment`] still carry the store.
pub struct AttachStore {
    store: Store,
}

impl AttachStore {
    pub const NAME: &'static str = "attach-store";

    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

impl Middleware for AttachStore {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn handle(&self, ctx: &mut Context) -> Flow {
        if ctx.store.is_none() {
            ctx.store = Some(self.store.clone());
        }
        Flow::Next
    }
}

/// Sends visitors without an auth token to the login route, and signed-in
/// token holders away from it.
pub struct AuthGate {
    config: Rc<Config>,
    tokens: Rc<dyn TokenStore>,
    user: CurrentUser,
}

impl AuthGate {
    pub const NAME: &'static str = "auth-gate";

    #[must_use]
    pub fn new(config: Rc<Config>, tokens: Rc<dyn TokenStore>, user: CurrentUser) -> Self {
        Self {
            config,
            tokens,
            user,
        }
    }

    fn has_valid_token(&self) -> bool {
        self.tokens
            .token()
            .is_some_and(|token| !token.trim().is_empty())
    }

    fn is_exempt(&self, ctx: &Context) -> bool {
        self.config
            .auth_exempt_prefixes
            .iter()
            .any(|prefix| ctx.path_starts_with(prefix))
    }
}

impl Middleware for AuthGate {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn handle(&self, ctx: &mut Context) -> Flow {
        let login = &self.config.paths.login;
        if !self.has_valid_token() {
            if self.is_exempt(ctx) {
                return Flow::Next;
            }
            log::info!("no auth token; redirecting {} to {login}", ctx.path);
            return Flow::Redirect(login.clone());
        }
        // A token without a user stays on login; `/` would bounce back here.
        if self.user.is_signed_in() && ctx.pathname.starts_with(login.as_str()) {
            return Flow::Redirect(ROOT_PATH.to_string());
        }
        Flow::Next
    }
}

/// Keeps logged-out visitors inside the sections that allow them.
pub struct LoggedOutAccess {
    config: Rc<Config>,
    user: CurrentUser,
    sections: Rc<SectionRegistry>,
}

impl LoggedOutAccess {
    pub const NAME: &'static str = "logged-out";

    #[must_use]
    pub fn new(config: Rc<Config>, user: CurrentUser, sections: Rc<SectionRegistry>) -> Self {
        Self {
            config,
            user,
            sections,
        }
    }

    fn root_redirect(&self) -> Option<&str> {
        if self.config.is_enabled(FEATURE_DESKTOP) {
            Some(&self.config.paths.login)
        } else if self.config.is_enabled(FEATURE_DEVDOCS_REDIRECT) {
            Some(&self.config.paths.devdocs_start)
        } else {
            None
        }
    }
}

impl Middleware for LoggedOutAccess {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn handle(&self, ctx: &mut Context) -> Flow {
        if self.user.is_signed_in() {
            return Flow::Next;
        }
        if ctx.pathname == ROOT_PATH
            && let Some(target) = self.root_redirect()
        {
            return Flow::Redirect(target.to_string());
        }
        if let Some(prefix) = self.sections.logged_out_match(&ctx.path) {
            log::trace!("{} allowed logged-out via {prefix}", ctx.path);
            return Flow::Next;
        }
        log::debug!("{} is not available logged-out", ctx.path);
        Flow::Halt
    }
}

/// Records the current pathname and query in the store.
pub struct RouteStateDispatch {
    store: Store,
}

impl RouteStateDispatch {
    pub const NAME: &'static str = "route-state";

    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

impl Middleware for RouteStateDispatch {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn handle(&self, ctx: &mut Context) -> Flow {
        let store = ctx.store.as_ref().unwrap_or(&self.store);
        store.dispatch(Action::RouteSet {
            path: ctx.pathname.clone(),
            query: ctx.query.clone(),
        });
        Flow::Next
    }
}

pub struct ClearNotices {
    store: Store,
}

impl ClearNotices {
    pub const NAME: &'static str = "clear-notices";

    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

impl Middleware for ClearNotices {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn handle(&self, _ctx: &mut Context) -> Flow {
        self.store.dispatch(Action::NoticesNavigated);
        Flow::Next
    }
}

/// Exit handler deferring to a [`FormGuard`].
pub struct UnsavedFormGuard {
    guard: Rc<dyn FormGuard>,
}

impl UnsavedFormGuard {
    pub const NAME: &'static str = "unsaved-forms";

    #[must_use]
    pub fn new(guard: Rc<dyn FormGuard>) -> Self {
        Self { guard }
    }
}

impl Middleware for UnsavedFormGuard {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn handle(&self, ctx: &mut Context) -> Flow {
        if self.guard.allow_leave(ctx) {
            Flow::Next
        } else {
            Flow::Halt
        }
    }
}
