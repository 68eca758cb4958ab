//! Navigation dispatcher.
//!
//! Entry handlers run in registration order for every navigation whose
//! pathname matches their pattern; exit handlers run against the page being
//! left and may veto the navigation.

use crate::constants::MAX_REDIRECTS;
use crate::context::Context;
use crate::error::RouterError;
use crate::host::Host;
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// What a middleware wants the router to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Continue with the next matching handler.
    Next,
    /// Stop here; later handlers never run.
    Halt,
    /// Abandon this navigation and start a new one at the given path.
    Redirect(String),
}

pub trait Middleware {
    /// Label reported in [`Outcome`] when this handler stops a navigation.
    fn name(&self) -> &str;

    fn handle(&self, ctx: &mut Context) -> Flow;
}

impl<F> Middleware for F
where
    F: Fn(&mut Context) -> Flow,
{
    fn name(&self) -> &str {
        std::any::type_name::<F>()
    }

    fn handle(&self, ctx: &mut Context) -> Flow {
        self(ctx)
    }
}

/// Which pathnames a handler applies to: `*`, `/exact`, or `/prefix/*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Any,
    Exact(String),
    Prefix(String),
}

impl Pattern {
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        if pattern == "*" {
            Self::Any
        } else if let Some(prefix) = pattern.strip_suffix("/*") {
            Self::Prefix(prefix.to_string())
        } else {
            Self::Exact(pattern.to_string())
        }
    }

    #[must_use]
    pub fn matches(&self, pathname: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(exact) => pathname == exact,
            Self::Prefix(prefix) => pathname
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

/// Result of one call to [`Router::navigate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Every matching handler continued; `path` is now the current page.
    Completed { path: String, redirects: Vec<String> },
    /// An entry handler stopped the chain.
    Halted {
        path: String,
        by: String,
        redirects: Vec<String>,
    },
    /// An exit handler refused to leave the current page.
    Blocked { path: String, by: String },
}

impl Outcome {
    /// Path the navigation ended on (after redirects).
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Completed { path, .. } | Self::Halted { path, .. } | Self::Blocked { path, .. } => {
                path
            }
        }
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

struct Registration {
    pattern: Pattern,
    handler: Rc<dyn Middleware>,
}

enum ChainResult {
    Completed,
    Halted(String),
    Redirect(String),
}

pub struct Router {
    base: String,
    host: Rc<dyn Host>,
    entries: Vec<Registration>,
    exits: Vec<Registration>,
    current: Option<Context>,
    completed: u64,
}

impl Router {
    #[must_use]
    pub fn new(base: &str, host: Rc<dyn Host>) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            host,
            entries: Vec::new(),
            exits: Vec::new(),
            current: None,
            completed: 0,
        }
    }

    /// Register an entry handler.
    pub fn on(&mut self, pattern: &str, handler: impl Middleware + 'static) -> &mut Self {
        self.entries.push(Registration {
            pattern: Pattern::parse(pattern),
            handler: Rc::new(handler),
        });
        self
    }

    /// Register an exit handler, run when leaving a matching page.
    pub fn exit(&mut self, pattern: &str, handler: impl Middleware + 'static) -> &mut Self {
        self.exits.push(Registration {
            pattern: Pattern::parse(pattern),
            handler: Rc::new(handler),
        });
        self
    }

    #[must_use]
    pub fn current(&self) -> Option<&Context> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn current_path(&self) -> Option<&str> {
        self.current.as_ref().map(|ctx| ctx.path.as_str())
    }

    #[must_use]
    pub fn completed_navigations(&self) -> u64 {
        self.completed
    }

    #[must_use]
    pub fn handler_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|r| r.handler.name().to_string())
            .collect()
    }

    /// Navigate to `path`, running exit handlers for the current page and
    /// then the entry chain. Redirects restart the entry chain.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::RedirectLoop`] after more than
    /// [`MAX_REDIRECTS`] consecutive redirects.
    pub fn navigate(&mut self, path: &str) -> Result<Outcome, RouterError> {
        if let Some(by) = self.run_exits() {
            log::debug!("navigation to {path} blocked by {by}");
            return Ok(Outcome::Blocked {
                path: self.current_path().unwrap_or(path).to_string(),
                by,
            });
        }

        let mut target = path.to_string();
        let mut redirects = Vec::new();
        loop {
            let mut ctx = Context::new(&target, &self.base);
            ctx.init = self.completed == 0;
            match self.run_entries(&mut ctx) {
                ChainResult::Completed => {
                    log::debug!("navigation to {} completed", ctx.path);
                    self.host.commit_path(&ctx.path);
                    let path = ctx.path.clone();
                    self.current = Some(ctx);
                    self.completed += 1;
                    return Ok(Outcome::Completed { path, redirects });
                }
                ChainResult::Halted(by) => {
                    log::debug!("navigation to {} halted by {by}", ctx.path);
                    return Ok(Outcome::Halted {
                        path: ctx.path,
                        by,
                        redirects,
                    });
                }
                ChainResult::Redirect(to) => {
                    log::debug!("navigation to {} redirected to {to}", ctx.path);
                    redirects.push(to.clone());
                    if redirects.len() > MAX_REDIRECTS {
                        return Err(RouterError::RedirectLoop { trail: redirects });
                    }
                    target = to;
                }
            }
        }
    }

    fn run_exits(&mut self) -> Option<String> {
        let current = self.current.as_mut()?;
        for registration in &self.exits {
            if !registration.pattern.matches(&current.pathname) {
                continue;
            }
            if registration.handler.handle(current) != Flow::Next {
                return Some(registration.handler.name().to_string());
            }
        }
        None
    }

    fn run_entries(&self, ctx: &mut Context) -> ChainResult {
        for registration in &self.entries {
            if !registration.pattern.matches(&ctx.pathname) {
                continue;
            }
            match registration.handler.handle(ctx) {
                Flow::Next => {}
                Flow::Halt => return ChainResult::Halted(registration.handler.name().to_string()),
                Flow::Redirect(to) => return ChainResult::Redirect(to),
            }
        }
        ChainResult::Completed
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("base", &self.base)
            .field("entries", &self.entries.len())
            .field("exits", &self.exits.len())
            .field("current", &self.current_path())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use std::cell::RefCell;

    fn router() -> Router {
        Router::new("", Rc::new(MemoryHost::new()))
    }

    #[test]
    fn pattern_parsing_and_matching() {
        assert!(Pattern::parse("*").matches("/anything"));
        let exact = Pattern::parse("/");
        assert!(exact.matches("/"));
        assert!(!exact.matches("/x"));
        let prefix = Pattern::parse("/devdocs/*");
        assert!(prefix.matches("/devdocs"));
        assert!(prefix.matches("/devdocs/start"));
        assert!(!prefix.matches("/devdocsextra"));
    }

    #[test]
    fn handlers_run_in_order_until_halt() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut router = router();
        let (a, b, c) = (Rc::clone(&log), Rc::clone(&log), Rc::clone(&log));
        router
            .on("*", move |_: &mut Context| {
                a.borrow_mut().push("a");
                Flow::Next
            })
            .on("/stop", move |_: &mut Context| {
                b.borrow_mut().push("b");
                Flow::Halt
            })
            .on("*", move |_: &mut Context| {
                c.borrow_mut().push("c");
                Flow::Next
            });

        assert!(router.navigate("/go").unwrap().is_completed());
        let outcome = router.navigate("/stop").unwrap();
        assert!(matches!(outcome, Outcome::Halted { .. }));
        assert_eq!(*log.borrow(), vec!["a", "c", "a", "b"]);
        assert_eq!(router.current_path(), Some("/go"));
    }

    #[test]
    fn redirects_restart_the_chain() {
        let mut router = router();
        router.on("/", |_: &mut Context| Flow::Redirect("/home".into()));
        let outcome = router.navigate("/").unwrap();
        assert_eq!(
            outcome,
            Outcome::Completed {
                path: "/home".into(),
                redirects: vec!["/home".into()],
            }
        );
        assert!(router.current().is_some_and(|ctx| ctx.init));
    }

    #[test]
    fn redirect_loops_are_reported() {
        let mut router = router();
        router
            .on("/a", |_: &mut Context| Flow::Redirect("/b".into()))
            .on("/b", |_: &mut Context| Flow::Redirect("/a".into()));
        let err = router.navigate("/a").unwrap_err();
        let RouterError::RedirectLoop { trail } = err;
        assert_eq!(trail.len(), MAX_REDIRECTS + 1);
    }

    #[test]
    fn exit_handlers_can_block() {
        let mut router = router();
        router.exit("/editor/*", |_: &mut Context| Flow::Halt);
        router.navigate("/editor/post").unwrap();
        let outcome = router.navigate("/elsewhere").unwrap();
        assert!(matches!(outcome, Outcome::Blocked { ref path, .. } if path == "/editor/post"));
        assert_eq!(router.completed_navigations(), 1);
    }
}
