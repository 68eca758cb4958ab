//! Shared application store.
//!
//! A synchronous Redux-style container: [`reduce`] is a pure function of
//! `(state, action)`, and [`Store`] is a cheap cloneable handle around the
//! current state plus its subscribers. Dispatch happens on the UI thread only.

use crate::constants::DEFAULT_LOCALE_SLUG;
use crate::listeners::{Listeners, SubscriptionId};
use crate::query::QueryParams;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteState {
    pub path: String,
    pub query: QueryParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleState {
    pub slug: String,
    pub rtl: bool,
}

impl Default for LocaleState {
    fn default() -> Self {
        Self {
            slug: DEFAULT_LOCALE_SLUG.to_string(),
            rtl: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeStatus {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient UI message.
///
/// A notice with `display_on_next_page` stays hidden until the next
/// navigation; a `persistent` notice survives navigations until removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    pub status: NoticeStatus,
    pub text: String,
    #[serde(default)]
    pub persistent: bool,
    #[serde(default)]
    pub display_on_next_page: bool,
}

impl Notice {
    #[must_use]
    pub fn new(id: impl Into<String>, status: NoticeStatus, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status,
            text: text.into(),
            persistent: false,
            display_on_next_page: false,
        }
    }

    #[must_use]
    pub const fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    #[must_use]
    pub const fn on_next_page(mut self) -> Self {
        self.display_on_next_page = true;
        self
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        !self.display_on_next_page
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Unknown,
    Online,
    Offline,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub route: RouteState,
    pub locale: LocaleState,
    pub notices: Vec<Notice>,
    pub connection: ConnectionState,
}

impl AppState {
    /// Notices that should currently be rendered.
    pub fn visible_notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(|n| n.is_visible())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    RouteSet { path: String, query: QueryParams },
    LocaleSet { slug: String, rtl: bool },
    NoticeCreate { notice: Notice },
    NoticeRemove { id: String },
    NoticesNavigated,
    ConnectionChanged { online: bool },
}

/// Compute the next state. Pure; never touches listeners.
#[must_use]
pub fn reduce(state: &AppState, action: &Action) -> AppState {
    let mut next = state.clone();
    match action {
        Action::RouteSet { path, query } => {
            next.route = RouteState {
                path: path.clone(),
                query: query.clone(),
            };
        }
        Action::LocaleSet { slug, rtl } => {
            next.locale = LocaleState {
                slug: slug.clone(),
                rtl: *rtl,
            };
        }
        Action::NoticeCreate { notice } => {
            next.notices.retain(|n| n.id != notice.id);
            next.notices.push(notice.clone());
        }
        Action::NoticeRemove { id } => {
            next.notices.retain(|n| &n.id != id);
        }
        Action::NoticesNavigated => {
            next.notices.retain(|n| n.persistent || n.display_on_next_page);
            for notice in &mut next.notices {
                notice.display_on_next_page = false;
            }
        }
        Action::ConnectionChanged { online } => {
            next.connection = if *online {
                ConnectionState::Online
            } else {
                ConnectionState::Offline
            };
        }
    }
    next
}

type StateListener = dyn Fn(&AppState);
type ActionObserver = dyn Fn(&Action);

struct StoreInner {
    state: AppState,
    listeners: Listeners<StateListener>,
    observers: Listeners<ActionObserver>,
}

/// Cloneable handle to the shared application store.
#[derive(Clone)]
pub struct Store {
    inner: Rc<RefCell<StoreInner>>,
}

impl Store {
    #[must_use]
    pub fn new(initial: AppState) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                state: initial,
                listeners: Listeners::new(),
                observers: Listeners::new(),
            })),
        }
    }

    /// Apply an action synchronously.
    ///
    /// Action observers see the action before it is reduced; state listeners
    /// run afterwards with the new state. Both may dispatch re-entrantly.
    pub fn dispatch(&self, action: Action) {
        log::trace!("dispatch {action:?}");
        let observers = self.inner.borrow().observers.snapshot();
        for observer in observers {
            observer(&action);
        }

        let next = {
            let mut inner = self.inner.borrow_mut();
            let next = reduce(&inner.state, &action);
            inner.state = next.clone();
            next
        };

        let listeners = self.inner.borrow().listeners.snapshot();
        for listener in listeners {
            listener(&next);
        }
    }

    #[must_use]
    pub fn state(&self) -> AppState {
        self.inner.borrow().state.clone()
    }

    /// Read a projection of the state without cloning all of it.
    pub fn select<R>(&self, selector: impl FnOnce(&AppState) -> R) -> R {
        selector(&self.inner.borrow().state)
    }

    pub fn subscribe(&self, listener: impl Fn(&AppState) + 'static) -> SubscriptionId {
        self.inner.borrow_mut().listeners.add(Rc::new(listener))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.borrow_mut().listeners.remove(id)
    }

    /// Register a callback that sees every dispatched action.
    pub fn observe_actions(&self, observer: impl Fn(&Action) + 'static) -> SubscriptionId {
        self.inner.borrow_mut().observers.add(Rc::new(observer))
    }

    pub fn unobserve_actions(&self, id: SubscriptionId) -> bool {
        self.inner.borrow_mut().observers.remove(id)
    }

    /// True when both handles point at the same store.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Store")
            .field("state", &inner.state)
            .field("listeners", &inner.listeners.len())
            .field("observers", &inner.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn navigation_drops_shown_notices_and_reveals_deferred_ones() {
        let store = Store::default();
        store.dispatch(Action::NoticeCreate {
            notice: Notice::new("saved", NoticeStatus::Success, "Saved"),
        });
        store.dispatch(Action::NoticeCreate {
            notice: Notice::new("pinned", NoticeStatus::Warning, "Offline").persistent(),
        });
        store.dispatch(Action::NoticeCreate {
            notice: Notice::new("later", NoticeStatus::Info, "Welcome").on_next_page(),
        });
        assert_eq!(store.select(|s| s.visible_notices().count()), 2);

        store.dispatch(Action::NoticesNavigated);
        let ids: Vec<String> = store.select(|s| s.notices.iter().map(|n| n.id.clone()).collect());
        assert_eq!(ids, vec!["pinned".to_string(), "later".to_string()]);
        assert_eq!(store.select(|s| s.visible_notices().count()), 2);

        store.dispatch(Action::NoticesNavigated);
        assert_eq!(store.select(|s| s.notices.len()), 1);
    }

    #[test]
    fn notice_create_replaces_same_id() {
        let state = AppState::default();
        let state = reduce(
            &state,
            &Action::NoticeCreate {
                notice: Notice::new("a", NoticeStatus::Info, "one"),
            },
        );
        let state = reduce(
            &state,
            &Action::NoticeCreate {
                notice: Notice::new("a", NoticeStatus::Error, "two"),
            },
        );
        assert_eq!(state.notices.len(), 1);
        assert_eq!(state.notices[0].text, "two");
        let state = reduce(&state, &Action::NoticeRemove { id: "a".into() });
        assert!(state.notices.is_empty());
    }

    #[test]
    fn listeners_may_dispatch_reentrantly() {
        let store = Store::default();
        let inner = store.clone();
        let fired = Rc::new(Cell::new(0));
        let count = Rc::clone(&fired);
        store.subscribe(move |state| {
            count.set(count.get() + 1);
            if state.connection == ConnectionState::Offline {
                inner.dispatch(Action::ConnectionChanged { online: true });
            }
        });
        store.dispatch(Action::ConnectionChanged { online: false });
        assert_eq!(fired.get(), 2);
        assert_eq!(store.state().connection, ConnectionState::Online);
    }

    #[test]
    fn observers_see_actions_and_can_unsubscribe() {
        let store = Store::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = store.observe_actions(move |action| sink.borrow_mut().push(action.clone()));
        store.dispatch(Action::LocaleSet {
            slug: "fr".into(),
            rtl: false,
        });
        assert!(store.unobserve_actions(id));
        store.dispatch(Action::NoticesNavigated);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(store.state().locale.slug, "fr");
    }

    #[test]
    fn actions_serialize_with_type_tag() {
        let json = serde_json::to_value(Action::ConnectionChanged { online: true }).unwrap();
        assert_eq!(json["type"], "CONNECTION_CHANGED");
        assert_eq!(json["online"], true);
    }
}
