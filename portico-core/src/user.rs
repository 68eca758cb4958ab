use crate::listeners::{Listeners, SubscriptionId};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The signed-in account as bootstrapped by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "ID", alias = "id")]
    pub id: u64,
    pub username: String,
    #[serde(rename = "localeSlug", alias = "locale_slug", default)]
    pub locale_slug: Option<String>,
}

impl User {
    #[must_use]
    pub fn new(id: u64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            locale_slug: None,
        }
    }

    #[must_use]
    pub fn with_locale(mut self, slug: impl Into<String>) -> Self {
        self.locale_slug = Some(slug.into());
        self
    }

    /// Locale preference, ignoring blank values.
    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.locale_slug
            .as_deref()
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
    }
}

type ChangeListener = dyn Fn(Option<&User>);

struct CurrentUserInner {
    user: Option<User>,
    listeners: Listeners<ChangeListener>,
}

/// Observable holder for the signed-in user.
///
/// Every [`set`](Self::set) emits exactly one change notification, whether
/// or not the value differs.
#[derive(Clone)]
pub struct CurrentUser {
    inner: Rc<RefCell<CurrentUserInner>>,
}

impl CurrentUser {
    #[must_use]
    pub fn new(user: Option<User>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CurrentUserInner {
                user,
                listeners: Listeners::new(),
            })),
        }
    }

    #[must_use]
    pub fn get(&self) -> Option<User> {
        self.inner.borrow().user.clone()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.inner.borrow().user.is_some()
    }

    pub fn set(&self, user: Option<User>) {
        self.inner.borrow_mut().user = user.clone();
        let listeners = self.inner.borrow().listeners.snapshot();
        for listener in listeners {
            listener(user.as_ref());
        }
    }

    /// Listeners receive the user as it was set.
    pub fn on_change(&self, listener: impl Fn(Option<&User>) + 'static) -> SubscriptionId {
        self.inner.borrow_mut().listeners.add(Rc::new(listener))
    }

    pub fn off_change(&self, id: SubscriptionId) -> bool {
        self.inner.borrow_mut().listeners.remove(id)
    }
}

impl Default for CurrentUser {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrentUser")
            .field("user", &self.inner.borrow().user)
            .finish_non_exhaustive()
    }
}
