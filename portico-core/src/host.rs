//! Browser side-effect seam.
//!
//! Everything the boot sequence does to the page goes through [`Host`]:
//! document-root classes, full page loads, history, confirmation prompts and
//! connectivity. `portico-web` implements it over `web-sys`; [`MemoryHost`]
//! records the same effects in memory for native runs.

use crate::constants::CLASS_ACCESSIBLE_FOCUS;
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

pub type ConnectivityListener = Box<dyn Fn(bool)>;

pub trait Host {
    /// Whether the device reports touch-capable input.
    fn supports_touch(&self) -> bool;

    fn add_root_class(&self, class: &str);

    fn remove_root_class(&self, class: &str);

    /// Wire keyboard/pointer listeners that feed [`handle_focus_input`].
    fn install_accessible_focus(&self);

    fn load_dev_instrumentation(&self);

    /// Leave the single-page app and load `url` from the server.
    fn full_page_load(&self, url: &str);

    /// Path (with query) the browser showed before the navigation in progress.
    fn current_path(&self) -> Option<String>;

    /// Record `path` as the page now on screen.
    fn commit_path(&self, path: &str);

    /// Put `path` back in the address bar after a cancelled navigation.
    fn restore_url(&self, path: &str);

    /// Ask the user a yes/no question.
    fn confirm(&self, message: &str) -> bool;

    fn is_online(&self) -> bool;

    fn on_connectivity_change(&self, listener: ConnectivityListener);
}

/// Input that toggles the accessible-focus root class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusInput {
    Key(String),
    PointerDown,
}

/// Keyboard navigation shows focus rings; pointer use hides them again.
pub fn handle_focus_input(host: &dyn Host, input: &FocusInput) {
    match input {
        FocusInput::Key(key) if key == "Tab" => host.add_root_class(CLASS_ACCESSIBLE_FOCUS),
        FocusInput::Key(_) => {}
        FocusInput::PointerDown => host.remove_root_class(CLASS_ACCESSIBLE_FOCUS),
    }
}

/// Effects recorded by [`MemoryHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    RootClassAdded(String),
    RootClassRemoved(String),
    AccessibleFocusInstalled,
    DevInstrumentationLoaded,
    FullPageLoad(String),
    PathCommitted(String),
    UrlRestored(String),
    Confirmed { message: String, answer: bool },
}

/// In-memory [`Host`] for native runs and tests.
pub struct MemoryHost {
    touch: Cell<bool>,
    online: Cell<bool>,
    confirm_answer: Cell<bool>,
    focus_installed: Cell<bool>,
    location: RefCell<Option<String>>,
    classes: RefCell<BTreeSet<String>>,
    events: RefCell<Vec<HostEvent>>,
    connectivity: RefCell<Vec<Rc<dyn Fn(bool)>>>,
}

impl MemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self {
            touch: Cell::new(false),
            online: Cell::new(true),
            confirm_answer: Cell::new(true),
            focus_installed: Cell::new(false),
            location: RefCell::new(None),
            classes: RefCell::new(BTreeSet::new()),
            events: RefCell::new(Vec::new()),
            connectivity: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_touch(self, touch: bool) -> Self {
        self.touch.set(touch);
        self
    }

    #[must_use]
    pub fn with_location(self, path: &str) -> Self {
        *self.location.borrow_mut() = Some(path.to_string());
        self
    }

    /// Answer future [`Host::confirm`] prompts with `answer`.
    pub fn set_confirm_answer(&self, answer: bool) {
        self.confirm_answer.set(answer);
    }

    /// Simulate the browser going on- or offline.
    pub fn set_online(&self, online: bool) {
        self.online.set(online);
        let listeners: Vec<_> = self.connectivity.borrow().iter().map(Rc::clone).collect();
        for listener in listeners {
            listener(online);
        }
    }

    /// Feed a keyboard or pointer event through the accessible-focus handler.
    /// Ignored until accessible focus is installed.
    pub fn simulate_focus_input(&self, input: &FocusInput) {
        if self.focus_installed.get() {
            handle_focus_input(self, input);
        }
    }

    #[must_use]
    pub fn location(&self) -> Option<String> {
        self.location.borrow().clone()
    }

    #[must_use]
    pub fn has_root_class(&self, class: &str) -> bool {
        self.classes.borrow().contains(class)
    }

    #[must_use]
    pub fn root_classes(&self) -> Vec<String> {
        self.classes.borrow().iter().cloned().collect()
    }

    #[must_use]
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.borrow().clone()
    }

    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }

    fn record(&self, event: HostEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for MemoryHost {
    fn supports_touch(&self) -> bool {
        self.touch.get()
    }

    fn add_root_class(&self, class: &str) {
        if self.classes.borrow_mut().insert(class.to_string()) {
            self.record(HostEvent::RootClassAdded(class.to_string()));
        }
    }

    fn remove_root_class(&self, class: &str) {
        if self.classes.borrow_mut().remove(class) {
            self.record(HostEvent::RootClassRemoved(class.to_string()));
        }
    }

    fn install_accessible_focus(&self) {
        self.focus_installed.set(true);
        self.record(HostEvent::AccessibleFocusInstalled);
    }

    fn load_dev_instrumentation(&self) {
        self.record(HostEvent::DevInstrumentationLoaded);
    }

    fn full_page_load(&self, url: &str) {
        *self.location.borrow_mut() = Some(url.to_string());
        self.record(HostEvent::FullPageLoad(url.to_string()));
    }

    fn current_path(&self) -> Option<String> {
        self.location()
    }

    fn commit_path(&self, path: &str) {
        *self.location.borrow_mut() = Some(path.to_string());
        self.record(HostEvent::PathCommitted(path.to_string()));
    }

    fn restore_url(&self, path: &str) {
        *self.location.borrow_mut() = Some(path.to_string());
        self.record(HostEvent::UrlRestored(path.to_string()));
    }

    fn confirm(&self, message: &str) -> bool {
        let answer = self.confirm_answer.get();
        self.record(HostEvent::Confirmed {
            message: message.to_string(),
            answer,
        });
        answer
    }

    fn is_online(&self) -> bool {
        self.online.get()
    }

    fn on_connectivity_change(&self, listener: ConnectivityListener) {
        self.connectivity.borrow_mut().push(Rc::from(listener));
    }
}
