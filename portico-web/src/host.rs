//! [`Host`] over the real browser.

use crate::dom;
use portico_core::host::ConnectivityListener;
use portico_core::{Context, FocusInput, Host, handle_focus_input};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlScriptElement, KeyboardEvent};

const DEV_INSTRUMENTATION_SRC: &str = "dev/instrumentation.js";

#[derive(Clone)]
pub struct BrowserHost {
    base: String,
    committed: Rc<RefCell<Option<String>>>,
}

impl BrowserHost {
    #[must_use]
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            committed: Rc::new(RefCell::new(None)),
        }
    }

    /// Replace the address bar entry, e.g. after a redirect, and let the
    /// history listeners observe it.
    pub fn replace_url(&self, path: &str) {
        replace_history(&crate::paths::with_base(&self.base, path));
    }

    /// App path of the address bar, base stripped.
    fn location_path() -> Option<String> {
        let location = dom::window()?.location();
        let pathname = location.pathname().ok()?;
        let search = location.search().unwrap_or_default();
        Some(format!("{pathname}{search}"))
    }
}

/// Swap the current history entry for `url` (base included).
fn replace_history(url: &str) {
    let Some(win) = dom::window() else {
        return;
    };
    if let Ok(history) = win.history() {
        if let Err(err) = history.replace_state_with_url(&JsValue::NULL, "", Some(url)) {
            log::warn!("replaceState failed: {}", dom::js_error_message(&err));
            return;
        }
    }
    announce_history_change();
}

/// History listeners (yew-router's included) only hear `popstate`, which
/// `pushState`/`replaceState` never fire.
fn announce_history_change() {
    let Some(win) = dom::window() else {
        return;
    };
    if let Ok(event) = Event::new("popstate")
        && let Err(err) = win.dispatch_event(&event)
    {
        log::warn!("popstate dispatch failed: {}", dom::js_error_message(&err));
    }
}

fn listen(target: &web_sys::EventTarget, event: &str, handler: Closure<dyn FnMut(Event)>) {
    if let Err(err) = target.add_event_listener_with_callback(event, handler.as_ref().unchecked_ref())
    {
        log::warn!("could not listen for {event}: {}", dom::js_error_message(&err));
    }
    // Listeners live as long as the page.
    handler.forget();
}

impl Host for BrowserHost {
    fn supports_touch(&self) -> bool {
        let Some(win) = dom::window() else {
            return false;
        };
        js_sys::Reflect::has(&win, &JsValue::from_str("ontouchstart")).unwrap_or(false)
            || win.navigator().max_touch_points() > 0
    }

    fn add_root_class(&self, class: &str) {
        if let Some(root) = dom::root_element()
            && let Err(err) = root.class_list().add_1(class)
        {
            log::warn!("could not add class {class}: {}", dom::js_error_message(&err));
        }
    }

    fn remove_root_class(&self, class: &str) {
        if let Some(root) = dom::root_element()
            && let Err(err) = root.class_list().remove_1(class)
        {
            log::warn!("could not remove class {class}: {}", dom::js_error_message(&err));
        }
    }

    fn install_accessible_focus(&self) {
        let Some(doc) = dom::document() else {
            return;
        };
        let host = self.clone();
        listen(
            &doc,
            "keydown",
            Closure::wrap(Box::new(move |event: Event| {
                if let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) {
                    handle_focus_input(&host, &FocusInput::Key(key));
                }
            }) as Box<dyn FnMut(Event)>),
        );
        let host = self.clone();
        listen(
            &doc,
            "mousedown",
            Closure::wrap(Box::new(move |_event: Event| {
                handle_focus_input(&host, &FocusInput::PointerDown);
            }) as Box<dyn FnMut(Event)>),
        );
    }

    fn load_dev_instrumentation(&self) {
        let Some(doc) = dom::document() else {
            return;
        };
        let Some(head) = doc.head() else {
            return;
        };
        let script = match doc.create_element("script") {
            Ok(element) => match element.dyn_into::<HtmlScriptElement>() {
                Ok(script) => script,
                Err(_) => return,
            },
            Err(err) => {
                log::warn!("could not create script: {}", dom::js_error_message(&err));
                return;
            }
        };
        script.set_src(&crate::paths::asset_path(&self.base, DEV_INSTRUMENTATION_SRC));
        script.set_async(true);
        if let Err(err) = head.append_child(&script) {
            log::warn!("could not load instrumentation: {}", dom::js_error_message(&err));
        }
    }

    fn full_page_load(&self, url: &str) {
        if let Some(win) = dom::window() {
            if let Err(err) = win.location().set_href(url) {
                log::error!("page load of {url} failed: {}", dom::js_error_message(&err));
            }
        }
    }

    fn current_path(&self) -> Option<String> {
        if let Some(committed) = self.committed.borrow().clone() {
            return Some(committed);
        }
        Self::location_path().map(|full| Context::new(&full, &self.base).path)
    }

    fn commit_path(&self, path: &str) {
        *self.committed.borrow_mut() = Some(path.to_string());
    }

    fn restore_url(&self, path: &str) {
        // The page never changed; overwrite the entry the leave attempt pushed.
        replace_history(path);
    }

    fn confirm(&self, message: &str) -> bool {
        dom::window()
            .and_then(|win| win.confirm_with_message(message).ok())
            .unwrap_or(false)
    }

    fn is_online(&self) -> bool {
        dom::window().is_none_or(|win| win.navigator().on_line())
    }

    fn on_connectivity_change(&self, listener: ConnectivityListener) {
        let Some(win) = dom::window() else {
            return;
        };
        let listener: Rc<dyn Fn(bool)> = Rc::from(listener);
        for (event, online) in [("online", true), ("offline", false)] {
            let listener = Rc::clone(&listener);
            listen(
                &win,
                event,
                Closure::wrap(Box::new(move |_event: Event| listener(online))
                    as Box<dyn FnMut(Event)>),
            );
        }
    }
}
