#![cfg(target_arch = "wasm32")]

use portico_core::constants::{CLASS_ACCESSIBLE_FOCUS, CLASS_NO_TOUCH, CLASS_TOUCH};
use portico_core::{Config, Host, I18n, LocaleData, LocaleTarget, Services};
use portico_web::dom;
use portico_web::host::BrowserHost;
use portico_web::i18n::WebLocaleTarget;
use std::rc::Rc;
use wasm_bindgen_test::*;
use web_sys::{KeyboardEvent, KeyboardEventInit, MouseEvent};

wasm_bindgen_test_configure!(run_in_browser);

fn root_has(class: &str) -> bool {
    dom::root_element().is_some_and(|root| root.class_list().contains(class))
}

#[wasm_bindgen_test]
fn utils_tags_document_root() {
    let host = Rc::new(BrowserHost::new(""));
    let services = Services::new(Config::default(), host.clone());
    portico_core::utils(&services);
    assert!(root_has(CLASS_TOUCH) != root_has(CLASS_NO_TOUCH));
}

#[wasm_bindgen_test]
fn keyboard_then_pointer_toggles_accessible_focus() {
    let host = BrowserHost::new("");
    host.install_accessible_focus();
    let doc = dom::document().expect("document");

    let init = KeyboardEventInit::new();
    init.set_key("Tab");
    let tab = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).expect("keydown");
    doc.dispatch_event(&tab).expect("dispatch keydown");
    assert!(root_has(CLASS_ACCESSIBLE_FOCUS));

    let click = MouseEvent::new("mousedown").expect("mousedown");
    doc.dispatch_event(&click).expect("dispatch mousedown");
    assert!(!root_has(CLASS_ACCESSIBLE_FOCUS));
}

#[wasm_bindgen_test]
fn committed_path_becomes_previous_path() {
    let host = BrowserHost::new("");
    host.commit_path("/read?feed=3");
    assert_eq!(host.current_path().as_deref(), Some("/read?feed=3"));
}

#[wasm_bindgen_test]
fn applied_locale_sets_lang_and_dir() {
    let i18n = I18n::new();
    let target = WebLocaleTarget::new(i18n.clone(), Rc::new(Config::default()));
    let data = LocaleData::from_json(r#"{"":{"localeSlug":"ar"}}"#).expect("locale");
    target.set_locale(data);
    let root = dom::root_element().expect("html element");
    assert_eq!(root.get_attribute("lang").as_deref(), Some("ar"));
    assert_eq!(root.get_attribute("dir").as_deref(), Some("rtl"));
    assert!(i18n.is_rtl());
}

#[wasm_bindgen_test]
fn restoring_url_replaces_the_history_entry() {
    let host = BrowserHost::new("");
    let win = dom::window().expect("window");
    let history = win.history().expect("history");
    let before = history.length().expect("history length");

    host.restore_url("/post/42?draft=1");

    assert_eq!(history.length().expect("history length"), before);
    let location = win.location();
    assert_eq!(location.pathname().expect("pathname"), "/post/42");
    assert_eq!(location.search().expect("search"), "?draft=1");
}
