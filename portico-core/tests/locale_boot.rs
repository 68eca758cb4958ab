use portico_core::{
    Config, CurrentUser, I18n, LocaleData, LocaleTarget, MemoryHost, Services,
    StaticLocaleSource, Store, User, run,
};
use std::cell::RefCell;
use std::rc::Rc;

const FRENCH: &str = include_str!("../../portico-web/static/languages/fr.json");
const ARABIC: &str = include_str!("../../portico-web/static/languages/ar.json");

/// Counts calls, then forwards to a real i18n runtime.
struct CountingTarget {
    inner: I18n,
    applied: RefCell<Vec<String>>,
    switched: RefCell<Vec<String>>,
}

impl LocaleTarget for CountingTarget {
    fn set_locale(&self, data: LocaleData) {
        self.applied.borrow_mut().push(data.slug.clone());
        self.inner.set_locale(data);
    }

    fn switch_locale(&self, slug: &str) {
        self.switched.borrow_mut().push(slug.to_string());
        self.inner.switch_locale(slug);
    }
}

fn boot(
    user: Option<User>,
    payload: Option<&str>,
) -> (Rc<CountingTarget>, Services, Store) {
    let source = StaticLocaleSource::new()
        .with(LocaleData::from_json(FRENCH).unwrap())
        .with(LocaleData::from_json(ARABIC).unwrap());
    let i18n = I18n::with_source(source);
    let target = Rc::new(CountingTarget {
        inner: i18n.clone(),
        applied: RefCell::new(Vec::new()),
        switched: RefCell::new(Vec::new()),
    });
    let services = Services::new(Config::default(), Rc::new(MemoryHost::new()))
        .with_i18n(i18n)
        .with_locale_target(target.clone())
        .with_user(CurrentUser::new(user))
        .with_bootstrap_locale(payload.map(ToString::to_string));
    let store = Store::default();
    let mut router = services.new_router();
    let _handles = run(&services, &store, &mut router);
    (target, services, store)
}

#[test]
fn bootstrapped_strings_apply_once_without_user() {
    let (target, services, store) = boot(None, Some(FRENCH));
    assert_eq!(*target.applied.borrow(), vec!["fr".to_string()]);
    assert!(target.switched.borrow().is_empty());
    assert_eq!(services.i18n.translate("Settings"), "Réglages");
    assert_eq!(store.state().locale.slug, "fr");

    // Later identity changes without a locale preference re-apply nothing.
    services.user.set(None);
    services.user.set(Some(User::new(3, "lin")));
    assert_eq!(target.applied.borrow().len(), 1);
    assert!(target.switched.borrow().is_empty());
}

#[test]
fn user_preference_switches_once_per_change() {
    let (target, services, store) = boot(Some(User::new(1, "ada").with_locale("fr")), None);
    assert_eq!(*target.switched.borrow(), vec!["fr".to_string()]);
    assert_eq!(store.state().locale.slug, "fr");

    services
        .user
        .set(Some(User::new(1, "ada").with_locale("ar")));
    assert_eq!(target.switched.borrow().len(), 2);
    let locale = store.state().locale;
    assert_eq!(locale.slug, "ar");
    assert!(locale.rtl);

    services
        .user
        .set(Some(User::new(1, "ada").with_locale("ar")));
    assert_eq!(target.switched.borrow().len(), 3);
}

#[test]
fn unknown_user_locale_keeps_current_strings() {
    let (target, services, store) = boot(None, Some(FRENCH));
    services
        .user
        .set(Some(User::new(2, "ren").with_locale("xx")));
    assert_eq!(*target.switched.borrow(), vec!["xx".to_string()]);
    assert_eq!(services.i18n.slug(), "fr");
    assert_eq!(store.state().locale.slug, "fr");
}
