//! Locale initializer.
//!
//! Two triggers drive the active locale: the bootstrapped payload at
//! startup, and every change notification from [`CurrentUser`]. Absent data
//! means no transition.

use crate::i18n::{LocaleData, LocaleTarget};
use crate::listeners::SubscriptionId;
use crate::store::{Action, LocaleState, Store};
use crate::user::{CurrentUser, User};
use std::rc::Rc;

/// Apply the bootstrapped translation payload, if any.
///
/// Returns the applied locale. Invalid payloads are logged and skipped.
pub fn apply_bootstrap(target: &dyn LocaleTarget, payload: Option<&str>) -> Option<LocaleState> {
    let raw = payload.map(str::trim).filter(|raw| !raw.is_empty())?;
    match LocaleData::from_json(raw) {
        Ok(data) => {
            let applied = LocaleState {
                slug: data.slug.clone(),
                rtl: data.rtl,
            };
            target.set_locale(data);
            Some(applied)
        }
        Err(err) => {
            log::warn!("ignoring bootstrapped locale payload: {err}");
            None
        }
    }
}

/// Switch to the signed-in user's preferred locale, if known.
pub fn apply_user_locale(target: &dyn LocaleTarget, user: Option<&User>) -> Option<String> {
    let slug = user?.locale()?.to_string();
    log::debug!("switching to user locale `{slug}`");
    target.switch_locale(&slug);
    Some(slug)
}

/// Keeps the active locale in step with the signed-in user.
pub struct LocaleInitializer {
    user: CurrentUser,
    subscription: SubscriptionId,
}

impl LocaleInitializer {
    /// Run the bootstrap trigger and subscribe to user changes.
    pub fn install(
        target: Rc<dyn LocaleTarget>,
        user: &CurrentUser,
        store: &Store,
        payload: Option<&str>,
    ) -> Self {
        if let Some(LocaleState { slug, rtl }) = apply_bootstrap(target.as_ref(), payload) {
            store.dispatch(Action::LocaleSet { slug, rtl });
        }
        apply_user_locale(target.as_ref(), user.get().as_ref());

        let subscription = user.on_change(move |changed| {
            apply_user_locale(target.as_ref(), changed);
        });
        Self {
            user: user.clone(),
            subscription,
        }
    }

    /// Stop following user changes.
    pub fn uninstall(self) -> bool {
        self.user.off_change(self.subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        applied: RefCell<Vec<String>>,
        switched: RefCell<Vec<String>>,
    }

    impl LocaleTarget for Recorder {
        fn set_locale(&self, data: LocaleData) {
            self.applied.borrow_mut().push(data.slug);
        }

        fn switch_locale(&self, slug: &str) {
            self.switched.borrow_mut().push(slug.to_string());
        }
    }

    #[test]
    fn bootstrap_payload_is_optional_and_validated() {
        let recorder = Recorder::default();
        assert_eq!(apply_bootstrap(&recorder, None), None);
        assert_eq!(apply_bootstrap(&recorder, Some("  ")), None);
        assert_eq!(apply_bootstrap(&recorder, Some("{oops")), None);
        assert_eq!(
            apply_bootstrap(&recorder, Some(r#"{"":{"localeSlug":"ja"}}"#)).map(|l| l.slug),
            Some("ja".to_string())
        );
        assert_eq!(*recorder.applied.borrow(), vec!["ja".to_string()]);
    }

    #[test]
    fn user_without_locale_is_no_transition() {
        let recorder = Recorder::default();
        let user = User::new(1, "ada");
        assert_eq!(apply_user_locale(&recorder, Some(&user)), None);
        assert_eq!(apply_user_locale(&recorder, None), None);
        assert!(recorder.switched.borrow().is_empty());
    }

    #[test]
    fn uninstall_stops_following_changes() {
        let recorder = Rc::new(Recorder::default());
        let user = CurrentUser::default();
        let initializer =
            LocaleInitializer::install(recorder.clone(), &user, &Store::default(), None);
        user.set(Some(User::new(1, "ada").with_locale("pt-br")));
        assert!(initializer.uninstall());
        user.set(Some(User::new(1, "ada").with_locale("de")));
        assert_eq!(*recorder.switched.borrow(), vec!["pt-br".to_string()]);
    }

    #[test]
    fn bootstrap_records_locale_in_store() {
        let store = Store::default();
        let recorder = Rc::new(Recorder::default());
        let _initializer = LocaleInitializer::install(
            recorder,
            &CurrentUser::default(),
            &store,
            Some(r#"{"":{"localeSlug":"ar"}}"#),
        );
        let locale = store.state().locale;
        assert_eq!(locale.slug, "ar");
        assert!(locale.rtl);
    }
}
