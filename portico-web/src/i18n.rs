//! Browser locale loading.
//!
//! [`WebLocaleTarget`] wraps the core i18n runtime: applied tables also set
//! `<html lang dir>`, and switching by slug fetches the table from the
//! configured locale URL.

use portico_core::{Config, I18n, LocaleData, LocaleError, LocaleTarget};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("fetching locale failed: {0}")]
    Fetch(String),
    #[error(transparent)]
    Locale(#[from] LocaleError),
}

#[must_use]
pub const fn direction(rtl: bool) -> &'static str {
    if rtl { "rtl" } else { "ltr" }
}

/// Bookkeeping for in-flight locale loads. Only the newest request may
/// apply its table.
#[derive(Debug, Clone, Default)]
pub struct LocaleRequests {
    generation: Rc<Cell<u64>>,
    pending: Rc<RefCell<Option<String>>>,
}

impl LocaleRequests {
    /// Start loading `slug` while `active` is applied. Returns the request's
    /// generation, or `None` when nothing needs fetching.
    pub fn begin(&self, slug: &str, active: &str) -> Option<u64> {
        let wanted = self.pending.borrow().clone();
        if wanted.as_deref().unwrap_or(active) == slug {
            return None;
        }
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        if slug == active {
            // Back to the applied table; whatever is in flight is stale.
            *self.pending.borrow_mut() = None;
            return None;
        }
        *self.pending.borrow_mut() = Some(slug.to_string());
        Some(generation)
    }

    /// Settle request `generation`; true when its result should be applied.
    pub fn finish(&self, generation: u64) -> bool {
        if self.generation.get() != generation {
            return false;
        }
        *self.pending.borrow_mut() = None;
        true
    }

    #[must_use]
    pub fn pending(&self) -> Option<String> {
        self.pending.borrow().clone()
    }
}

pub struct WebLocaleTarget {
    i18n: I18n,
    config: Rc<Config>,
    requests: LocaleRequests,
}

impl WebLocaleTarget {
    #[must_use]
    pub fn new(i18n: I18n, config: Rc<Config>) -> Self {
        Self {
            i18n,
            config,
            requests: LocaleRequests::default(),
        }
    }

    /// URL the table for `slug` is fetched from, honouring the base path.
    #[must_use]
    pub fn locale_url(&self, slug: &str) -> String {
        crate::paths::asset_path(self.config.router_base(), &self.config.locale_url(slug))
    }
}

fn set_document_lang(slug: &str, rtl: bool) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(el) = crate::dom::root_element() {
            for (name, value) in [("lang", slug), ("dir", direction(rtl))] {
                if let Err(err) = el.set_attribute(name, value) {
                    log::warn!("could not set {name}: {}", crate::dom::js_error_message(&err));
                }
            }
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = (slug, rtl);
}

#[cfg(target_arch = "wasm32")]
async fn load(url: String) -> Result<LocaleData, LoadError> {
    let body = crate::dom::fetch_text(&url)
        .await
        .map_err(|err| LoadError::Fetch(crate::dom::js_error_message(&err)))?;
    Ok(LocaleData::from_json(&body)?)
}

impl LocaleTarget for WebLocaleTarget {
    fn set_locale(&self, data: LocaleData) {
        set_document_lang(&data.slug, data.rtl);
        self.i18n.set_locale(data);
    }

    fn switch_locale(&self, slug: &str) {
        let Some(generation) = self.requests.begin(slug, &self.i18n.slug()) else {
            log::debug!("locale `{slug}` already active or loading");
            return;
        };

        #[cfg(target_arch = "wasm32")]
        {
            let url = self.locale_url(slug);
            let i18n = self.i18n.clone();
            let requests = self.requests.clone();
            let slug = slug.to_string();
            wasm_bindgen_futures::spawn_local(async move {
                let loaded = load(url).await;
                if !requests.finish(generation) {
                    log::debug!("dropping superseded locale `{slug}`");
                    return;
                }
                match loaded {
                    Ok(data) => {
                        set_document_lang(&data.slug, data.rtl);
                        i18n.set_locale(data);
                    }
                    Err(err) => log::warn!("locale switch to `{slug}` skipped: {err}"),
                }
            });
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.requests.finish(generation) {
            self.i18n.switch_locale(slug);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_core::StaticLocaleSource;

    #[test]
    fn locale_url_respects_base() {
        let config = Config::from_json(r#"{"base":"/app"}"#).unwrap();
        let target = WebLocaleTarget::new(I18n::new(), Rc::new(config));
        assert_eq!(target.locale_url("fr"), "/app/languages/fr.json");

        let cdn = Config::from_json(r#"{"locale_url_template":"https://cdn.test/{slug}.json"}"#)
            .unwrap();
        let target = WebLocaleTarget::new(I18n::new(), Rc::new(cdn));
        assert_eq!(target.locale_url("ar"), "https://cdn.test/ar.json");
    }

    #[test]
    fn only_the_newest_locale_request_applies() {
        let requests = LocaleRequests::default();
        let fr = requests.begin("fr", "en").unwrap();
        let de = requests.begin("de", "en").unwrap();
        assert_eq!(requests.pending().as_deref(), Some("de"));

        assert!(!requests.finish(fr));
        assert!(requests.finish(de));
        assert_eq!(requests.pending(), None);
    }

    #[test]
    fn repeated_or_reverted_locale_requests_do_not_fetch() {
        let requests = LocaleRequests::default();
        let fr = requests.begin("fr", "en").unwrap();
        assert_eq!(requests.begin("fr", "en"), None);

        // Switching back to the applied table cancels the load in flight.
        assert_eq!(requests.begin("en", "en"), None);
        assert_eq!(requests.pending(), None);
        assert!(!requests.finish(fr));

        assert_eq!(requests.begin("en", "en"), None);
    }

    #[test]
    fn switching_to_active_locale_is_a_no_op() {
        let source = StaticLocaleSource::new().with(
            LocaleData::from_json(include_str!("../static/languages/fr.json")).unwrap(),
        );
        let i18n = I18n::with_source(source);
        let target = WebLocaleTarget::new(i18n.clone(), Rc::new(Config::default()));
        target.switch_locale("en");
        assert_eq!(i18n.slug(), "en");
        target.switch_locale("fr");
        assert_eq!(i18n.translate("Home"), "Accueil");
        assert_eq!(direction(i18n.is_rtl()), "ltr");
    }
}
