//! Translation runtime.
//!
//! Locale payloads use the Jed layout: the empty key carries metadata
//! (`localeSlug`, optional `localeDirection`), every other key maps an
//! original string to its translations.

use crate::constants::{DEFAULT_LOCALE_SLUG, LOCALE_META_KEY, RTL_LOCALE_SLUGS};
use crate::error::LocaleError;
use crate::listeners::{Listeners, SubscriptionId};
use crate::store::LocaleState;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// One locale's translation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleData {
    pub slug: String,
    pub rtl: bool,
    strings: BTreeMap<String, Vec<String>>,
}

fn is_rtl_slug(slug: &str) -> bool {
    let base = slug.split(['-', '_']).next().unwrap_or(slug);
    RTL_LOCALE_SLUGS.contains(&base)
}

impl LocaleData {
    /// Empty table for `slug`; every lookup falls back to the original string.
    #[must_use]
    pub fn empty(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            rtl: is_rtl_slug(slug),
            strings: BTreeMap::new(),
        }
    }

    /// Parse a Jed-style payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, is not an object, or lacks
    /// a `localeSlug` in its metadata entry.
    pub fn from_json(json: &str) -> Result<Self, LocaleError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Build locale data from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// See [`LocaleData::from_json`].
    pub fn from_value(value: &Value) -> Result<Self, LocaleError> {
        let map = value.as_object().ok_or(LocaleError::NotAnObject)?;
        let meta = map.get(LOCALE_META_KEY);
        let slug = meta
            .and_then(|m| m.get("localeSlug"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or(LocaleError::MissingSlug)?;
        let rtl = meta
            .and_then(|m| m.get("localeDirection"))
            .and_then(Value::as_str)
            .map_or_else(|| is_rtl_slug(slug), |dir| dir == "rtl");

        let strings = map
            .iter()
            .filter(|(key, _)| key.as_str() != LOCALE_META_KEY)
            .filter_map(|(key, entry)| {
                let forms = match entry {
                    Value::String(s) => vec![s.clone()],
                    Value::Array(items) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(ToString::to_string)
                        .collect(),
                    _ => return None,
                };
                (!forms.is_empty()).then(|| (key.clone(), forms))
            })
            .collect();

        Ok(Self {
            slug: slug.to_string(),
            rtl,
            strings,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    fn form(&self, key: &str, index: usize) -> Option<&str> {
        self.strings
            .get(key)
            .and_then(|forms| forms.get(index).or_else(|| forms.first()))
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    fn state(&self) -> LocaleState {
        LocaleState {
            slug: self.slug.clone(),
            rtl: self.rtl,
        }
    }
}

/// Where locale tables come from when switching by slug.
pub trait LocaleSource {
    /// Load the table for `slug`.
    ///
    /// # Errors
    ///
    /// Returns an error if no data exists for the slug or it fails to parse.
    fn load(&self, slug: &str) -> Result<LocaleData, LocaleError>;
}

/// In-memory locale source, used natively and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticLocaleSource {
    tables: BTreeMap<String, LocaleData>,
}

impl StaticLocaleSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, data: LocaleData) -> Self {
        self.tables.insert(data.slug.clone(), data);
        self
    }
}

impl LocaleSource for StaticLocaleSource {
    fn load(&self, slug: &str) -> Result<LocaleData, LocaleError> {
        if let Some(data) = self.tables.get(slug) {
            return Ok(data.clone());
        }
        if slug == DEFAULT_LOCALE_SLUG {
            return Ok(LocaleData::empty(slug));
        }
        Err(LocaleError::Unavailable(slug.to_string()))
    }
}

/// What the locale initializer drives: apply a full table, or switch by slug.
pub trait LocaleTarget {
    fn set_locale(&self, data: LocaleData);
    fn switch_locale(&self, slug: &str);
}

type LocaleListener = dyn Fn(&LocaleState);

struct I18nInner {
    data: LocaleData,
    source: Option<Rc<dyn LocaleSource>>,
    listeners: Listeners<LocaleListener>,
}

/// Cloneable handle to the active translation table.
#[derive(Clone)]
pub struct I18n {
    inner: Rc<RefCell<I18nInner>>,
}

impl I18n {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(I18nInner {
                data: LocaleData::empty(DEFAULT_LOCALE_SLUG),
                source: None,
                listeners: Listeners::new(),
            })),
        }
    }

    #[must_use]
    pub fn with_source(source: impl LocaleSource + 'static) -> Self {
        let i18n = Self::new();
        i18n.inner.borrow_mut().source = Some(Rc::new(source));
        i18n
    }

    #[must_use]
    pub fn slug(&self) -> String {
        self.inner.borrow().data.slug.clone()
    }

    #[must_use]
    pub fn is_rtl(&self) -> bool {
        self.inner.borrow().data.rtl
    }

    #[must_use]
    pub fn locale_state(&self) -> LocaleState {
        self.inner.borrow().data.state()
    }

    /// Translate `original`, falling back to it when untranslated.
    #[must_use]
    pub fn translate(&self, original: &str) -> String {
        self.inner
            .borrow()
            .data
            .form(original, 0)
            .map_or_else(|| original.to_string(), ToString::to_string)
    }

    /// Pick the singular or plural translation for `count`.
    #[must_use]
    pub fn translate_plural(&self, singular: &str, plural: &str, count: u64) -> String {
        let index = usize::from(count != 1);
        self.inner
            .borrow()
            .data
            .form(singular, index)
            .map_or_else(
                || {
                    if index == 0 {
                        singular.to_string()
                    } else {
                        plural.to_string()
                    }
                },
                ToString::to_string,
            )
    }

    pub fn on_change(&self, listener: impl Fn(&LocaleState) + 'static) -> SubscriptionId {
        self.inner.borrow_mut().listeners.add(Rc::new(listener))
    }

    pub fn off_change(&self, id: SubscriptionId) -> bool {
        self.inner.borrow_mut().listeners.remove(id)
    }

    fn notify(&self) {
        let (state, listeners) = {
            let inner = self.inner.borrow();
            (inner.data.state(), inner.listeners.snapshot())
        };
        for listener in listeners {
            listener(&state);
        }
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new()
    }
}

impl LocaleTarget for I18n {
    fn set_locale(&self, data: LocaleData) {
        log::debug!("applying locale `{}` ({} strings)", data.slug, data.len());
        self.inner.borrow_mut().data = data;
        self.notify();
    }

    fn switch_locale(&self, slug: &str) {
        let source = self.inner.borrow().source.clone();
        let loaded = match source {
            Some(source) => source.load(slug),
            None if slug == DEFAULT_LOCALE_SLUG => Ok(LocaleData::empty(slug)),
            None => Err(LocaleError::Unavailable(slug.to_string())),
        };
        match loaded {
            Ok(data) => self.set_locale(data),
            Err(err) => log::warn!("locale switch to `{slug}` skipped: {err}"),
        }
    }
}

impl fmt::Debug for I18n {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("I18n")
            .field("slug", &inner.data.slug)
            .field("strings", &inner.data.len())
            .field("has_source", &inner.source.is_some())
            .finish()
    }
}
