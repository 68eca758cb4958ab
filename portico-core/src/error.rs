use thiserror::Error;

/// Errors raised while decoding a query string or URL fragment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("truncated percent escape at byte {offset}")]
    TruncatedEscape { offset: usize },
    #[error("invalid percent escape `%{digits}` at byte {offset}")]
    InvalidEscape { offset: usize, digits: String },
    #[error("decoded component is not valid UTF-8")]
    InvalidUtf8,
}

/// Errors raised while loading the boot configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("router base `{0}` must start with `/`")]
    InvalidBase(String),
    #[error("locale URL template `{0}` must contain `{{slug}}`")]
    InvalidLocaleTemplate(String),
}

/// Errors raised while reading locale payloads.
#[derive(Debug, Error)]
pub enum LocaleError {
    #[error("locale JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("locale payload must be a JSON object")]
    NotAnObject,
    #[error("locale payload is missing `localeSlug` metadata")]
    MissingSlug,
    #[error("no locale data available for `{0}`")]
    Unavailable(String),
}

/// Errors raised by the navigation router.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("redirect loop detected after {} hops: {}", trail.len(), trail.join(" -> "))]
    RedirectLoop { trail: Vec<String> },
}
