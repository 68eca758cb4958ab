//! Query-string and fragment decoding.
//!
//! Query strings are parsed leniently: a component that fails to decode is
//! kept verbatim. Fragments go through [`parse_hash`], which is strict and
//! reports the first undecodable component.

use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered query parameters. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// First value recorded for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v.as_str()))
    }

    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A fragment parameter: one value, or every value of a repeated key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    Multi(Vec<String>),
}

impl ParamValue {
    fn append(&mut self, value: String) {
        match self {
            Self::Single(first) => {
                let first = std::mem::take(first);
                *self = Self::Multi(vec![first, value]);
            }
            Self::Multi(values) => values.push(value),
        }
    }

    /// First value regardless of arity.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multi(values) => values.first().map(String::as_str),
        }
    }
}

/// Fragment parameters keyed by name.
pub type HashParams = BTreeMap<String, ParamValue>;

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Percent-decode a URI component.
///
/// # Errors
///
/// Returns an error on a truncated or non-hex escape, or when the decoded
/// bytes are not UTF-8.
pub fn decode_component(input: &str) -> Result<String, QueryError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] != b'%' {
            out.push(bytes[idx]);
            idx += 1;
            continue;
        }
        if idx + 2 >= bytes.len() {
            return Err(QueryError::TruncatedEscape { offset: idx });
        }
        let (hi, lo) = (bytes[idx + 1], bytes[idx + 2]);
        match (hex_value(hi), hex_value(lo)) {
            (Some(h), Some(l)) => out.push((h << 4) | l),
            _ => {
                return Err(QueryError::InvalidEscape {
                    offset: idx,
                    digits: String::from_utf8_lossy(&[hi, lo]).into_owned(),
                });
            }
        }
        idx += 3;
    }
    String::from_utf8(out).map_err(|_| QueryError::InvalidUtf8)
}

fn decode_form_component(input: &str) -> Result<String, QueryError> {
    decode_component(&input.replace('+', " "))
}

fn split_pairs(input: &str) -> impl Iterator<Item = (&str, &str)> {
    input
        .trim_start_matches('?')
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.split_once('=').unwrap_or((segment, "")))
        .filter(|(key, _)| !key.is_empty())
}

/// Parse a query string, keeping undecodable components verbatim.
#[must_use]
pub fn parse_query(input: &str) -> QueryParams {
    split_pairs(input)
        .map(|(key, value)| {
            let key = decode_form_component(key).unwrap_or_else(|_| key.to_string());
            let value = decode_form_component(value).unwrap_or_else(|_| value.to_string());
            (key, value)
        })
        .collect()
}

/// Parse a fragment as a query string. Repeated keys collect into
/// [`ParamValue::Multi`].
///
/// # Errors
///
/// Returns the first decoding error encountered.
pub fn parse_hash(input: &str) -> Result<HashParams, QueryError> {
    let mut params = HashParams::new();
    for (key, value) in split_pairs(input.trim_start_matches('#')) {
        let key = decode_form_component(key)?;
        let value = decode_form_component(value)?;
        match params.get_mut(&key) {
            Some(existing) => existing.append(value),
            None => {
                params.insert(key, ParamValue::Single(value));
            }
        }
    }
    Ok(params)
}
