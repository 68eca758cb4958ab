use crate::query::{HashParams, QueryParams};
use crate::store::Store;

/// Per-navigation record handed through the middleware chain.
///
/// The router fills the raw URL pieces; the enrichment middleware decodes
/// them and attaches the store. A context lives for one navigation and, once
/// completed, stays around as the router's current page until the next one.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Path exactly as handed to the router, base, query and fragment included.
    pub canonical_path: String,
    /// Canonical path without the router base or fragment; `/` when empty.
    pub path: String,
    /// `path` without the query string.
    pub pathname: String,
    pub querystring: String,
    pub query: QueryParams,
    pub hashstring: String,
    pub hash: HashParams,
    /// Browser path before this navigation, when it differs from `path`.
    pub prev_path: Option<String>,
    pub store: Option<Store>,
    /// First navigation after boot.
    pub init: bool,
}

impl Context {
    #[must_use]
    pub fn new(canonical_path: &str, base: &str) -> Self {
        let relative = strip_base(canonical_path, base);

        let (without_hash, hashstring) = relative.split_once('#').unwrap_or((relative, ""));
        let path = if without_hash.is_empty() {
            "/".to_string()
        } else if without_hash.starts_with('/') {
            without_hash.to_string()
        } else {
            format!("/{without_hash}")
        };
        let (pathname, querystring) = path
            .split_once('?')
            .map_or((path.as_str(), ""), |(p, q)| (p, q));

        Self {
            canonical_path: canonical_path.to_string(),
            pathname: if pathname.is_empty() { "/" } else { pathname }.to_string(),
            querystring: querystring.to_string(),
            hashstring: hashstring.to_string(),
            path,
            ..Self::default()
        }
    }

    /// Query portion of the canonical path, without `?` and fragment.
    #[must_use]
    pub fn canonical_querystring(&self) -> &str {
        let without_hash = self
            .canonical_path
            .split_once('#')
            .map_or(self.canonical_path.as_str(), |(p, _)| p);
        without_hash.split_once('?').map_or("", |(_, q)| q)
    }

    /// Case-sensitive prefix test against `path`.
    #[must_use]
    pub fn path_starts_with(&self, prefix: &str) -> bool {
        self.path.starts_with(prefix)
    }
}

/// Remove `base` from the front of `path` only on a segment boundary, so
/// `/app` strips from `/app/read` but not from `/apple`.
fn strip_base<'a>(path: &'a str, base: &str) -> &'a str {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        return path;
    }
    match path.strip_prefix(base) {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '?', '#']) => rest,
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_path_query_and_fragment() {
        let ctx = Context::new("/posts/my%20site?status=draft#token=abc", "");
        assert_eq!(ctx.path, "/posts/my%20site?status=draft");
        assert_eq!(ctx.pathname, "/posts/my%20site");
        assert_eq!(ctx.querystring, "status=draft");
        assert_eq!(ctx.hashstring, "token=abc");
        assert_eq!(ctx.canonical_querystring(), "status=draft");
        assert!(ctx.store.is_none());
        assert!(ctx.prev_path.is_none());
    }

    #[test]
    fn strips_router_base() {
        let ctx = Context::new("/app/settings?tab=1", "/app/");
        assert_eq!(ctx.path, "/settings?tab=1");
        assert_eq!(ctx.pathname, "/settings");
        assert_eq!(ctx.canonical_path, "/app/settings?tab=1");

        let root = Context::new("/app", "/app");
        assert_eq!(root.path, "/");
        assert_eq!(root.pathname, "/");
    }

    #[test]
    fn base_strips_only_whole_segments() {
        let apple = Context::new("/apple/settings", "/app");
        assert_eq!(apple.path, "/apple/settings");
        assert_eq!(Context::new("/applog-in", "/app").path, "/applog-in");

        assert_eq!(Context::new("/app?x=1", "/app").path, "/?x=1");
        let fragment = Context::new("/app#tab=2", "/app");
        assert_eq!(fragment.path, "/");
        assert_eq!(fragment.hashstring, "tab=2");
    }

    #[test]
    fn empty_and_fragment_only_paths_become_root() {
        assert_eq!(Context::new("", "").path, "/");
        let ctx = Context::new("#section", "");
        assert_eq!(ctx.path, "/");
        assert_eq!(ctx.hashstring, "section");
        assert_eq!(Context::new("?q=1", "").pathname, "/");
    }
}
