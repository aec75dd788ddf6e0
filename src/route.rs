//! Route patterns: the path/method admission filter.
//!
//! A [`Route`] is a binary filter over `(path, method)` — it decides whether
//! a middleware *runs*, it does not dispatch to handlers and it does not
//! extract path parameters.
//!
//! # Pattern language
//!
//! | Pattern            | Meaning                                                   |
//! |--------------------|-----------------------------------------------------------|
//! | `api/*`            | one path segment: matches `/api/users`, not `/api/a/b`    |
//! | `public/**`        | any depth: matches `/public/js/vendor/jquery.min.js`      |
//! | `/login`           | exact path                                                |
//! | `/^\/api\/\d+$/`   | slash-delimited regex, used verbatim                      |
//!
//! Globs are compiled to anchored regexes: metacharacters are escaped, then
//! `**` becomes `.*?` and `*` becomes `[^/]*?` (longest wildcard first, so
//! `**` is never eaten by two `*` substitutions). A slash-delimited pattern
//! whose body fails to compile silently degrades to a glob — a garbage
//! pattern matches garbage paths, it never takes the pipeline down.

use std::sync::OnceLock;

use regex::Regex;

/// A compiled-on-first-use route restriction: pattern plus method allowlist.
///
/// The method list defaults to `GET` and is matched case-insensitively.
/// Compilation happens once, on the first path test, and is cached for the
/// lifetime of the value.
#[derive(Debug)]
pub struct Route {
    pattern: String,
    methods: Vec<String>,
    compiled: OnceLock<Regex>,
}

impl Route {
    /// A route restricted to `GET`. Widen with [`Route::methods`].
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            methods: vec!["GET".to_owned()],
            compiled: OnceLock::new(),
        }
    }

    /// Replaces the method allowlist. Methods are stored uppercased; an
    /// empty list is ignored and the default (`GET`) kept.
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let methods: Vec<String> = methods
            .into_iter()
            .map(|m| m.as_ref().to_ascii_uppercase())
            .collect();
        if !methods.is_empty() {
            self.methods = methods;
        }
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn allowed_methods(&self) -> &[String] {
        &self.methods
    }

    /// Path test AND method test.
    pub fn matches(&self, path: &str, method: &str) -> bool {
        self.matches_path(path) && self.matches_method(method)
    }

    /// Tests `path` against the compiled pattern. The path is normalized to
    /// a single leading slash before evaluation.
    pub fn matches_path(&self, path: &str) -> bool {
        let matcher = self.compiled.get_or_init(|| compile(&self.pattern));
        let path = format!("/{}", path.trim_start_matches('/'));
        matcher.is_match(&path)
    }

    /// Case-insensitive membership in the allowlist.
    pub fn matches_method(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }
}

// ── Compilation ───────────────────────────────────────────────────────────────

fn compile(pattern: &str) -> Regex {
    match regex_literal(pattern) {
        Some(re) => re,
        None => glob(pattern),
    }
}

/// Recognizes the slash-delimited regex convention: `/body/` where `body`
/// compiles. Anything else — no delimiters, empty body, body that fails to
/// compile — is a glob.
fn regex_literal(pattern: &str) -> Option<Regex> {
    let body = pattern.strip_prefix('/')?.strip_suffix('/')?;
    if body.is_empty() {
        return None;
    }
    Regex::new(body).ok()
}

fn glob(pattern: &str) -> Regex {
    let pattern = format!("/{}", pattern.trim_start_matches('/'));
    let expanded = regex::escape(&pattern)
        .replace(r"\*\*", ".*?")
        .replace(r"\*", "[^/]*?");
    // Escaped input is always syntactically valid; only the compiler's size
    // limit can trip here, and a pattern that matches nothing is an
    // admissible outcome where an error is not.
    Regex::new(&format!("^{expanded}$")).unwrap_or_else(|_| never_matching())
}

fn never_matching() -> Regex {
    Regex::new("[^\\s\\S]").expect("empty character class is a valid regex")
}
