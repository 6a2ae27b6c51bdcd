//! Resource ignore rules.
//!
//! Two tiers: a built-in list of boilerplate resources (licenses, notices,
//! manifests, build metadata, package docs, OSGi and Spring descriptors) and
//! an optional user list. Every pattern must match the whole path; matching is
//! case-insensitive against the uppercased, `/`-separated path. User patterns
//! have their literal characters uppercased too, so `straße` matches the
//! uppercased `STRASSE`.

use regex::{RegexBuilder, RegexSet, RegexSetBuilder};
use std::sync::LazyLock;

use crate::error::{IndexError, IndexResult};

pub const DEFAULT_IGNORED_RESOURCES: &[&str] = &[
    r"(META-INF/)?ASL2\.0(\.TXT)?",
    r"META-INF/DEPENDENCIES(\.TXT)?",
    r"META-INF/DISCLAIMER(\.TXT)?",
    r"(META-INF/)?[A-Z_-]*LICENSE.*",
    r"META-INF/MANIFEST\.MF",
    r"META-INF/INDEX\.LIST",
    r"META-INF/MAVEN/.*",
    r"META-INF/PLEXUS/.*",
    r"META-INF/SERVICES/.*",
    r"(META-INF/)?NOTICE(\.TXT)?",
    r"META-INF/README",
    r"OSGI-INF/.*",
    r"README(\.TXT)?",
    r".*PACKAGE\.HTML",
    r".*OVERVIEW\.HTML",
    r"META-INF/SPRING\.HANDLERS",
    r"META-INF/SPRING\.SCHEMAS",
    r"META-INF/SPRING\.TOOLING",
];

static DEFAULT_SET: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new(DEFAULT_IGNORED_RESOURCES.iter().map(|p| anchored(p)))
        .expect("built-in ignore patterns compile")
});

fn anchored(pattern: &str) -> String {
    format!("^(?:{pattern})$")
}

/// Uppercases the literal characters of a user pattern. Escapes (with any
/// `{..}` argument), inline flag and group-name prefixes, and POSIX class
/// names are copied unchanged, so `\d` stays a digit class.
pub fn uppercase_literals(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                    if chars.peek() == Some(&'{') {
                        copy_through(&mut chars, &mut out, &['}']);
                    }
                }
            }
            '(' if chars.peek() == Some(&'?') => {
                out.push(c);
                copy_through(&mut chars, &mut out, &[')', ':', '>']);
            }
            '[' if chars.peek() == Some(&':') => {
                out.push(c);
                let mut prev = c;
                for next in chars.by_ref() {
                    out.push(next);
                    if prev == ':' && next == ']' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.extend(c.to_uppercase()),
        }
    }
    out
}

fn copy_through(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    out: &mut String,
    stops: &[char],
) {
    for next in chars.by_ref() {
        out.push(next);
        if stops.contains(&next) {
            break;
        }
    }
}

/// Normalizes a resource path to the form patterns are matched against.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").to_uppercase()
}

#[derive(Debug, Clone)]
pub struct IgnorePolicy {
    use_defaults: bool,
    user: Option<RegexSet>,
    user_patterns: Vec<String>,
}

impl Default for IgnorePolicy {
    fn default() -> Self {
        Self {
            use_defaults: true,
            user: None,
            user_patterns: Vec::new(),
        }
    }
}

impl IgnorePolicy {
    /// Compiles the user tier. Fails on the first malformed pattern, leaving
    /// nothing installed.
    pub fn new<S: AsRef<str>>(use_defaults: bool, patterns: &[S]) -> IndexResult<Self> {
        if patterns.is_empty() {
            return Ok(Self {
                use_defaults,
                ..Self::default()
            });
        }

        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let upper = anchored(&uppercase_literals(pattern));
            RegexBuilder::new(&upper)
                .case_insensitive(true)
                .build()
                .map_err(|source| IndexError::Configuration {
                    pattern: pattern.to_string(),
                    source,
                })?;
            compiled.push(upper);
        }

        let user_patterns: Vec<String> = patterns.iter().map(|p| p.as_ref().to_string()).collect();
        let user = RegexSetBuilder::new(&compiled)
            .case_insensitive(true)
            .build()
            .map_err(|source| IndexError::Configuration {
                pattern: user_patterns.join(", "),
                source,
            })?;

        Ok(Self {
            use_defaults,
            user: Some(user),
            user_patterns,
        })
    }

    pub fn uses_defaults(&self) -> bool {
        self.use_defaults
    }

    pub fn user_patterns(&self) -> &[String] {
        &self.user_patterns
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        let path = normalize_path(path);
        if self.use_defaults && DEFAULT_SET.is_match(&path) {
            return true;
        }
        self.user.as_ref().is_some_and(|set| set.is_match(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: &[&str] = &[];

    #[test]
    fn defaults_cover_common_boilerplate() {
        let policy = IgnorePolicy::default();
        for path in [
            "META-INF/MANIFEST.MF",
            "meta-inf/manifest.mf",
            "META-INF/LICENSE.txt",
            "META-INF/APACHE_LICENSE",
            "LICENSE",
            "NOTICE.txt",
            "META-INF/maven/org.example/demo/pom.xml",
            "META-INF/services/java.sql.Driver",
            "OSGI-INF/metatype/config.xml",
            "org/example/package.html",
            "META-INF/spring.handlers",
            "META-INF\\INDEX.LIST",
        ] {
            assert!(policy.is_ignored(path), "{path} should be ignored");
        }
    }

    #[test]
    fn defaults_require_full_match() {
        let policy = IgnorePolicy::default();
        assert!(!policy.is_ignored("com/acme/readme.txt"));
        assert!(!policy.is_ignored("META-INF/MANIFEST.MF.bak"));
        assert!(!policy.is_ignored("config/app.properties"));
    }

    #[test]
    fn disabling_defaults_keeps_boilerplate() {
        let policy = IgnorePolicy::new(false, NONE).unwrap();
        assert!(!policy.is_ignored("META-INF/MANIFEST.MF"));
    }

    #[test]
    fn user_patterns_apply_regardless_of_default_tier() {
        for use_defaults in [true, false] {
            let policy = IgnorePolicy::new(use_defaults, &["com/acme/.*\\.properties"]).unwrap();
            assert!(policy.is_ignored("com/acme/app.properties"));
            assert!(policy.is_ignored("COM/ACME/APP.PROPERTIES"));
            assert!(!policy.is_ignored("com/other/app.properties"));
        }
    }

    #[test]
    fn malformed_user_pattern_names_the_pattern() {
        let err = IgnorePolicy::new(true, &["ok/.*", "broken/(unclosed"]).unwrap_err();
        match err {
            IndexError::Configuration { pattern, .. } => assert_eq!(pattern, "broken/(unclosed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn user_literals_uppercase_like_the_path() {
        let policy = IgnorePolicy::new(false, &["straße\\.txt"]).unwrap();
        assert!(policy.is_ignored("straße.txt"));
        assert!(policy.is_ignored("STRASSE.TXT"));
    }

    #[test]
    fn escapes_and_classes_survive_uppercasing() {
        assert_eq!(uppercase_literals(r"v\d+\.txt"), r"V\d+\.TXT");
        assert_eq!(uppercase_literals(r"(?x)a\p{Greek}"), r"(?x)A\p{Greek}");
        assert_eq!(uppercase_literals(r"(?P<name>ab)"), r"(?P<name>AB)");
        assert_eq!(uppercase_literals(r"[[:digit:]a-z]"), r"[[:digit:]A-Z]");

        let policy = IgnorePolicy::new(false, &[r"v\d+\.txt", r"n[[:digit:]]\.bin"]).unwrap();
        assert!(policy.is_ignored("v12.txt"));
        assert!(!policy.is_ignored("vab.txt"));
        assert!(policy.is_ignored("n7.bin"));
    }
}
