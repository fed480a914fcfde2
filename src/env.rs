//! Captured build environment and placeholder expansion

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub const GIT_COMMITTER_NAME: &str = "GIT_COMMITTER_NAME";
pub const GIT_AUTHOR_NAME: &str = "GIT_AUTHOR_NAME";
pub const GIT_COMMITTER_EMAIL: &str = "GIT_COMMITTER_EMAIL";
pub const GIT_AUTHOR_EMAIL: &str = "GIT_AUTHOR_EMAIL";

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$(\{([A-Za-z0-9_.]+)\}|([A-Za-z0-9_]+))")
            .expect("placeholder pattern is a valid regex")
    })
}

/// Snapshot of environment variables for one publish run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars {
    vars: BTreeMap<String, String>,
}

impl EnvVars {
    pub fn new() -> Self {
        EnvVars::default()
    }

    /// Snapshot of the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn capture() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace `$NAME` and `${NAME}` with their values.
    ///
    /// Unknown variables are left untouched.
    pub fn expand(&self, input: &str) -> String {
        placeholder_pattern()
            .replace_all(input, |caps: &Captures<'_>| {
                let name = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                match self.get(name) {
                    Some(value) => value.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Set committer and author identity variables. Blank values are ignored.
    pub fn override_identity(&mut self, name: Option<&str>, email: Option<&str>) {
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            self.insert(GIT_COMMITTER_NAME, name);
            self.insert(GIT_AUTHOR_NAME, name);
        }
        if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
            self.insert(GIT_COMMITTER_EMAIL, email);
            self.insert(GIT_AUTHOR_EMAIL, email);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        EnvVars {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for EnvVars {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EnvVars {
        [("BUILD_NUMBER", "42"), ("JOB_NAME", "core"), ("dotted.name", "x")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_expand_both_forms() {
        let env = sample();
        assert_eq!(env.expand("v$BUILD_NUMBER"), "v42");
        assert_eq!(env.expand("${JOB_NAME}-${BUILD_NUMBER}"), "core-42");
        assert_eq!(env.expand("${dotted.name}"), "x");
    }

    #[test]
    fn test_expand_leaves_unknown_variables() {
        let env = sample();
        assert_eq!(env.expand("release-$UNKNOWN"), "release-$UNKNOWN");
        assert_eq!(env.expand("${MISSING}/main"), "${MISSING}/main");
        assert_eq!(env.expand("plain"), "plain");
        assert_eq!(env.expand("cost$"), "cost$");
    }

    #[test]
    fn test_override_identity() {
        let mut env = EnvVars::new();
        env.override_identity(Some("CI Bot"), Some("  "));
        assert_eq!(env.get(GIT_COMMITTER_NAME), Some("CI Bot"));
        assert_eq!(env.get(GIT_AUTHOR_NAME), Some("CI Bot"));
        assert_eq!(env.get(GIT_COMMITTER_EMAIL), None);

        env.override_identity(None, Some("ci@example.com"));
        assert_eq!(env.get(GIT_AUTHOR_EMAIL), Some("ci@example.com"));
        assert_eq!(env.len(), 4);
    }
}
