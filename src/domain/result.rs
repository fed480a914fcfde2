use crate::error::{PublishError, Result};
use std::fmt;
use std::str::FromStr;

/// Outcome of a build, ordered from best to worst.
///
/// `Success < Unstable < Failure < NotBuilt < Aborted`, so "worse than" is
/// plain `>` on the derived ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildResult {
    Success,
    Unstable,
    Failure,
    NotBuilt,
    Aborted,
}

impl BuildResult {
    /// True when `self` is strictly worse than `other`
    pub fn is_worse_than(self, other: BuildResult) -> bool {
        self > other
    }

    /// True when `self` is no worse than `other`
    pub fn is_better_or_equal_to(self, other: BuildResult) -> bool {
        self <= other
    }

    /// Upper-case name used in tag suffixes and logs
    pub fn as_str(self) -> &'static str {
        match self {
            BuildResult::Success => "SUCCESS",
            BuildResult::Unstable => "UNSTABLE",
            BuildResult::Failure => "FAILURE",
            BuildResult::NotBuilt => "NOT_BUILT",
            BuildResult::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildResult {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SUCCESS" => Ok(BuildResult::Success),
            "UNSTABLE" => Ok(BuildResult::Unstable),
            "FAILURE" => Ok(BuildResult::Failure),
            "NOT_BUILT" => Ok(BuildResult::NotBuilt),
            "ABORTED" => Ok(BuildResult::Aborted),
            other => Err(PublishError::config(format!(
                "Unknown build result '{}'",
                other
            ))),
        }
    }
}

/// Mutable view of the build result shared by every publish stage.
///
/// Stages may only move the result toward failure; a better result passed to
/// [`BuildResultHandle::worsen`] is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildResultHandle {
    current: BuildResult,
}

impl BuildResultHandle {
    pub fn new(initial: BuildResult) -> Self {
        BuildResultHandle { current: initial }
    }

    pub fn get(&self) -> BuildResult {
        self.current
    }

    pub fn worsen(&mut self, result: BuildResult) {
        if result.is_worse_than(self.current) {
            self.current = result;
        }
    }

    /// Force the build to FAILURE (or leave it if already worse)
    pub fn mark_failed(&mut self) {
        self.worsen(BuildResult::Failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(BuildResult::Unstable.is_worse_than(BuildResult::Success));
        assert!(BuildResult::Failure.is_worse_than(BuildResult::Unstable));
        assert!(!BuildResult::Success.is_worse_than(BuildResult::Success));
        assert!(BuildResult::Success.is_better_or_equal_to(BuildResult::Success));
        assert!(!BuildResult::Unstable.is_better_or_equal_to(BuildResult::Success));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("success".parse::<BuildResult>().unwrap(), BuildResult::Success);
        assert_eq!("not-built".parse::<BuildResult>().unwrap(), BuildResult::NotBuilt);
        assert_eq!(BuildResult::Failure.to_string(), "FAILURE");
        assert!("green".parse::<BuildResult>().is_err());
    }

    #[test]
    fn test_handle_only_worsens() {
        let mut handle = BuildResultHandle::new(BuildResult::Unstable);
        handle.worsen(BuildResult::Success);
        assert_eq!(handle.get(), BuildResult::Unstable);

        handle.mark_failed();
        assert_eq!(handle.get(), BuildResult::Failure);

        handle.worsen(BuildResult::Unstable);
        assert_eq!(handle.get(), BuildResult::Failure);
    }

    #[test]
    fn test_mark_failed_keeps_aborted() {
        let mut handle = BuildResultHandle::new(BuildResult::Aborted);
        handle.mark_failed();
        assert_eq!(handle.get(), BuildResult::Aborted);
    }
}
