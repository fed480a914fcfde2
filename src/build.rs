//! The finished build handed to the publisher.

use std::path::{Path, PathBuf};

use crate::domain::BuildResult;
use crate::env::EnvVars;
use crate::error::Result;
use crate::scm::Scm;

/// What the publisher reads from a finished build.
pub trait BuildContext {
    fn job_name(&self) -> &str;

    fn number(&self) -> u64;

    /// Result of the build at the time publishing starts
    fn result(&self) -> BuildResult;

    fn workspace(&self) -> &Path;

    fn scm(&self) -> &Scm;

    /// Environment the build ran with. May fail; the publisher then carries
    /// on with an empty environment.
    fn environment(&self) -> Result<EnvVars>;
}

/// A build run on this machine, described by its caller.
///
/// The environment is the current process environment plus `JOB_NAME`,
/// `BUILD_NUMBER`, `WORKSPACE` and any variables added with
/// [`LocalBuild::with_env`].
#[derive(Debug, Clone)]
pub struct LocalBuild {
    job_name: String,
    number: u64,
    result: BuildResult,
    workspace: PathBuf,
    scm: Scm,
    extra_env: EnvVars,
    inherit_process_env: bool,
}

impl LocalBuild {
    pub fn new(
        job_name: impl Into<String>,
        number: u64,
        result: BuildResult,
        workspace: impl Into<PathBuf>,
        scm: Scm,
    ) -> Self {
        LocalBuild {
            job_name: job_name.into(),
            number,
            result,
            workspace: workspace.into(),
            scm,
            extra_env: EnvVars::new(),
            inherit_process_env: true,
        }
    }

    /// Add a variable to the build environment
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_env.insert(key, value);
        self
    }

    /// Do not start from the process environment
    pub fn isolated(mut self) -> Self {
        self.inherit_process_env = false;
        self
    }
}

impl BuildContext for LocalBuild {
    fn job_name(&self) -> &str {
        &self.job_name
    }

    fn number(&self) -> u64 {
        self.number
    }

    fn result(&self) -> BuildResult {
        self.result
    }

    fn workspace(&self) -> &Path {
        &self.workspace
    }

    fn scm(&self) -> &Scm {
        &self.scm
    }

    fn environment(&self) -> Result<EnvVars> {
        let mut env = if self.inherit_process_env {
            EnvVars::capture()
        } else {
            EnvVars::new()
        };

        env.insert("JOB_NAME", self.job_name.as_str());
        env.insert("BUILD_NUMBER", self.number.to_string());
        env.insert("WORKSPACE", self.workspace.to_string_lossy());
        env.extend(self.extra_env.iter());
        Ok(env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scm::GitScm;
    use serial_test::serial;

    #[test]
    fn test_local_build_environment() {
        let build = LocalBuild::new(
            "core",
            7,
            BuildResult::Success,
            "/ws",
            Scm::Git(GitScm::default()),
        )
        .isolated()
        .with_env("RELEASE", "1.4");

        let env = build.environment().unwrap();
        assert_eq!(env.get("JOB_NAME"), Some("core"));
        assert_eq!(env.get("BUILD_NUMBER"), Some("7"));
        assert_eq!(env.get("WORKSPACE"), Some("/ws"));
        assert_eq!(env.get("RELEASE"), Some("1.4"));
        assert_eq!(env.len(), 4);
    }

    #[test]
    #[serial]
    fn test_local_build_inherits_process_environment() {
        std::env::set_var("GIT_PUBLISHER_TEST_MARKER", "present");
        let build = LocalBuild::new(
            "core",
            1,
            BuildResult::Success,
            "/ws",
            Scm::Git(GitScm::default()),
        );

        let env = build.environment().unwrap();
        std::env::remove_var("GIT_PUBLISHER_TEST_MARKER");
        assert_eq!(env.get("GIT_PUBLISHER_TEST_MARKER"), Some("present"));
    }
}
