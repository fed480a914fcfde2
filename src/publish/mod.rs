//! Post-build publishing.
//!
//! [`GitPublisher::perform`] is the single entry point for a finished build.
//! It applies the success gate, then runs three stages in a fixed order
//! against one working directory and one environment snapshot:
//!
//! 1. the merge tag ([`merge`]), when `push_merge` is set
//! 2. configured tags ([`tags`])
//! 3. configured branches ([`branches`])
//!
//! Each stage reports a boolean. Operational failures (git errors) are
//! logged, force the build result to FAILURE, and fail only their own scope;
//! later stages still run. The publisher never returns an error.
//!
//! Fan-out builds publish once, through [`MatrixAggregator`].

pub mod branches;
pub mod matrix;
pub mod merge;
pub mod tags;

pub use branches::BranchPublisher;
pub use matrix::MatrixAggregator;
pub use tags::TagPublisher;

use std::path::Path;

use crate::build::BuildContext;
use crate::build_log::BuildLog;
use crate::config::PublishConfig;
use crate::domain::{BuildResult, BuildResultHandle};
use crate::env::EnvVars;
use crate::error::PublishError;
use crate::git::GitClientFactory;
use crate::scm::{GitScm, RemoteConfig};

/// Result of one publish invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishOutcome {
    /// AND of every stage that ran
    pub success: bool,
    /// Build result after publishing, possibly forced to FAILURE
    pub build_result: BuildResult,
}

/// Everything a stage needs for one publish invocation.
pub struct PublishContext<'a> {
    pub job_name: &'a str,
    pub build_number: u64,
    /// Build result when publishing started
    pub build_result: BuildResult,
    pub scm: &'a GitScm,
    pub working_directory: &'a Path,
    pub env: &'a EnvVars,
    pub clients: &'a dyn GitClientFactory,
    pub log: &'a mut dyn BuildLog,
    pub result: &'a mut BuildResultHandle,
}

impl<'a> PublishContext<'a> {
    /// Expand placeholders against the captured environment
    pub fn expand(&self, value: &str) -> String {
        self.env.expand(value)
    }

    /// Resolve a logical repository name, logging when it is unknown
    pub fn resolve_remote(&mut self, target_repo: &str) -> Option<&'a RemoteConfig> {
        let scm: &'a GitScm = self.scm;
        let remote = scm.repository_by_name(target_repo);
        if remote.is_none() {
            self.log.error(&format!(
                "No repository found for target repo name {}",
                target_repo
            ));
        }
        remote
    }

    /// Record a git failure: log it and mark the build as failed
    pub fn operation_failed(&mut self, message: &str, err: &PublishError) {
        tracing::warn!(error = %err, "{}", message);
        self.log.error(&format!("{}: {}", message, err));
        self.result.mark_failed();
    }
}

/// Publishes the outcome of a build back to its git remotes.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    config: PublishConfig,
    tags: TagPublisher,
    branches: BranchPublisher,
}

impl GitPublisher {
    pub fn new(config: PublishConfig) -> Self {
        GitPublisher {
            config,
            tags: TagPublisher::default(),
            branches: BranchPublisher::default(),
        }
    }

    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Whether one bad tag entry lets the remaining tags run (default `true`)
    pub fn with_tag_entry_policy(mut self, continue_on_entry_error: bool) -> Self {
        self.tags.continue_on_entry_error = continue_on_entry_error;
        self
    }

    /// Whether one bad branch entry lets the remaining branches run (default `false`)
    pub fn with_branch_entry_policy(mut self, continue_on_entry_error: bool) -> Self {
        self.branches.continue_on_entry_error = continue_on_entry_error;
        self
    }

    /// Publish a standalone build, or a whole fan-out build once it has ended.
    pub fn perform(
        &self,
        build: &dyn BuildContext,
        clients: &dyn GitClientFactory,
        log: &mut dyn BuildLog,
    ) -> PublishOutcome {
        let build_result = build.result();
        let mut result = BuildResultHandle::new(build_result);

        let Some(scm) = build.scm().as_git() else {
            log.error(&format!(
                "Job {} uses {} source control, not git, so nothing can be pushed.",
                build.job_name(),
                build.scm().kind()
            ));
            return PublishOutcome {
                success: false,
                build_result: result.get(),
            };
        };

        if self.config.push_only_if_success && build_result.is_worse_than(BuildResult::Success) {
            log.info("Build did not succeed and the project is configured to only push after a successful build, so no pushing will occur.");
            return PublishOutcome {
                success: true,
                build_result: result.get(),
            };
        }

        if !self.config.push_merge && !self.config.push_tags() && !self.config.push_branches() {
            log.info("No merge result, tags or branches are configured to be pushed.");
            return PublishOutcome {
                success: true,
                build_result: result.get(),
            };
        }

        let mut env = match build.environment() {
            Ok(env) => env,
            Err(e) => {
                log.error(&format!(
                    "Could not capture the build environment, continuing without it: {}",
                    e
                ));
                EnvVars::new()
            }
        };
        env.override_identity(scm.identity.name.as_deref(), scm.identity.email.as_deref());

        let working_directory = scm.working_directory(build.workspace());
        tracing::debug!(
            job = build.job_name(),
            build = build.number(),
            result = %build_result,
            dir = %working_directory.display(),
            "publishing build"
        );

        let mut ctx = PublishContext {
            job_name: build.job_name(),
            build_number: build.number(),
            build_result,
            scm,
            working_directory: &working_directory,
            env: &env,
            clients,
            log,
            result: &mut result,
        };

        let mut success = true;
        if self.config.push_merge {
            success &= merge::publish_merge(&mut ctx);
        }
        if self.config.push_tags() {
            success &= self.tags.publish(&mut ctx, &self.config.tags_to_push);
        }
        if self.config.push_branches() {
            success &= self.branches.publish(&mut ctx, &self.config.branches_to_push);
        }

        PublishOutcome {
            success,
            build_result: result.get(),
        }
    }

    /// Hook for one configuration of a fan-out build. Publishing waits for
    /// the aggregate, so this never touches git.
    pub fn perform_configuration(
        &self,
        run: &dyn BuildContext,
        log: &mut dyn BuildLog,
    ) -> PublishOutcome {
        log.info(&format!(
            "Configuration build #{} of {}: pushing is deferred until all configurations finish.",
            run.number(),
            run.job_name()
        ));
        PublishOutcome {
            success: true,
            build_result: run.result(),
        }
    }

    /// Aggregator for a fan-out build; publishes once when it ends.
    pub fn create_aggregator<'a>(&'a self, clients: &'a dyn GitClientFactory) -> MatrixAggregator<'a> {
        MatrixAggregator::new(self, clients)
    }
}
