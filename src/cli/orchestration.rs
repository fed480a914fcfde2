//! Command-line publish workflow
//!
//! Turns CLI arguments into a [`LocalBuild`] over the repository in the
//! workspace and runs the publisher against it. Kept apart from `main.rs` so
//! the workflow can be driven without clap.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use crate::build::LocalBuild;
use crate::build_log::BuildLog;
use crate::config::load_config;
use crate::domain::BuildResult;
use crate::git::GitClientFactory;
use crate::publish::{GitPublisher, PublishOutcome};
use crate::scm::{GitIdentity, GitScm, MergeOptions, Scm};

/// Arguments for the publish workflow
#[derive(Debug, Clone, PartialEq)]
pub struct PublishWorkflowArgs {
    /// Path to custom config file
    pub config_path: Option<PathBuf>,

    /// Build workspace; the current directory when absent
    pub workspace: Option<PathBuf>,

    /// Checkout location inside the workspace
    pub relative_target_dir: Option<PathBuf>,

    pub job_name: String,
    pub build_number: u64,
    pub build_result: BuildResult,

    /// Remote the SCM merged from before building
    pub merge_remote: Option<String>,

    /// Branch the merge result goes to
    pub merge_target: Option<String>,

    pub git_name: Option<String>,
    pub git_email: Option<String>,

    /// This invocation is one configuration of a fan-out build
    pub matrix_configuration: bool,
}

/// Result of a publish workflow run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkflowResult {
    /// Build result passed in on the command line
    pub initial_result: BuildResult,
    pub outcome: PublishOutcome,
}

impl WorkflowResult {
    /// True when publishing forced the build result to something worse
    pub fn build_marked_failed(&self) -> bool {
        self.outcome
            .build_result
            .is_worse_than(self.initial_result)
    }

    /// Process exit code: 0 only when everything was published cleanly
    pub fn exit_code(&self) -> i32 {
        if self.outcome.success && !self.build_marked_failed() {
            0
        } else {
            1
        }
    }
}

/// Build the SCM description from the workspace repository plus CLI overrides
pub fn scm_from_args(args: &PublishWorkflowArgs, workspace: &std::path::Path) -> Result<GitScm> {
    let checkout = match &args.relative_target_dir {
        Some(dir) => workspace.join(dir),
        None => workspace.to_path_buf(),
    };
    let mut scm = GitScm::from_repository(&checkout)
        .with_context(|| format!("Cannot read git remotes from {}", checkout.display()))?;

    scm.relative_target_dir = args.relative_target_dir.clone();
    scm.identity = GitIdentity {
        name: args.git_name.clone(),
        email: args.git_email.clone(),
    };

    if args.merge_remote.is_none() {
        if let Some(target) = &args.merge_target {
            bail!("Merge target '{}' given without --merge-remote", target);
        }
    }

    if let Some(remote_name) = &args.merge_remote {
        let remote = scm
            .repository_by_name(remote_name)
            .cloned()
            .with_context(|| format!("Merge remote '{}' is not configured", remote_name))?;
        scm.merge_options = MergeOptions {
            merge_remote: Some(remote),
            merge_target: args.merge_target.clone(),
        };
    }

    Ok(scm)
}

/// Main publish workflow
///
/// 1. Load and migrate the publish configuration
/// 2. Describe the workspace repository as the build's SCM
/// 3. Publish, or defer when this is a fan-out configuration build
pub fn run_publish_workflow(
    args: &PublishWorkflowArgs,
    clients: &dyn GitClientFactory,
    log: &mut dyn BuildLog,
) -> Result<WorkflowResult> {
    let config = load_config(args.config_path.as_deref()).context("Error loading config")?;

    let workspace = match &args.workspace {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };
    let scm = scm_from_args(args, &workspace)?;

    let build = LocalBuild::new(
        args.job_name.as_str(),
        args.build_number,
        args.build_result,
        workspace,
        Scm::Git(scm),
    );
    let publisher = GitPublisher::new(config);

    let outcome = if args.matrix_configuration {
        publisher.perform_configuration(&build, log)
    } else {
        publisher.perform(&build, clients, log)
    };

    Ok(WorkflowResult {
        initial_result: args.build_result,
        outcome,
    })
}
