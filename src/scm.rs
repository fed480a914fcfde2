//! Source-control configuration of the job being published.
//!
//! Only the parts the publisher reads: remotes, merge options, the identity
//! used for tagging, and where the checkout lives inside the workspace.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// SCM attached to a job. Only git SCMs can be published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scm {
    Git(GitScm),
    Other { kind: String },
}

impl Scm {
    pub fn as_git(&self) -> Option<&GitScm> {
        match self {
            Scm::Git(git) => Some(git),
            Scm::Other { .. } => None,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Scm::Git(_) => "git",
            Scm::Other { kind } => kind,
        }
    }
}

/// Connection descriptor for one configured remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub name: String,
    pub urls: Vec<String>,
    pub refspecs: Vec<String>,
}

impl RemoteConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        let name = name.into();
        let refspecs = vec![format!("+refs/heads/*:refs/remotes/{}/*", name)];
        RemoteConfig {
            name,
            urls: vec![url.into()],
            refspecs,
        }
    }

    /// URL pushes go to
    pub fn push_url(&self) -> Option<&str> {
        self.urls.first().map(String::as_str)
    }
}

/// Pre-build merge settings. A merge was requested when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOptions {
    pub merge_remote: Option<RemoteConfig>,
    pub merge_target: Option<String>,
}

impl MergeOptions {
    pub fn new(merge_remote: RemoteConfig, merge_target: impl Into<String>) -> Self {
        MergeOptions {
            merge_remote: Some(merge_remote),
            merge_target: Some(merge_target.into()),
        }
    }

    /// Remote and target branch when a merge was requested
    pub fn merge_request(&self) -> Option<(&RemoteConfig, &str)> {
        match (&self.merge_remote, self.merge_target.as_deref()) {
            (Some(remote), Some(target)) if !target.trim().is_empty() => Some((remote, target)),
            _ => None,
        }
    }
}

/// Committer/author overrides applied to the publish environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitIdentity {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitScm {
    pub remotes: Vec<RemoteConfig>,
    pub merge_options: MergeOptions,
    pub identity: GitIdentity,
    /// Checkout location relative to the workspace, if not the workspace itself
    pub relative_target_dir: Option<PathBuf>,
}

impl GitScm {
    pub fn new(remotes: Vec<RemoteConfig>) -> Self {
        GitScm {
            remotes,
            ..GitScm::default()
        }
    }

    /// Build the remote list from the remotes configured in a repository
    pub fn from_repository(path: &Path) -> Result<Self> {
        let repo = git2::Repository::discover(path)?;
        let mut remotes = Vec::new();

        for name in repo.remotes()?.iter().flatten() {
            let remote = repo.find_remote(name)?;
            let urls = remote
                .pushurl()
                .into_iter()
                .chain(remote.url())
                .map(str::to_string)
                .collect();
            let refspecs = remote
                .refspecs()
                .filter_map(|spec| spec.str().map(str::to_string))
                .collect();

            remotes.push(RemoteConfig {
                name: name.to_string(),
                urls,
                refspecs,
            });
        }

        Ok(GitScm::new(remotes))
    }

    /// Resolve a logical repository name to its remote
    pub fn repository_by_name(&self, name: &str) -> Option<&RemoteConfig> {
        self.remotes.iter().find(|remote| remote.name == name)
    }

    /// Directory the checkout lives in for the given workspace
    pub fn working_directory(&self, workspace: &Path) -> PathBuf {
        match &self.relative_target_dir {
            Some(dir) if !dir.as_os_str().is_empty() => workspace.join(dir),
            _ => workspace.to_path_buf(),
        }
    }
}
