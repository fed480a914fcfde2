use crate::env::EnvVars;
use crate::error::{PublishError, Result};
use crate::git::{GitClient, GitClientFactory};
use crate::scm::RemoteConfig;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// One call made against a mock client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    TagExists(String),
    Tag { name: String, message: String },
    DeleteTag(String),
    Push { remote: String, refspec: String },
}

#[derive(Debug, Default)]
struct MockState {
    tags: BTreeSet<String>,
    calls: Vec<GitCall>,
    failing_remotes: HashSet<String>,
    failing_tags: HashSet<String>,
    fail_open: bool,
    acquisitions: usize,
    open_clients: usize,
}

/// Factory for mock clients that share one in-memory repository
#[derive(Debug, Clone, Default)]
pub struct MockGitClientFactory {
    state: Arc<Mutex<MockState>>,
}

impl MockGitClientFactory {
    /// Create a factory over an empty repository
    pub fn new() -> Self {
        MockGitClientFactory::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        lock(&self.state)
    }

    /// Add an existing tag
    pub fn add_tag(&self, name: impl Into<String>) {
        self.state().tags.insert(name.into());
    }

    /// Make every push to this remote fail
    pub fn fail_push(&self, remote: impl Into<String>) {
        self.state().failing_remotes.insert(remote.into());
    }

    /// Make creating this tag fail
    pub fn fail_tag(&self, name: impl Into<String>) {
        self.state().failing_tags.insert(name.into());
    }

    /// Make every acquisition fail
    pub fn fail_open(&self) {
        self.state().fail_open = true;
    }

    /// All calls, in the order they were made
    pub fn calls(&self) -> Vec<GitCall> {
        self.state().calls.clone()
    }

    /// `(remote, refspec)` of every push, in order
    pub fn pushes(&self) -> Vec<(String, String)> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                GitCall::Push { remote, refspec } => Some((remote.clone(), refspec.clone())),
                _ => None,
            })
            .collect()
    }

    /// Tags currently in the repository
    pub fn tags(&self) -> Vec<String> {
        self.state().tags.iter().cloned().collect()
    }

    /// Number of clients handed out so far
    pub fn acquisitions(&self) -> usize {
        self.state().acquisitions
    }

    /// Clients handed out and not yet closed
    pub fn open_clients(&self) -> usize {
        self.state().open_clients
    }

    /// True when nothing touched the repository at all
    pub fn is_untouched(&self) -> bool {
        let state = self.state();
        state.acquisitions == 0 && state.calls.is_empty()
    }
}

impl GitClientFactory for MockGitClientFactory {
    fn open(&self, _working_directory: &Path, _env: &EnvVars) -> Result<Box<dyn GitClient>> {
        let mut state = self.state();
        if state.fail_open {
            return Err(PublishError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "working directory is not a git repository",
            )));
        }
        state.acquisitions += 1;
        state.open_clients += 1;

        Ok(Box::new(MockGitClient {
            state: Arc::clone(&self.state),
            closed: false,
        }))
    }
}

/// Mock client for testing without actual git operations
#[derive(Debug)]
pub struct MockGitClient {
    state: Arc<Mutex<MockState>>,
    closed: bool,
}

impl GitClient for MockGitClient {
    fn tag_exists(&self, name: &str) -> Result<bool> {
        let mut state = lock(&self.state);
        state.calls.push(GitCall::TagExists(name.to_string()));
        Ok(state.tags.contains(name))
    }

    fn tag(&self, name: &str, message: &str) -> Result<()> {
        let mut state = lock(&self.state);
        state.calls.push(GitCall::Tag {
            name: name.to_string(),
            message: message.to_string(),
        });
        if state.failing_tags.contains(name) {
            return Err(PublishError::tag(format!("Cannot create tag: {}", name)));
        }
        if !state.tags.insert(name.to_string()) {
            return Err(PublishError::tag(format!("Tag '{}' already exists", name)));
        }
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        let mut state = lock(&self.state);
        state.calls.push(GitCall::DeleteTag(name.to_string()));
        state.tags.remove(name);
        Ok(())
    }

    fn push(&self, remote: &RemoteConfig, refspec: &str) -> Result<()> {
        let mut state = lock(&self.state);
        state.calls.push(GitCall::Push {
            remote: remote.name.clone(),
            refspec: refspec.to_string(),
        });
        if state.failing_remotes.contains(&remote.name) {
            return Err(PublishError::remote(format!(
                "Push failed: remote '{}' rejected {}",
                remote.name, refspec
            )));
        }
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            lock(&self.state).open_clients -= 1;
        }
    }
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> RemoteConfig {
        RemoteConfig::new("origin", "/tmp/origin.git")
    }

    #[test]
    fn test_mock_tags() {
        let factory = MockGitClientFactory::new();
        factory.add_tag("v1.0.0");
        let git = factory.acquire(Path::new("."), &EnvVars::new()).unwrap();

        assert!(git.tag_exists("v1.0.0").unwrap());
        assert!(!git.tag_exists("v2.0.0").unwrap());

        git.tag("v2.0.0", "second").unwrap();
        assert!(git.tag("v2.0.0", "again").is_err());

        git.delete_tag("v1.0.0").unwrap();
        git.delete_tag("never-existed").unwrap();
        assert_eq!(factory.tags(), vec!["v2.0.0".to_string()]);
    }

    #[test]
    fn test_mock_push_records_and_fails() {
        let factory = MockGitClientFactory::new();
        factory.fail_push("mirror");
        let git = factory.acquire(Path::new("."), &EnvVars::new()).unwrap();

        git.push(&origin(), "HEAD:main").unwrap();
        assert!(git
            .push(&RemoteConfig::new("mirror", "/tmp/mirror.git"), "HEAD:main")
            .is_err());

        assert_eq!(
            factory.pushes(),
            vec![
                ("origin".to_string(), "HEAD:main".to_string()),
                ("mirror".to_string(), "HEAD:main".to_string()),
            ]
        );
    }

    #[test]
    fn test_mock_acquisition_counts() {
        let factory = MockGitClientFactory::new();
        assert!(factory.is_untouched());
        {
            let _first = factory.acquire(Path::new("."), &EnvVars::new()).unwrap();
            let _second = factory.acquire(Path::new("."), &EnvVars::new()).unwrap();
            assert_eq!(factory.open_clients(), 2);
        }
        assert_eq!(factory.open_clients(), 0);
        assert_eq!(factory.acquisitions(), 2);
    }

    #[test]
    fn test_mock_fail_open() {
        let factory = MockGitClientFactory::new();
        factory.fail_open();
        assert!(factory.acquire(Path::new("."), &EnvVars::new()).is_err());
        assert_eq!(factory.acquisitions(), 0);
    }
}
