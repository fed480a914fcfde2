// Shared fixtures for tests that need real repositories
#![allow(dead_code)]

use git2::{Repository, Signature};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A working repository with one commit and a bare `origin` next to it
pub struct TestRepos {
    pub dir: TempDir,
    pub work: PathBuf,
    pub origin: PathBuf,
}

impl TestRepos {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("work");
        let origin = dir.path().join("origin.git");

        Repository::init_bare(&origin).unwrap();
        let repo = Repository::init(&work).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test Author").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        repo.remote("origin", origin.to_str().unwrap()).unwrap();
        commit(&repo, "initial commit");

        TestRepos { dir, work, origin }
    }

    pub fn work_repo(&self) -> Repository {
        Repository::open(&self.work).unwrap()
    }

    pub fn origin_repo(&self) -> Repository {
        Repository::open_bare(&self.origin).unwrap()
    }

    /// Whether `refname` exists in the bare origin
    pub fn origin_has(&self, refname: &str) -> bool {
        self.origin_repo().find_reference(refname).is_ok()
    }
}

pub fn commit(repo: &Repository, message: &str) {
    let sig = Signature::now("Test Author", "test@example.com").unwrap();
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap();
}

pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("gitpublisher.toml");
    std::fs::write(&path, content).unwrap();
    path
}
