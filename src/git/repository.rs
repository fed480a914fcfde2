use crate::env::{EnvVars, GIT_COMMITTER_EMAIL, GIT_COMMITTER_NAME};
use crate::error::{PublishError, Result};
use crate::git::{GitClient, GitClientFactory};
use crate::scm::RemoteConfig;
use git2::{ErrorCode, Repository, Signature};
use std::path::Path;

/// Opens [`Git2Client`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct Git2ClientFactory;

impl GitClientFactory for Git2ClientFactory {
    fn open(&self, working_directory: &Path, env: &EnvVars) -> Result<Box<dyn GitClient>> {
        Ok(Box::new(Git2Client::open(working_directory, env)?))
    }
}

/// Git client backed by libgit2
pub struct Git2Client {
    repo: Repository,
    committer: Option<(String, String)>,
}

impl Git2Client {
    /// Open the repository at or above `path`.
    ///
    /// Tags are signed with `GIT_COMMITTER_NAME`/`GIT_COMMITTER_EMAIL` from
    /// `env` when both are set, otherwise with the repository's own identity.
    pub fn open<P: AsRef<Path>>(path: P, env: &EnvVars) -> Result<Self> {
        let repo = Repository::discover(path)?;
        let committer = match (env.get(GIT_COMMITTER_NAME), env.get(GIT_COMMITTER_EMAIL)) {
            (Some(name), Some(email)) => Some((name.to_string(), email.to_string())),
            _ => None,
        };

        Ok(Git2Client { repo, committer })
    }

    fn signature(&self) -> Result<Signature<'static>> {
        let signature = match &self.committer {
            Some((name, email)) => Signature::now(name, email)?,
            None => self.repo.signature()?,
        };
        Ok(signature)
    }

    fn is_local_tag(&self, name: &str) -> bool {
        self.tag_exists(name).unwrap_or(false)
    }
}

impl GitClient for Git2Client {
    fn tag_exists(&self, name: &str) -> Result<bool> {
        match self.repo.find_reference(&format!("refs/tags/{}", name)) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) if e.code() == ErrorCode::InvalidSpec => Err(PublishError::tag(format!(
                "Invalid tag name '{}': {}",
                name, e
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn tag(&self, name: &str, message: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        let signature = self.signature()?;

        self.repo
            .tag(name, head.as_object(), &signature, message, false)
            .map_err(|e| PublishError::tag(format!("Cannot create tag '{}': {}", name, e)))?;

        tracing::debug!(tag = name, commit = %head.id(), "created tag");
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        match self.repo.tag_delete(name) {
            Ok(()) => {
                tracing::debug!(tag = name, "deleted tag");
                Ok(())
            }
            // No tag can exist under an invalid name
            Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec) => Ok(()),
            Err(e) => Err(PublishError::tag(format!(
                "Cannot delete tag '{}': {}",
                name, e
            ))),
        }
    }

    fn push(&self, remote: &RemoteConfig, refspec: &str) -> Result<()> {
        let url = remote.push_url().ok_or_else(|| {
            PublishError::remote(format!("Remote '{}' has no URL configured", remote.name))
        })?;
        let refspec = normalize_refspec(refspec, |name| self.is_local_tag(name));

        let mut connection = self
            .repo
            .remote_anonymous(url)
            .map_err(|e| PublishError::remote(format!("Cannot use remote '{}': {}", url, e)))?;

        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            let username = username_from_url.unwrap_or("git");

            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                if let Some(home) = dirs::home_dir() {
                    for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                        let path = home.join(".ssh").join(key);
                        if path.exists() {
                            if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                                return Ok(cred);
                            }
                        }
                    }
                }

                if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
            }

            git2::Cred::default()
        });

        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => {
                tracing::warn!(refname, status, "remote rejected reference update");
                Err(git2::Error::from_str(&format!(
                    "Remote rejected {}: {}",
                    refname, status
                )))
            }
            None => Ok(()),
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        tracing::debug!(remote = %remote.name, url, refspec = %refspec, "pushing");
        connection
            .push(&[refspec.as_str()], Some(&mut push_options))
            .map_err(|e| {
                if e.class() == git2::ErrorClass::Net {
                    PublishError::remote(format!("Network error during push to {}: {}", url, e))
                } else {
                    PublishError::remote(format!("Push of {} to {} failed: {}", refspec, url, e))
                }
            })
    }
}

/// Turn a `git push`-style refspec into the fully qualified form libgit2 needs.
///
/// `HEAD:main` becomes `HEAD:refs/heads/main`; a bare name becomes a tag
/// refspec when `is_tag` says so and a branch refspec otherwise. A leading
/// `+` is kept.
pub fn normalize_refspec(refspec: &str, is_tag: impl Fn(&str) -> bool) -> String {
    let (force, spec) = match refspec.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", refspec),
    };

    if let Some((src, dst)) = spec.split_once(':') {
        let dst = if dst.starts_with("refs/") {
            dst.to_string()
        } else {
            format!("refs/heads/{}", dst)
        };
        return format!("{}{}:{}", force, src, dst);
    }

    let full = if spec.starts_with("refs/") {
        spec.to_string()
    } else if is_tag(spec) {
        format!("refs/tags/{}", spec)
    } else {
        format!("refs/heads/{}", spec)
    };
    format!("{}{}:{}", force, full, full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_head_refspec() {
        assert_eq!(normalize_refspec("HEAD:main", |_| false), "HEAD:refs/heads/main");
        assert_eq!(
            normalize_refspec("+HEAD:refs/heads/release/1.x", |_| false),
            "+HEAD:refs/heads/release/1.x"
        );
    }

    #[test]
    fn test_normalize_bare_name() {
        assert_eq!(
            normalize_refspec("v1.0.0", |name| name == "v1.0.0"),
            "refs/tags/v1.0.0:refs/tags/v1.0.0"
        );
        assert_eq!(
            normalize_refspec("feature", |_| false),
            "refs/heads/feature:refs/heads/feature"
        );
        assert_eq!(
            normalize_refspec("refs/tags/x", |_| false),
            "refs/tags/x:refs/tags/x"
        );
    }

    #[test]
    fn test_open_outside_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Git2Client::open(dir.path(), &EnvVars::new()).is_err());
    }
}
