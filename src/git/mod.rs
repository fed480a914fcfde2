//! Git operations abstraction layer
//!
//! The publisher never talks to git directly. It asks a [`GitClientFactory`]
//! for a client scoped to one operation (one merge-tag attempt, one tag, one
//! branch) and drives it through the [`GitClient`] trait.
//!
//! # Implementations
//!
//! - [repository::Git2Client]: real implementation using the `git2` crate
//! - [mock::MockGitClient]: records calls and injects failures for tests
//!
//! # Scoped acquisition
//!
//! [`GitClientFactory::acquire`] hands the client out inside a [`ClientGuard`],
//! which calls [`GitClient::close`] when dropped. Early returns, `?` and
//! panics all release the client.
//!
//! ```rust
//! # use git_publisher::git::{GitClient, GitClientFactory, MockGitClientFactory};
//! # use git_publisher::env::EnvVars;
//! # use std::path::Path;
//! # fn main() -> git_publisher::Result<()> {
//! let factory = MockGitClientFactory::new();
//! {
//!     let git = factory.acquire(Path::new("."), &EnvVars::new())?;
//!     git.tag("v1.0.0", "release")?;
//! }
//! assert_eq!(factory.open_clients(), 0);
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::{GitCall, MockGitClient, MockGitClientFactory};
pub use repository::{Git2Client, Git2ClientFactory};

use std::ops::{Deref, DerefMut};
use std::path::Path;

use crate::env::EnvVars;
use crate::error::Result;
use crate::scm::RemoteConfig;

/// Git capabilities the publisher needs.
///
/// Every call blocks until git is done, including network pushes.
pub trait GitClient: Send {
    /// Whether a tag with this name exists in the working repository
    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// Create an annotated tag on HEAD
    fn tag(&self, name: &str, message: &str) -> Result<()>;

    /// Delete a tag. A missing tag is not an error.
    fn delete_tag(&self, name: &str) -> Result<()>;

    /// Push `refspec` to `remote`.
    ///
    /// Refspecs are what a user would pass to `git push`: `HEAD:main`, or a
    /// bare tag name.
    fn push(&self, remote: &RemoteConfig, refspec: &str) -> Result<()>;

    /// Release whatever the client holds. Called exactly once by [`ClientGuard`].
    fn close(&mut self) {}
}

/// Opens git clients on a working directory
pub trait GitClientFactory {
    fn open(&self, working_directory: &Path, env: &EnvVars) -> Result<Box<dyn GitClient>>;

    /// Open a client that is closed when the returned guard goes out of scope
    fn acquire(&self, working_directory: &Path, env: &EnvVars) -> Result<ClientGuard> {
        self.open(working_directory, env).map(ClientGuard::new)
    }
}

/// Owns an open [`GitClient`] and closes it on drop
pub struct ClientGuard {
    client: Box<dyn GitClient>,
}

impl ClientGuard {
    pub fn new(client: Box<dyn GitClient>) -> Self {
        ClientGuard { client }
    }
}

impl Deref for ClientGuard {
    type Target = dyn GitClient;

    fn deref(&self) -> &Self::Target {
        self.client.as_ref()
    }
}

impl DerefMut for ClientGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.client.as_mut()
    }
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        self.client.close();
    }
}
