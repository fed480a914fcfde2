//! Domain values - push targets and build results, independent of git operations

pub mod branch;
pub mod result;
pub mod tag;

pub use branch::BranchSpec;
pub use result::{BuildResult, BuildResultHandle};
pub use tag::TagSpec;

/// Shared shape of everything that is pushed to a logically named repository.
///
/// The name is resolved to a live remote only at publish time.
pub trait PushTarget {
    /// Logical repository name, `None` when missing or blank
    fn target_repo_name(&self) -> Option<&str>;
}

/// Treat blank strings the same as absent ones
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
