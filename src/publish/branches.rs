//! Configured branches: HEAD is pushed to each of them.

use crate::domain::{BranchSpec, PushTarget};
use crate::error::Result;

use super::PublishContext;

/// Pushes HEAD to each configured branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchPublisher {
    /// Move on to the next branch when an entry is missing its branch or repo
    /// name. Off by default: the whole stage stops at the first such entry.
    pub continue_on_entry_error: bool,
}

impl Default for BranchPublisher {
    fn default() -> Self {
        BranchPublisher {
            continue_on_entry_error: false,
        }
    }
}

impl BranchPublisher {
    /// Publish every spec in order. `true` only if all of them succeeded.
    pub fn publish(&self, ctx: &mut PublishContext<'_>, specs: &[BranchSpec]) -> bool {
        let mut all_branches_pushed = true;

        for spec in specs {
            let Some(branch_name) = spec.branch_name() else {
                ctx.log.error("No branch to push defined");
                if self.continue_on_entry_error {
                    all_branches_pushed = false;
                    continue;
                }
                return false;
            };
            let Some(target_repo) = spec.target_repo_name() else {
                ctx.log.error("No branch repo to push to defined");
                if self.continue_on_entry_error {
                    all_branches_pushed = false;
                    continue;
                }
                return false;
            };

            let branch_name = ctx.expand(branch_name);
            let target_repo = ctx.expand(target_repo);

            let pushed = match push_branch(ctx, &branch_name, &target_repo) {
                Ok(pushed) => pushed,
                Err(e) => {
                    ctx.operation_failed(
                        &format!("Failed to push branch {} to {}", branch_name, target_repo),
                        &e,
                    );
                    false
                }
            };
            all_branches_pushed &= pushed;
        }

        all_branches_pushed
    }
}

fn push_branch(ctx: &mut PublishContext<'_>, branch_name: &str, target_repo: &str) -> Result<bool> {
    let Some(remote) = ctx.resolve_remote(target_repo) else {
        return Ok(false);
    };
    let git = ctx.clients.acquire(ctx.working_directory, ctx.env)?;

    ctx.log.info(&format!(
        "Pushing HEAD to branch {} at repo {}",
        branch_name, target_repo
    ));
    git.push(remote, &format!("HEAD:{}", branch_name))?;
    Ok(true)
}
