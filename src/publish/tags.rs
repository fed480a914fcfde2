//! Configured tags.

use crate::domain::{PushTarget, TagSpec};
use crate::error::Result;

use super::PublishContext;

/// Message of tags created by the publisher; the tag name follows it
pub const TAG_MESSAGE_PREFIX: &str = "git-publisher tagging with ";

/// Creates or verifies each configured tag and pushes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagPublisher {
    /// Move on to the next tag when an entry is missing its tag or repo name
    pub continue_on_entry_error: bool,
}

impl Default for TagPublisher {
    fn default() -> Self {
        TagPublisher {
            continue_on_entry_error: true,
        }
    }
}

impl TagPublisher {
    /// Publish every spec in order. `true` only if all of them succeeded.
    pub fn publish(&self, ctx: &mut PublishContext<'_>, specs: &[TagSpec]) -> bool {
        let mut all_tags_pushed = true;

        for spec in specs {
            let (tag_name, target_repo) = match (spec.tag_name(), spec.target_repo_name()) {
                (Some(tag_name), Some(target_repo)) => (tag_name, target_repo),
                (tag_name, target_repo) => {
                    if tag_name.is_none() {
                        ctx.log.error("No tag to push defined");
                    }
                    if target_repo.is_none() {
                        ctx.log.error("No target repo to push to defined");
                    }
                    all_tags_pushed = false;
                    if self.continue_on_entry_error {
                        continue;
                    }
                    return false;
                }
            };

            let tag_name = ctx.expand(tag_name);
            let target_repo = ctx.expand(target_repo);

            let pushed = match push_tag(ctx, spec.create_tag, &tag_name, &target_repo) {
                Ok(pushed) => pushed,
                Err(e) => {
                    ctx.operation_failed(
                        &format!("Failed to push tag {} to {}", tag_name, target_repo),
                        &e,
                    );
                    false
                }
            };
            all_tags_pushed &= pushed;
        }

        all_tags_pushed
    }
}

/// `Ok(false)` for configuration problems, `Err` for git failures
fn push_tag(
    ctx: &mut PublishContext<'_>,
    create_tag: bool,
    tag_name: &str,
    target_repo: &str,
) -> Result<bool> {
    let Some(remote) = ctx.resolve_remote(target_repo) else {
        return Ok(false);
    };
    let git = ctx.clients.acquire(ctx.working_directory, ctx.env)?;

    if create_tag {
        if git.tag_exists(tag_name)? {
            ctx.log.error(&format!(
                "Tag {} already exists and Create Tag is specified, so failing.",
                tag_name
            ));
            return Ok(false);
        }
        git.tag(tag_name, &format!("{}{}", TAG_MESSAGE_PREFIX, tag_name))?;
    } else if !git.tag_exists(tag_name)? {
        ctx.log.error(&format!(
            "Tag {} does not exist and Create Tag is not specified, so failing.",
            tag_name
        ));
        return Ok(false);
    }

    ctx.log.info(&format!("Pushing tag {} to repo {}", tag_name, target_repo));
    git.push(remote, tag_name)?;
    Ok(true)
}
