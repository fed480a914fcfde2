//! Merge-result tag.
//!
//! Every published build gets a tag `<prefix>-<job>-<number>-<RESULT>` on
//! HEAD. When the SCM merged a branch before building and the build
//! succeeded, HEAD is pushed to the merge target.

use crate::domain::BuildResult;
use crate::error::Result;

use super::PublishContext;

/// Prefix of the tag the SCM step leaves behind for each build
pub const INTERNAL_TAG_NAME_PREFIX: &str = "ci";

/// Prefix of the merge tag's message; the build number follows it
pub const INTERNAL_TAG_COMMENT_PREFIX: &str = "CI Build #";

/// Tag name shared by the SCM step and the publisher for one build.
///
/// Whitespace in the job name becomes `_` so the name is a valid ref.
pub fn internal_tag_name(job_name: &str, build_number: u64) -> String {
    let job_name: String = job_name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{}-{}-{}", INTERNAL_TAG_NAME_PREFIX, job_name, build_number)
}

/// Tag the build's HEAD with its result and push the merge if requested.
///
/// Returns `false` if any git operation failed; the build is then marked
/// FAILURE.
pub fn publish_merge(ctx: &mut PublishContext<'_>) -> bool {
    match push_merge_tag(ctx) {
        Ok(()) => true,
        Err(e) => {
            ctx.operation_failed("Failed to push merge to origin repository", &e);
            false
        }
    }
}

fn push_merge_tag(ctx: &mut PublishContext<'_>) -> Result<()> {
    let scm = ctx.scm;
    let git = ctx.clients.acquire(ctx.working_directory, ctx.env)?;

    let internal_tag = internal_tag_name(ctx.job_name, ctx.build_number);
    git.delete_tag(&internal_tag)?;

    // A retried publish finds the result tag from the previous attempt
    let tag_name = format!("{}-{}", internal_tag, ctx.build_result);
    git.delete_tag(&tag_name)?;
    git.tag(
        &tag_name,
        &format!("{}{}", INTERNAL_TAG_COMMENT_PREFIX, ctx.build_number),
    )?;

    match scm.merge_options.merge_request() {
        Some((remote, target))
            if ctx.build_result.is_better_or_equal_to(BuildResult::Success) =>
        {
            ctx.log.info(&format!(
                "Pushing result {} to {} branch of {} repository",
                tag_name, target, remote.name
            ));
            git.push(remote, &format!("HEAD:{}", target))?;
        }
        Some((remote, target)) => {
            ctx.log.info(&format!(
                "Build result is {}, so {} is not pushed to {} branch of {} repository",
                ctx.build_result, tag_name, target, remote.name
            ));
        }
        None => {
            ctx.log.info(&format!(
                "No merge was requested, so {} is only tagged locally",
                tag_name
            ));
        }
    }

    Ok(())
}
