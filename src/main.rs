use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use git_publisher::build_log::{BuildLog, ConsoleLog};
use git_publisher::cli::{run_publish_workflow, PublishWorkflowArgs};
use git_publisher::domain::BuildResult;
use git_publisher::git::Git2ClientFactory;

#[derive(clap::Parser)]
#[command(
    name = "git-publisher",
    version,
    about = "Push build tags and branches back to git remotes after a CI build"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Build workspace (defaults to the current directory)")]
    workspace: Option<PathBuf>,

    #[arg(long, help = "Checkout directory relative to the workspace")]
    relative_target_dir: Option<PathBuf>,

    #[arg(short, long, help = "Job name")]
    job: String,

    #[arg(short = 'n', long, help = "Build number")]
    build_number: u64,

    #[arg(
        short,
        long,
        default_value = "SUCCESS",
        help = "Build result: SUCCESS, UNSTABLE, FAILURE, NOT_BUILT or ABORTED"
    )]
    result: BuildResult,

    #[arg(long, help = "Remote the build merged from")]
    merge_remote: Option<String>,

    #[arg(long, help = "Branch the merge result is pushed to")]
    merge_target: Option<String>,

    #[arg(long, help = "Committer and author name for created tags")]
    git_name: Option<String>,

    #[arg(long, help = "Committer and author email for created tags")]
    git_email: Option<String>,

    #[arg(long, help = "This run is one configuration of a matrix build; defer pushing")]
    matrix_configuration: bool,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let workflow_args = PublishWorkflowArgs {
        config_path: args.config,
        workspace: args.workspace,
        relative_target_dir: args.relative_target_dir,
        job_name: args.job,
        build_number: args.build_number,
        build_result: args.result,
        merge_remote: args.merge_remote,
        merge_target: args.merge_target,
        git_name: args.git_name,
        git_email: args.git_email,
        matrix_configuration: args.matrix_configuration,
    };

    let mut log = ConsoleLog;
    let result = match run_publish_workflow(&workflow_args, &Git2ClientFactory, &mut log) {
        Ok(result) => result,
        Err(e) => {
            log.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    if result.build_marked_failed() {
        log.error(&format!(
            "Publishing marked the build as {}",
            result.outcome.build_result
        ));
    }

    std::process::exit(result.exit_code());
}
