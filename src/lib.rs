pub mod build;
pub mod build_log;
pub mod cli;
pub mod config;
pub mod domain;
pub mod env;
pub mod error;
pub mod git;
pub mod publish;
pub mod scm;

pub use error::{PublishError, Result};
pub use publish::{GitPublisher, PublishOutcome};
