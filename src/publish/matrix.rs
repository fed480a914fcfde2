//! Fan-out ("matrix") builds.
//!
//! A matrix build runs one configuration build per axis combination under a
//! single logical build. Configuration builds only report in; the publish
//! itself happens once, in [`MatrixAggregator::end_build`].

use crate::build::BuildContext;
use crate::build_log::BuildLog;
use crate::git::GitClientFactory;

use super::{GitPublisher, PublishOutcome};

pub struct MatrixAggregator<'a> {
    publisher: &'a GitPublisher,
    clients: &'a dyn GitClientFactory,
    finished_configurations: usize,
}

impl<'a> MatrixAggregator<'a> {
    pub fn new(publisher: &'a GitPublisher, clients: &'a dyn GitClientFactory) -> Self {
        MatrixAggregator {
            publisher,
            clients,
            finished_configurations: 0,
        }
    }

    /// A configuration build finished. Nothing is pushed.
    pub fn configuration_finished(
        &mut self,
        run: &dyn BuildContext,
        log: &mut dyn BuildLog,
    ) -> PublishOutcome {
        self.finished_configurations += 1;
        self.publisher.perform_configuration(run, log)
    }

    pub fn finished_configurations(&self) -> usize {
        self.finished_configurations
    }

    /// All configurations are done: publish the aggregate build once.
    pub fn end_build(self, build: &dyn BuildContext, log: &mut dyn BuildLog) -> PublishOutcome {
        tracing::debug!(
            job = build.job_name(),
            configurations = self.finished_configurations,
            "matrix build ended"
        );
        self.publisher.perform(build, self.clients, log)
    }
}
