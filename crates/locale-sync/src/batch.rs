use std::future::Future;

use futures::StreamExt;

use crate::error::SyncError;
use crate::repository::RepositoryName;

/// Channel for failures that are caught instead of propagated.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, repository: &RepositoryName, error: &SyncError);
}

/// Reports failures as `tracing` error events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, repository: &RepositoryName, error: &SyncError) {
        tracing::error!(repository = %repository, "{error}");
    }
}

/// Result of one repository's pipeline inside a batch.
#[derive(Debug)]
pub struct RepositoryOutcome<T> {
    pub repository: RepositoryName,
    pub result: Result<T, SyncError>,
}

/// Per-repository results of a batch run, in submission order.
#[derive(Debug)]
pub struct BatchReport<T> {
    pub outcomes: Vec<RepositoryOutcome<T>>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            outcomes: Vec::new(),
        }
    }
}

impl<T> BatchReport<T> {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = (&RepositoryName, &T)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|value| (&o.repository, value)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&RepositoryName, &SyncError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|error| (&o.repository, error)))
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failure_count() == 0
    }

    pub fn report_failures(&self, reporter: &dyn ErrorReporter) {
        for (repository, error) in self.failed() {
            reporter.report(repository, error);
        }
    }
}

/// Run independent per-repository jobs, at most `concurrency` at a time.
///
/// A failing job never stops the others; its error is kept in the report.
pub async fn run_batch<T, Fut>(
    jobs: impl IntoIterator<Item = (RepositoryName, Fut)>,
    concurrency: usize,
) -> BatchReport<T>
where
    Fut: Future<Output = Result<T, SyncError>>,
{
    let outcomes = futures::stream::iter(jobs.into_iter().map(|(repository, job)| async move {
        RepositoryOutcome {
            repository,
            result: job.await,
        }
    }))
    .buffered(concurrency.max(1))
    .collect()
    .await;

    BatchReport { outcomes }
}
