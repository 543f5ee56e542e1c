use crate::error::ProviderError;
use crate::job::*;

use futures::stream::BoxStream;

/// A trait for injecting the remote resource API into the backend adapter.
///
/// Implementations are request/response clients for a managed dataflow
/// service; the adapter never retries or translates their failures.
pub trait JobProvider: Send + Sync + 'static + Clone {
    /// Creates a job from a spec. `overwrite` replaces an existing job with
    /// the same name, per provider semantics.
    fn create_job(
        &self,
        spec: &JobSpec,
        overwrite: bool,
    ) -> impl Future<Output = Result<Job, ProviderError>> + Send;

    /// Looks up a job by its OCID.
    fn get_job(&self, id: &str) -> impl Future<Output = Result<Job, ProviderError>> + Send;

    /// Deletes a job. Cascades to its runs on the provider side.
    fn delete_job(&self, id: &str) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Submits a new run of an existing job.
    fn submit_run(&self, job_id: &str)
    -> impl Future<Output = Result<Run, ProviderError>> + Send;

    /// Looks up a run by its OCID.
    fn get_run(&self, id: &str) -> impl Future<Output = Result<Run, ProviderError>> + Send;

    /// Deletes/terminates a run.
    fn delete_run(&self, id: &str) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Streams a run's log records until it reaches a terminal state.
    fn watch_run(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<BoxStream<'static, Result<LogOutput, ProviderError>>, ProviderError>>
    + Send;
}
