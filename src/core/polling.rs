//! Waiting on server-side jobs
//!
//! Imports (TMX into a memory, CSV into a glossary) and document translations
//! run asynchronously on the service. The waiter polls their status at a fixed
//! interval until the job reaches a terminal state or the time bound expires.
//! Only "still running" is retried: a failed lookup is returned as-is.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::core::config::{ClientConfig, DEFAULT_POLLING_INTERVAL_MS};
use crate::core::errors::{LaraError, Result};
use crate::core::models::{Document, ImportJob};

/// A job snapshot that knows whether it can still change
pub trait TerminalState {
    fn job_id(&self) -> &str;
    fn is_terminal(&self) -> bool;
}

impl TerminalState for ImportJob {
    fn job_id(&self) -> &str {
        &self.id
    }

    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl TerminalState for Document {
    fn job_id(&self) -> &str {
        &self.id
    }

    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Read-only status lookup for import jobs
#[async_trait]
pub trait ImportStatusLookup: Send + Sync {
    async fn get_import_status(&self, job_id: &str) -> Result<ImportJob>;
}

/// Bounds for a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// `None` (or zero) polls until the job finishes
    pub max_wait_time: Option<Duration>,
    pub polling_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            max_wait_time: None,
            polling_interval: Duration::from_millis(DEFAULT_POLLING_INTERVAL_MS),
        }
    }
}

impl WaitOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_wait_time: config.max_wait(),
            polling_interval: config.polling_interval(),
        }
    }

    pub fn with_max_wait_time(mut self, max_wait_time: Duration) -> Self {
        self.max_wait_time = Some(max_wait_time);
        self
    }

    pub fn with_polling_interval(mut self, polling_interval: Duration) -> Self {
        self.polling_interval = polling_interval;
        self
    }

    fn deadline(&self) -> Option<Duration> {
        self.max_wait_time.filter(|max| !max.is_zero())
    }
}

/// Poll `job` until it is done or failed.
///
/// A job that ends in [`crate::ImportStatus::Error`] is returned as `Ok`;
/// `Err(LaraError::Timeout)` only means the waiter gave up.
pub async fn wait_for_import<L>(lookup: &L, job: &ImportJob, options: WaitOptions) -> Result<ImportJob>
where
    L: ImportStatusLookup + ?Sized,
{
    wait_for_import_with_progress(lookup, job, options, |_| {}).await
}

/// Like [`wait_for_import`], calling `on_update` with every observed snapshot
pub async fn wait_for_import_with_progress<L, U>(
    lookup: &L,
    job: &ImportJob,
    options: WaitOptions,
    on_update: U,
) -> Result<ImportJob>
where
    L: ImportStatusLookup + ?Sized,
    U: FnMut(&ImportJob),
{
    poll_until_terminal(
        &job.id,
        options,
        |id| async move { lookup.get_import_status(&id).await },
        on_update,
    )
    .await
}

/// Fixed-interval polling loop shared by imports and documents
pub(crate) async fn poll_until_terminal<J, F, Fut, U>(
    job_id: &str,
    options: WaitOptions,
    mut fetch: F,
    mut on_update: U,
) -> Result<J>
where
    J: TerminalState,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<J>>,
    U: FnMut(&J),
{
    if options.polling_interval.is_zero() {
        return Err(LaraError::InvalidInput {
            message: "polling interval must be greater than 0".to_string(),
        });
    }

    let start = Instant::now();
    let mut polls: u64 = 0;

    loop {
        let current = fetch(job_id.to_string()).await?;
        polls += 1;
        on_update(&current);

        if current.is_terminal() {
            debug!("Job {} finished after {} polls", current.job_id(), polls);
            return Ok(current);
        }

        sleep(options.polling_interval).await;

        if let Some(max_wait) = options.deadline() {
            let waited = start.elapsed();
            if waited >= max_wait {
                warn!("Gave up on job {} after {:?} ({} polls)", job_id, waited, polls);
                return Err(LaraError::Timeout {
                    job_id: job_id.to_string(),
                    waited,
                });
            }
        }
    }
}
