//! Deletion with confirmation for storage resources.
//!
//! The management plane resolves a delete request before the resource stops
//! appearing in the read path, so a delete alone does not prove the resource
//! is gone. Each `delete_*_and_confirm` call issues the delete and then
//! polls the lookup until it reports absence, bounded by a wait timeout.
//! Lookup failures during the poll are treated as transient and retried
//! until the deadline.

use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, sleep};

use crate::client::{AccountPath, PoolPath, StorageClient, VolumePath};

const POLL_INTERVAL: Duration = Duration::from_secs(5);
const WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Errors raised while deleting a resource and confirming its absence.
#[derive(Debug, Error)]
pub enum TeardownError<E>
where
    E: std::error::Error + 'static,
{
    /// Raised when the provider rejects the delete request.
    #[error("failed to delete {resource}: {source}")]
    Delete {
        /// Path of the resource being deleted.
        resource: String,
        /// Provider-specific error.
        #[source]
        source: E,
    },
    /// Raised when the resource is still visible after the wait timeout.
    #[error(
        "{resource} still present after {waited_secs}s{}",
        .last_error.as_ref().map(|err| format!(" (last poll error: {err})")).unwrap_or_default()
    )]
    Timeout {
        /// Path of the resource being deleted.
        resource: String,
        /// Total seconds waited before giving up.
        waited_secs: u64,
        /// Message of the last transient poll failure, if any.
        last_error: Option<String>,
    },
}

/// Deletes resources and confirms each deletion through the lookup path.
#[derive(Debug)]
pub struct Teardown<'a, C> {
    client: &'a C,
    poll_interval: Duration,
    wait_timeout: Duration,
}

impl<'a, C: StorageClient> Teardown<'a, C> {
    /// Wraps the given client with the default poll policy.
    pub const fn new(client: &'a C) -> Self {
        Self {
            client,
            poll_interval: POLL_INTERVAL,
            wait_timeout: WAIT_TIMEOUT,
        }
    }

    /// Overrides the poll interval.
    ///
    /// This is primarily used by tests to keep timeout scenarios fast.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Overrides the wait timeout.
    ///
    /// This is primarily used by tests to keep timeout scenarios fast.
    #[must_use]
    pub const fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Deletes a volume and waits until the lookup reports it absent.
    ///
    /// # Errors
    ///
    /// Returns [`TeardownError::Delete`] when the delete request fails and
    /// [`TeardownError::Timeout`] when the volume outlives the wait bound.
    pub async fn delete_volume_and_confirm(
        &self,
        path: &VolumePath,
    ) -> Result<(), TeardownError<C::Error>> {
        self.client
            .delete_volume(path)
            .await
            .map_err(|source| TeardownError::Delete {
                resource: path.to_string(),
                source,
            })?;
        self.confirm_absent(path.to_string(), async || {
            Ok(self.client.get_volume(path).await?.is_some())
        })
        .await
    }

    /// Deletes a capacity pool and waits until the lookup reports it absent.
    ///
    /// The pool must already be empty; the provider rejects deletion of a
    /// pool that still holds volumes.
    ///
    /// # Errors
    ///
    /// Returns [`TeardownError::Delete`] when the delete request fails and
    /// [`TeardownError::Timeout`] when the pool outlives the wait bound.
    pub async fn delete_pool_and_confirm(
        &self,
        path: &PoolPath,
    ) -> Result<(), TeardownError<C::Error>> {
        self.client
            .delete_pool(path)
            .await
            .map_err(|source| TeardownError::Delete {
                resource: path.to_string(),
                source,
            })?;
        self.confirm_absent(path.to_string(), async || {
            Ok(self.client.get_pool(path).await?.is_some())
        })
        .await
    }

    /// Deletes an account and waits until the lookup reports it absent.
    ///
    /// The account must already be empty; the provider rejects deletion of
    /// an account that still holds pools.
    ///
    /// # Errors
    ///
    /// Returns [`TeardownError::Delete`] when the delete request fails and
    /// [`TeardownError::Timeout`] when the account outlives the wait bound.
    pub async fn delete_account_and_confirm(
        &self,
        path: &AccountPath,
    ) -> Result<(), TeardownError<C::Error>> {
        self.client
            .delete_account(path)
            .await
            .map_err(|source| TeardownError::Delete {
                resource: path.to_string(),
                source,
            })?;
        self.confirm_absent(path.to_string(), async || {
            Ok(self.client.get_account(path).await?.is_some())
        })
        .await
    }

    /// Polls `probe` until it reports the resource absent or the deadline
    /// passes. The probe returns whether the resource is still present;
    /// probe errors are remembered and retried.
    async fn confirm_absent(
        &self,
        resource: String,
        probe: impl AsyncFn() -> Result<bool, C::Error>,
    ) -> Result<(), TeardownError<C::Error>> {
        let deadline = Instant::now() + self.wait_timeout;
        let mut last_error = None;

        loop {
            match probe().await {
                Ok(false) => return Ok(()),
                Ok(true) => {}
                Err(err) => last_error = Some(err.to_string()),
            }

            if Instant::now() >= deadline {
                break;
            }
            sleep(self.poll_interval).await;
        }

        Err(TeardownError::Timeout {
            resource,
            waited_secs: self.wait_timeout.as_secs(),
            last_error,
        })
    }
}
