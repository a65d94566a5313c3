//! End-to-end pool-change workflow.
//!
//! The workflow is a strictly sequential pipeline: ensure the account, the
//! source and target capacity pools, and the volume under the source pool;
//! move the volume to the target pool; verify the move through the lookup
//! path; and, when requested, tear everything down leaf-to-root. The first
//! unrecovered error aborts the run with no compensation.

use std::io::Write;
use std::time::Duration;

use thiserror::Error;

use crate::client::{
    AccountPath, AccountSpec, Pool, PoolPath, PoolSpec, StorageClient, Volume, VolumePath,
    VolumeSpec,
};
use crate::provision::{EnsureOutcome, Provisioner};
use crate::report::Reporter;
use crate::teardown::{Teardown, TeardownError};

/// Everything a single workflow run needs: the four resource paths, the
/// desired attributes for each creation, and the cleanup switch.
///
/// Plans are normally assembled from configuration via
/// [`WorkflowConfig::as_plan`](crate::config::WorkflowConfig::as_plan).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorkflowPlan {
    /// Path of the storage account.
    pub account_path: AccountPath,
    /// Desired attributes for the account.
    pub account_spec: AccountSpec,
    /// Path of the pool the volume is created in.
    pub source_pool_path: PoolPath,
    /// Desired attributes for the source pool.
    pub source_pool_spec: PoolSpec,
    /// Path of the pool the volume is moved to.
    pub target_pool_path: PoolPath,
    /// Desired attributes for the target pool.
    pub target_pool_spec: PoolSpec,
    /// Path of the volume under the source pool.
    pub volume_path: VolumePath,
    /// Desired attributes for the volume.
    pub volume_spec: VolumeSpec,
    /// Whether to delete everything after the pool change.
    pub cleanup: bool,
}

/// Errors surfaced while running the workflow.
#[derive(Debug, Error)]
pub enum WorkflowError<E>
where
    E: std::error::Error + 'static,
{
    /// Raised when provisioning a resource fails.
    #[error("failed to provision {resource}: {source}")]
    Ensure {
        /// Path of the resource being provisioned.
        resource: String,
        /// Provider-specific error.
        #[source]
        source: E,
    },
    /// Raised when the pool-change request fails.
    #[error("pool change failed: {0}")]
    PoolChange(#[source] E),
    /// Raised when the post-move lookup itself fails.
    #[error("failed to verify volume {path} after pool change: {source}")]
    Verify {
        /// Expected volume path under the target pool.
        path: String,
        /// Provider-specific error.
        #[source]
        source: E,
    },
    /// Raised when the moved volume does not resolve under the target pool.
    #[error("volume {path} not visible under target pool after pool change")]
    MoveNotVisible {
        /// Expected volume path under the target pool.
        path: String,
    },
    /// Raised when teardown of a provisioned resource fails.
    #[error(transparent)]
    Teardown(#[from] TeardownError<E>),
}

/// Runs the provisioning, pool-change, and optional teardown pipeline.
#[derive(Debug)]
pub struct Workflow<C, W: Write> {
    client: C,
    reporter: Reporter<W>,
    teardown_poll_interval: Option<Duration>,
    teardown_wait_timeout: Option<Duration>,
}

impl<C, W> Workflow<C, W>
where
    C: StorageClient,
    W: Write,
{
    /// Creates a workflow over the given client and reporter.
    pub const fn new(client: C, reporter: Reporter<W>) -> Self {
        Self {
            client,
            reporter,
            teardown_poll_interval: None,
            teardown_wait_timeout: None,
        }
    }

    /// Overrides the deletion-confirmation poll interval.
    ///
    /// This is primarily used by tests to keep timeout scenarios fast.
    #[must_use]
    pub const fn with_teardown_poll_interval(mut self, interval: Duration) -> Self {
        self.teardown_poll_interval = Some(interval);
        self
    }

    /// Overrides the deletion-confirmation wait timeout.
    ///
    /// This is primarily used by tests to keep timeout scenarios fast.
    #[must_use]
    pub const fn with_teardown_wait_timeout(mut self, timeout: Duration) -> Self {
        self.teardown_wait_timeout = Some(timeout);
        self
    }

    /// Consumes the workflow, returning the reporter.
    pub fn into_reporter(self) -> Reporter<W> {
        self.reporter
    }

    /// Runs the pipeline to completion or first error.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] for the first failing step; no partial
    /// rollback is attempted.
    pub async fn execute(&mut self, plan: &WorkflowPlan) -> Result<(), WorkflowError<C::Error>> {
        let target_pool = self.provision(plan).await?;
        let moved_path = self.move_volume(plan, &target_pool).await?;

        if plan.cleanup {
            self.teardown(plan, &moved_path).await?;
        }

        Ok(())
    }

    async fn provision(&mut self, plan: &WorkflowPlan) -> Result<Pool, WorkflowError<C::Error>> {
        let provisioner = Provisioner::new(&self.client);

        self.reporter
            .step(&format!("Ensuring storage account {}", plan.account_path));
        let (_, outcome) = provisioner
            .ensure_account(&plan.account_path, &plan.account_spec)
            .await
            .map_err(|source| WorkflowError::Ensure {
                resource: plan.account_path.to_string(),
                source,
            })?;
        Self::report_outcome(&mut self.reporter, outcome, "account");

        self.reporter.step(&format!(
            "Ensuring source capacity pool {} at {} service level",
            plan.source_pool_path, plan.source_pool_spec.service_level
        ));
        let (_, outcome) = provisioner
            .ensure_pool(&plan.source_pool_path, &plan.source_pool_spec)
            .await
            .map_err(|source| WorkflowError::Ensure {
                resource: plan.source_pool_path.to_string(),
                source,
            })?;
        Self::report_outcome(&mut self.reporter, outcome, "source pool");

        self.reporter.step(&format!(
            "Ensuring target capacity pool {} at {} service level",
            plan.target_pool_path, plan.target_pool_spec.service_level
        ));
        let (target_pool, outcome) = provisioner
            .ensure_pool(&plan.target_pool_path, &plan.target_pool_spec)
            .await
            .map_err(|source| WorkflowError::Ensure {
                resource: plan.target_pool_path.to_string(),
                source,
            })?;
        Self::report_outcome(&mut self.reporter, outcome, "target pool");

        self.reporter
            .step(&format!("Ensuring volume {}", plan.volume_path));
        let (volume, outcome) = provisioner
            .ensure_volume(&plan.volume_path, &plan.volume_spec)
            .await
            .map_err(|source| WorkflowError::Ensure {
                resource: plan.volume_path.to_string(),
                source,
            })?;
        Self::report_outcome(&mut self.reporter, outcome, "volume");
        self.reporter.info(&format!(
            "Current volume service level: {}",
            volume.service_level
        ));

        Ok(target_pool)
    }

    async fn move_volume(
        &mut self,
        plan: &WorkflowPlan,
        target_pool: &Pool,
    ) -> Result<VolumePath, WorkflowError<C::Error>> {
        self.reporter.step(&format!(
            "Performing pool change, moving volume to {}",
            plan.target_pool_path
        ));
        self.client
            .change_pool(&plan.volume_path, &target_pool.id)
            .await
            .map_err(WorkflowError::PoolChange)?;

        let moved_path = plan.volume_path.with_pool(plan.target_pool_path.clone());
        let moved = self.verify_move(&moved_path).await?;
        self.reporter.done(&format!(
            "volume moved from {} to {}",
            plan.source_pool_path, plan.target_pool_path
        ));
        self.reporter.info(&format!(
            "Current volume service level: {}",
            moved.service_level
        ));

        Ok(moved_path)
    }

    async fn verify_move(
        &mut self,
        moved_path: &VolumePath,
    ) -> Result<Volume, WorkflowError<C::Error>> {
        let looked_up = self
            .client
            .get_volume(moved_path)
            .await
            .map_err(|source| WorkflowError::Verify {
                path: moved_path.to_string(),
                source,
            })?;
        looked_up.ok_or_else(|| WorkflowError::MoveNotVisible {
            path: moved_path.to_string(),
        })
    }

    /// Deletes everything the run provisioned, innermost resource first:
    /// volume, then both pools, then the account.
    async fn teardown(
        &mut self,
        plan: &WorkflowPlan,
        moved_path: &VolumePath,
    ) -> Result<(), WorkflowError<C::Error>> {
        let mut teardown = Teardown::new(&self.client);
        if let Some(interval) = self.teardown_poll_interval {
            teardown = teardown.with_poll_interval(interval);
        }
        if let Some(timeout) = self.teardown_wait_timeout {
            teardown = teardown.with_wait_timeout(timeout);
        }

        self.reporter.step("Cleaning up all created resources");

        teardown.delete_volume_and_confirm(moved_path).await?;
        self.reporter.done(&format!("volume {moved_path} deleted"));

        teardown
            .delete_pool_and_confirm(&plan.source_pool_path)
            .await?;
        self.reporter
            .done(&format!("pool {} deleted", plan.source_pool_path));

        teardown
            .delete_pool_and_confirm(&plan.target_pool_path)
            .await?;
        self.reporter
            .done(&format!("pool {} deleted", plan.target_pool_path));

        teardown
            .delete_account_and_confirm(&plan.account_path)
            .await?;
        self.reporter
            .done(&format!("account {} deleted", plan.account_path));

        Ok(())
    }

    fn report_outcome(reporter: &mut Reporter<W>, outcome: EnsureOutcome, what: &str) {
        match outcome {
            EnsureOutcome::AlreadyExists => {
                reporter.done(&format!("{what} already exists"));
            }
            EnsureOutcome::Created => reporter.done(&format!("{what} created")),
        }
    }
}
