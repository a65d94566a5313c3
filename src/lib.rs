//! Core library for the sluice pool-change tool.
//!
//! The crate exposes a storage-client abstraction over a managed
//! file-storage management plane and the workflow that provisions an
//! account, two capacity pools at different service tiers, and a volume,
//! then moves the volume between pools and optionally tears everything
//! down (ensure → pool change → confirm-deleted).

pub mod client;
pub mod config;
pub mod provision;
pub mod report;
pub mod rest;
pub mod teardown;
pub mod workflow;

pub use client::{
    Account, AccountPath, AccountSpec, ClientError, ClientFuture, MIN_POOL_SIZE_BYTES,
    MIN_VOLUME_SIZE_BYTES, Pool, PoolPath, PoolSpec, Protocol, ServiceLevel, StorageClient,
    Volume, VolumePath, VolumeSpec,
};
pub use config::{ConfigError, WorkflowConfig};
pub use provision::{EnsureOutcome, Provisioner};
pub use report::Reporter;
pub use rest::{RestClient, RestError};
pub use teardown::{Teardown, TeardownError};
pub use workflow::{Workflow, WorkflowError, WorkflowPlan};
