//! Get-or-create provisioning of storage resources.
//!
//! Each `ensure_*` call looks the resource up first and only issues a
//! creation request when the lookup reports absence. Existing resources are
//! returned unchanged; desired attributes are never reconciled against what
//! the provider already holds.

use crate::client::{
    Account, AccountPath, AccountSpec, Pool, PoolPath, PoolSpec, StorageClient, Volume, VolumePath,
    VolumeSpec,
};

/// Whether `ensure_*` found the resource or had to create it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EnsureOutcome {
    /// The lookup resolved an existing resource; no creation was issued.
    AlreadyExists,
    /// The resource was absent and has been created.
    Created,
}

/// Idempotent provisioner over a storage client.
#[derive(Debug)]
pub struct Provisioner<'a, C> {
    client: &'a C,
}

impl<'a, C: StorageClient> Provisioner<'a, C> {
    /// Wraps the given client.
    pub const fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Ensures the account exists, creating it when absent.
    ///
    /// # Errors
    ///
    /// Propagates the client's error from the lookup or the creation call;
    /// creation is not retried.
    pub async fn ensure_account(
        &self,
        path: &AccountPath,
        spec: &AccountSpec,
    ) -> Result<(Account, EnsureOutcome), C::Error> {
        if let Some(existing) = self.client.get_account(path).await? {
            return Ok((existing, EnsureOutcome::AlreadyExists));
        }
        let created = self.client.create_account(path, spec).await?;
        Ok((created, EnsureOutcome::Created))
    }

    /// Ensures the capacity pool exists, creating it when absent.
    ///
    /// # Errors
    ///
    /// Propagates the client's error from the lookup or the creation call;
    /// creation is not retried.
    pub async fn ensure_pool(
        &self,
        path: &PoolPath,
        spec: &PoolSpec,
    ) -> Result<(Pool, EnsureOutcome), C::Error> {
        if let Some(existing) = self.client.get_pool(path).await? {
            return Ok((existing, EnsureOutcome::AlreadyExists));
        }
        let created = self.client.create_pool(path, spec).await?;
        Ok((created, EnsureOutcome::Created))
    }

    /// Ensures the volume exists, creating it when absent.
    ///
    /// # Errors
    ///
    /// Propagates the client's error from the lookup or the creation call;
    /// creation is not retried.
    pub async fn ensure_volume(
        &self,
        path: &VolumePath,
        spec: &VolumeSpec,
    ) -> Result<(Volume, EnsureOutcome), C::Error> {
        if let Some(existing) = self.client.get_volume(path).await? {
            return Ok((existing, EnsureOutcome::AlreadyExists));
        }
        let created = self.client.create_volume(path, spec).await?;
        Ok((created, EnsureOutcome::Created))
    }
}
