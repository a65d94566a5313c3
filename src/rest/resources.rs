//! Resource operations for the REST storage client.
//!
//! Creation is a PUT followed by polling the resource until its
//! `provisioningState` turns terminal; deletion is a DELETE followed by
//! draining the read path while the resource still reports `Deleting`.

use std::future::Future;

use tokio::time::{Instant, sleep};

use super::error::RestError;
use super::RestClient;
use super::types::{
    AccountResource, CreateBody, PoolChangeBody, PoolResource, STATE_FAILED, STATE_SUCCEEDED,
    VolumeResource,
};
use crate::client::{
    Account, AccountPath, AccountSpec, Pool, PoolPath, PoolSpec, Volume, VolumePath, VolumeSpec,
};

/// One observation of a resource: its parsed record and the provisioning
/// state it reported, when any.
type Observation<T> = Option<(T, Option<String>)>;

impl RestClient {
    pub(super) async fn fetch_account(
        &self,
        path: &AccountPath,
    ) -> Result<Option<Account>, RestError> {
        let resource: Option<AccountResource> = self.get_json(&self.account_url(path)).await?;
        Ok(resource.map(AccountResource::into_record))
    }

    pub(super) async fn fetch_pool(&self, path: &PoolPath) -> Result<Option<Pool>, RestError> {
        let resource: Option<PoolResource> = self.get_json(&self.pool_url(path)).await?;
        resource.map(PoolResource::into_record).transpose()
    }

    pub(super) async fn fetch_volume(
        &self,
        path: &VolumePath,
    ) -> Result<Option<Volume>, RestError> {
        let resource: Option<VolumeResource> = self.get_json(&self.volume_url(path)).await?;
        resource.map(VolumeResource::into_record).transpose()
    }

    pub(super) async fn put_account(
        &self,
        path: &AccountPath,
        spec: &AccountSpec,
    ) -> Result<Account, RestError> {
        let url = self.account_url(path);
        let _: AccountResource = self.put_json(&url, &CreateBody::account(spec)).await?;
        let poll_url = &url;
        self.await_provisioned(&path.to_string(), move || async move {
            let resource: Option<AccountResource> = self.get_json(poll_url).await?;
            Ok(resource.map(|found| {
                let state = found.provisioning_state().map(str::to_owned);
                (found.into_record(), state)
            }))
        })
        .await
    }

    pub(super) async fn put_pool(
        &self,
        path: &PoolPath,
        spec: &PoolSpec,
    ) -> Result<Pool, RestError> {
        let url = self.pool_url(path);
        let _: PoolResource = self.put_json(&url, &CreateBody::pool(spec)).await?;
        let poll_url = &url;
        self.await_provisioned(&path.to_string(), move || async move {
            let resource: Option<PoolResource> = self.get_json(poll_url).await?;
            resource
                .map(|found| {
                    let state = found.provisioning_state().map(str::to_owned);
                    Ok((found.into_record()?, state))
                })
                .transpose()
        })
        .await
    }

    pub(super) async fn put_volume(
        &self,
        path: &VolumePath,
        spec: &VolumeSpec,
    ) -> Result<Volume, RestError> {
        let url = self.volume_url(path);
        let _: VolumeResource = self.put_json(&url, &CreateBody::volume(spec)).await?;
        let poll_url = &url;
        self.await_provisioned(&path.to_string(), move || async move {
            let resource: Option<VolumeResource> = self.get_json(poll_url).await?;
            resource
                .map(|found| {
                    let state = found.provisioning_state().map(str::to_owned);
                    Ok((found.into_record()?, state))
                })
                .transpose()
        })
        .await
    }

    pub(super) async fn remove_account(&self, path: &AccountPath) -> Result<(), RestError> {
        let url = self.account_url(path);
        self.delete_url(&url).await?;
        let poll_url = &url;
        self.drain_deletion(&path.to_string(), move || async move {
            let resource: Option<AccountResource> = self.get_json(poll_url).await?;
            Ok(resource.map(|found| found.provisioning_state().map(str::to_owned)))
        })
        .await
    }

    pub(super) async fn remove_pool(&self, path: &PoolPath) -> Result<(), RestError> {
        let url = self.pool_url(path);
        self.delete_url(&url).await?;
        let poll_url = &url;
        self.drain_deletion(&path.to_string(), move || async move {
            let resource: Option<PoolResource> = self.get_json(poll_url).await?;
            Ok(resource.map(|found| found.provisioning_state().map(str::to_owned)))
        })
        .await
    }

    pub(super) async fn remove_volume(&self, path: &VolumePath) -> Result<(), RestError> {
        let url = self.volume_url(path);
        self.delete_url(&url).await?;
        let poll_url = &url;
        self.drain_deletion(&path.to_string(), move || async move {
            let resource: Option<VolumeResource> = self.get_json(poll_url).await?;
            Ok(resource.map(|found| found.provisioning_state().map(str::to_owned)))
        })
        .await
    }

    /// Issues the pool-change action and waits until the volume reports a
    /// terminal state under the target pool.
    pub(super) async fn post_pool_change(
        &self,
        path: &VolumePath,
        target_pool_id: &str,
    ) -> Result<(), RestError> {
        let target_pool = pool_name_from_id(target_pool_id)?;
        let target_pool_path = PoolPath::new(path.pool().account().clone(), target_pool)
            .map_err(|_| RestError::MalformedResourceId(target_pool_id.to_owned()))?;
        let moved_path = path.with_pool(target_pool_path);

        let url = format!("{}/poolChange", self.volume_url(path));
        self.post_json(
            &url,
            &PoolChangeBody {
                new_pool_resource_id: target_pool_id.to_owned(),
            },
        )
        .await?;

        let moved_url = self.volume_url(&moved_path);
        let poll_url = &moved_url;
        self.await_provisioned(&moved_path.to_string(), move || async move {
            let resource: Option<VolumeResource> = self.get_json(poll_url).await?;
            resource
                .map(|found| {
                    let state = found.provisioning_state().map(str::to_owned);
                    Ok((found.into_record()?, state))
                })
                .transpose()
        })
        .await?;
        Ok(())
    }

    /// Polls `probe` until the resource reports `Succeeded` (or no state at
    /// all, for providers that omit it once settled).
    async fn await_provisioned<T, F>(
        &self,
        resource: &str,
        probe: impl Fn() -> F,
    ) -> Result<T, RestError>
    where
        F: Future<Output = Result<Observation<T>, RestError>>,
    {
        let deadline = Instant::now() + self.wait_timeout;
        loop {
            if let Some((record, state)) = probe().await? {
                match state.as_deref() {
                    None | Some(STATE_SUCCEEDED) => return Ok(record),
                    Some(STATE_FAILED) => {
                        return Err(RestError::OperationFailed {
                            resource: resource.to_owned(),
                            message: String::from("provisioning entered the Failed state"),
                        });
                    }
                    _ => {}
                }
            }

            if Instant::now() >= deadline {
                return Err(RestError::OperationTimeout {
                    resource: resource.to_owned(),
                });
            }
            sleep(self.poll_interval).await;
        }
    }

    /// Polls `probe` until the resource disappears from the read path. A
    /// lingering record is tolerated while it reports `Deleting`.
    async fn drain_deletion<F>(
        &self,
        resource: &str,
        probe: impl Fn() -> F,
    ) -> Result<(), RestError>
    where
        F: Future<Output = Result<Option<Option<String>>, RestError>>,
    {
        let deadline = Instant::now() + self.wait_timeout;
        loop {
            match probe().await? {
                None => return Ok(()),
                Some(state) if state.as_deref() == Some(STATE_FAILED) => {
                    return Err(RestError::OperationFailed {
                        resource: resource.to_owned(),
                        message: String::from("deletion entered the Failed state"),
                    });
                }
                // Still visible, usually as Deleting; the read path lags
                // behind the accepted delete.
                Some(_) => {}
            }

            if Instant::now() >= deadline {
                return Err(RestError::OperationTimeout {
                    resource: resource.to_owned(),
                });
            }
            sleep(self.poll_interval).await;
        }
    }
}

/// Extracts the pool name segment from a pool resource id such as
/// `/subscriptions/.../capacityPools/{pool}`.
fn pool_name_from_id(target_pool_id: &str) -> Result<&str, RestError> {
    let mut segments = target_pool_id.split('/');
    while let Some(segment) = segments.next() {
        if segment == "capacityPools" {
            return segments
                .next()
                .filter(|name| !name.is_empty())
                .ok_or_else(|| RestError::MalformedResourceId(target_pool_id.to_owned()));
        }
    }
    Err(RestError::MalformedResourceId(target_pool_id.to_owned()))
}
