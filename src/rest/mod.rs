//! REST implementation of the storage client.
//!
//! Talks to an ARM-style management API: resources live under
//! `/subscriptions/{id}/resourceGroups/{group}/providers/FileStorage/...`,
//! every request carries an `api-version` query parameter and a bearer
//! token, and create and pool-change requests are long-running operations
//! resolved by polling the resource's `provisioningState`.

mod error;
mod http;
mod resources;
mod types;

use std::sync::LazyLock;
use std::time::Duration;

use crate::client::{
    Account, AccountPath, AccountSpec, ClientFuture, Pool, PoolPath, PoolSpec, StorageClient,
    Volume, VolumePath, VolumeSpec,
};
use crate::config::WorkflowConfig;

pub use error::RestError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const API_VERSION: &str = "2024-01-01";
const PROVIDER_NAMESPACE: &str = "FileStorage";
const POLL_INTERVAL: Duration = Duration::from_secs(5);
const WAIT_TIMEOUT: Duration = Duration::from_secs(300);

static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Storage client that speaks the provider's management REST API.
#[derive(Clone, Debug)]
pub struct RestClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
    subscription_id: String,
    poll_interval: Duration,
    wait_timeout: Duration,
}

impl RestClient {
    /// Constructs a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Config`] when the provided configuration fails
    /// validation.
    pub fn new(config: &WorkflowConfig) -> Result<Self, RestError> {
        config
            .validate()
            .map_err(|err| RestError::Config(err.to_string()))?;
        Ok(Self {
            http: HTTP_CLIENT.clone(),
            endpoint: config.api_endpoint.trim_end_matches('/').to_owned(),
            token: config.api_token.clone(),
            subscription_id: config.subscription_id.clone(),
            poll_interval: POLL_INTERVAL,
            wait_timeout: WAIT_TIMEOUT,
        })
    }

    /// Overrides the long-running-operation poll interval.
    ///
    /// This is primarily used by tests to keep timeout scenarios fast.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Overrides the long-running-operation wait timeout.
    ///
    /// This is primarily used by tests to keep timeout scenarios fast.
    #[must_use]
    pub const fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    fn account_url(&self, path: &AccountPath) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/{PROVIDER_NAMESPACE}/accounts/{}",
            self.endpoint,
            self.subscription_id,
            path.resource_group(),
            path.account()
        )
    }

    fn pool_url(&self, path: &PoolPath) -> String {
        format!(
            "{}/capacityPools/{}",
            self.account_url(path.account()),
            path.pool()
        )
    }

    fn volume_url(&self, path: &VolumePath) -> String {
        format!("{}/volumes/{}", self.pool_url(path.pool()), path.volume())
    }
}

impl StorageClient for RestClient {
    type Error = RestError;

    fn get_account<'a>(
        &'a self,
        path: &'a AccountPath,
    ) -> ClientFuture<'a, Option<Account>, RestError> {
        Box::pin(async move { self.fetch_account(path).await })
    }

    fn get_pool<'a>(&'a self, path: &'a PoolPath) -> ClientFuture<'a, Option<Pool>, RestError> {
        Box::pin(async move { self.fetch_pool(path).await })
    }

    fn get_volume<'a>(
        &'a self,
        path: &'a VolumePath,
    ) -> ClientFuture<'a, Option<Volume>, RestError> {
        Box::pin(async move { self.fetch_volume(path).await })
    }

    fn create_account<'a>(
        &'a self,
        path: &'a AccountPath,
        spec: &'a AccountSpec,
    ) -> ClientFuture<'a, Account, RestError> {
        Box::pin(async move { self.put_account(path, spec).await })
    }

    fn create_pool<'a>(
        &'a self,
        path: &'a PoolPath,
        spec: &'a PoolSpec,
    ) -> ClientFuture<'a, Pool, RestError> {
        Box::pin(async move { self.put_pool(path, spec).await })
    }

    fn create_volume<'a>(
        &'a self,
        path: &'a VolumePath,
        spec: &'a VolumeSpec,
    ) -> ClientFuture<'a, Volume, RestError> {
        Box::pin(async move { self.put_volume(path, spec).await })
    }

    fn delete_account<'a>(&'a self, path: &'a AccountPath) -> ClientFuture<'a, (), RestError> {
        Box::pin(async move { self.remove_account(path).await })
    }

    fn delete_pool<'a>(&'a self, path: &'a PoolPath) -> ClientFuture<'a, (), RestError> {
        Box::pin(async move { self.remove_pool(path).await })
    }

    fn delete_volume<'a>(&'a self, path: &'a VolumePath) -> ClientFuture<'a, (), RestError> {
        Box::pin(async move { self.remove_volume(path).await })
    }

    fn change_pool<'a>(
        &'a self,
        path: &'a VolumePath,
        target_pool_id: &'a str,
    ) -> ClientFuture<'a, (), RestError> {
        Box::pin(async move { self.post_pool_change(path, target_pool_id).await })
    }
}
