//! Storage-client abstraction for managed file-storage resources.
//!
//! The workflow only ever talks to the management plane through the
//! [`StorageClient`] trait: hierarchical paths identify resources, specs
//! carry desired attributes for creation, and records are the provider's
//! view of an existing resource. Lookups report absence as `Ok(None)`;
//! absence is never an error.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provider-enforced minimum capacity-pool size (4 TiB).
pub const MIN_POOL_SIZE_BYTES: u64 = 4_398_046_511_104;

/// Provider-enforced minimum volume quota (100 GiB).
pub const MIN_VOLUME_SIZE_BYTES: u64 = 107_374_182_400;

/// Performance tier attached to a pool or volume.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ServiceLevel {
    /// Baseline throughput tier.
    Standard,
    /// Mid throughput tier.
    Premium,
    /// Highest throughput tier.
    Ultra,
}

impl ServiceLevel {
    /// Returns the provider's wire name for the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Premium => "Premium",
            Self::Ultra => "Ultra",
        }
    }

    /// Parses a tier name, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ServiceLevel`] for unknown names.
    pub fn parse(value: &str) -> Result<Self, ClientError> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("standard") {
            Ok(Self::Standard)
        } else if trimmed.eq_ignore_ascii_case("premium") {
            Ok(Self::Premium)
        } else if trimmed.eq_ignore_ascii_case("ultra") {
            Ok(Self::Ultra)
        } else {
            Err(ClientError::ServiceLevel(trimmed.to_owned()))
        }
    }
}

impl fmt::Display for ServiceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mount protocol exposed by a volume.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Protocol {
    /// NFS version 3.
    Nfsv3,
    /// NFS version 4.1.
    Nfsv41,
}

impl Protocol {
    /// Returns the provider's wire name for the protocol.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nfsv3 => "NFSv3",
            Self::Nfsv41 => "NFSv4.1",
        }
    }

    /// Parses a protocol name, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Protocol`] for unknown names.
    pub fn parse(value: &str) -> Result<Self, ClientError> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("nfsv3") {
            Ok(Self::Nfsv3)
        } else if trimmed.eq_ignore_ascii_case("nfsv4.1") || trimmed.eq_ignore_ascii_case("nfsv41")
        {
            Ok(Self::Nfsv41)
        } else {
            Err(ClientError::Protocol(trimmed.to_owned()))
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn require_segment(value: &str, field: &str) -> Result<String, ClientError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(field.to_owned()));
    }
    Ok(trimmed.to_owned())
}

/// Path of a storage account: resource group plus account name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountPath {
    resource_group: String,
    account: String,
}

impl AccountPath {
    /// Builds an account path, trimming segments.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when a segment is empty.
    pub fn new(
        resource_group: impl Into<String>,
        account: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            resource_group: require_segment(&resource_group.into(), "resource_group")?,
            account: require_segment(&account.into(), "account")?,
        })
    }

    /// Resource group segment.
    #[must_use]
    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }

    /// Account name segment.
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }
}

impl fmt::Display for AccountPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_group, self.account)
    }
}

/// Path of a capacity pool under an account.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolPath {
    account: AccountPath,
    pool: String,
}

impl PoolPath {
    /// Builds a pool path under the given account.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when the pool segment is empty.
    pub fn new(account: AccountPath, pool: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            account,
            pool: require_segment(&pool.into(), "pool")?,
        })
    }

    /// Parent account path.
    #[must_use]
    pub const fn account(&self) -> &AccountPath {
        &self.account
    }

    /// Pool name segment.
    #[must_use]
    pub fn pool(&self) -> &str {
        &self.pool
    }
}

impl fmt::Display for PoolPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.account, self.pool)
    }
}

/// Path of a volume under a capacity pool.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VolumePath {
    pool: PoolPath,
    volume: String,
}

impl VolumePath {
    /// Builds a volume path under the given pool.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when the volume segment is empty.
    pub fn new(pool: PoolPath, volume: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            pool,
            volume: require_segment(&volume.into(), "volume")?,
        })
    }

    /// Parent pool path.
    #[must_use]
    pub const fn pool(&self) -> &PoolPath {
        &self.pool
    }

    /// Volume name segment.
    #[must_use]
    pub fn volume(&self) -> &str {
        &self.volume
    }

    /// Returns the same volume name re-rooted under a different pool.
    ///
    /// Used after a pool change, when the volume is reachable under the
    /// target pool instead of the source pool.
    #[must_use]
    pub fn with_pool(&self, pool: PoolPath) -> Self {
        Self {
            pool,
            volume: self.volume.clone(),
        }
    }
}

impl fmt::Display for VolumePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pool, self.volume)
    }
}

/// Desired attributes for a new storage account.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountSpec {
    /// Region in which to place the account.
    pub location: String,
}

impl AccountSpec {
    /// Builds an account spec, trimming the location.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when the location is empty.
    pub fn new(location: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            location: require_segment(&location.into(), "location")?,
        })
    }
}

/// Desired attributes for a new capacity pool.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolSpec {
    /// Region in which to place the pool.
    pub location: String,
    /// Performance tier for the pool.
    pub service_level: ServiceLevel,
    /// Provisioned size in bytes.
    pub size_bytes: u64,
}

impl PoolSpec {
    /// Builds a pool spec, enforcing the provider minimum size.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when the location is empty and
    /// [`ClientError::PoolTooSmall`] when the size is below 4 TiB.
    pub fn new(
        location: impl Into<String>,
        service_level: ServiceLevel,
        size_bytes: u64,
    ) -> Result<Self, ClientError> {
        if size_bytes < MIN_POOL_SIZE_BYTES {
            return Err(ClientError::PoolTooSmall { size_bytes });
        }
        Ok(Self {
            location: require_segment(&location.into(), "location")?,
            service_level,
            size_bytes,
        })
    }
}

/// Desired attributes for a new volume.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VolumeSpec {
    /// Region in which to place the volume.
    pub location: String,
    /// Performance tier for the volume.
    pub service_level: ServiceLevel,
    /// Unique export label for the volume.
    pub creation_token: String,
    /// Provider resource id of the delegated subnet.
    pub subnet_id: String,
    /// Usage quota in bytes.
    pub usage_threshold_bytes: u64,
    /// Mount protocols to expose.
    pub protocols: Vec<Protocol>,
}

impl VolumeSpec {
    /// Builds a volume spec, enforcing the provider minimum quota.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when a required field is empty,
    /// including an empty protocol list, and [`ClientError::VolumeTooSmall`]
    /// when the quota is below 100 GiB.
    pub fn new(
        location: impl Into<String>,
        service_level: ServiceLevel,
        creation_token: impl Into<String>,
        subnet_id: impl Into<String>,
        usage_threshold_bytes: u64,
        protocols: Vec<Protocol>,
    ) -> Result<Self, ClientError> {
        if usage_threshold_bytes < MIN_VOLUME_SIZE_BYTES {
            return Err(ClientError::VolumeTooSmall {
                size_bytes: usage_threshold_bytes,
            });
        }
        if protocols.is_empty() {
            return Err(ClientError::Validation("protocols".to_owned()));
        }
        Ok(Self {
            location: require_segment(&location.into(), "location")?,
            service_level,
            creation_token: require_segment(&creation_token.into(), "creation_token")?,
            subnet_id: require_segment(&subnet_id.into(), "subnet_id")?,
            usage_threshold_bytes,
            protocols,
        })
    }
}

/// Provider record for an existing storage account.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Account {
    /// Provider resource id.
    pub id: String,
    /// Account name.
    pub name: String,
    /// Region the account lives in.
    pub location: String,
}

/// Provider record for an existing capacity pool.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    /// Provider resource id, used as the pool-change target reference.
    pub id: String,
    /// Pool name.
    pub name: String,
    /// Region the pool lives in.
    pub location: String,
    /// Performance tier.
    pub service_level: ServiceLevel,
    /// Provisioned size in bytes.
    pub size_bytes: u64,
}

/// Provider record for an existing volume.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Volume {
    /// Provider resource id.
    pub id: String,
    /// Volume name.
    pub name: String,
    /// Region the volume lives in.
    pub location: String,
    /// Performance tier.
    pub service_level: ServiceLevel,
    /// Unique export label; stable across pool changes.
    pub creation_token: String,
    /// Usage quota in bytes.
    pub usage_threshold_bytes: u64,
}

/// Errors raised while building paths and specs.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ClientError {
    /// Raised when a required field is missing or empty.
    #[error("missing or empty field: {0}")]
    Validation(String),
    /// Raised for an unrecognised service-level name.
    #[error("unknown service level '{0}' (expected Standard, Premium, or Ultra)")]
    ServiceLevel(String),
    /// Raised for an unrecognised protocol name.
    #[error("unknown protocol '{0}' (expected NFSv3 or NFSv4.1)")]
    Protocol(String),
    /// Raised when a pool size is below the provider minimum.
    #[error("pool size {size_bytes} below provider minimum of {MIN_POOL_SIZE_BYTES} bytes")]
    PoolTooSmall {
        /// Requested size in bytes.
        size_bytes: u64,
    },
    /// Raised when a volume quota is below the provider minimum.
    #[error("volume size {size_bytes} below provider minimum of {MIN_VOLUME_SIZE_BYTES} bytes")]
    VolumeTooSmall {
        /// Requested quota in bytes.
        size_bytes: u64,
    },
}

/// Future returned by client operations.
pub type ClientFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Management-plane interface implemented by storage clients.
///
/// Create and pool-change operations are long-running on the provider side;
/// implementations resolve them to a terminal state before returning.
pub trait StorageClient {
    /// Provider-specific error type returned by the client.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Looks up an account; absence is `Ok(None)`.
    fn get_account<'a>(
        &'a self,
        path: &'a AccountPath,
    ) -> ClientFuture<'a, Option<Account>, Self::Error>;

    /// Looks up a capacity pool; absence is `Ok(None)`.
    fn get_pool<'a>(&'a self, path: &'a PoolPath) -> ClientFuture<'a, Option<Pool>, Self::Error>;

    /// Looks up a volume; absence is `Ok(None)`.
    fn get_volume<'a>(
        &'a self,
        path: &'a VolumePath,
    ) -> ClientFuture<'a, Option<Volume>, Self::Error>;

    /// Creates an account and waits for it to reach a terminal state.
    fn create_account<'a>(
        &'a self,
        path: &'a AccountPath,
        spec: &'a AccountSpec,
    ) -> ClientFuture<'a, Account, Self::Error>;

    /// Creates a capacity pool and waits for it to reach a terminal state.
    fn create_pool<'a>(
        &'a self,
        path: &'a PoolPath,
        spec: &'a PoolSpec,
    ) -> ClientFuture<'a, Pool, Self::Error>;

    /// Creates a volume and waits for it to reach a terminal state.
    fn create_volume<'a>(
        &'a self,
        path: &'a VolumePath,
        spec: &'a VolumeSpec,
    ) -> ClientFuture<'a, Volume, Self::Error>;

    /// Requests deletion of an account.
    fn delete_account<'a>(&'a self, path: &'a AccountPath) -> ClientFuture<'a, (), Self::Error>;

    /// Requests deletion of a capacity pool.
    fn delete_pool<'a>(&'a self, path: &'a PoolPath) -> ClientFuture<'a, (), Self::Error>;

    /// Requests deletion of a volume.
    fn delete_volume<'a>(&'a self, path: &'a VolumePath) -> ClientFuture<'a, (), Self::Error>;

    /// Moves a volume to the pool identified by `target_pool_id` and waits
    /// for the move to finish. The volume keeps its creation token; only its
    /// parent pool changes.
    fn change_pool<'a>(
        &'a self,
        path: &'a VolumePath,
        target_pool_id: &'a str,
    ) -> ClientFuture<'a, (), Self::Error>;
}
