//! Wire types for the management REST API.

use serde::{Deserialize, Serialize};

use super::error::RestError;
use crate::client::{
    Account, AccountSpec, Pool, PoolSpec, Protocol, ServiceLevel, Volume, VolumeSpec,
};

/// Terminal states reported through `provisioningState`.
pub(super) const STATE_SUCCEEDED: &str = "Succeeded";
pub(super) const STATE_FAILED: &str = "Failed";

fn parse_service_level(value: &str) -> Result<ServiceLevel, RestError> {
    ServiceLevel::parse(value).map_err(|err| RestError::Decode(err.to_string()))
}

#[derive(Debug, Deserialize)]
pub(super) struct AccountResource {
    pub(super) id: String,
    pub(super) name: String,
    pub(super) location: String,
    #[serde(default)]
    pub(super) properties: AccountProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AccountProperties {
    pub(super) provisioning_state: Option<String>,
}

impl AccountResource {
    pub(super) fn provisioning_state(&self) -> Option<&str> {
        self.properties.provisioning_state.as_deref()
    }

    pub(super) fn into_record(self) -> Account {
        Account {
            id: self.id,
            name: self.name,
            location: self.location,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PoolResource {
    pub(super) id: String,
    pub(super) name: String,
    pub(super) location: String,
    pub(super) properties: PoolProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PoolProperties {
    pub(super) provisioning_state: Option<String>,
    pub(super) service_level: String,
    pub(super) size: u64,
}

impl PoolResource {
    pub(super) fn provisioning_state(&self) -> Option<&str> {
        self.properties.provisioning_state.as_deref()
    }

    pub(super) fn into_record(self) -> Result<Pool, RestError> {
        Ok(Pool {
            service_level: parse_service_level(&self.properties.service_level)?,
            id: self.id,
            name: self.name,
            location: self.location,
            size_bytes: self.properties.size,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct VolumeResource {
    pub(super) id: String,
    pub(super) name: String,
    pub(super) location: String,
    pub(super) properties: VolumeProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VolumeProperties {
    pub(super) provisioning_state: Option<String>,
    pub(super) service_level: String,
    pub(super) creation_token: String,
    pub(super) usage_threshold: u64,
}

impl VolumeResource {
    pub(super) fn provisioning_state(&self) -> Option<&str> {
        self.properties.provisioning_state.as_deref()
    }

    pub(super) fn into_record(self) -> Result<Volume, RestError> {
        Ok(Volume {
            service_level: parse_service_level(&self.properties.service_level)?,
            id: self.id,
            name: self.name,
            location: self.location,
            creation_token: self.properties.creation_token,
            usage_threshold_bytes: self.properties.usage_threshold,
        })
    }
}

#[derive(Debug, Serialize)]
pub(super) struct CreateBody<P> {
    pub(super) location: String,
    pub(super) properties: P,
}

#[derive(Debug, Serialize)]
pub(super) struct EmptyProperties {}

impl CreateBody<EmptyProperties> {
    pub(super) fn account(spec: &AccountSpec) -> Self {
        Self {
            location: spec.location.clone(),
            properties: EmptyProperties {},
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PoolCreateProperties {
    pub(super) service_level: &'static str,
    pub(super) size: u64,
}

impl CreateBody<PoolCreateProperties> {
    pub(super) fn pool(spec: &PoolSpec) -> Self {
        Self {
            location: spec.location.clone(),
            properties: PoolCreateProperties {
                service_level: spec.service_level.as_str(),
                size: spec.size_bytes,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VolumeCreateProperties {
    pub(super) service_level: &'static str,
    pub(super) creation_token: String,
    pub(super) subnet_id: String,
    pub(super) usage_threshold: u64,
    pub(super) protocol_types: Vec<&'static str>,
}

impl CreateBody<VolumeCreateProperties> {
    pub(super) fn volume(spec: &VolumeSpec) -> Self {
        Self {
            location: spec.location.clone(),
            properties: VolumeCreateProperties {
                service_level: spec.service_level.as_str(),
                creation_token: spec.creation_token.clone(),
                subnet_id: spec.subnet_id.clone(),
                usage_threshold: spec.usage_threshold_bytes,
                protocol_types: spec.protocols.iter().copied().map(Protocol::as_str).collect(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PoolChangeBody {
    pub(super) new_pool_resource_id: String,
}
