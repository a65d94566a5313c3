//! Configuration loading via `ortho-config`.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::client::{
    AccountPath, AccountSpec, ClientError, PoolPath, PoolSpec, Protocol, ServiceLevel, VolumePath,
    VolumeSpec,
};
use crate::workflow::WorkflowPlan;

/// Workflow configuration derived from defaults, `sluice.toml`, environment
/// variables, and CLI flags, in that order of precedence.
#[derive(Clone, Debug, Deserialize, Eq, OrthoConfig, PartialEq)]
#[ortho_config(prefix = "SLUICE")]
pub struct WorkflowConfig {
    /// Base URL of the management API. This value is required.
    pub api_endpoint: String,
    /// Bearer token used for authentication. Acquiring the token is out of
    /// scope; it is consumed as an opaque string.
    pub api_token: String,
    /// Subscription identifier owning every resource the workflow touches.
    pub subscription_id: String,
    /// Region in which to place all created resources.
    pub location: String,
    /// Resource group the account is created in. The group itself must
    /// already exist.
    pub resource_group: String,
    /// Virtual network holding the delegated subnet.
    pub vnet_name: String,
    /// Delegated subnet the volume is exported on.
    pub subnet_name: String,
    /// Storage account name.
    #[ortho_config(default = "sluice-example-account".to_owned())]
    pub account_name: String,
    /// Name of the pool the volume starts in.
    #[ortho_config(default = "sluice-example-pool-source".to_owned())]
    pub source_pool_name: String,
    /// Name of the pool the volume is moved to.
    #[ortho_config(default = "sluice-example-pool-target".to_owned())]
    pub target_pool_name: String,
    /// Service level of the source pool and the volume.
    #[ortho_config(default = "Premium".to_owned())]
    pub source_service_level: String,
    /// Service level of the target pool.
    #[ortho_config(default = "Standard".to_owned())]
    pub target_service_level: String,
    /// Size of both capacity pools in bytes. Defaults to the provider
    /// minimum of 4 TiB.
    #[ortho_config(default = 4_398_046_511_104)]
    pub pool_size_bytes: u64,
    /// Volume name, also used as the volume's creation token.
    #[ortho_config(default = "sluice-example-volume".to_owned())]
    pub volume_name: String,
    /// Volume quota in bytes. Defaults to the provider minimum of 100 GiB.
    #[ortho_config(default = 107_374_182_400)]
    pub volume_size_bytes: u64,
    /// Mount protocol exposed by the volume.
    #[ortho_config(default = "NFSv3".to_owned())]
    pub protocol: String,
    /// Whether to delete every created resource after the pool change.
    #[ortho_config(default = false)]
    pub cleanup: bool,
}

/// Metadata for a configuration field, used to generate actionable error
/// messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(
        description: &'static str,
        env_var: &'static str,
        toml_key: &'static str,
    ) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl WorkflowConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to sluice.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration using the `ortho-config` derive. Values merge
    /// defaults, configuration files, environment variables, and CLI flags
    /// in that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the loader fails to merge sources.
    pub fn load_from_sources() -> Result<Self, ConfigError> {
        Self::load().map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("sluice")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields, names, tiers, and
    /// sizes. Error messages include guidance on how to provide missing
    /// values via environment variables or the configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] for empty required fields and
    /// [`ConfigError::Invalid`] for values that fail semantic checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.api_endpoint,
            &FieldMetadata::new(
                "management API endpoint",
                "SLUICE_API_ENDPOINT",
                "api_endpoint",
            ),
        )?;
        Self::require_field(
            &self.api_token,
            &FieldMetadata::new("management API token", "SLUICE_API_TOKEN", "api_token"),
        )?;
        Self::require_field(
            &self.subscription_id,
            &FieldMetadata::new(
                "subscription id",
                "SLUICE_SUBSCRIPTION_ID",
                "subscription_id",
            ),
        )?;
        Self::require_field(
            &self.location,
            &FieldMetadata::new("region", "SLUICE_LOCATION", "location"),
        )?;
        Self::require_field(
            &self.resource_group,
            &FieldMetadata::new("resource group", "SLUICE_RESOURCE_GROUP", "resource_group"),
        )?;
        Self::require_field(
            &self.vnet_name,
            &FieldMetadata::new("virtual network name", "SLUICE_VNET_NAME", "vnet_name"),
        )?;
        Self::require_field(
            &self.subnet_name,
            &FieldMetadata::new("delegated subnet name", "SLUICE_SUBNET_NAME", "subnet_name"),
        )?;
        if self.source_pool_name.trim() == self.target_pool_name.trim() {
            return Err(ConfigError::Invalid(String::from(
                "source_pool_name and target_pool_name must differ",
            )));
        }
        ServiceLevel::parse(&self.source_service_level)?;
        ServiceLevel::parse(&self.target_service_level)?;
        Protocol::parse(&self.protocol)?;
        Ok(())
    }

    /// Renders the provider resource id of the delegated subnet.
    #[must_use]
    pub fn subnet_id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Network/virtualNetworks/{}/subnets/{}",
            self.subscription_id.trim(),
            self.resource_group.trim(),
            self.vnet_name.trim(),
            self.subnet_name.trim()
        )
    }

    /// Assembles the typed [`WorkflowPlan`] for a run.
    ///
    /// The volume is planned under the source pool at the source service
    /// level, with the volume name doubling as its creation token, the way
    /// the provider's own sample configures it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation fails or a path or spec
    /// cannot be built from the configured values.
    pub fn as_plan(&self) -> Result<WorkflowPlan, ConfigError> {
        self.validate()?;

        let source_level = ServiceLevel::parse(&self.source_service_level)?;
        let target_level = ServiceLevel::parse(&self.target_service_level)?;
        let protocol = Protocol::parse(&self.protocol)?;

        let account_path = AccountPath::new(&self.resource_group, &self.account_name)?;
        let source_pool_path = PoolPath::new(account_path.clone(), &self.source_pool_name)?;
        let target_pool_path = PoolPath::new(account_path.clone(), &self.target_pool_name)?;
        let volume_path = VolumePath::new(source_pool_path.clone(), &self.volume_name)?;

        Ok(WorkflowPlan {
            account_spec: AccountSpec::new(&self.location)?,
            source_pool_spec: PoolSpec::new(&self.location, source_level, self.pool_size_bytes)?,
            target_pool_spec: PoolSpec::new(&self.location, target_level, self.pool_size_bytes)?,
            volume_spec: VolumeSpec::new(
                &self.location,
                source_level,
                &self.volume_name,
                self.subnet_id(),
                self.volume_size_bytes,
                vec![protocol],
            )?,
            account_path,
            source_pool_path,
            target_pool_path,
            volume_path,
            cleanup: self.cleanup,
        })
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a configured value fails semantic validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}

impl From<ClientError> for ConfigError {
    fn from(value: ClientError) -> Self {
        Self::Invalid(value.to_string())
    }
}
