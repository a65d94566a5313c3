//! Shared paths, specs, and plans for workflow tests.

use sluice::{
    AccountPath, AccountSpec, MIN_POOL_SIZE_BYTES, MIN_VOLUME_SIZE_BYTES, PoolPath, PoolSpec,
    Protocol, ServiceLevel, VolumePath, VolumeSpec, WorkflowPlan,
};

pub const LOCATION: &str = "westus";
pub const SUBNET_ID: &str =
    "/subscriptions/sub-test/resourceGroups/rg-test/providers/Network/virtualNetworks/vnet-test/subnets/subnet-test";

pub fn account_path() -> AccountPath {
    AccountPath::new("rg-test", "acct-test").expect("account path")
}

pub fn source_pool_path() -> PoolPath {
    PoolPath::new(account_path(), "pool-source").expect("pool path")
}

pub fn target_pool_path() -> PoolPath {
    PoolPath::new(account_path(), "pool-target").expect("pool path")
}

pub fn volume_path() -> VolumePath {
    VolumePath::new(source_pool_path(), "vol-test").expect("volume path")
}

pub fn account_spec() -> AccountSpec {
    AccountSpec::new(LOCATION).expect("account spec")
}

pub fn pool_spec(service_level: ServiceLevel) -> PoolSpec {
    PoolSpec::new(LOCATION, service_level, MIN_POOL_SIZE_BYTES).expect("pool spec")
}

pub fn volume_spec() -> VolumeSpec {
    VolumeSpec::new(
        LOCATION,
        ServiceLevel::Premium,
        "vol-test",
        SUBNET_ID,
        MIN_VOLUME_SIZE_BYTES,
        vec![Protocol::Nfsv3],
    )
    .expect("volume spec")
}

/// Plan matching the default workflow: volume starts in the Premium source
/// pool and moves to the Standard target pool.
pub fn plan(cleanup: bool) -> WorkflowPlan {
    WorkflowPlan {
        account_path: account_path(),
        account_spec: account_spec(),
        source_pool_path: source_pool_path(),
        source_pool_spec: pool_spec(ServiceLevel::Premium),
        target_pool_path: target_pool_path(),
        target_pool_spec: pool_spec(ServiceLevel::Standard),
        volume_path: volume_path(),
        volume_spec: volume_spec(),
        cleanup,
    }
}
