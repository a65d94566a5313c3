//! Behaviour tests for get-or-create provisioning.

#[path = "common/fake_client.rs"]
mod fake_client;
#[path = "common/fixtures.rs"]
mod fixtures;

use fake_client::{FakeClient, FakeError};
use fixtures::{
    LOCATION, SUBNET_ID, account_path, account_spec, pool_spec, source_pool_path, volume_path,
    volume_spec,
};
use sluice::{
    EnsureOutcome, MIN_VOLUME_SIZE_BYTES, Protocol, Provisioner, ServiceLevel, StorageClient,
    VolumeSpec,
};

#[tokio::test]
async fn ensure_account_creates_once_and_is_idempotent() {
    let client = FakeClient::new();
    let provisioner = Provisioner::new(&client);
    let path = account_path();
    let spec = account_spec();

    let (first, outcome) = provisioner
        .ensure_account(&path, &spec)
        .await
        .expect("first ensure");
    assert_eq!(outcome, EnsureOutcome::Created);

    let (second, outcome) = provisioner
        .ensure_account(&path, &spec)
        .await
        .expect("second ensure");
    assert_eq!(outcome, EnsureOutcome::AlreadyExists);

    assert_eq!(first, second);
    assert_eq!(client.create_calls(&path.to_string()), 1);
}

#[tokio::test]
async fn ensure_does_not_reconcile_existing_attributes() {
    let client = FakeClient::new();
    let provisioner = Provisioner::new(&client);
    provisioner
        .ensure_account(&account_path(), &account_spec())
        .await
        .expect("account");
    provisioner
        .ensure_pool(&source_pool_path(), &pool_spec(ServiceLevel::Premium))
        .await
        .expect("pool");
    let (created, _) = provisioner
        .ensure_volume(&volume_path(), &volume_spec())
        .await
        .expect("volume");

    // Same path, different desired attributes: the existing record must be
    // returned untouched and no creation call issued.
    let bigger = VolumeSpec::new(
        LOCATION,
        ServiceLevel::Ultra,
        "vol-test",
        SUBNET_ID,
        MIN_VOLUME_SIZE_BYTES * 2,
        vec![Protocol::Nfsv41],
    )
    .expect("bigger spec");
    let (found, outcome) = provisioner
        .ensure_volume(&volume_path(), &bigger)
        .await
        .expect("re-ensure");

    assert_eq!(outcome, EnsureOutcome::AlreadyExists);
    assert_eq!(found, created);
    assert_eq!(found.usage_threshold_bytes, MIN_VOLUME_SIZE_BYTES);
    assert_eq!(found.service_level, ServiceLevel::Premium);
    assert_eq!(client.create_calls(&volume_path().to_string()), 1);
}

#[tokio::test]
async fn ensure_pool_propagates_missing_parent() {
    let client = FakeClient::new();
    let provisioner = Provisioner::new(&client);

    let error = provisioner
        .ensure_pool(&source_pool_path(), &pool_spec(ServiceLevel::Premium))
        .await
        .expect_err("account does not exist");
    assert!(matches!(error, FakeError::MissingParent(_)));
}

#[tokio::test]
async fn lookup_absence_is_not_an_error() {
    let client = FakeClient::new();
    let absent = client
        .get_volume(&volume_path())
        .await
        .expect("lookup should succeed");
    assert!(absent.is_none());
}
