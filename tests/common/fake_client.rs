//! In-memory storage client double for workflow tests.
//!
//! Models the management plane as three keyed maps with the behaviours the
//! workflow depends on: parent resources must exist before children are
//! created, non-empty parents refuse deletion, pool change rehomes a volume
//! under the target pool, and deleted resources can be made to linger in
//! the read path for a configurable number of polls to exercise the
//! deletion confirmer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use sluice::{
    Account, AccountPath, AccountSpec, ClientFuture, Pool, PoolPath, PoolSpec, StorageClient,
    Volume, VolumePath, VolumeSpec,
};
use thiserror::Error;

/// Errors raised by the fake client.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum FakeError {
    #[error("parent of {0} does not exist")]
    MissingParent(String),
    #[error("{0} is not empty")]
    NotEmpty(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("injected failure for {0}")]
    Injected(String),
    #[error("transient lookup failure")]
    Transient,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<String, Account>,
    pools: HashMap<String, Pool>,
    volumes: HashMap<String, Volume>,
    ghost_accounts: HashMap<String, u32>,
    ghost_pools: HashMap<String, u32>,
    ghost_volumes: HashMap<String, u32>,
    create_calls: HashMap<String, u32>,
    fail_creates: Vec<String>,
    fail_deletes: Vec<String>,
    indestructible: Vec<String>,
    transient_get_failures: u32,
    linger_cycles: u32,
}

impl State {
    fn note_create(&mut self, key: &str) {
        *self.create_calls.entry(key.to_owned()).or_insert(0) += 1;
    }

    fn check_injected_create(&self, key: &str) -> Result<(), FakeError> {
        if self.fail_creates.iter().any(|k| k == key) {
            return Err(FakeError::Injected(key.to_owned()));
        }
        Ok(())
    }

    fn check_injected_delete(&self, key: &str) -> Result<(), FakeError> {
        if self.fail_deletes.iter().any(|k| k == key) {
            return Err(FakeError::Injected(key.to_owned()));
        }
        Ok(())
    }

    fn take_transient(&mut self) -> Result<(), FakeError> {
        if self.transient_get_failures > 0 {
            self.transient_get_failures -= 1;
            return Err(FakeError::Transient);
        }
        Ok(())
    }

    /// A ghost entry keeps a deleted resource visible for the configured
    /// number of lookups, imitating the management plane's read-path lag.
    fn ghost_visible(ghosts: &mut HashMap<String, u32>, key: &str) -> bool {
        match ghosts.get_mut(key) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            Some(_) => {
                ghosts.remove(key);
                false
            }
            None => false,
        }
    }
}

/// Scripted in-memory management plane.
#[derive(Clone, Debug, Default)]
pub struct FakeClient {
    state: Arc<Mutex<State>>,
}

fn fake_id(key: &str) -> String {
    format!("/fake/{key}")
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|err| panic!("fake client lock poisoned: {err}"))
    }

    /// Number of creation calls issued for the given path.
    pub fn create_calls(&self, path: &str) -> u32 {
        self.lock().create_calls.get(path).copied().unwrap_or(0)
    }

    /// Makes the next creation of `path` fail.
    pub fn fail_create(&self, path: &str) {
        self.lock().fail_creates.push(path.to_owned());
    }

    /// Makes deletion requests for `path` fail.
    pub fn fail_delete(&self, path: &str) {
        self.lock().fail_deletes.push(path.to_owned());
    }

    /// Deleted resources stay visible for this many lookups.
    pub fn set_linger_cycles(&self, cycles: u32) {
        self.lock().linger_cycles = cycles;
    }

    /// Deletion of `path` is accepted but the resource never disappears.
    pub fn make_indestructible(&self, path: &str) {
        self.lock().indestructible.push(path.to_owned());
    }

    /// The next `count` lookups fail with a transient error.
    pub fn fail_next_gets(&self, count: u32) {
        self.lock().transient_get_failures = count;
    }

    /// Whether any live resource exists at the given path.
    pub fn contains(&self, path: &str) -> bool {
        let state = self.lock();
        state.accounts.contains_key(path)
            || state.pools.contains_key(path)
            || state.volumes.contains_key(path)
    }

    fn insert_account(&self, path: &AccountPath, spec: &AccountSpec) -> Result<Account, FakeError> {
        let key = path.to_string();
        let mut state = self.lock();
        state.check_injected_create(&key)?;
        state.note_create(&key);
        let record = Account {
            id: fake_id(&key),
            name: path.account().to_owned(),
            location: spec.location.clone(),
        };
        state.accounts.insert(key, record.clone());
        Ok(record)
    }

    fn insert_pool(&self, path: &PoolPath, spec: &PoolSpec) -> Result<Pool, FakeError> {
        let key = path.to_string();
        let mut state = self.lock();
        state.check_injected_create(&key)?;
        if !state.accounts.contains_key(&path.account().to_string()) {
            return Err(FakeError::MissingParent(key));
        }
        state.note_create(&key);
        let record = Pool {
            id: fake_id(&key),
            name: path.pool().to_owned(),
            location: spec.location.clone(),
            service_level: spec.service_level,
            size_bytes: spec.size_bytes,
        };
        state.pools.insert(key, record.clone());
        Ok(record)
    }

    fn insert_volume(&self, path: &VolumePath, spec: &VolumeSpec) -> Result<Volume, FakeError> {
        let key = path.to_string();
        let mut state = self.lock();
        state.check_injected_create(&key)?;
        if !state.pools.contains_key(&path.pool().to_string()) {
            return Err(FakeError::MissingParent(key));
        }
        state.note_create(&key);
        let record = Volume {
            id: fake_id(&key),
            name: path.volume().to_owned(),
            location: spec.location.clone(),
            service_level: spec.service_level,
            creation_token: spec.creation_token.clone(),
            usage_threshold_bytes: spec.usage_threshold_bytes,
        };
        state.volumes.insert(key, record.clone());
        Ok(record)
    }

    fn remove_account(&self, path: &AccountPath) -> Result<(), FakeError> {
        let key = path.to_string();
        let mut state = self.lock();
        state.check_injected_delete(&key)?;
        let child_prefix = format!("{key}/");
        if state.pools.keys().any(|pool| pool.starts_with(&child_prefix)) {
            return Err(FakeError::NotEmpty(key));
        }
        if state.indestructible.iter().any(|k| k == &key) {
            return Ok(());
        }
        if state.accounts.remove(&key).is_none() {
            return Err(FakeError::NotFound(key));
        }
        let cycles = state.linger_cycles;
        if cycles > 0 {
            state.ghost_accounts.insert(key, cycles);
        }
        Ok(())
    }

    fn remove_pool(&self, path: &PoolPath) -> Result<(), FakeError> {
        let key = path.to_string();
        let mut state = self.lock();
        state.check_injected_delete(&key)?;
        let child_prefix = format!("{key}/");
        if state
            .volumes
            .keys()
            .any(|volume| volume.starts_with(&child_prefix))
        {
            return Err(FakeError::NotEmpty(key));
        }
        if state.indestructible.iter().any(|k| k == &key) {
            return Ok(());
        }
        if state.pools.remove(&key).is_none() {
            return Err(FakeError::NotFound(key));
        }
        let cycles = state.linger_cycles;
        if cycles > 0 {
            state.ghost_pools.insert(key, cycles);
        }
        Ok(())
    }

    fn remove_volume(&self, path: &VolumePath) -> Result<(), FakeError> {
        let key = path.to_string();
        let mut state = self.lock();
        state.check_injected_delete(&key)?;
        if state.indestructible.iter().any(|k| k == &key) {
            return Ok(());
        }
        if state.volumes.remove(&key).is_none() {
            return Err(FakeError::NotFound(key));
        }
        let cycles = state.linger_cycles;
        if cycles > 0 {
            state.ghost_volumes.insert(key, cycles);
        }
        Ok(())
    }

    fn move_volume(&self, path: &VolumePath, target_pool_id: &str) -> Result<(), FakeError> {
        let mut state = self.lock();
        let target_key = state
            .pools
            .iter()
            .find(|(_, pool)| pool.id == target_pool_id)
            .map(|(key, _)| key.clone())
            .ok_or_else(|| FakeError::NotFound(target_pool_id.to_owned()))?;
        let target_level = state
            .pools
            .get(&target_key)
            .map(|pool| pool.service_level)
            .ok_or_else(|| FakeError::NotFound(target_pool_id.to_owned()))?;

        let key = path.to_string();
        let mut volume = state
            .volumes
            .remove(&key)
            .ok_or(FakeError::NotFound(key))?;

        let new_key = format!("{target_key}/{}", path.volume());
        volume.id = fake_id(&new_key);
        volume.service_level = target_level;
        state.volumes.insert(new_key, volume);
        Ok(())
    }
}

impl StorageClient for FakeClient {
    type Error = FakeError;

    fn get_account<'a>(
        &'a self,
        path: &'a AccountPath,
    ) -> ClientFuture<'a, Option<Account>, FakeError> {
        Box::pin(async move {
            let mut state = self.lock();
            state.take_transient()?;
            let key = path.to_string();
            if let Some(found) = state.accounts.get(&key) {
                return Ok(Some(found.clone()));
            }
            if State::ghost_visible(&mut state.ghost_accounts, &key) {
                return Ok(Some(Account {
                    id: fake_id(&key),
                    name: path.account().to_owned(),
                    location: String::from("ghost"),
                }));
            }
            Ok(None)
        })
    }

    fn get_pool<'a>(&'a self, path: &'a PoolPath) -> ClientFuture<'a, Option<Pool>, FakeError> {
        Box::pin(async move {
            let mut state = self.lock();
            state.take_transient()?;
            let key = path.to_string();
            if let Some(found) = state.pools.get(&key) {
                return Ok(Some(found.clone()));
            }
            if State::ghost_visible(&mut state.ghost_pools, &key) {
                return Ok(Some(Pool {
                    id: fake_id(&key),
                    name: path.pool().to_owned(),
                    location: String::from("ghost"),
                    service_level: sluice::ServiceLevel::Standard,
                    size_bytes: 0,
                }));
            }
            Ok(None)
        })
    }

    fn get_volume<'a>(
        &'a self,
        path: &'a VolumePath,
    ) -> ClientFuture<'a, Option<Volume>, FakeError> {
        Box::pin(async move {
            let mut state = self.lock();
            state.take_transient()?;
            let key = path.to_string();
            if let Some(found) = state.volumes.get(&key) {
                return Ok(Some(found.clone()));
            }
            if State::ghost_visible(&mut state.ghost_volumes, &key) {
                return Ok(Some(Volume {
                    id: fake_id(&key),
                    name: path.volume().to_owned(),
                    location: String::from("ghost"),
                    service_level: sluice::ServiceLevel::Standard,
                    creation_token: path.volume().to_owned(),
                    usage_threshold_bytes: 0,
                }));
            }
            Ok(None)
        })
    }

    fn create_account<'a>(
        &'a self,
        path: &'a AccountPath,
        spec: &'a AccountSpec,
    ) -> ClientFuture<'a, Account, FakeError> {
        Box::pin(async move { self.insert_account(path, spec) })
    }

    fn create_pool<'a>(
        &'a self,
        path: &'a PoolPath,
        spec: &'a PoolSpec,
    ) -> ClientFuture<'a, Pool, FakeError> {
        Box::pin(async move { self.insert_pool(path, spec) })
    }

    fn create_volume<'a>(
        &'a self,
        path: &'a VolumePath,
        spec: &'a VolumeSpec,
    ) -> ClientFuture<'a, Volume, FakeError> {
        Box::pin(async move { self.insert_volume(path, spec) })
    }

    fn delete_account<'a>(&'a self, path: &'a AccountPath) -> ClientFuture<'a, (), FakeError> {
        Box::pin(async move { self.remove_account(path) })
    }

    fn delete_pool<'a>(&'a self, path: &'a PoolPath) -> ClientFuture<'a, (), FakeError> {
        Box::pin(async move { self.remove_pool(path) })
    }

    fn delete_volume<'a>(&'a self, path: &'a VolumePath) -> ClientFuture<'a, (), FakeError> {
        Box::pin(async move { self.remove_volume(path) })
    }

    fn change_pool<'a>(
        &'a self,
        path: &'a VolumePath,
        target_pool_id: &'a str,
    ) -> ClientFuture<'a, (), FakeError> {
        Box::pin(async move { self.move_volume(path, target_pool_id) })
    }
}
