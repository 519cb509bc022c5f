use std::sync::Arc;

use registry_core::{Ed25519Verifier, LoadError, ManualClock, Registry, Star, Wallet};
use registry_storage::SledStore;
use tempfile::{tempdir, TempDir};

pub const T0: i64 = 1_700_000_000;

pub fn create_temp_store() -> (TempDir, SledStore) {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let store = SledStore::open(temp_dir.path()).expect("Failed to open SledStore");
    (temp_dir, store)
}

pub fn open_registry(store: SledStore) -> Result<Registry<SledStore>, LoadError> {
    Registry::open(store, Arc::new(Ed25519Verifier), Arc::new(ManualClock::new(T0)))
}

pub fn register(registry: &Registry<SledStore>, wallet: &Wallet, story: &str) {
    let message = registry
        .request_challenge(&wallet.address())
        .expect("challenge should be issued");
    registry
        .submit_claim(
            &wallet.address(),
            &message,
            &wallet.sign(&message),
            Star::with_story(story),
        )
        .expect("claim should be accepted");
}
