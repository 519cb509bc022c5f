use std::sync::Arc;

use registry_core::{
    validate::validate_blocks, ClaimError, Ed25519Verifier, ManualClock, Registry, Star,
    StarClaim, VolatileStore, Wallet,
};

const T: i64 = 1_700_000_000;

fn setup() -> (Registry, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T));
    let registry =
        Registry::open(VolatileStore, Arc::new(Ed25519Verifier), clock.clone()).unwrap();
    (registry, clock)
}

#[test]
fn register_star_then_validate() {
    let (registry, clock) = setup();
    let wallet = Wallet::generate();
    let address = wallet.address();
    let before = registry.height();

    let message = registry.request_challenge(&address).unwrap();
    assert_eq!(message, format!("{address}:{T}:starRegistry"));
    let signature = wallet.sign(&message);

    clock.advance(10);
    let star: Star = serde_json::from_str(r#"{"story":"test"}"#).unwrap();
    let block = registry
        .submit_claim(&address, &message, &signature, star.clone())
        .unwrap();

    assert_eq!(block.height, before);
    assert_eq!(registry.height(), before + 1);
    assert_eq!(block.time, (T + 10) as u64);
    assert_eq!(registry.block_by_hash(&block.hash), Some(block.clone()));
    assert!(registry.validate_chain().is_empty());

    let claim: StarClaim = block.decode_body().unwrap();
    assert_eq!(claim.owner, address);
    assert_eq!(claim.star, star);
    assert_eq!(registry.stars_by_address(&address), vec![claim]);
}

#[test]
fn challenge_reuse_within_window() {
    let (registry, clock) = setup();
    let wallet = Wallet::generate();
    let message = registry.request_challenge(&wallet.address()).unwrap();
    let signature = wallet.sign(&message);
    for story in ["a", "b", "c"] {
        clock.advance(60);
        registry
            .submit_claim(&wallet.address(), &message, &signature, Star::with_story(story))
            .unwrap();
    }
    clock.advance(120);
    let err = registry
        .submit_claim(&wallet.address(), &message, &signature, Star::with_story("d"))
        .unwrap_err();
    assert!(matches!(err, ClaimError::ChallengeExpired { elapsed: 300, .. }));
    assert_eq!(registry.stars_by_address(&wallet.address()).len(), 3);
}

#[test]
fn snapshot_tampering_is_reported() {
    let (registry, _) = setup();
    let wallet = Wallet::generate();
    for story in ["one", "two", "three"] {
        let message = registry.request_challenge(&wallet.address()).unwrap();
        registry
            .submit_claim(&wallet.address(), &message, &wallet.sign(&message), Star::with_story(story))
            .unwrap();
    }
    let mut blocks = registry.snapshot();
    assert!(validate_blocks(&blocks).is_empty());

    blocks[1].body = blocks[2].body.clone();
    blocks[3].hash = "00".repeat(32);
    assert_eq!(
        validate_blocks(&blocks),
        vec!["block #1 is invalid", "block #3 is invalid"]
    );
    assert!(registry.validate_chain().is_empty());
}
