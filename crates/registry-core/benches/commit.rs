use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use registry_core::{Ed25519Verifier, Registry, Star, SystemClock, VolatileStore, Wallet};

fn bench_registry(c: &mut Criterion) {
    let wallet = Wallet::generate();
    let address = wallet.address();

    c.bench_function("submit_claim", |b| {
        let registry =
            Registry::open(VolatileStore, Arc::new(Ed25519Verifier), Arc::new(SystemClock))
                .unwrap();
        b.iter(|| {
            let message = registry.request_challenge(&address).unwrap();
            let signature = wallet.sign(&message);
            registry
                .submit_claim(&address, &message, &signature, Star::with_story("bench"))
                .unwrap()
        });
    });

    c.bench_function("validate_chain_1000", |b| {
        let registry =
            Registry::open(VolatileStore, Arc::new(Ed25519Verifier), Arc::new(SystemClock))
                .unwrap();
        let message = registry.request_challenge(&address).unwrap();
        let signature = wallet.sign(&message);
        for i in 0..1000 {
            registry
                .submit_claim(&address, &message, &signature, Star::with_story(format!("{i}")))
                .unwrap();
        }
        b.iter(|| registry.validate_chain());
    });
}

criterion_group!(benches, bench_registry);
criterion_main!(benches);
