//! Integrity core of the star registry: hash-linked blocks, lookup indices,
//! the ownership challenge protocol and chain validation.

pub mod block;
pub mod chain;
pub mod clock;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod ownership;
pub mod star;
pub mod validate;

pub use block::Block;
pub use chain::{ChainStore, Registry, VolatileStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use crypto::{Ed25519Verifier, SignatureVerifier, Wallet};
pub use error::{ClaimError, CommitError, LoadError, PayloadError};
pub use star::{Star, StarClaim};
