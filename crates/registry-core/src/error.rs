//! Error types for the registry core.

use thiserror::Error;

/// Reasons a star claim submission is rejected.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("invalid address {0:?}: must be non-empty and contain no ':'")]
    InvalidAddress(String),

    #[error("malformed challenge message: {0}")]
    MalformedMessage(String),

    #[error("address mismatch: challenge was issued for {expected}, claimed by {claimed}")]
    AddressMismatch { expected: String, claimed: String },

    #[error("invalid challenge timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("challenge expired: {elapsed}s elapsed, window is {window}s")]
    ChallengeExpired { elapsed: i64, window: i64 },

    #[error("signature verification failed")]
    SignatureInvalid,

    #[error("invalid star payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Commit(#[from] CommitError),
}

/// Failures while appending a block.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("payload encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("storage write failed: {0}")]
    Storage(#[source] anyhow::Error),
}

/// Failures while rebuilding the chain from a persistence sink.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("storage read failed: {0}")]
    Storage(#[source] anyhow::Error),

    #[error("block at position {position} claims height {height}")]
    HeightMismatch { position: u64, height: u64 },

    #[error("block #{0} does not match its stored hash")]
    HashMismatch(u64),

    #[error("block #{0} does not link to its predecessor")]
    BrokenLink(u64),

    #[error(transparent)]
    Commit(#[from] CommitError),
}

/// Failures while decoding a block body.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("body is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("body is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}
