//! Wallet addresses and message signatures.
//!
//! An address is the hex encoding of an Ed25519 verifying key; a signature is
//! the hex encoding of the 64-byte Ed25519 signature over the challenge's
//! UTF-8 bytes.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;

/// Checks that `signature` over `message` was produced by the key behind
/// `address`.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, message: &str, address: &str, signature: &str) -> bool;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, message: &str, address: &str, signature: &str) -> bool {
        let Some(key) = decode_array::<32>(address) else {
            return false;
        };
        let Some(sig) = decode_array::<64>(signature) else {
            return false;
        };
        let Ok(key) = VerifyingKey::from_bytes(&key) else {
            return false;
        };
        key.verify(message.as_bytes(), &Signature::from_bytes(&sig))
            .is_ok()
    }
}

/// A local signing key, used by clients to answer challenges.
pub struct Wallet {
    key: SigningKey,
}

impl Wallet {
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_secret_hex(secret: &str) -> Result<Self, hex::FromHexError> {
        let bytes = decode_array::<32>(secret).ok_or(hex::FromHexError::InvalidStringLength)?;
        Ok(Self {
            key: SigningKey::from_bytes(&bytes),
        })
    }

    pub fn secret_hex(&self) -> String {
        hex::encode(self.key.to_bytes())
    }

    pub fn address(&self) -> String {
        hex::encode(self.key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &str) -> String {
        hex::encode(self.key.sign(message.as_bytes()).to_bytes())
    }
}

fn decode_array<const N: usize>(s: &str) -> Option<[u8; N]> {
    hex::decode(s).ok()?.try_into().ok()
}
