use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::block::Block;
use crate::clock::{Clock, SystemClock};
use crate::crypto::{Ed25519Verifier, SignatureVerifier};
use crate::error::{ClaimError, CommitError, LoadError};
use crate::ownership::{challenge_message, check_address, check_window, parse_challenge};
use crate::star::{Star, StarClaim};
use crate::validate::validate_blocks;

/// Persistence sink the registry writes every committed block through.
/// This lives in `registry-core` to avoid a circular dependency.
pub trait ChainStore: Send + Sync {
    fn put_block(&self, block: &Block) -> Result<()>;
    /// Every persisted block, ordered by height.
    fn load_blocks(&self) -> Result<Vec<Block>>;
    fn close(&self) -> Result<()>;
}

impl<S: ChainStore + ?Sized> ChainStore for Box<S> {
    fn put_block(&self, block: &Block) -> Result<()> {
        (**self).put_block(block)
    }

    fn load_blocks(&self) -> Result<Vec<Block>> {
        (**self).load_blocks()
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }
}

/// Keeps nothing; the chain lives as long as the process.
#[derive(Clone, Copy, Debug, Default)]
pub struct VolatileStore;

impl ChainStore for VolatileStore {
    fn put_block(&self, _block: &Block) -> Result<()> {
        Ok(())
    }

    fn load_blocks(&self) -> Result<Vec<Block>> {
        Ok(Vec::new())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct ChainState {
    blocks: Vec<Block>,
    hash_to_height: HashMap<String, u64>,
    address_to_heights: HashMap<String, Vec<u64>>,
}

impl ChainState {
    fn push(&mut self, block: Block) {
        self.hash_to_height.insert(block.hash.clone(), block.height);
        self.blocks.push(block);
    }
}

/// The star registry: block store, both indices, and the claim protocol.
///
/// All mutation goes through one write lock, so concurrent submissions can
/// never stamp the same height. Reads share a read lock and always see the
/// store and indices in step.
pub struct Registry<S: ChainStore = VolatileStore> {
    store: S,
    verifier: Arc<dyn SignatureVerifier>,
    clock: Arc<dyn Clock>,
    state: RwLock<ChainState>,
}

impl Registry<VolatileStore> {
    /// A process-lifetime chain with Ed25519 wallets and the system clock.
    pub fn volatile() -> Result<Self, LoadError> {
        Self::open(VolatileStore, Arc::new(Ed25519Verifier), Arc::new(SystemClock))
    }
}

impl<S: ChainStore> Registry<S> {
    /// Rebuilds the chain from `store`, verifying every block, and commits
    /// the genesis block if nothing was persisted.
    pub fn open(
        store: S,
        verifier: Arc<dyn SignatureVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LoadError> {
        let blocks = store.load_blocks().map_err(LoadError::Storage)?;
        let mut state = ChainState::default();
        for (position, block) in blocks.into_iter().enumerate() {
            let position = position as u64;
            if block.height != position {
                return Err(LoadError::HeightMismatch {
                    position,
                    height: block.height,
                });
            }
            if !block.validate() {
                return Err(LoadError::HashMismatch(position));
            }
            let expected = state.blocks.last().map(|b| b.hash.as_str());
            if block.previous_block_hash.as_deref() != expected {
                return Err(LoadError::BrokenLink(position));
            }
            match block.decode_body::<StarClaim>() {
                Ok(claim) => state
                    .address_to_heights
                    .entry(claim.owner)
                    .or_default()
                    .push(block.height),
                Err(e) => debug!("block #{} carries no star claim: {e}", block.height),
            }
            state.push(block);
        }
        let loaded = state.blocks.len();

        let registry = Self {
            store,
            verifier,
            clock,
            state: RwLock::new(state),
        };
        if loaded == 0 {
            let genesis = registry.commit(&json!({}))?;
            info!("created genesis block {}", genesis.hash);
        } else {
            info!("loaded {loaded} blocks from store");
        }
        Ok(registry)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read(&self) -> RwLockReadGuard<'_, ChainState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ChainState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn height(&self) -> u64 {
        self.read().blocks.len() as u64
    }

    pub fn block_by_height(&self, height: u64) -> Option<Block> {
        let state = self.read();
        usize::try_from(height)
            .ok()
            .and_then(|h| state.blocks.get(h))
            .cloned()
    }

    pub fn block_by_hash(&self, hash: &str) -> Option<Block> {
        let state = self.read();
        let height = *state.hash_to_height.get(hash)?;
        state.blocks.get(height as usize).cloned()
    }

    /// Copy of the whole chain.
    pub fn snapshot(&self) -> Vec<Block> {
        self.read().blocks.clone()
    }

    /// Stamps and appends a block carrying `payload`.
    fn commit<T: Serialize>(&self, payload: &T) -> Result<Block, CommitError> {
        let mut state = self.write();
        self.commit_locked(&mut state, payload)
    }

    fn commit_locked<T: Serialize>(
        &self,
        state: &mut ChainState,
        payload: &T,
    ) -> Result<Block, CommitError> {
        let mut block = Block::new(payload)?;
        block.height = state.blocks.len() as u64;
        block.time = u64::try_from(self.clock.now_secs()).unwrap_or_default();
        block.previous_block_hash = state.blocks.last().map(|b| b.hash.clone());
        block.hash = block.compute_hash();

        self.store.put_block(&block).map_err(CommitError::Storage)?;
        state.push(block.clone());
        debug!("committed block #{} {}", block.height, block.hash);
        Ok(block)
    }

    /// The message `address` must sign to register a star.
    pub fn request_challenge(&self, address: &str) -> Result<String, ClaimError> {
        check_address(address)?;
        Ok(challenge_message(address, self.clock.now_secs()))
    }

    /// Verifies ownership of `address` and commits `star` on its behalf.
    pub fn submit_claim(
        &self,
        address: &str,
        message: &str,
        signature: &str,
        star: Star,
    ) -> Result<Block, ClaimError> {
        let issued = parse_challenge(message, address)?;
        check_window(self.clock.now_secs(), issued)?;
        if !self.verifier.verify(message, address, signature) {
            warn!("rejected claim from {address}: bad signature");
            return Err(ClaimError::SignatureInvalid);
        }
        star.validate().map_err(ClaimError::InvalidPayload)?;

        let claim = StarClaim {
            owner: address.to_string(),
            star,
        };
        let mut state = self.write();
        let block = self.commit_locked(&mut state, &claim)?;
        state
            .address_to_heights
            .entry(claim.owner)
            .or_default()
            .push(block.height);
        info!("registered star for {address} at block #{}", block.height);
        Ok(block)
    }

    /// Star claims owned by `address`, in commit order.
    pub fn stars_by_address(&self, address: &str) -> Vec<StarClaim> {
        let state = self.read();
        let Some(heights) = state.address_to_heights.get(address) else {
            return Vec::new();
        };
        heights
            .iter()
            .filter_map(|&h| state.blocks.get(h as usize))
            .filter_map(|block| match block.decode_body::<StarClaim>() {
                Ok(claim) => Some(claim),
                Err(e) => {
                    warn!("block #{} has an undecodable body: {e}", block.height);
                    None
                }
            })
            .collect()
    }

    /// False for a tampered block or an unknown height.
    pub fn validate_block(&self, height: u64) -> bool {
        self.block_by_height(height)
            .map(|b| b.validate())
            .unwrap_or(false)
    }

    pub fn validate_chain(&self) -> Vec<String> {
        validate_blocks(&self.read().blocks)
    }

    pub fn close(&self) -> Result<()> {
        self.store.close()
    }
}
