use anyhow::{Context, Result};
use registry_core::{Block, ChainStore};
use sled::{Db, IVec};
use std::path::Path;
use tracing::{debug, info};

const TREE_BLOCKS: &str = "blocks";

/// Blocks keyed by big-endian height, so iteration order is chain order.
#[derive(Clone)]
pub struct SledStore {
    db: Db,
    blocks: sled::Tree,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref())
            .with_context(|| format!("open sled at {}", path.as_ref().display()))?;
        let blocks = db.open_tree(TREE_BLOCKS)?;
        info!("sled store opened with {} blocks", blocks.len());
        Ok(Self { db, blocks })
    }

    pub fn get_block(&self, height: u64) -> Result<Option<Block>> {
        self.blocks
            .get(height.to_be_bytes())?
            .map(|ivec: IVec| decode(height, &ivec))
            .transpose()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Writes `block`, then runs `flush`. If the flush fails the tree is put
    /// back the way it was, so a block whose commit was refused can never
    /// reappear on reload.
    fn insert_durably(&self, block: &Block, flush: impl FnOnce() -> Result<()>) -> Result<()> {
        let key = block.height.to_be_bytes();
        let bytes = bincode::serialize(block)?;
        let previous = self.blocks.insert(key, bytes)?;
        if let Err(e) = flush() {
            match previous {
                Some(old) => drop(self.blocks.insert(key, old)?),
                None => drop(self.blocks.remove(key)?),
            }
            return Err(e.context(format!("flush of block #{} failed", block.height)));
        }
        debug!("persisted block #{}", block.height);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.blocks.clear()?;
        self.db.flush()?;
        Ok(())
    }
}

fn decode(height: u64, bytes: &[u8]) -> Result<Block> {
    bincode::deserialize(bytes).with_context(|| format!("decode block #{height}"))
}

impl ChainStore for SledStore {
    fn put_block(&self, block: &Block) -> Result<()> {
        self.insert_durably(block, || {
            self.db.flush()?;
            Ok(())
        })
    }

    fn load_blocks(&self) -> Result<Vec<Block>> {
        self.blocks
            .iter()
            .map(|entry| {
                let (key, value) = entry?;
                let key: [u8; 8] = key
                    .as_ref()
                    .try_into()
                    .context("block key is not a u64 height")?;
                decode(u64::from_be_bytes(key), &value)
            })
            .collect()
    }

    fn close(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}
