//! Chain sources: the persisted JSON chain, the sample fallback and in-memory chains.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use time::{Duration, OffsetDateTime};
use tracing::{error, info, warn};

use crate::error::StoreError;
use crate::model::{Block, ChainOrigin, ChainSnapshot};

/// Supplies the block sequence to the engine. Loading never fails.
pub trait ChainSource: Send + Sync {
    fn load(&self) -> ChainSnapshot;
}

/// Chain persisted as a JSON array, with the sample chain as fallback.
#[derive(Debug, Clone)]
pub struct FileChainStore {
    path: PathBuf,
}

impl FileChainStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChainSource for FileChainStore {
    fn load(&self) -> ChainSnapshot {
        let now = OffsetDateTime::now_utc();
        match read_chain_file(&self.path) {
            Ok(blocks) => {
                info!(path = %self.path.display(), blocks = blocks.len(), "loaded chain");
                ChainSnapshot {
                    blocks,
                    loaded_at: now,
                    origin: ChainOrigin::File,
                }
            }
            Err(e) => {
                match &e {
                    StoreError::Missing(_) => warn!("{e}; serving sample chain"),
                    _ => error!("error loading chain: {e}; serving sample chain"),
                }
                ChainSnapshot {
                    blocks: sample_chain(now),
                    loaded_at: now,
                    origin: ChainOrigin::Sample,
                }
            }
        }
    }
}

/// Fixed chain held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticChain {
    blocks: Vec<Block>,
}

impl StaticChain {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }
}

impl ChainSource for StaticChain {
    fn load(&self) -> ChainSnapshot {
        ChainSnapshot {
            blocks: self.blocks.clone(),
            loaded_at: OffsetDateTime::now_utc(),
            origin: ChainOrigin::Memory,
        }
    }
}

/// Read a JSON array of blocks, keeping the file's order.
///
/// Only an unreadable file or a document that is not an array fails; an entry
/// that is not an object becomes an empty block in its position.
pub fn read_chain_file(path: &Path) -> Result<Vec<Block>, StoreError> {
    if !path.exists() {
        return Err(StoreError::Missing(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: Vec<Value> = serde_json::from_str(&raw).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| {
            serde_json::from_value(entry).unwrap_or_else(|e| {
                warn!(position, "malformed block entry: {e}");
                Block::default()
            })
        })
        .collect())
}

const SAMPLE_CANDIDATES: [&str; 3] = ["Candidate A", "Candidate B", "Candidate C"];
const SAMPLE_VOTES: u64 = 156;

/// Demo election: a genesis block and 156 linked votes ending one minute before `now`.
pub fn sample_chain(now: OffsetDateTime) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(SAMPLE_VOTES as usize + 1);
    blocks.push(Block {
        index: 0,
        data: "Genesis Block - Election Started".to_string(),
        prev_hash: String::new(),
        hash: "000a1b2c3d4e5f67890abc123def4567890abcdef1234567890abcdef12345".to_string(),
        timestamp: (now - Duration::hours(2)).unix_timestamp(),
        nonce: 3128,
    });

    for i in 1..=SAMPLE_VOTES {
        let candidate = SAMPLE_CANDIDATES[(i % 3) as usize];
        let digits: String = (0..60u64)
            .map(|j| char::from(b'0' + ((i * j) % 10) as u8))
            .collect();
        let prev_hash = blocks[blocks.len() - 1].hash.clone();
        blocks.push(Block {
            index: i,
            data: format!("Voter_{i:04} voted for {candidate}"),
            prev_hash,
            hash: format!("000{digits}"),
            timestamp: (now - Duration::minutes((SAMPLE_VOTES + 1 - i) as i64)).unix_timestamp(),
            nonce: 1000 + i as i64,
        });
    }
    blocks
}
