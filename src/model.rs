//! Data model for vote blocks and the reports derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// Leading characters a block hash must carry to count as proof-of-work valid.
pub const DIFFICULTY_PREFIX: &str = "000";

/// Marker separating the voter id from the candidate in a vote payload.
pub const VOTE_MARKER: &str = "voted for";

/// One record of the chain, as emitted by the block producer.
///
/// Every field defaults when absent, null or of the wrong type, so partially
/// written records still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Block {
    /// Position of the block as claimed by the producer.
    #[serde(deserialize_with = "lenient_u64")]
    pub index: u64,
    /// Free-form payload: a genesis marker or `"<voter> voted for <candidate>"`.
    #[serde(deserialize_with = "lenient_string")]
    pub data: String,
    /// Hash of the preceding block (empty for genesis).
    #[serde(rename = "prevHash", deserialize_with = "lenient_string")]
    pub prev_hash: String,
    /// Content hash of this block.
    #[serde(deserialize_with = "lenient_string")]
    pub hash: String,
    /// Creation time, seconds since the unix epoch.
    #[serde(deserialize_with = "lenient_i64")]
    pub timestamp: i64,
    /// Value varied by the producer to satisfy the difficulty prefix.
    #[serde(deserialize_with = "lenient_i64")]
    pub nonce: i64,
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        _ => 0,
    })
}

/// Integers pass through, finite floats are truncated, anything else is 0.
fn lenient_i64<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0),
        _ => 0,
    })
}

impl Block {
    /// True when the hash starts with [`DIFFICULTY_PREFIX`].
    pub fn has_valid_pow(&self) -> bool {
        has_valid_pow(&self.hash)
    }
}

/// Proof-of-work rule shared by verification, statistics and activity.
pub fn has_valid_pow(hash: &str) -> bool {
    hash.starts_with(DIFFICULTY_PREFIX)
}

/// Structured view of a vote payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRecord {
    pub voter_id: String,
    pub candidate: String,
}

impl VoteRecord {
    /// Decode the legacy `"<voter> voted for <candidate>"` payload.
    ///
    /// Returns `None` for payloads that are not votes. The split happens on the
    /// last marker; the candidate may come back empty.
    pub fn parse(data: &str) -> Option<Self> {
        let (voter, candidate) = data.rsplit_once(VOTE_MARKER)?;
        Some(Self {
            voter_id: voter.trim().to_string(),
            candidate: candidate.trim().to_string(),
        })
    }
}

/// Problem detected on a single block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    InvalidProofOfWork,
    BrokenChainLink,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::InvalidProofOfWork => "INVALID_PROOF_OF_WORK",
            IssueCode::BrokenChainLink => "BROKEN_CHAIN_LINK",
        }
    }
}

/// Per-block outcome of a verification pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Position in the supplied sequence.
    pub position: usize,
    /// The block's own `index` field.
    pub block_index: u64,
    pub valid: bool,
    pub issues: Vec<IssueCode>,
    /// Truncated hash for display.
    pub hash: String,
}

/// Result of one verification pass over a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub valid: bool,
    pub blocks: Vec<Finding>,
    pub total_blocks: usize,
    pub audit_id: String,
}

/// Tally of a single candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CandidateResult {
    pub count: u64,
    pub percentage: u8,
}

/// Display window of the election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VotingPeriod {
    pub start: String,
    pub end: String,
    pub remaining: String,
}

/// Aggregate figures over a chain. `Default` is the empty-chain value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_blocks: usize,
    pub total_votes: u64,
    pub verified_blocks: usize,
    /// Share of blocks passing the proof-of-work rule, 0..=100.
    pub chain_integrity: u8,
    pub candidate_results: BTreeMap<String, CandidateResult>,
    pub participation_rate: u64,
    pub latest_block: Option<Block>,
    pub voting_period: Option<VotingPeriod>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivityStatus {
    Verified,
    Pending,
}

/// A recently added block, as listed in the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub index: u64,
    pub time: String,
    pub status: ActivityStatus,
}

/// Where a snapshot's blocks came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainOrigin {
    File,
    Sample,
    Memory,
}

/// Blocks handed out by a chain source, stamped with the load time.
#[derive(Debug, Clone)]
pub struct ChainSnapshot {
    pub blocks: Vec<Block>,
    pub loaded_at: OffsetDateTime,
    pub origin: ChainOrigin,
}
