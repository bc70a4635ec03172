//! Chain verification: proof-of-work prefix and hash linkage per block.

use time::{macros::format_description, OffsetDateTime};
use tracing::debug;

use crate::error::LookupError;
use crate::model::{Block, Finding, IssueCode, VerificationResult};

/// Characters of the hash kept in a finding before the ellipsis.
pub const DISPLAY_HASH_LEN: usize = 32;

/// Verify `blocks` against the current time.
pub fn verify(blocks: &[Block]) -> VerificationResult {
    verify_at(blocks, OffsetDateTime::now_utc())
}

/// Verify `blocks`, stamping the report with `now`.
///
/// The first block is exempt from the linkage check and its `prevHash` is
/// never inspected. Input order is trusted; nothing is reordered.
pub fn verify_at(blocks: &[Block], now: OffsetDateTime) -> VerificationResult {
    let mut findings = Vec::with_capacity(blocks.len());
    let mut valid = true;

    for (i, block) in blocks.iter().enumerate() {
        let mut issues = vec![];

        if !block.has_valid_pow() {
            issues.push(IssueCode::InvalidProofOfWork);
        }

        if i > 0 && block.prev_hash != blocks[i - 1].hash {
            issues.push(IssueCode::BrokenChainLink);
        }

        let block_valid = issues.is_empty();
        valid &= block_valid;
        findings.push(Finding {
            position: i,
            block_index: block.index,
            valid: block_valid,
            issues,
            hash: display_hash(&block.hash),
        });
    }

    let result = VerificationResult {
        valid,
        total_blocks: blocks.len(),
        blocks: findings,
        audit_id: audit_id(now),
    };
    debug!(
        audit_id = %result.audit_id,
        valid = result.valid,
        total = result.total_blocks,
        "chain verified"
    );
    result
}

/// First [`DISPLAY_HASH_LEN`] characters plus `...`, or the whole hash if shorter.
pub fn display_hash(hash: &str) -> String {
    match hash.char_indices().nth(DISPLAY_HASH_LEN) {
        Some((cut, _)) => format!("{}...", &hash[..cut]),
        None => hash.to_string(),
    }
}

/// Audit label derived from the verification time, e.g. `audit_report_20261018_091500`.
pub fn audit_id(now: OffsetDateTime) -> String {
    format!("audit_report_{}", file_stamp(now))
}

/// `YYYYMMDD_HHMMSS` stamp used in report and export names.
pub fn file_stamp(now: OffsetDateTime) -> String {
    // Numeric components only, which always format.
    now.format(format_description!("[year][month][day]_[hour][minute][second]"))
        .unwrap_or_default()
}

/// Block at array position `index`.
pub fn get_block(blocks: &[Block], index: usize) -> Result<&Block, LookupError> {
    blocks.get(index).ok_or(LookupError::NotFound {
        index,
        len: blocks.len(),
    })
}
