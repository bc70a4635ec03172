//! Vote tallies, chain integrity and participation figures.

use std::collections::BTreeMap;

use time::{macros::format_description, Duration, OffsetDateTime};
use tracing::debug;

use crate::config::TallyConfig;
use crate::model::{Block, CandidateResult, Statistics, VoteRecord, VotingPeriod};

/// `remaining` label shown while no voting window is configured.
pub const DEMO_REMAINING: &str = "12h 24m";

/// Aggregate `blocks` with the default policy at the current time.
pub fn aggregate(blocks: &[Block]) -> Statistics {
    aggregate_at(blocks, OffsetDateTime::now_utc(), &TallyConfig::default())
}

/// Aggregate `blocks` as of `now` under `policy`.
pub fn aggregate_at(blocks: &[Block], now: OffsetDateTime, policy: &TallyConfig) -> Statistics {
    if blocks.is_empty() {
        return Statistics::default();
    }

    let mut total_votes = 0u64;
    let mut verified_blocks = 0usize;
    let mut tally: BTreeMap<String, u64> = BTreeMap::new();

    for block in blocks {
        if block.has_valid_pow() {
            verified_blocks += 1;
        }
        if let Some(vote) = VoteRecord::parse(&block.data) {
            total_votes += 1;
            *tally.entry(vote.candidate).or_default() += 1;
        }
    }

    let candidate_results = tally
        .into_iter()
        .map(|(name, count)| {
            let result = CandidateResult {
                count,
                percentage: percent(count, total_votes),
            };
            (name, result)
        })
        .collect();

    let stats = Statistics {
        total_blocks: blocks.len(),
        total_votes,
        verified_blocks,
        chain_integrity: percent(verified_blocks as u64, blocks.len() as u64),
        candidate_results,
        participation_rate: participation(total_votes, policy),
        latest_block: blocks.last().cloned(),
        voting_period: Some(voting_period(now, policy)),
    };
    debug!(
        blocks = stats.total_blocks,
        votes = stats.total_votes,
        integrity = stats.chain_integrity,
        "statistics aggregated"
    );
    stats
}

/// `part / whole` as a whole percentage, rounded half up and clamped to 100.
///
/// Returns 0 when `whole` is 0.
pub fn percent(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = u128::from(part);
    let whole = u128::from(whole);
    let rounded = (part * 200 + whole) / (whole * 2);
    rounded.min(100) as u8
}

/// Votes against the voter roll when known, else the capped legacy figure.
pub fn participation(total_votes: u64, policy: &TallyConfig) -> u64 {
    match policy.eligible_voters {
        Some(eligible) if eligible > 0 => u64::from(percent(total_votes, eligible)),
        _ => total_votes.min(policy.participation_cap),
    }
}

/// Display window of the election.
///
/// Uses the configured bounds when both are set; otherwise a fixed demo
/// window around `now`.
pub fn voting_period(now: OffsetDateTime, policy: &TallyConfig) -> VotingPeriod {
    let configured = match (policy.voting_start, policy.voting_end) {
        (Some(start), Some(end)) => OffsetDateTime::from_unix_timestamp(start)
            .ok()
            .zip(OffsetDateTime::from_unix_timestamp(end).ok()),
        _ => None,
    };

    match configured {
        Some((start, end)) => VotingPeriod {
            start: period_label(start),
            end: period_label(end),
            remaining: remaining_label(end - now),
        },
        None => VotingPeriod {
            start: period_label(now - Duration::hours(2)),
            end: period_label(now + Duration::hours(12)),
            remaining: DEMO_REMAINING.to_string(),
        },
    }
}

fn period_label(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[month repr:short] [day], [year] [hour repr:12]:[minute] [period]"
    ))
    .unwrap_or_default()
}

fn remaining_label(left: Duration) -> String {
    if left <= Duration::ZERO {
        return "closed".to_string();
    }
    format!("{}h {}m", left.whole_hours(), left.whole_minutes() % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2026-10-18 09:15:00 UTC);

    fn chain(payloads: &[(&str, &str)]) -> Vec<Block> {
        payloads
            .iter()
            .enumerate()
            .map(|(i, (data, hash))| Block {
                index: i as u64,
                data: data.to_string(),
                hash: hash.to_string(),
                ..Block::default()
            })
            .collect()
    }

    #[test]
    fn empty_chain_yields_zeroed_statistics() {
        let stats = aggregate_at(&[], NOW, &TallyConfig::default());
        assert_eq!(stats, Statistics::default());
        assert_eq!(stats.total_blocks, 0);
        assert!(stats.candidate_results.is_empty());
        assert!(stats.latest_block.is_none());
        assert!(stats.voting_period.is_none());
    }

    #[test]
    fn tallies_votes_per_candidate() {
        let blocks = chain(&[
            ("Genesis Block - Election Started", "000g"),
            ("Voter_0001 voted for Candidate A", "000a"),
            ("Voter_0002 voted for Candidate B", "000b"),
            ("Voter_0003 voted for Candidate A", "bad"),
        ]);
        let stats = aggregate_at(&blocks, NOW, &TallyConfig::default());
        assert_eq!(stats.total_blocks, 4);
        assert_eq!(stats.total_votes, 3);
        assert_eq!(stats.verified_blocks, 3);
        assert_eq!(stats.chain_integrity, 75);
        assert_eq!(
            stats.candidate_results["Candidate A"],
            CandidateResult { count: 2, percentage: 67 }
        );
        assert_eq!(
            stats.candidate_results["Candidate B"],
            CandidateResult { count: 1, percentage: 33 }
        );
        assert_eq!(stats.latest_block.as_ref().map(|b| b.index), Some(3));
    }

    #[test]
    fn tally_is_conserved() {
        let blocks = chain(&[
            ("a voted for X", "000"),
            ("b voted for   ", "000"),
            ("c voted for Y", "000"),
            ("no vote here", "000"),
            ("d voted for X", "000"),
        ]);
        let stats = aggregate_at(&blocks, NOW, &TallyConfig::default());
        let summed: u64 = stats.candidate_results.values().map(|r| r.count).sum();
        assert_eq!(summed, stats.total_votes);
        assert_eq!(stats.total_votes, 4);
        assert_eq!(stats.candidate_results[""].count, 1);
    }

    #[test]
    fn verified_count_agrees_with_verification() {
        let blocks = chain(&[
            ("g", "000"),
            ("a voted for X", "00"),
            ("b voted for X", "0001"),
            ("c voted for Y", ""),
        ]);
        let stats = aggregate_at(&blocks, NOW, &TallyConfig::default());
        let report = crate::verify::verify_at(&blocks, NOW);
        let pow_clean = report
            .blocks
            .iter()
            .filter(|f| !f.issues.contains(&crate::model::IssueCode::InvalidProofOfWork))
            .count();
        assert_eq!(stats.verified_blocks, pow_clean);
        assert_eq!(stats.verified_blocks, 2);
    }

    #[test]
    fn no_votes_means_no_candidates() {
        let blocks = chain(&[("Genesis", "000")]);
        let stats = aggregate_at(&blocks, NOW, &TallyConfig::default());
        assert_eq!(stats.total_votes, 0);
        assert!(stats.candidate_results.is_empty());
        assert_eq!(stats.chain_integrity, 100);
        assert_eq!(stats.participation_rate, 0);
    }

    #[test]
    fn percentages_round_half_up_within_bounds() {
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(1, 200), 1);
        assert_eq!(percent(1, 201), 0);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(5, 5), 100);
        assert_eq!(percent(9, 5), 100);
        assert_eq!(percent(3, 0), 0);
        assert_eq!(percent(u64::MAX, u64::MAX), 100);
    }

    #[test]
    fn participation_follows_policy() {
        let legacy = TallyConfig::default();
        assert_eq!(participation(40, &legacy), 40);
        assert_eq!(participation(156, &legacy), 89);

        let roll = TallyConfig {
            eligible_voters: Some(200),
            ..TallyConfig::default()
        };
        assert_eq!(participation(156, &roll), 78);
        assert_eq!(participation(500, &roll), 100);
    }

    #[test]
    fn demo_voting_period_is_anchored_on_now() {
        let period = voting_period(NOW, &TallyConfig::default());
        assert_eq!(period.start, "Oct 18, 2026 07:15 AM");
        assert_eq!(period.end, "Oct 18, 2026 09:15 PM");
        assert_eq!(period.remaining, DEMO_REMAINING);
    }

    #[test]
    fn configured_voting_period_counts_down() {
        let start = NOW - Duration::hours(1);
        let end = NOW + Duration::hours(3) + Duration::minutes(20);
        let policy = TallyConfig {
            voting_start: Some(start.unix_timestamp()),
            voting_end: Some(end.unix_timestamp()),
            ..TallyConfig::default()
        };
        let period = voting_period(NOW, &policy);
        assert_eq!(period.start, "Oct 18, 2026 08:15 AM");
        assert_eq!(period.end, "Oct 18, 2026 12:35 PM");
        assert_eq!(period.remaining, "3h 20m");

        let after = voting_period(end + Duration::minutes(1), &policy);
        assert_eq!(after.remaining, "closed");
    }
}
