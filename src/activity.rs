//! Recent-activity feed over the tail of the chain.

use time::{macros::format_description, Duration, OffsetDateTime};

use crate::config::ActivityConfig;
use crate::model::{ActivityEntry, ActivityStatus, Block};

/// Recent entries with the default scan depth at the current time.
pub fn recent_activity(
    blocks: &[Block],
    window_minutes: i64,
    max_results: usize,
) -> Vec<ActivityEntry> {
    let bounds = ActivityConfig {
        window_minutes,
        max_results,
        ..ActivityConfig::default()
    };
    recent_activity_at(blocks, OffsetDateTime::now_utc(), &bounds)
}

/// Blocks among the last `scan_depth` whose timestamp is at most
/// `window_minutes` before `now`, keeping the last `max_results` in chain order.
///
/// Timestamps after `now` count as recent. A window reaching past the
/// representable time range has no lower bound.
pub fn recent_activity_at(
    blocks: &[Block],
    now: OffsetDateTime,
    bounds: &ActivityConfig,
) -> Vec<ActivityEntry> {
    let cutoff = bounds
        .window_minutes
        .checked_mul(60)
        .and_then(|secs| now.checked_sub(Duration::seconds(secs)));
    let tail = &blocks[blocks.len().saturating_sub(bounds.scan_depth)..];

    let recent: Vec<ActivityEntry> = tail
        .iter()
        .filter_map(|block| {
            let at = block_time(block);
            cutoff.map_or(true, |cutoff| at >= cutoff).then(|| ActivityEntry {
                index: block.index,
                time: time_label(at),
                status: if block.has_valid_pow() {
                    ActivityStatus::Verified
                } else {
                    ActivityStatus::Pending
                },
            })
        })
        .collect();

    let skip = recent.len().saturating_sub(bounds.max_results);
    recent.into_iter().skip(skip).collect()
}

/// Creation time of a block; out-of-range timestamps fall back to the epoch.
fn block_time(block: &Block) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(block.timestamp).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

fn time_label(at: OffsetDateTime) -> String {
    at.format(format_description!("[hour repr:12]:[minute] [period]"))
        .unwrap_or_default()
}
