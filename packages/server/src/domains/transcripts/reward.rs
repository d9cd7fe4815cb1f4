//! Reward sizing from word-diff statistics.

use super::diff::DiffStats;

/// Convert diff statistics into a credit amount in sats.
///
/// `reward = total_words * rate + total_diff_words * rate`, rounded half
/// away from zero to an integer before any persistence so repeated
/// computation from the same diff input is deterministic.
pub fn calculate_reward(stats: &DiffStats, rate: f64) -> i64 {
    let raw = stats.total_words as f64 * rate + stats.total_diff_words as f64 * rate;
    raw.round() as i64
}
