use chrono::{DateTime, Utc};

use crate::rules::RetentionRule;

/// Decide whether a file should be swept under `rule`. Pure, no side
/// effects.
///
/// A file strictly older than the rule's age threshold is removed once at
/// least `min_file_count` matching files have been seen; a file written
/// exactly at `oldest_file` is kept. Independent of age, the file is
/// removed once the match count has reached `max_file_count`.
pub fn should_delete(rule: &RetentionRule, last_write: DateTime<Utc>) -> bool {
    if last_write < rule.oldest_file && rule.number_matched() >= rule.min_file_count {
        return true;
    }
    rule.number_matched() >= rule.max_file_count
}
