use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::Result;
use crate::pattern::PatternInference;

/// Thresholds applied to rules inferred on the fly during a sweep.
#[derive(Debug, Clone, Copy)]
pub struct RuleDefaults {
    pub min_files: u64,
    pub max_files: u64,
    pub oldest_file: DateTime<Utc>,
}

/// Retention policy plus running match counter for one filename pattern
/// within one directory.
#[derive(Debug, Clone)]
pub struct RetentionRule {
    pattern: Regex,
    /// Matching files that must already have been seen (newest first)
    /// before age-based deletion applies.
    pub min_file_count: u64,
    /// Once the match count reaches this, matching files are deleted
    /// regardless of age.
    pub max_file_count: u64,
    /// Files strictly older than this are age-eligible.
    pub oldest_file: DateTime<Utc>,
    number_matched: u64,
}

impl RetentionRule {
    pub fn new(
        pattern: Regex,
        min_file_count: u64,
        max_file_count: u64,
        oldest_file: DateTime<Utc>,
        seed_count: u64,
    ) -> Self {
        Self {
            pattern,
            min_file_count,
            max_file_count,
            oldest_file,
            number_matched: seed_count,
        }
    }

    fn from_defaults(pattern: Regex, defaults: &RuleDefaults, seed_count: u64) -> Self {
        Self::new(
            pattern,
            defaults.min_files,
            defaults.max_files,
            defaults.oldest_file,
            seed_count,
        )
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.is_match(file_name)
    }

    /// How many files have matched this rule so far, in recency order.
    pub fn number_matched(&self) -> u64 {
        self.number_matched
    }

    /// Count one more matched file. The counter never decreases within a
    /// sweep.
    pub fn record_match(&mut self) {
        self.number_matched += 1;
    }

    pub fn pattern_str(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Directory path to ordered retention rules. The first matching rule wins,
/// so insertion order is significant.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: HashMap<PathBuf, Vec<RetentionRule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an explicitly configured rule for a directory.
    pub fn add_rule(&mut self, directory: &Path, rule: RetentionRule) {
        self.rules
            .entry(directory.to_path_buf())
            .or_default()
            .push(rule);
    }

    /// Find the first rule matching `file_name` in `directory`, or infer a
    /// new one from the filename and append it.
    ///
    /// A freshly created rule is seeded with `number_matched = 1`: the file
    /// it was inferred from counts as its own first match. The flag is true
    /// when the rule was created; for an existing rule the caller increments
    /// the counter itself.
    pub fn find_or_create(
        &mut self,
        directory: &Path,
        file_name: &str,
        extension: &str,
        defaults: &RuleDefaults,
        inference: &dyn PatternInference,
    ) -> Result<(&mut RetentionRule, bool)> {
        let rules = self.rules.entry(directory.to_path_buf()).or_default();

        let (index, created) = match rules.iter().position(|r| r.matches(file_name)) {
            Some(index) => (index, false),
            None => {
                let pattern = inference.infer(file_name, extension)?;
                rules.push(RetentionRule::from_defaults(pattern, defaults, 1));
                (rules.len() - 1, true)
            }
        };

        Ok((&mut rules[index], created))
    }

    pub fn contains(&self, directory: &Path) -> bool {
        self.rules.contains_key(directory)
    }

    pub fn rules_for(&self, directory: &Path) -> Option<&[RetentionRule]> {
        self.rules.get(directory).map(Vec::as_slice)
    }

    /// Forget everything known about one directory (low-memory mode).
    pub fn drop_directory(&mut self, directory: &Path) {
        self.rules.remove(directory);
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
