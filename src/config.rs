use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use colored::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::colors;
use crate::error::SweepError;
use crate::rules::{RetentionRule, RuleDefaults};
use crate::{DEFAULT_MAX_FILES, DEFAULT_MIN_FILES};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Sweep passes
    #[serde(default = "default_true")]
    pub clean_root_folder: bool,
    #[serde(default = "default_true")]
    pub clean_subdirectories: bool,
    #[serde(default)]
    pub low_memory_mode: bool,

    // Defaults for rules inferred during the sweep
    #[serde(default = "default_min_files")]
    pub default_min_files: u64,
    #[serde(default = "default_max_files")]
    pub default_max_files: u64,
    /// Age cutoff in days; files older than this become delete-eligible.
    /// Absent means age never triggers, only the max count does.
    #[serde(default)]
    pub default_max_age_days: Option<i64>,

    // Action defaults
    #[serde(default)]
    pub backup_directory: Option<PathBuf>,
    #[serde(default)]
    pub use_trash: bool,

    // Explicit per-directory rules, checked before anything inferred
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// One explicitly configured retention rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    pub directory: PathBuf,
    /// Regular expression matched against file names in `directory`.
    pub pattern: String,
    #[serde(default = "default_min_files")]
    pub min_files: u64,
    #[serde(default = "default_max_files")]
    pub max_files: u64,
    #[serde(default)]
    pub max_age_days: Option<i64>,
    /// Starting value for the match counter, 0 or 1.
    #[serde(default)]
    pub seed_count: u64,
}

fn default_true() -> bool {
    true
}

fn default_min_files() -> u64 {
    DEFAULT_MIN_FILES
}

fn default_max_files() -> u64 {
    DEFAULT_MAX_FILES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clean_root_folder: true,
            clean_subdirectories: true,
            low_memory_mode: false,
            default_min_files: DEFAULT_MIN_FILES,
            default_max_files: DEFAULT_MAX_FILES,
            default_max_age_days: None,
            backup_directory: None,
            use_trash: false,
            rules: Vec::new(),
        }
    }
}

impl Config {
    /// Get the path to the default config file
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".dirsweep.json"))
    }

    /// Load from an explicit path, or the default location, or fall back to
    /// built-in defaults when no file exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = Self::config_path()?;
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the sweep cannot act on.
    pub fn validate(&self) -> std::result::Result<(), SweepError> {
        if let Some(days) = self.default_max_age_days {
            if days < 0 {
                return Err(SweepError::Configuration(format!(
                    "default_max_age_days must be >= 0, got {}",
                    days
                )));
            }
        }

        for spec in &self.rules {
            if let Some(days) = spec.max_age_days {
                if days < 0 {
                    return Err(SweepError::Configuration(format!(
                        "max_age_days for {} must be >= 0, got {}",
                        spec.directory.display(),
                        days
                    )));
                }
            }
            if spec.seed_count > 1 {
                return Err(SweepError::Configuration(format!(
                    "seed_count for {} must be 0 or 1, got {}",
                    spec.directory.display(),
                    spec.seed_count
                )));
            }
            Regex::new(&spec.pattern).map_err(|e| {
                SweepError::Configuration(format!(
                    "rule pattern {:?} for {}: {}",
                    spec.pattern,
                    spec.directory.display(),
                    e
                ))
            })?;
        }

        Ok(())
    }

    /// The absolute age cutoff the engine compares against. `now` is
    /// supplied by the caller; the sweep core itself never reads a clock.
    pub fn oldest_file(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.default_max_age_days {
            Some(days) => now - Duration::days(days),
            None => DateTime::<Utc>::MIN_UTC,
        }
    }

    pub fn defaults(&self, now: DateTime<Utc>) -> RuleDefaults {
        RuleDefaults {
            min_files: self.default_min_files,
            max_files: self.default_max_files,
            oldest_file: self.oldest_file(now),
        }
    }

    /// Compile the explicit rule specs into registry-ready rules.
    pub fn compiled_rules(
        &self,
        now: DateTime<Utc>,
    ) -> std::result::Result<Vec<(PathBuf, RetentionRule)>, SweepError> {
        let mut rules = Vec::with_capacity(self.rules.len());

        for spec in &self.rules {
            let pattern = Regex::new(&spec.pattern).map_err(|e| {
                SweepError::Configuration(format!(
                    "rule pattern {:?} for {}: {}",
                    spec.pattern,
                    spec.directory.display(),
                    e
                ))
            })?;
            let oldest = match spec.max_age_days {
                Some(days) => now - Duration::days(days),
                None => self.oldest_file(now),
            };
            rules.push((
                spec.directory.clone(),
                RetentionRule::new(pattern, spec.min_files, spec.max_files, oldest, spec.seed_count),
            ));
        }

        Ok(rules)
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("{}", "🔧 CURRENT CONFIGURATION".bold().color(colors::HEADER));
        println!();

        println!("{} Clean root folder: {}", "•".cyan(), self.clean_root_folder);
        println!("{} Clean subdirectories: {}", "•".cyan(), self.clean_subdirectories);
        println!("{} Low-memory mode: {}", "•".cyan(), self.low_memory_mode);
        println!("{} Default min files: {}", "•".cyan(), self.default_min_files);

        let max = if self.default_max_files == DEFAULT_MAX_FILES {
            "unlimited".to_string()
        } else {
            self.default_max_files.to_string()
        };
        println!("{} Default max files: {}", "•".cyan(), max);

        match self.default_max_age_days {
            Some(days) => println!("{} Default max age: {} days", "•".cyan(), days),
            None => println!("{} Default max age: unlimited", "•".cyan()),
        }

        match &self.backup_directory {
            Some(dir) => println!("{} Backup directory: {}", "•".cyan(), dir.display()),
            None => println!("{} Backup directory: none (files are deleted)", "•".cyan()),
        }
        println!("{} Use trash: {}", "•".cyan(), self.use_trash);

        println!();
        println!("{} Explicit rules ({}):", "•".cyan(), self.rules.len());
        for spec in &self.rules {
            let age = match spec.max_age_days {
                Some(days) => format!("{} days", days),
                None => "any age".to_string(),
            };
            println!(
                "  - {} {} (min {}, max {}, {})",
                spec.directory.display(),
                spec.pattern.color(colors::PATH),
                spec.min_files,
                spec.max_files,
                age
            );
        }
    }
}
