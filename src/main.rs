use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm};

use dirsweep::cli::{Cli, Commands, RulesArgs, SweepArgs};
use dirsweep::colors;
use dirsweep::config::Config;
use dirsweep::fsio::{DirectoryEnumerator, FsActionExecutor, FsEnumerator, PreviewExecutor};
use dirsweep::pattern::RunLengthInference;
use dirsweep::report::ConsoleReporter;
use dirsweep::rules::{RuleDefaults, RuleRegistry};
use dirsweep::sweep::{SweepEngine, SweepOptions, SweepSummary};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Sweep(args) => run_sweep(&config, args, cli.verbose),
        Commands::Preview(args) => run_sweep(&config, args.into_sweep(), cli.verbose),
        Commands::Rules(args) => show_rules(&config, args),
        Commands::Config => {
            config.display();
            Ok(())
        }
    }
}

fn run_sweep(config: &Config, args: SweepArgs, verbose: bool) -> Result<()> {
    let root = args.path.as_path();
    if !root.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }

    let now = Utc::now();
    let defaults = resolve_defaults(config, &args, now)?;

    let options = SweepOptions {
        clean_root_folder: config.clean_root_folder && !args.no_root,
        clean_subdirectories: config.clean_subdirectories && !args.no_subdirs,
        low_memory_mode: config.low_memory_mode || args.low_memory,
        defaults,
    };

    let backup = args.backup.clone().or_else(|| config.backup_directory.clone());
    let use_trash = args.trash || config.use_trash;

    if !args.dry_run && !args.yes && !confirm_sweep(root, backup.as_deref(), use_trash)? {
        println!("{} Sweep cancelled", "ℹ️".cyan());
        return Ok(());
    }

    let reporter = ConsoleReporter::new(verbose, args.dry_run);
    let seeds = config.compiled_rules(now)?;

    let summary = if args.dry_run {
        let mut engine = SweepEngine::new(options, FsEnumerator, PreviewExecutor::default())
            .with_reporter(Box::new(reporter));
        for (dir, rule) in seeds {
            engine.add_rule(&dir, rule);
        }
        engine.run(root, backup.as_deref())?
    } else {
        let mut engine =
            SweepEngine::new(options, FsEnumerator, FsActionExecutor::new(use_trash))
                .with_reporter(Box::new(reporter));
        for (dir, rule) in seeds {
            engine.add_rule(&dir, rule);
        }
        engine.run(root, backup.as_deref())?
    };

    report_failures(&summary);
    Ok(())
}

fn confirm_sweep(root: &Path, backup: Option<&Path>, use_trash: bool) -> Result<bool> {
    let action = match (backup, use_trash) {
        (Some(dir), _) => format!("move expired files under {}", dir.display()),
        (None, true) => "send expired files to the trash".to_string(),
        (None, false) => "permanently delete expired files".to_string(),
    };

    let proceed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Sweep {} and {}?", root.display(), action))
        .default(false)
        .interact()?;
    Ok(proceed)
}

fn report_failures(summary: &SweepSummary) {
    if !summary.failures.is_empty() {
        println!();
        println!(
            "{} {} entries could not be processed, see above",
            "⚠️".yellow(),
            summary.failures.len()
        );
    }
}

fn resolve_defaults(config: &Config, args: &SweepArgs, now: DateTime<Utc>) -> Result<RuleDefaults> {
    let mut defaults = config.defaults(now);

    if let Some(min) = args.min_files {
        defaults.min_files = min;
    }
    if let Some(max) = args.max_files {
        defaults.max_files = max;
    }
    if let Some(days) = args.older_than_days {
        if days < 0 {
            anyhow::bail!("--older-than-days must be >= 0");
        }
        defaults.oldest_file = now - chrono::Duration::days(days);
    }
    if let Some(oldest) = &args.oldest {
        let parsed = DateTime::parse_from_rfc3339(oldest)
            .with_context(|| format!("Invalid --oldest timestamp: {}", oldest))?;
        defaults.oldest_file = parsed.with_timezone(&Utc);
    }

    Ok(defaults)
}

/// Group a directory's files under the rules a sweep would use, without
/// touching anything.
fn show_rules(config: &Config, args: RulesArgs) -> Result<()> {
    let dir = args.path.as_path();
    if !dir.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }

    let now = Utc::now();
    let defaults = config.defaults(now);
    let inference = RunLengthInference;

    let mut registry = RuleRegistry::new();
    for (rule_dir, rule) in config.compiled_rules(now)? {
        if rule_dir == dir {
            registry.add_rule(&rule_dir, rule);
        }
    }

    let files = FsEnumerator.files(dir)?;
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();

    for file in &files {
        let name = file.file_name();
        let (rule, created) =
            registry.find_or_create(dir, &name, &file.extension(), &defaults, &inference)?;
        if !created {
            rule.record_match();
        }
        grouped.entry(rule.pattern_str().to_string()).or_default().push(name);
    }

    println!("{} {}", "🔎 Rules for:".color(colors::HEADER), dir.display());
    println!("{}", "─".repeat(50).color(colors::PATH));

    match registry.rules_for(dir) {
        Some(rules) if !rules.is_empty() => {
            for rule in rules {
                println!(
                    "{:4} × {}",
                    rule.number_matched(),
                    rule.pattern_str().color(colors::PATH)
                );
                if args.detailed {
                    if let Some(names) = grouped.get(rule.pattern_str()) {
                        for name in names {
                            println!("       {}", name.dimmed());
                        }
                    }
                }
            }
        }
        _ => println!("{} No files found", "✨".green()),
    }

    println!();
    println!(
        "📁 Files examined: {}",
        files.len().to_string().color(colors::SUCCESS)
    );
    Ok(())
}
