use regex::Regex;

use crate::error::{Result, SweepError};

/// Strategy for deriving a generalized matching pattern from a filename.
///
/// The sweep engine takes any implementation, so callers with unusual
/// naming schemes can swap in their own.
pub trait PatternInference {
    /// Build a pattern from a filename and its extension. The extension
    /// carries its leading dot (".log") or is empty.
    fn infer(&self, file_name: &str, extension: &str) -> Result<Regex>;
}

/// Default inference: maximal runs of letters and of digits collapse into
/// placeholders matching exactly that many characters, everything else
/// stays literal.
///
/// "log001.txt" and "log002.txt" end up under one pattern, while
/// "log1.txt" and "log01.txt" do not. Length-sensitive on purpose: a
/// conservative default that never groups more than it has seen.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunLengthInference;

impl PatternInference for RunLengthInference {
    fn infer(&self, file_name: &str, extension: &str) -> Result<Regex> {
        let stem = if extension.is_empty() {
            file_name
        } else {
            file_name.strip_suffix(extension).unwrap_or(file_name)
        };

        let mut pattern = String::with_capacity(file_name.len() + 8);
        pattern.push('^');

        let mut letter_run = 0usize;
        let mut digit_run = 0usize;

        for c in stem.chars() {
            if c.is_ascii_digit() {
                flush_run(&mut pattern, 'w', &mut letter_run);
                digit_run += 1;
            } else if c.is_alphabetic() {
                flush_run(&mut pattern, 'd', &mut digit_run);
                letter_run += 1;
            } else {
                flush_run(&mut pattern, 'w', &mut letter_run);
                flush_run(&mut pattern, 'd', &mut digit_run);
                // punctuation and separators pass through unescaped, so a
                // pathological name can still fail to compile below
                pattern.push(c);
            }
        }

        flush_run(&mut pattern, 'w', &mut letter_run);
        flush_run(&mut pattern, 'd', &mut digit_run);

        pattern.push_str(extension);
        pattern.push('$');

        Regex::new(&pattern).map_err(|source| SweepError::PatternCompile { pattern, source })
    }
}

fn flush_run(pattern: &mut String, class: char, run: &mut usize) {
    if *run > 0 {
        pattern.push_str(&format!("\\{}{{{}}}", class, *run));
        *run = 0;
    }
}
