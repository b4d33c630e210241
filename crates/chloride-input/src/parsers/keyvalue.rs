//! Parser for line-oriented `key = value` parameter files.
//!
//! ```text
//! # slab geometry
//! L1 = 45
//! Cs: 0.8
//! tol=1e-6
//! ```
//!
//! Each non-blank line holds one assignment. The key is split from the value
//! at the first separator character (`=` or `:` by default) and both sides
//! are trimmed. Keys are case-sensitive parameter names; values are finite
//! decimal or scientific-notation numbers. Any other line is skipped and the
//! rest of the file is still used. A key assigned twice keeps its last value.

use chloride_core::{ParameterKey, ParameterOverrides, ParameterSet};

use super::{ParseOutcome, SkipReason, SkippedLine};

/// Tunable parts of the file format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Characters accepted between key and value.
    pub separators: Vec<char>,
    /// Treat lines whose first non-blank character is `#` as comments.
    pub allow_comments: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            separators: vec!['=', ':'],
            allow_comments: true,
        }
    }
}

/// Parse `text` with the default options, keeping only the overrides.
pub fn parse(text: &str) -> ParameterOverrides {
    parse_with(text, &ParserOptions::default()).overrides
}

/// Parse `text`, recording every skipped line alongside the overrides.
pub fn parse_with(text: &str, options: &ParserOptions) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || (options.allow_comments && line.starts_with('#')) {
            continue;
        }

        match parse_line(line, options) {
            Ok((key, value)) => outcome.overrides.insert(key, value),
            Err(reason) => outcome.skipped.push(SkippedLine {
                line: idx + 1,
                content: line.to_string(),
                reason,
            }),
        }
    }

    outcome
}

fn parse_line(line: &str, options: &ParserOptions) -> Result<(ParameterKey, f64), SkipReason> {
    let (key, value) = line
        .split_once(|c: char| options.separators.contains(&c))
        .ok_or(SkipReason::MissingSeparator)?;
    let key = key.trim();
    let value = value.trim();

    let key: ParameterKey = key
        .parse()
        .map_err(|_| SkipReason::UnknownKey(key.to_string()))?;

    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok((key, v)),
        _ => Err(SkipReason::InvalidValue(value.to_string())),
    }
}

/// Render a complete parameter set as a parameter file.
///
/// Values are written in shortest round-trip form, so parsing the output of
/// a finite set reproduces it exactly.
pub fn write_parameters(params: &ParameterSet) -> String {
    let mut out = String::new();
    for key in ParameterKey::ALL {
        out.push_str(&format!("{} = {}\n", key, params.get(key)));
    }
    out
}
