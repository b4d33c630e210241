//! Parameter-file parsers.
//!
//! Supported formats:
//! - [`keyvalue`] — one `key<sep>value` assignment per line, `.txt` by
//!   convention.

pub mod keyvalue;

use std::path::Path;

use chloride_core::ParameterOverrides;
use thiserror::Error;

/// Errors while loading a parameter file.
///
/// Malformed content is never an error; it is reported through
/// [`ParseOutcome::skipped`] instead.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read parameter file: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a line contributed nothing to the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No recognised separator on the line.
    MissingSeparator,
    /// The key is not a parameter name (keys are case-sensitive).
    UnknownKey(String),
    /// The value is not a number.
    InvalidValue(String),
}

/// A line ignored by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    /// The line as it appeared in the input, trimmed.
    pub content: String,
    pub reason: SkipReason,
}

/// Result of a best-effort parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    /// Well-formed assignments, to be layered over the caller's parameters.
    pub overrides: ParameterOverrides,
    /// Lines that were ignored. Blank lines and comments are not listed.
    pub skipped: Vec<SkippedLine>,
}

/// Read a parameter file and parse it with the default options.
///
/// Invalid UTF-8 is replaced with U+FFFD rather than rejected, so only the
/// affected lines are lost.
pub fn load_parameter_file(path: &Path) -> Result<ParseOutcome, InputError> {
    let bytes = std::fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    Ok(keyvalue::parse_with(&content, &keyvalue::ParserOptions::default()))
}
