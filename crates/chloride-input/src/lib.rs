//! # Chloride Input
//!
//! Parameter ingestion for the chloride diffusion workspace.
//!
//! - **Parsers** ([`parsers`]) — Decode line-oriented `key = value` text into
//!   a partial [`ParameterOverrides`](chloride_core::ParameterOverrides)
//!   mapping, and write a full parameter set back out in the same format.
//!
//! Parsing is best-effort and never fails; only reading a file can.

pub mod parsers;

pub use parsers::keyvalue::{parse, parse_with, write_parameters, ParserOptions};
pub use parsers::{load_parameter_file, InputError, ParseOutcome, SkipReason, SkippedLine};
