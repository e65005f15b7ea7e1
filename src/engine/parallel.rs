//! Parallel batch transduction
//!
//! A [`Grammar`] is immutable and `Sync`, and every parse keeps its state in
//! its own [`ParseContext`](super::parser::ParseContext), so independent
//! inputs can be transduced on separate threads against one shared grammar.
//!
//! # Feature Flag
//!
//! Work is spread with rayon when the `parallel` feature is enabled:
//!
//! ```toml
//! [dependencies]
//! tokgraph = { version = "0.1", features = ["parallel"] }
//! ```
//!
//! Without it the same functions run sequentially.

use super::error::ParseError;
use super::grammar::Grammar;
use super::parser::{ParserConfig, Transducer};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Transduce multiple inputs, results in input order
#[inline]
pub fn parse_batch_parallel(grammar: &Grammar, inputs: &[&str]) -> Vec<Result<String, ParseError>> {
    parse_batch_parallel_with_config(grammar, inputs, ParserConfig::default())
}

/// Transduce multiple inputs with a custom configuration
#[cfg(feature = "rayon")]
pub fn parse_batch_parallel_with_config(
    grammar: &Grammar,
    inputs: &[&str],
    config: ParserConfig,
) -> Vec<Result<String, ParseError>> {
    let transducer = Transducer::with_config(grammar, config);
    inputs.par_iter().map(|input| transducer.parse(input)).collect()
}

/// Transduce multiple inputs sequentially (fallback when rayon is not available)
#[cfg(not(feature = "rayon"))]
pub fn parse_batch_parallel_with_config(
    grammar: &Grammar,
    inputs: &[&str],
    config: ParserConfig,
) -> Vec<Result<String, ParseError>> {
    let transducer = Transducer::with_config(grammar, config);
    inputs.iter().map(|input| transducer.parse(input)).collect()
}

/// Transduce owned inputs
pub fn parse_batch_parallel_owned(
    grammar: &Grammar,
    inputs: &[String],
) -> Vec<Result<String, ParseError>> {
    let refs: Vec<&str> = inputs.iter().map(String::as_str).collect();
    parse_batch_parallel(grammar, &refs)
}
