//! tokgraph - Grammar-Driven Token Transducer
//!
//! tokgraph executes precompiled transliteration grammars. Input text is
//! tokenized with the grammar's tokenizer pattern, then a production driver
//! walks the tokens left to right. At each position a depth-first walk over
//! the rule automaton picks the longest rule whose context constraints hold,
//! an optional onmatch rule adds a production between adjacent tokens, and
//! the rule's production is appended to the output.
//!
//! It provides:
//! - Loading of compiled grammar documents (JSON via serde)
//! - A regex tokenizer with whitespace consolidation and best-effort recovery
//! - The automaton matcher, including an ambiguity-inspection mode
//! - The production driver with per-call parse contexts
//! - Debug tools (automaton DOT output, parse traces)
//! - Batch transduction over a shared grammar
//!
//! ## Quick Start
//!
//! ```rust
//! use tokgraph::Grammar;
//!
//! let grammar = Grammar::from_json(r#"{
//!     "_graph": {
//!         "node": {
//!             "0": { "ordered_children": { "k": [1], " ": [3] } },
//!             "1": { "ordered_children": { "__rules__": [2] } },
//!             "2": { "accepting": true, "rule_key": 0 },
//!             "3": { "ordered_children": { "__rules__": [4] } },
//!             "4": { "accepting": true, "rule_key": 1 }
//!         },
//!         "edge": {}
//!     },
//!     "_rules": [
//!         ["क", null, null, ["k"], null, null, 0],
//!         [" ", null, null, [" "], null, null, 0]
//!     ],
//!     "_tokenizer_pattern": "(k|\\s+)",
//!     "_tokens": { "k": ["consonant"], " ": ["wb"] },
//!     "_whitespace": [" ", "wb", true]
//! }"#).unwrap();
//!
//! assert_eq!(grammar.parse("k k").unwrap(), "\u{0915} \u{0915}");
//! ```
//!
//! ## Feature Flags
//!
//! - `logging` - Enable debug logging using the `log` crate
//! - `parallel` - Use rayon for batch transduction

// Lint configuration for production quality
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]

// Prelude module for convenient imports
pub mod prelude;

pub mod engine;

/// Re-export commonly used types for convenience
pub use engine::{
    // Debug tools
    debug::{AutomatonVisualizer, ParseTrace},
    // Errors
    error::{GrammarError, ParseError, UnrecognizedSpan},
    // Batch parsing
    parallel::parse_batch_parallel,
    Grammar,
    GrammarData,
    Matcher,
    ParseContext,
    ParseOutput,
    ParserConfig,
    RuleId,
    TokenSequence,
    Tokenizer,
    Transducer,
};

/// Load a compiled grammar document
///
/// Equivalent to [`Grammar::load`].
pub fn load(data: GrammarData) -> Result<Grammar, GrammarError> {
    Grammar::load(data)
}

/// Transduce `input` with `grammar` using the default configuration
pub fn parse(grammar: &Grammar, input: &str) -> Result<String, ParseError> {
    Transducer::new(grammar).parse(input)
}

/// Every rule accepting at `index` of an already tokenized input
pub fn match_all_at(grammar: &Grammar, tokens: &[String], index: usize) -> Result<Vec<RuleId>, ParseError> {
    Matcher::new(grammar).match_all_at(tokens, index)
}
