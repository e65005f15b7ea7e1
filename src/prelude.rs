//! Prelude module for convenient imports
//!
//! ```
//! use tokgraph::prelude::*;
//! ```
//!
//! # Re-exported Items
//!
//! ## Core Types
//! - [`Grammar`] - Loaded, immutable grammar
//! - [`GrammarData`] - Compiled grammar document
//! - [`Transducer`] - Production driver
//! - [`ParserConfig`] - Driver configuration
//! - [`ParseContext`] - Per-parse state
//! - [`TokenSequence`] - Tokenizer output
//!
//! ## Error Handling
//! - [`ParseError`] - Parse failure
//! - [`GrammarError`] - Grammar load failure
//! - [`UnrecognizedSpan`] - Tokenizer diagnostic

// ============================================================================
// Core Types
// ============================================================================

pub use crate::engine::{
    Grammar, GrammarData, Matcher, ParseContext, ParseOutput, ParserConfig, TokenSequence,
    Tokenizer, Transducer,
};

// ============================================================================
// Error Handling
// ============================================================================

pub use crate::engine::error::{GrammarError, ParseError, UnrecognizedSpan};
