//! Transduction engine
//!
//! # Module Organization
//!
//! ## Grammar Model
//! - [`grammar`] - Compiled grammar document and its runtime form
//! - [`constraint`] - Edge constraints and window checks
//!
//! ## Pipeline
//! - [`tokenizer`] - Input → token sequence
//! - [`matcher`] - Depth-first automaton walk at one token index
//! - [`parser`] - Left-to-right production driver
//!
//! ## Error Handling
//! - [`error`] - Parse, grammar and tokenizer diagnostics
//! - [`source_location`] - Line/column tracking
//!
//! ## Tooling
//! - [`debug`] - Automaton visualization and parse traces
//! - [`parallel`] - Batch transduction over a shared grammar

/// Logging macros - no-op when logging feature is disabled
#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Logging macros - use log crate when logging feature is enabled
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

// ============================================================================
// Module Declarations
// ============================================================================

pub mod constraint;
pub mod debug;
pub mod error;
pub mod grammar;
pub mod matcher;
pub mod parallel;
pub mod parser;
pub mod source_location;
pub mod tokenizer;

// ============================================================================
// Core Types
// ============================================================================

pub use grammar::{
    ClassSet, ConstraintData, EdgeData, Grammar, GrammarData, GraphData, Node, NodeData, NodeId,
    OnmatchId, OnmatchRule, Rule, RuleId, WhitespacePolicy, FALLBACK_KEY, ROOT,
};
pub use parser::{ParseContext, ParseOutput, ParserConfig, RuleMatch, Transducer};
pub use tokenizer::{TokenSequence, Tokenizer};

// ============================================================================
// Matching
// ============================================================================

pub use constraint::{window_matches, Constraint, EdgeConstraints, MatchBy};
pub use matcher::{MatchMode, Matcher};

// ============================================================================
// Error Handling
// ============================================================================

pub use error::{GrammarError, ParseError, UnrecognizedSpan};
pub use source_location::SourcePosition;

// ============================================================================
// Tooling
// ============================================================================

pub use debug::{AutomatonVisualizer, ParseTrace};
pub use parallel::{parse_batch_parallel, parse_batch_parallel_owned, parse_batch_parallel_with_config};
