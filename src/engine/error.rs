//! Error types for tokgraph
//!
//! Three failure families exist and they propagate differently:
//!
//! - [`UnrecognizedSpan`] is a tokenizer diagnostic. It is accumulated as a
//!   warning and tokenization continues past the span.
//! - [`ParseError`] aborts the current parse. `NoMatchAtPosition` is the
//!   ordinary case; `MalformedGrammar` means the compiled grammar is
//!   structurally inconsistent and retrying is pointless.
//! - [`GrammarError`] is raised while building a [`Grammar`] from its
//!   compiled form, before any input is seen.
//!
//! [`Grammar`]: super::grammar::Grammar

use super::source_location::SourcePosition;
use std::fmt;

/// Maximum number of chars kept in an [`UnrecognizedSpan`] snippet
pub const MAX_SNIPPET_CHARS: usize = 32;

/// Input that matched no token shape of the tokenizer pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedSpan {
    /// Where the span starts in the raw input
    pub position: SourcePosition,
    /// Length of the span in bytes
    pub len: usize,
    /// The unrecognized text, truncated to [`MAX_SNIPPET_CHARS`]
    pub snippet: String,
}

impl UnrecognizedSpan {
    /// Build a diagnostic for `input[start..end]`
    pub fn new(input: &str, start: usize, end: usize) -> Self {
        let end = end.min(input.len());
        let start = start.min(end);
        Self {
            position: SourcePosition::from_offset(input, start),
            len: end - start,
            snippet: input[start..end].chars().take(MAX_SNIPPET_CHARS).collect(),
        }
    }

    /// Byte offset where the span starts
    #[inline]
    pub fn offset(&self) -> usize {
        self.position.offset
    }

    /// Render the diagnostic with the offending input line and a caret
    pub fn format_with_source(&self, input: &str) -> String {
        let offset = self.position.offset.min(input.len());
        let line_start = input[..offset].rfind('\n').map(|n| n + 1).unwrap_or(0);
        let line_end = input[offset..]
            .find('\n')
            .map(|n| offset + n)
            .unwrap_or(input.len());

        let mut output = format!("{}\n", self);
        output.push_str(&input[line_start..line_end]);
        output.push('\n');
        for _ in 0..self.position.column.saturating_sub(1) {
            output.push(' ');
        }
        output.push_str("^\n");
        output
    }
}

impl fmt::Display for UnrecognizedSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unrecognized input {:?} at {} (byte offset {})",
            self.snippet, self.position, self.position.offset
        )
    }
}

/// Error type for parse operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No accepting, constraint-satisfying rule starts at this token
    NoMatchAtPosition {
        /// Index into the token sequence
        position: usize,
        /// The token found at that index
        token: String,
    },

    /// The compiled grammar is structurally inconsistent
    MalformedGrammar {
        /// What was found to be inconsistent
        reason: String,
    },

    /// Input exceeds maximum allowed size
    InputTooLarge {
        /// Size of the input in bytes
        input_size: usize,
        /// Maximum allowed size
        max_size: usize,
    },

    /// The matcher work-stack grew past the configured cap
    StackLimitExceeded {
        /// Stack size when the limit tripped
        size: usize,
        /// Maximum allowed stack size
        max_size: usize,
    },

    /// Strict mode only: tokenization left unrecognized input behind
    UnrecognizedInput {
        /// Every span that was skipped
        spans: Vec<UnrecognizedSpan>,
    },
}

impl ParseError {
    /// Shorthand for a [`ParseError::MalformedGrammar`]
    #[inline]
    pub fn malformed(reason: impl Into<String>) -> Self {
        ParseError::MalformedGrammar {
            reason: reason.into(),
        }
    }

    /// Whether the error is caused by the grammar rather than the input
    pub fn is_grammar_fault(&self) -> bool {
        matches!(self, ParseError::MalformedGrammar { .. })
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::NoMatchAtPosition { position, token } => {
                write!(f, "Could not match token {:?} at position {}", token, position)
            }
            ParseError::MalformedGrammar { reason } => {
                write!(f, "Malformed grammar: {}", reason)
            }
            ParseError::InputTooLarge {
                input_size,
                max_size,
            } => {
                write!(
                    f,
                    "Input too large: {} bytes exceeds limit of {} bytes",
                    input_size, max_size
                )
            }
            ParseError::StackLimitExceeded { size, max_size } => {
                write!(
                    f,
                    "Matcher stack limit exceeded: {} entries exceeds limit of {}",
                    size, max_size
                )
            }
            ParseError::UnrecognizedInput { spans } => {
                write!(f, "{} unrecognized span(s)", spans.len())?;
                if let Some(first) = spans.first() {
                    write!(f, ", first: {}", first)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Error raised while loading a compiled grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// The tokenizer pattern is not a valid regular expression
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Message from the regex compiler
        message: String,
    },

    /// A node or edge key is not a node id
    InvalidNodeKey {
        /// The offending key
        key: String,
    },

    /// The compiled grammar document could not be decoded
    Json {
        /// Message from the JSON decoder
        message: String,
    },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::InvalidPattern { pattern, message } => {
                write!(f, "Invalid tokenizer pattern {:?}: {}", pattern, message)
            }
            GrammarError::InvalidNodeKey { key } => {
                write!(f, "Invalid node key {:?}", key)
            }
            GrammarError::Json { message } => {
                write!(f, "Invalid grammar document: {}", message)
            }
        }
    }
}

impl std::error::Error for GrammarError {}

impl From<serde_json::Error> for GrammarError {
    fn from(err: serde_json::Error) -> Self {
        GrammarError::Json {
            message: err.to_string(),
        }
    }
}
