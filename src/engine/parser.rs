//! Production driver
//!
//! Walks the token sequence left to right. At every index it asks the
//! [`Matcher`] for a rule, emits the production of the first onmatch rule
//! whose class windows fit around the boundary between the previous and
//! current token, then emits the rule's own production and skips past the
//! rule's span.
//!
//! All per-parse state lives in a [`ParseContext`] owned by the call, so a
//! single [`Grammar`] can serve any number of concurrent parses.

use super::constraint::{window_matches, MatchBy};
use super::error::{ParseError, UnrecognizedSpan};
use super::grammar::{Grammar, OnmatchId, RuleId};
use super::matcher::Matcher;
use super::tokenizer::{TokenSequence, Tokenizer};

/// Default maximum input size: 100 MB
pub const DEFAULT_MAX_INPUT_SIZE: usize = 100 * 1024 * 1024;

/// Default matcher stack cap (0 = unlimited)
pub const DEFAULT_MAX_STACK_SIZE: usize = 0;

/// Configuration options for the transducer
///
/// # Example
///
/// ```rust
/// use tokgraph::ParserConfig;
///
/// let config = ParserConfig::new()
///     .with_max_input_size(1024 * 1024)
///     .with_max_stack_size(10_000)
///     .with_strict(true);
/// assert!(config.strict);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum allowed input size in bytes (0 = unlimited)
    pub max_input_size: usize,

    /// Maximum matcher work-stack entries (0 = unlimited)
    pub max_stack_size: usize,

    /// Fail with [`ParseError::UnrecognizedInput`] when the tokenizer
    /// skipped any input
    pub strict: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
            max_stack_size: DEFAULT_MAX_STACK_SIZE,
            strict: false,
        }
    }
}

impl ParserConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum input size
    pub fn with_max_input_size(mut self, size: usize) -> Self {
        self.max_input_size = size;
        self
    }

    /// Set the matcher stack cap
    pub fn with_max_stack_size(mut self, size: usize) -> Self {
        self.max_stack_size = size;
        self
    }

    /// Set strict tokenization
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// One step of the production driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    /// Token index where the rule's span starts
    pub token_idx: usize,
    /// The rule applied
    pub rule: RuleId,
    /// Onmatch rule whose production preceded the rule's, if any
    pub onmatch: Option<OnmatchId>,
}

/// Mutable state of a single parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseContext {
    tokens: TokenSequence,
    matches: Vec<RuleMatch>,
    position: usize,
}

impl ParseContext {
    /// Start a parse over an already tokenized input
    pub fn new(tokens: TokenSequence) -> Self {
        let capacity = tokens.len().saturating_sub(2);
        Self {
            tokens,
            matches: Vec::with_capacity(capacity),
            position: 1,
        }
    }

    /// The token sequence being parsed
    #[inline]
    pub fn tokens(&self) -> &TokenSequence {
        &self.tokens
    }

    /// Every step taken so far, in order
    #[inline]
    pub fn matches(&self) -> &[RuleMatch] {
        &self.matches
    }

    /// Ids of the rules applied so far, in order
    pub fn rule_ids(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.matches.iter().map(|m| m.rule)
    }

    /// Tokenizer diagnostics for this input
    #[inline]
    pub fn warnings(&self) -> &[UnrecognizedSpan] {
        self.tokens.unrecognized()
    }

    /// Index of the next token to consume
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Output of [`Transducer::parse_with_trace`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutput {
    /// The produced string
    pub output: String,
    /// Tokens, rule trace and warnings of the parse
    pub context: ParseContext,
}

/// The production driver bound to a grammar
#[derive(Debug, Clone, Copy)]
pub struct Transducer<'g> {
    grammar: &'g Grammar,
    config: ParserConfig,
}

impl<'g> Transducer<'g> {
    /// Create a transducer with default configuration
    #[inline]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::with_config(grammar, ParserConfig::default())
    }

    /// Create a transducer with custom configuration
    #[inline]
    pub fn with_config(grammar: &'g Grammar, config: ParserConfig) -> Self {
        Self { grammar, config }
    }

    /// The grammar this transducer runs
    #[inline]
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// The active configuration
    #[inline]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Tokenize `input` without parsing it
    pub fn tokenize(&self, input: &str) -> TokenSequence {
        Tokenizer::new(self.grammar).tokenize(input)
    }

    /// Transduce `input`
    ///
    /// # Errors
    /// Any matcher failure aborts the parse; no partial output is returned.
    pub fn parse(&self, input: &str) -> Result<String, ParseError> {
        self.parse_with_trace(input).map(|out| out.output)
    }

    /// Transduce `input` and keep the parse context
    pub fn parse_with_trace(&self, input: &str) -> Result<ParseOutput, ParseError> {
        self.check_input_size(input)?;

        let tokens = self.tokenize(input);
        if self.config.strict && !tokens.is_clean() {
            return Err(ParseError::UnrecognizedInput {
                spans: tokens.unrecognized().to_vec(),
            });
        }

        let mut context = ParseContext::new(tokens);
        let output = self.run(&mut context)?;
        Ok(ParseOutput { output, context })
    }

    /// Every rule accepting at `index`, for ambiguity inspection
    pub fn match_all_at(&self, tokens: &[String], index: usize) -> Result<Vec<RuleId>, ParseError> {
        self.matcher().match_all_at(tokens, index)
    }

    /// Drive the context from its current position to the trailing sentinel
    ///
    /// On error the context keeps every step that succeeded and its position
    /// is left at the token that failed to match.
    pub fn run(&self, context: &mut ParseContext) -> Result<String, ParseError> {
        let matcher = self.matcher();
        let tokens = context.tokens.as_slice();
        let end = tokens.len().saturating_sub(1);
        let mut output = String::new();
        let mut idx = context.position;

        log_debug!("Starting parse: tokens={}", tokens.len());

        while idx < end {
            let rule_id = matcher.match_at(tokens, idx)?;
            let rule = self
                .grammar
                .rule(rule_id)
                .ok_or_else(|| ParseError::malformed(format!("unknown rule {}", rule_id)))?;
            if rule.token_count() == 0 {
                return Err(ParseError::malformed(format!(
                    "rule {} consumes no tokens",
                    rule_id
                )));
            }

            let onmatch = self.onmatch_at(tokens, idx)?;
            if let Some(id) = onmatch {
                if let Some(om) = self.grammar.onmatch_rule(id) {
                    output.push_str(&om.production);
                }
            }
            output.push_str(&rule.production);

            log_debug!(
                "Matched rule {} at token {} ({:?} -> {:?})",
                rule_id,
                idx,
                rule.tokens,
                rule.production
            );

            context.matches.push(RuleMatch {
                token_idx: idx,
                rule: rule_id,
                onmatch,
            });
            idx += rule.token_count();
            context.position = idx;
        }

        log_debug!("Parse successful: {} rules applied", context.matches.len());
        Ok(output)
    }

    /// First onmatch rule whose class windows fit around `idx`
    fn onmatch_at(&self, tokens: &[String], idx: usize) -> Result<Option<OnmatchId>, ParseError> {
        let Some(prev) = idx.checked_sub(1).and_then(|i| tokens.get(i)) else {
            return Ok(None);
        };
        let Some(candidates) = self.grammar.onmatch_candidates(&tokens[idx], prev) else {
            return Ok(None);
        };

        for &id in candidates {
            let rule = self
                .grammar
                .onmatch_rule(id)
                .ok_or_else(|| ParseError::malformed(format!("unknown onmatch rule {}", id)))?;
            let prev_start = idx.checked_sub(rule.prev_classes.len());
            if window_matches(self.grammar, tokens, prev_start, &rule.prev_classes, MatchBy::Class)
                && window_matches(self.grammar, tokens, Some(idx), &rule.next_classes, MatchBy::Class)
            {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    fn matcher(&self) -> Matcher<'g> {
        Matcher::new(self.grammar).with_max_stack_size(self.config.max_stack_size)
    }

    fn check_input_size(&self, input: &str) -> Result<(), ParseError> {
        let max_size = self.config.max_input_size;
        if max_size > 0 && input.len() > max_size {
            return Err(ParseError::InputTooLarge {
                input_size: input.len(),
                max_size,
            });
        }
        Ok(())
    }
}
