//! Regex-driven tokenizer
//!
//! Scans the input with the grammar's tokenizer pattern and produces a
//! [`TokenSequence`] bracketed by the whitespace policy's default token.
//! Input that falls between matches is reported as an
//! [`UnrecognizedSpan`] and skipped; tokenization never fails.

use super::error::UnrecognizedSpan;
use super::grammar::Grammar;

/// Tokens of one input, always starting and ending with the default
/// whitespace token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSequence {
    tokens: Vec<String>,
    unrecognized: Vec<UnrecognizedSpan>,
}

impl TokenSequence {
    /// The tokens, sentinels included
    #[inline]
    pub fn as_slice(&self) -> &[String] {
        &self.tokens
    }

    /// Number of tokens, sentinels included. Always at least 2.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the sequence holds no tokens. Never true for tokenizer output.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at `idx`
    #[inline]
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.tokens.get(idx).map(String::as_str)
    }

    /// Spans of input that matched no token shape
    #[inline]
    pub fn unrecognized(&self) -> &[UnrecognizedSpan] {
        &self.unrecognized
    }

    /// Whether every byte of input was tokenized
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.unrecognized.is_empty()
    }

    /// Split into tokens and diagnostics
    pub fn into_parts(self) -> (Vec<String>, Vec<UnrecognizedSpan>) {
        (self.tokens, self.unrecognized)
    }
}

/// Tokenizer bound to a grammar
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer<'g> {
    grammar: &'g Grammar,
}

impl<'g> Tokenizer<'g> {
    /// Create a tokenizer for `grammar`
    #[inline]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    /// Tokenize `input`
    ///
    /// Each match contributes the text of its first participating capture
    /// group (or the whole match if the pattern has no groups). Empty matches
    /// are ignored. With whitespace consolidation on, every run of
    /// whitespace-class tokens becomes one default token, and whitespace at
    /// the very start of the input merges into the leading sentinel.
    pub fn tokenize(&self, input: &str) -> TokenSequence {
        let policy = self.grammar.whitespace();
        let mut tokens = vec![policy.default_token.clone()];
        let mut unrecognized = Vec::new();
        let mut prev_whitespace = true;
        let mut last_end = 0;
        let mut matched = false;

        for caps in self.grammar.tokenizer().captures_iter(input) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.as_str().is_empty() {
                continue;
            }
            let token = caps.iter().skip(1).flatten().next().unwrap_or(whole);
            if token.as_str().is_empty() {
                continue;
            }
            matched = true;

            if whole.start() != last_end {
                self.report(&mut unrecognized, input, last_end, whole.start());
            }
            last_end = whole.end();

            let text = token.as_str();
            if policy.consolidate && self.grammar.is_whitespace(text) {
                if prev_whitespace {
                    continue;
                }
                tokens.push(policy.default_token.clone());
                prev_whitespace = true;
            } else {
                tokens.push(text.to_string());
                prev_whitespace = false;
            }
        }

        if !matched {
            if !input.is_empty() {
                self.report(&mut unrecognized, input, 0, input.len());
            }
            return TokenSequence {
                tokens: vec![policy.default_token.clone(), policy.default_token.clone()],
                unrecognized,
            };
        }

        if last_end != input.len() {
            self.report(&mut unrecognized, input, last_end, input.len());
        }

        // A whitespace-only input consolidates into the leading sentinel
        if !policy.consolidate || !prev_whitespace || tokens.len() < 2 {
            tokens.push(policy.default_token.clone());
        }

        TokenSequence {
            tokens,
            unrecognized,
        }
    }

    fn report(&self, out: &mut Vec<UnrecognizedSpan>, input: &str, start: usize, end: usize) {
        let span = UnrecognizedSpan::new(input, start, end);
        log_warn!("{}", span);
        out.push(span);
    }
}
