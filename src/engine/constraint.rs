//! Context constraints on automaton edges
//!
//! A constraint is a window of tokens positioned relative to a rule's matched
//! span, checked either for exact token identity or for class membership.
//! Windows stack outward from the span:
//!
//! ```text
//!   [prev_classes][prev_tokens][ rule tokens ][next_tokens][next_classes]
//!                                             ^ token index at acceptance
//! ```
//!
//! The token index at acceptance is one past the last consumed token, so the
//! previous windows are measured back from the start of the span.

use super::grammar::{ConstraintData, Grammar};

/// How a window compares tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchBy {
    /// Exact token identity
    Token,
    /// Membership of the token in a class tag
    Class,
}

/// One context check on an edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Exact tokens immediately before the span
    PrevTokens(Vec<String>),
    /// Exact tokens starting at the acceptance index
    NextTokens(Vec<String>),
    /// Classes before the `PrevTokens` window
    PrevClasses(Vec<String>),
    /// Classes after the `NextTokens` window
    NextClasses(Vec<String>),
}

impl Constraint {
    /// The values the window is compared against
    #[inline]
    pub fn values(&self) -> &[String] {
        match self {
            Constraint::PrevTokens(v)
            | Constraint::NextTokens(v)
            | Constraint::PrevClasses(v)
            | Constraint::NextClasses(v) => v,
        }
    }

    /// Short name used by debug output
    pub fn name(&self) -> &'static str {
        match self {
            Constraint::PrevTokens(_) => "prev_tokens",
            Constraint::NextTokens(_) => "next_tokens",
            Constraint::PrevClasses(_) => "prev_classes",
            Constraint::NextClasses(_) => "next_classes",
        }
    }
}

/// All constraints on one edge, at most one of each kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeConstraints {
    constraints: Vec<Constraint>,
}

impl EdgeConstraints {
    /// Convert the compiled constraint object
    pub fn from_data(data: ConstraintData) -> Self {
        let constraints = [
            data.prev_tokens.map(Constraint::PrevTokens),
            data.next_tokens.map(Constraint::NextTokens),
            data.prev_classes.map(Constraint::PrevClasses),
            data.next_classes.map(Constraint::NextClasses),
        ]
        .into_iter()
        .flatten()
        .collect();
        Self { constraints }
    }

    /// Whether the edge carries no constraints
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Iterate over the constraints
    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    fn prev_tokens_len(&self) -> usize {
        self.iter()
            .find_map(|c| match c {
                Constraint::PrevTokens(v) => Some(v.len()),
                _ => None,
            })
            .unwrap_or(0)
    }

    fn next_tokens_len(&self) -> usize {
        self.iter()
            .find_map(|c| match c {
                Constraint::NextTokens(v) => Some(v.len()),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Check every constraint at `token_idx`
    ///
    /// `rule_token_count` is the span length of the rule owned by the edge's
    /// target node.
    pub fn check(
        &self,
        grammar: &Grammar,
        tokens: &[String],
        token_idx: usize,
        rule_token_count: usize,
    ) -> bool {
        self.iter().all(|constraint| {
            let values = constraint.values();
            match constraint {
                Constraint::PrevTokens(_) => {
                    let start = token_idx.checked_sub(rule_token_count + values.len());
                    window_matches(grammar, tokens, start, values, MatchBy::Token)
                }
                Constraint::NextTokens(_) => {
                    window_matches(grammar, tokens, Some(token_idx), values, MatchBy::Token)
                }
                Constraint::PrevClasses(_) => {
                    let start = token_idx
                        .checked_sub(rule_token_count + self.prev_tokens_len() + values.len());
                    window_matches(grammar, tokens, start, values, MatchBy::Class)
                }
                Constraint::NextClasses(_) => {
                    let start = token_idx + self.next_tokens_len();
                    window_matches(grammar, tokens, Some(start), values, MatchBy::Class)
                }
            }
        })
    }
}

/// Compare `values` against the tokens starting at `start`
///
/// `None` stands for a window that would begin before index 0. Both that
/// and a window running past the end of `tokens` are non-matches.
pub fn window_matches(
    grammar: &Grammar,
    tokens: &[String],
    start: Option<usize>,
    values: &[String],
    by: MatchBy,
) -> bool {
    let Some(start) = start else {
        return false;
    };
    let Some(window) = tokens.get(start..start + values.len()) else {
        return false;
    };
    window.iter().zip(values).all(|(token, value)| match by {
        MatchBy::Token => token == value,
        MatchBy::Class => grammar.has_class(token, value),
    })
}
