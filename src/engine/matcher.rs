//! Automaton matcher
//!
//! Finds the rule to apply at a token index by walking the compiled
//! automaton depth-first. The walk uses an explicit LIFO work-stack of
//! `(node, parent, token index)` entries instead of native recursion, so its
//! depth is bounded only by memory (or by [`Matcher::with_max_stack_size`]).
//!
//! Children are pushed in reverse so that they pop in their compiled
//! priority order. A popped node that accepts and whose incoming edge
//! constraints hold at the entry's token index yields its rule; any other
//! node advances one token and pushes its own children. The first accepting
//! rule found wins; rule cost is not consulted.

use super::error::ParseError;
use super::grammar::{Grammar, NodeId, RuleId, ROOT};

/// Whether to stop at the first accepting rule or collect all of them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Return the first accepting rule in traversal order
    First,
    /// Collect every accepting rule (ambiguity inspection)
    All,
}

#[derive(Debug, Clone, Copy)]
struct StackEntry {
    node: NodeId,
    parent: NodeId,
    token_idx: usize,
}

/// Depth-first rule matcher bound to a grammar
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'g> {
    grammar: &'g Grammar,
    max_stack_size: usize,
}

impl<'g> Matcher<'g> {
    /// Create a matcher with no stack limit
    #[inline]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            max_stack_size: 0,
        }
    }

    /// Cap the work-stack at `size` entries (0 = unlimited)
    #[inline]
    pub fn with_max_stack_size(mut self, size: usize) -> Self {
        self.max_stack_size = size;
        self
    }

    /// Find the rule to apply at `token_idx`
    ///
    /// # Errors
    /// - [`ParseError::NoMatchAtPosition`] if no rule accepts here
    /// - [`ParseError::MalformedGrammar`] if the walk reaches a missing node
    ///   or rule
    /// - [`ParseError::StackLimitExceeded`] if the stack cap is hit
    pub fn match_at(&self, tokens: &[String], token_idx: usize) -> Result<RuleId, ParseError> {
        self.walk(tokens, token_idx, MatchMode::First)?
            .first()
            .copied()
            .ok_or_else(|| ParseError::NoMatchAtPosition {
                position: token_idx,
                token: tokens.get(token_idx).cloned().unwrap_or_default(),
            })
    }

    /// Every rule that accepts at `token_idx`, without duplicates, in the
    /// order the walk finds them
    ///
    /// Constraints are evaluated exactly as in [`match_at`](Self::match_at).
    /// An index with no accepting rule yields an empty list.
    pub fn match_all_at(&self, tokens: &[String], token_idx: usize) -> Result<Vec<RuleId>, ParseError> {
        self.walk(tokens, token_idx, MatchMode::All)
    }

    /// Run the walk in the given mode
    pub fn walk(
        &self,
        tokens: &[String],
        token_idx: usize,
        mode: MatchMode,
    ) -> Result<Vec<RuleId>, ParseError> {
        let mut found = Vec::new();
        if token_idx >= tokens.len() {
            return Ok(found);
        }
        let last_idx = tokens.len() - 1;

        let mut stack = Vec::new();
        self.push_children(&mut stack, ROOT, tokens, token_idx)?;

        while let Some(entry) = stack.pop() {
            let node = self.grammar.node(entry.node).ok_or_else(|| {
                ParseError::malformed(format!("node {} is referenced but missing", entry.node))
            })?;

            if node.accepting {
                let rule_id = self.accepting_rule(entry.node, node.rule_key)?;
                if self.constraints_hold(&entry, rule_id, tokens)? {
                    match mode {
                        MatchMode::First => {
                            found.push(rule_id);
                            return Ok(found);
                        }
                        MatchMode::All => {
                            if !found.contains(&rule_id) {
                                found.push(rule_id);
                            }
                            continue;
                        }
                    }
                }
            }

            let next_idx = if entry.token_idx < last_idx {
                entry.token_idx + 1
            } else {
                entry.token_idx
            };
            self.push_children(&mut stack, entry.node, tokens, next_idx)?;
        }

        Ok(found)
    }

    fn accepting_rule(&self, node_id: NodeId, rule_key: Option<RuleId>) -> Result<RuleId, ParseError> {
        let rule_id = rule_key.ok_or_else(|| {
            ParseError::malformed(format!("accepting node {} has no rule", node_id))
        })?;
        if self.grammar.rule(rule_id).is_none() {
            return Err(ParseError::malformed(format!(
                "node {} accepts unknown rule {}",
                node_id, rule_id
            )));
        }
        Ok(rule_id)
    }

    fn constraints_hold(
        &self,
        entry: &StackEntry,
        rule_id: RuleId,
        tokens: &[String],
    ) -> Result<bool, ParseError> {
        let Some(constraints) = self.grammar.edge_constraints(entry.parent, entry.node) else {
            return Ok(true);
        };
        let rule = self
            .grammar
            .rule(rule_id)
            .ok_or_else(|| ParseError::malformed(format!("unknown rule {}", rule_id)))?;
        Ok(constraints.check(self.grammar, tokens, entry.token_idx, rule.token_count()))
    }

    /// Push the children of `node_id` keyed by `tokens[token_idx]`, or its
    /// fallback entries when no child is keyed by that token
    fn push_children(
        &self,
        stack: &mut Vec<StackEntry>,
        node_id: NodeId,
        tokens: &[String],
        token_idx: usize,
    ) -> Result<(), ParseError> {
        let node = self.grammar.node(node_id).ok_or_else(|| {
            ParseError::malformed(format!("node {} is referenced but missing", node_id))
        })?;

        let children = node
            .children_for(&tokens[token_idx])
            .unwrap_or_else(|| node.fallback());

        for &child in children.iter().rev() {
            stack.push(StackEntry {
                node: child,
                parent: node_id,
                token_idx,
            });
        }

        if self.max_stack_size > 0 && stack.len() > self.max_stack_size {
            return Err(ParseError::StackLimitExceeded {
                size: stack.len(),
                max_size: self.max_stack_size,
            });
        }
        Ok(())
    }
}
