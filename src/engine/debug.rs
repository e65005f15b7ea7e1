//! Developer Experience Tools
//!
//! - Automaton visualization (Graphviz DOT)
//! - Parse trace rendering (one line per applied rule)

use super::grammar::{Grammar, NodeId};
use super::parser::ParseContext;
use std::fmt::Write;

/// Renders a grammar's automaton as a Graphviz digraph
pub struct AutomatonVisualizer<'g> {
    grammar: &'g Grammar,
    show_constraints: bool,
}

impl<'g> AutomatonVisualizer<'g> {
    /// Create a visualizer for `grammar`
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            show_constraints: true,
        }
    }

    /// Include edge constraints in edge labels
    pub fn show_constraints(mut self, show: bool) -> Self {
        self.show_constraints = show;
        self
    }

    /// Generate DOT source
    ///
    /// Accepting nodes are drawn as double circles labelled with their
    /// rule's production. Token edges are labelled with the token; fallback
    /// edges are dashed.
    pub fn to_dot(&self) -> String {
        let mut output = String::from("digraph automaton {\n  rankdir=LR;\n");

        let mut ids: Vec<NodeId> = self.grammar.nodes().map(|(id, _)| id).collect();
        ids.sort_unstable();

        for &id in &ids {
            let Some(node) = self.grammar.node(id) else {
                continue;
            };
            if node.accepting {
                let production = node
                    .rule_key
                    .and_then(|r| self.grammar.rule(r))
                    .map(|r| r.production.as_str())
                    .unwrap_or("?");
                let _ = writeln!(
                    output,
                    "  n{} [shape=doublecircle, label=\"{}\\n{}\"];",
                    id,
                    id,
                    escape(production)
                );
            } else {
                let _ = writeln!(output, "  n{} [shape=circle, label=\"{}\"];", id, id);
            }
        }

        for &id in &ids {
            let Some(node) = self.grammar.node(id) else {
                continue;
            };
            let mut tokens: Vec<&str> = node.child_tokens().collect();
            tokens.sort_unstable();
            for token in tokens {
                for &child in node.children_for(token).unwrap_or_default() {
                    let label = format!("{:?}{}", token, self.constraint_label(id, child));
                    let _ = writeln!(output, "  n{} -> n{} [label=\"{}\"];", id, child, escape(&label));
                }
            }
            for &child in node.fallback() {
                let label = self.constraint_label(id, child);
                let _ = writeln!(
                    output,
                    "  n{} -> n{} [style=dashed, label=\"{}\"];",
                    id,
                    child,
                    escape(label.trim_start())
                );
            }
        }

        output.push_str("}\n");
        output
    }

    fn constraint_label(&self, parent: NodeId, child: NodeId) -> String {
        if !self.show_constraints {
            return String::new();
        }
        let Some(constraints) = self.grammar.edge_constraints(parent, child) else {
            return String::new();
        };
        constraints
            .iter()
            .map(|c| format!(" {}={:?}", c.name(), c.values()))
            .collect()
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Renders the rule trace of a finished parse
pub struct ParseTrace<'a> {
    grammar: &'a Grammar,
    context: &'a ParseContext,
}

impl<'a> ParseTrace<'a> {
    /// Create a trace view over a parse context
    pub fn new(grammar: &'a Grammar, context: &'a ParseContext) -> Self {
        Self { grammar, context }
    }

    /// One line per applied rule:
    /// `<token index>: rule <id> [<tokens>] -> "<production>"`, followed by
    /// the onmatch production when one fired
    pub fn render(&self) -> String {
        let mut output = String::new();
        for step in self.context.matches() {
            let Some(rule) = self.grammar.rule(step.rule) else {
                continue;
            };
            let _ = write!(
                output,
                "{:>4}: rule {} {:?} -> {:?}",
                step.token_idx, step.rule, rule.tokens, rule.production
            );
            if let Some(om) = step.onmatch.and_then(|id| self.grammar.onmatch_rule(id)) {
                let _ = write!(output, " (onmatch {:?})", om.production);
            }
            output.push('\n');
        }
        for warning in self.context.warnings() {
            let _ = writeln!(output, "warning: {}", warning);
        }
        output
    }
}
