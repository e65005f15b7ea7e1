//! Grammar types for tokgraph
//!
//! A grammar arrives as an already-compiled JSON document ([`GrammarData`])
//! produced by an external compiler. [`Grammar::load`] turns it into the
//! runtime representation: hash-indexed nodes and edges, a compiled
//! tokenizer regex and per-token class sets. A loaded grammar is immutable
//! and can be shared by reference across any number of concurrent parses.
//!
//! Loading performs no well-formedness checks on the automaton. Dangling
//! node or rule references surface as [`ParseError::MalformedGrammar`]
//! when the matcher walks into them.
//!
//! [`ParseError::MalformedGrammar`]: super::error::ParseError::MalformedGrammar

use super::constraint::EdgeConstraints;
use super::error::{GrammarError, ParseError};
use super::matcher::Matcher;
use super::parser::{ParserConfig, Transducer};
use super::tokenizer::{TokenSequence, Tokenizer};
use hashbrown::{HashMap, HashSet};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index of an automaton node
pub type NodeId = usize;

/// Index into the rule table
pub type RuleId = usize;

/// Index into the onmatch rule table
pub type OnmatchId = usize;

/// Id of the automaton root
pub const ROOT: NodeId = 0;

/// Key of the fallback entry inside a node's ordered children
pub const FALLBACK_KEY: &str = "__rules__";

/// Set of class tags a token belongs to
pub type ClassSet = HashSet<String, ahash::RandomState>;

// ============================================================================
// Compiled document
// ============================================================================

/// The compiled grammar document, exactly as the grammar compiler writes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarData {
    /// Automaton nodes and edges
    #[serde(rename = "_graph")]
    pub graph: GraphData,

    /// Rule table, indexed by [`RuleId`]
    #[serde(rename = "_rules")]
    pub rules: Vec<Rule>,

    /// Onmatch rule table, indexed by [`OnmatchId`]
    #[serde(rename = "_onmatch_rules", default)]
    pub onmatch_rules: Vec<OnmatchRule>,

    /// current token → previous token → candidate onmatch rules
    #[serde(rename = "_onmatch_rules_lookup", default)]
    pub onmatch_rules_lookup: BTreeMap<String, BTreeMap<String, Vec<OnmatchId>>>,

    /// Tokenizer regex
    #[serde(rename = "_tokenizer_pattern")]
    pub tokenizer_pattern: String,

    /// token → class tags
    #[serde(rename = "_tokens")]
    pub tokens: BTreeMap<String, Vec<String>>,

    /// Whitespace policy
    #[serde(rename = "_whitespace")]
    pub whitespace: WhitespacePolicy,
}

impl GrammarData {
    /// Deserialize from JSON
    #[inline]
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Serialize to JSON
    #[inline]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Node and edge tables of the compiled automaton
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    /// node id → node
    #[serde(default)]
    pub node: BTreeMap<String, NodeData>,

    /// parent id → child id → edge
    #[serde(default)]
    pub edge: BTreeMap<String, BTreeMap<String, EdgeData>>,
}

/// A compiled automaton node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Whether a rule match ends here
    #[serde(default)]
    pub accepting: bool,

    /// Rule owned by an accepting node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_key: Option<RuleId>,

    /// token → child node ids in priority order, plus the `__rules__`
    /// fallback list
    #[serde(default)]
    pub ordered_children: BTreeMap<String, Vec<NodeId>>,
}

/// A compiled edge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    /// Context checks applied when the edge's target accepts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<ConstraintData>,
}

/// The four optional constraint windows of an edge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintData {
    /// Exact tokens immediately before the rule span
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_tokens: Option<Vec<String>>,

    /// Exact tokens immediately after the rule span
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_tokens: Option<Vec<String>>,

    /// Token classes before any `prev_tokens` window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_classes: Option<Vec<String>>,

    /// Token classes after any `next_tokens` window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_classes: Option<Vec<String>>,
}

// ============================================================================
// Rules
// ============================================================================

type RuleTuple = (
    String,
    Option<Vec<String>>,
    Option<Vec<String>>,
    Vec<String>,
    Option<Vec<String>>,
    Option<Vec<String>>,
    f64,
);

/// A transliteration rule
///
/// Only `tokens.len()` and `production` are used at match time. The context
/// fields describe what the compiler turned into edge constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RuleTuple", into = "RuleTuple")]
pub struct Rule {
    /// Text emitted when the rule matches
    pub production: String,
    /// Classes required before `prev_tokens`
    pub prev_classes: Option<Vec<String>>,
    /// Tokens required before the span
    pub prev_tokens: Option<Vec<String>>,
    /// Tokens the rule consumes
    pub tokens: Vec<String>,
    /// Tokens required after the span
    pub next_tokens: Option<Vec<String>>,
    /// Classes required after `next_tokens`
    pub next_classes: Option<Vec<String>>,
    /// Compiler-assigned priority. Never consulted by the matcher.
    pub cost: f64,
}

impl Rule {
    /// Number of tokens consumed by a match of this rule
    #[inline]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

impl From<RuleTuple> for Rule {
    fn from(t: RuleTuple) -> Self {
        let (production, prev_classes, prev_tokens, tokens, next_tokens, next_classes, cost) = t;
        Self {
            production,
            prev_classes,
            prev_tokens,
            tokens,
            next_tokens,
            next_classes,
            cost,
        }
    }
}

impl From<Rule> for RuleTuple {
    fn from(r: Rule) -> Self {
        (
            r.production,
            r.prev_classes,
            r.prev_tokens,
            r.tokens,
            r.next_tokens,
            r.next_classes,
            r.cost,
        )
    }
}

/// An additional production emitted between two adjacent tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "(Vec<String>, Vec<String>, String)",
    into = "(Vec<String>, Vec<String>, String)"
)]
pub struct OnmatchRule {
    /// Classes of the tokens ending right before the current token
    pub prev_classes: Vec<String>,
    /// Classes of the tokens starting at the current token
    pub next_classes: Vec<String>,
    /// Text emitted before the base production
    pub production: String,
}

impl From<(Vec<String>, Vec<String>, String)> for OnmatchRule {
    fn from((prev_classes, next_classes, production): (Vec<String>, Vec<String>, String)) -> Self {
        Self {
            prev_classes,
            next_classes,
            production,
        }
    }
}

impl From<OnmatchRule> for (Vec<String>, Vec<String>, String) {
    fn from(r: OnmatchRule) -> Self {
        (r.prev_classes, r.next_classes, r.production)
    }
}

/// How whitespace is represented in token sequences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String, bool)", into = "(String, String, bool)")]
pub struct WhitespacePolicy {
    /// Sentinel token placed at both ends of every sequence
    pub default_token: String,
    /// Class tag that marks a token as whitespace
    pub token_class: String,
    /// Collapse whitespace runs into a single `default_token`
    pub consolidate: bool,
}

impl From<(String, String, bool)> for WhitespacePolicy {
    fn from((default_token, token_class, consolidate): (String, String, bool)) -> Self {
        Self {
            default_token,
            token_class,
            consolidate,
        }
    }
}

impl From<WhitespacePolicy> for (String, String, bool) {
    fn from(w: WhitespacePolicy) -> Self {
        (w.default_token, w.token_class, w.consolidate)
    }
}

// ============================================================================
// Runtime representation
// ============================================================================

/// An automaton node
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Whether a rule match ends here
    pub accepting: bool,
    /// Rule owned by the node, meaningful when `accepting`
    pub rule_key: Option<RuleId>,
    children: HashMap<String, Vec<NodeId>>,
    fallback: Vec<NodeId>,
}

impl Node {
    /// Children reached by consuming `token`, in priority order
    #[inline]
    pub fn children_for(&self, token: &str) -> Option<&[NodeId]> {
        self.children.get(token).map(Vec::as_slice)
    }

    /// Entries tried when no child is keyed by the current token
    #[inline]
    pub fn fallback(&self) -> &[NodeId] {
        &self.fallback
    }

    /// Tokens with outgoing children
    pub fn child_tokens(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    fn from_data(data: NodeData) -> Self {
        let mut children = HashMap::with_capacity(data.ordered_children.len());
        let mut fallback = Vec::new();
        for (token, ids) in data.ordered_children {
            if token == FALLBACK_KEY {
                fallback = ids;
            } else if !ids.is_empty() {
                children.insert(token, ids);
            }
        }
        Self {
            accepting: data.accepting,
            rule_key: data.rule_key,
            children,
            fallback,
        }
    }
}

/// A loaded, immutable grammar
#[derive(Debug, Clone)]
pub struct Grammar {
    nodes: HashMap<NodeId, Node>,
    edges: HashMap<(NodeId, NodeId), EdgeConstraints>,
    rules: Vec<Rule>,
    onmatch_rules: Vec<OnmatchRule>,
    onmatch_lookup: HashMap<String, HashMap<String, Vec<OnmatchId>>>,
    tokenizer: Regex,
    token_classes: HashMap<String, ClassSet>,
    whitespace: WhitespacePolicy,
}

impl Grammar {
    /// Build the runtime grammar from its compiled form
    ///
    /// # Errors
    /// Fails if the tokenizer pattern does not compile or a node/edge key
    /// is not an integer.
    pub fn load(data: GrammarData) -> Result<Self, GrammarError> {
        let tokenizer =
            Regex::new(&data.tokenizer_pattern).map_err(|e| GrammarError::InvalidPattern {
                pattern: data.tokenizer_pattern.clone(),
                message: e.to_string(),
            })?;

        let mut nodes = HashMap::with_capacity(data.graph.node.len());
        for (key, node) in data.graph.node {
            nodes.insert(parse_node_key(&key)?, Node::from_data(node));
        }

        let mut edges = HashMap::new();
        for (parent_key, targets) in data.graph.edge {
            let parent = parse_node_key(&parent_key)?;
            for (child_key, edge) in targets {
                let child = parse_node_key(&child_key)?;
                let constraints = edge
                    .constraints
                    .map(EdgeConstraints::from_data)
                    .unwrap_or_default();
                if !constraints.is_empty() {
                    edges.insert((parent, child), constraints);
                }
            }
        }

        let token_classes = data
            .tokens
            .into_iter()
            .map(|(token, classes)| (token, classes.into_iter().collect::<ClassSet>()))
            .collect();

        let onmatch_lookup = data
            .onmatch_rules_lookup
            .into_iter()
            .map(|(curr, by_prev)| (curr, by_prev.into_iter().collect()))
            .collect();

        Ok(Self {
            nodes,
            edges,
            rules: data.rules,
            onmatch_rules: data.onmatch_rules,
            onmatch_lookup,
            tokenizer,
            token_classes,
            whitespace: data.whitespace,
        })
    }

    /// Decode and load a compiled grammar document
    pub fn from_json(s: &str) -> Result<Self, GrammarError> {
        Self::load(GrammarData::from_json(s)?)
    }

    /// Get a node by id
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Iterate over all nodes
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Total node count
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Constraints on the edge from `parent` to `child`, if any
    #[inline]
    pub fn edge_constraints(&self, parent: NodeId, child: NodeId) -> Option<&EdgeConstraints> {
        self.edges.get(&(parent, child))
    }

    /// Get a rule by id
    #[inline]
    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id)
    }

    /// All rules, indexed by [`RuleId`]
    #[inline]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Total rule count
    #[inline]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Get an onmatch rule by id
    #[inline]
    pub fn onmatch_rule(&self, id: OnmatchId) -> Option<&OnmatchRule> {
        self.onmatch_rules.get(id)
    }

    /// All onmatch rules
    #[inline]
    pub fn onmatch_rules(&self) -> &[OnmatchRule] {
        &self.onmatch_rules
    }

    /// Candidate onmatch rules for a (current, previous) token pair
    pub fn onmatch_candidates(&self, curr: &str, prev: &str) -> Option<&[OnmatchId]> {
        self.onmatch_lookup
            .get(curr)
            .and_then(|by_prev| by_prev.get(prev))
            .map(Vec::as_slice)
    }

    /// The compiled tokenizer pattern
    #[inline]
    pub fn tokenizer(&self) -> &Regex {
        &self.tokenizer
    }

    /// The whitespace policy
    #[inline]
    pub fn whitespace(&self) -> &WhitespacePolicy {
        &self.whitespace
    }

    /// Class tags of a token; `None` for tokens missing from the class table
    #[inline]
    pub fn token_classes(&self, token: &str) -> Option<&ClassSet> {
        self.token_classes.get(token)
    }

    /// Whether `token` belongs to `class`
    #[inline]
    pub fn has_class(&self, token: &str, class: &str) -> bool {
        self.token_classes
            .get(token)
            .is_some_and(|classes| classes.contains(class))
    }

    /// Whether `token` belongs to the whitespace class
    #[inline]
    pub fn is_whitespace(&self, token: &str) -> bool {
        self.has_class(token, &self.whitespace.token_class)
    }

    /// Tokenize `input` with this grammar's tokenizer pattern
    pub fn tokenize(&self, input: &str) -> TokenSequence {
        Tokenizer::new(self).tokenize(input)
    }

    /// One-shot parse with default configuration
    ///
    /// # Example
    ///
    /// ```
    /// use tokgraph::Grammar;
    ///
    /// let grammar = Grammar::from_json(r#"{
    ///     "_graph": {
    ///         "node": {
    ///             "0": { "ordered_children": { "a": [1] } },
    ///             "1": { "ordered_children": { "__rules__": [2] } },
    ///             "2": { "accepting": true, "rule_key": 0 }
    ///         },
    ///         "edge": {}
    ///     },
    ///     "_rules": [["A", null, null, ["a"], null, null, 0]],
    ///     "_tokenizer_pattern": "(a|\\s+)",
    ///     "_tokens": { "a": [], " ": ["wb"] },
    ///     "_whitespace": [" ", "wb", true]
    /// }"#).unwrap();
    ///
    /// assert_eq!(grammar.parse("a").unwrap(), "A");
    /// ```
    pub fn parse(&self, input: &str) -> Result<String, ParseError> {
        Transducer::new(self).parse(input)
    }

    /// Parse with a custom configuration
    pub fn parse_with_config(&self, input: &str, config: ParserConfig) -> Result<String, ParseError> {
        Transducer::with_config(self, config).parse(input)
    }

    /// Parse multiple inputs in order, one result per input
    pub fn parse_batch<'a, I>(&self, inputs: I) -> Vec<Result<String, ParseError>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let transducer = Transducer::new(self);
        inputs
            .into_iter()
            .map(|input| transducer.parse(input))
            .collect()
    }

    /// Every rule accepting at `index`, for ambiguity inspection
    pub fn match_all_at(&self, tokens: &[String], index: usize) -> Result<Vec<RuleId>, ParseError> {
        Matcher::new(self).match_all_at(tokens, index)
    }
}

fn parse_node_key(key: &str) -> Result<NodeId, GrammarError> {
    key.parse().map_err(|_| GrammarError::InvalidNodeKey {
        key: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAMMAR_JSON: &str = r#"{
        "_graph": {
            "node": {
                "0": { "accepting": false, "ordered_children": { "a": [1], "b": [] } },
                "1": { "accepting": false, "ordered_children": { "__rules__": [2] } },
                "2": { "accepting": true, "rule_key": 0 }
            },
            "edge": {
                "0": { "1": {} },
                "1": { "2": { "constraints": { "prev_classes": ["wb"] } } }
            }
        },
        "_rules": [["A", ["wb"], null, ["a"], null, null, -1.5]],
        "_onmatch_rules": [[["consonant"], ["consonant"], "-"]],
        "_onmatch_rules_lookup": { "a": { "a": [0] } },
        "_tokenizer_pattern": "(a|b|\\s+)",
        "_tokens": { "a": ["consonant"], "b": [], " ": ["wb"] },
        "_whitespace": [" ", "wb", true]
    }"#;

    fn grammar() -> Grammar {
        Grammar::from_json(GRAMMAR_JSON).unwrap()
    }

    #[test]
    fn test_grammar_load() {
        let g = grammar();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.rule_count(), 1);
        assert_eq!(g.rule(0).unwrap().production, "A");
        assert_eq!(g.rule(0).unwrap().cost, -1.5);
        assert_eq!(g.rule(0).unwrap().token_count(), 1);
        assert!(g.rule(1).is_none());
    }

    #[test]
    fn test_fallback_split_from_children() {
        let g = grammar();
        let node = g.node(1).unwrap();
        assert!(node.children_for(FALLBACK_KEY).is_none());
        assert_eq!(node.fallback(), &[2]);
    }

    #[test]
    fn test_empty_child_list_dropped() {
        let g = grammar();
        let root = g.node(ROOT).unwrap();
        assert_eq!(root.children_for("a"), Some(&[1][..]));
        assert!(root.children_for("b").is_none());
    }

    #[test]
    fn test_unconstrained_edges_not_stored() {
        let g = grammar();
        assert!(g.edge_constraints(0, 1).is_none());
        assert!(g.edge_constraints(1, 2).is_some());
    }

    #[test]
    fn test_token_classes() {
        let g = grammar();
        assert!(g.is_whitespace(" "));
        assert!(!g.is_whitespace("a"));
        assert!(g.has_class("a", "consonant"));
        assert!(!g.has_class("unknown", "consonant"));
        assert!(g.token_classes("unknown").is_none());
    }

    #[test]
    fn test_onmatch_lookup() {
        let g = grammar();
        assert_eq!(g.onmatch_candidates("a", "a"), Some(&[0][..]));
        assert!(g.onmatch_candidates("a", " ").is_none());
        assert_eq!(g.onmatch_rule(0).unwrap().production, "-");
    }

    #[test]
    fn test_whitespace_policy() {
        let g = grammar();
        let ws = g.whitespace();
        assert_eq!(ws.default_token, " ");
        assert_eq!(ws.token_class, "wb");
        assert!(ws.consolidate);
    }

    #[test]
    fn test_invalid_pattern() {
        let json = GRAMMAR_JSON.replace(r#""(a|b|\\s+)""#, r#""(a|b""#);
        let err = Grammar::from_json(&json).unwrap_err();
        assert!(matches!(err, GrammarError::InvalidPattern { .. }));
    }

    #[test]
    fn test_invalid_node_key() {
        let json = GRAMMAR_JSON.replace(r#""2": { "accepting""#, r#""two": { "accepting""#);
        let err = Grammar::from_json(&json).unwrap_err();
        assert_eq!(
            err,
            GrammarError::InvalidNodeKey {
                key: "two".to_string()
            }
        );
    }

    #[test]
    fn test_data_json_roundtrip() {
        let data = GrammarData::from_json(GRAMMAR_JSON).unwrap();
        let json = data.to_json().unwrap();
        let parsed = GrammarData::from_json(&json).unwrap();
        assert_eq!(parsed, data);
    }

    #[test]
    fn test_grammar_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Grammar>();
    }
}
