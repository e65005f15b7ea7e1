//! Integration tests for the automaton matcher
//!
//! The grammar below has a two-token rule ("th" before a vowel) sharing a
//! prefix with two single-token rules for "t", so the matcher has to back
//! out of the deeper branch when its constraint fails.

use tokgraph::prelude::*;
use tokgraph::AutomatonVisualizer;

const TH_GRAMMAR: &str = r#"{
    "_graph": {
        "node": {
            "0": { "ordered_children": { "t": [1], "h": [6], "a": [8], " ": [10] } },
            "1": { "ordered_children": { "h": [2, 4, 5], "__rules__": [4, 5] } },
            "2": { "ordered_children": { "__rules__": [3] } },
            "3": { "accepting": true, "rule_key": 4 },
            "4": { "accepting": true, "rule_key": 5 },
            "5": { "accepting": true, "rule_key": 0 },
            "6": { "ordered_children": { "__rules__": [7] } },
            "7": { "accepting": true, "rule_key": 1 },
            "8": { "ordered_children": { "__rules__": [9] } },
            "9": { "accepting": true, "rule_key": 2 },
            "10": { "ordered_children": { "__rules__": [11] } },
            "11": { "accepting": true, "rule_key": 3 }
        },
        "edge": {
            "1": { "4": { "constraints": { "next_tokens": ["t"] } } },
            "2": { "3": { "constraints": { "next_classes": ["vowel"] } } }
        }
    },
    "_rules": [
        ["t", null, null, ["t"], null, null, 0],
        ["h", null, null, ["h"], null, null, 0],
        ["a", null, null, ["a"], null, null, 0],
        [" ", null, null, [" "], null, null, 0],
        ["θ", null, null, ["t", "h"], null, ["vowel"], -2],
        ["ṭ", null, null, ["t"], ["t"], null, -1]
    ],
    "_tokenizer_pattern": "(t|h|a|\\s)",
    "_tokens": { "t": ["consonant"], "h": ["consonant"], "a": ["vowel"], " ": ["wb"] },
    "_whitespace": [" ", "wb", true]
}"#;

fn grammar() -> Grammar {
    Grammar::from_json(TH_GRAMMAR).unwrap()
}

#[test]
fn test_multi_token_rule_with_next_classes() {
    let g = grammar();
    assert_eq!(g.parse("tha").unwrap(), "θa");
}

#[test]
fn test_backtrack_when_deeper_constraint_fails() {
    let g = grammar();
    assert_eq!(g.parse("th").unwrap(), "th");
    assert_eq!(g.parse("th a").unwrap(), "th a");
}

#[test]
fn test_next_tokens_constraint() {
    let g = grammar();
    assert_eq!(g.parse("tta").unwrap(), "ṭta");
    assert_eq!(g.parse("ttha").unwrap(), "ṭθa");
}

#[test]
fn test_first_in_traversal_order_wins_over_cost() {
    let g = grammar();
    let tokens = g.tokenize("tha");
    let matcher = Matcher::new(&g);
    assert_eq!(matcher.match_at(tokens.as_slice(), 1), Ok(4));
    assert_eq!(matcher.match_all_at(tokens.as_slice(), 1), Ok(vec![4, 0]));
}

#[test]
fn test_match_all_at_end_of_input() {
    let g = grammar();
    let tokens = g.tokenize("t");
    assert_eq!(g.match_all_at(tokens.as_slice(), 1).unwrap(), vec![0]);
    assert_eq!(g.match_all_at(tokens.as_slice(), 2).unwrap(), vec![3]);
}

// "th" -> "Q" only after an "a" that itself follows whitespace
const PREV_CONTEXT_GRAMMAR: &str = r#"{
    "_graph": {
        "node": {
            "0": { "ordered_children": { "t": [1], "a": [4], "x": [6], " ": [8] } },
            "1": { "ordered_children": { "h": [2] } },
            "2": { "ordered_children": { "__rules__": [3] } },
            "3": { "accepting": true, "rule_key": 0 },
            "4": { "ordered_children": { "__rules__": [5] } },
            "5": { "accepting": true, "rule_key": 1 },
            "6": { "ordered_children": { "__rules__": [7] } },
            "7": { "accepting": true, "rule_key": 2 },
            "8": { "ordered_children": { "__rules__": [9] } },
            "9": { "accepting": true, "rule_key": 3 }
        },
        "edge": {
            "2": { "3": { "constraints": { "prev_tokens": ["a"], "prev_classes": ["wb"] } } }
        }
    },
    "_rules": [
        ["Q", ["wb"], ["a"], ["t", "h"], null, null, 0],
        ["A", null, null, ["a"], null, null, 0],
        ["X", null, null, ["x"], null, null, 0],
        ["", null, null, [" "], null, null, 0]
    ],
    "_tokenizer_pattern": "(t|h|a|x|\\s)",
    "_tokens": { "t": [], "h": [], "a": [], "x": [], " ": ["wb"] },
    "_whitespace": [" ", "wb", true]
}"#;

#[test]
fn test_prev_windows_measured_from_multi_token_span() {
    let g = Grammar::from_json(PREV_CONTEXT_GRAMMAR).unwrap();
    assert_eq!(g.parse("ath").unwrap(), "AQ");
    assert_eq!(g.parse("x ath").unwrap(), "XAQ");

    let tokens = g.tokenize("ath");
    assert_eq!(tokens.as_slice(), &[" ", "a", "t", "h", " "]);
    assert_eq!(g.match_all_at(tokens.as_slice(), 2).unwrap(), vec![0]);
}

#[test]
fn test_prev_classes_fail_behind_multi_token_span() {
    let g = Grammar::from_json(PREV_CONTEXT_GRAMMAR).unwrap();
    assert_eq!(
        g.parse("xath").unwrap_err(),
        ParseError::NoMatchAtPosition {
            position: 3,
            token: "t".to_string()
        }
    );

    let tokens = g.tokenize("xath");
    assert_eq!(g.match_all_at(tokens.as_slice(), 3).unwrap(), Vec::<usize>::new());
}

#[test]
fn test_prev_tokens_fail_behind_multi_token_span() {
    let g = Grammar::from_json(PREV_CONTEXT_GRAMMAR).unwrap();
    assert!(g.parse("th").is_err());
    assert!(g.parse("xth").is_err());
}

#[test]
fn test_stack_cap_reported() {
    let g = grammar();
    let config = ParserConfig::new().with_max_stack_size(2);
    let err = g.parse_with_config("tha", config).unwrap_err();
    assert!(matches!(err, ParseError::StackLimitExceeded { max_size: 2, .. }));
    assert_eq!(g.parse_with_config("a", config).unwrap(), "a");
}

#[test]
fn test_dot_output_lists_every_node() {
    let g = grammar();
    let dot = AutomatonVisualizer::new(&g).to_dot();
    for id in 0..g.node_count() {
        assert!(dot.contains(&format!("  n{} [", id)), "node {} missing", id);
    }
    assert!(dot.contains("next_classes"));
}
