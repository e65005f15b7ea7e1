//! Integration tests for the production driver
//!
//! These tests run complete transductions against compiled grammar fixtures.

use tokgraph::prelude::*;
use tokgraph::{match_all_at, parse, ParseTrace};

const SCENARIO: &str = include_str!("fixtures/scenario.json");
const GREEDY: &str = include_str!("fixtures/greedy.json");

fn scenario() -> Grammar {
    Grammar::from_json(SCENARIO).expect("scenario grammar loads")
}

fn greedy() -> Grammar {
    Grammar::from_json(GREEDY).expect("greedy grammar loads")
}

// ============================================================================
// Basic Scenarios
// ============================================================================

#[test]
fn test_single_rule() {
    let g = scenario();
    let out = Transducer::new(&g).parse_with_trace("a").unwrap();
    assert_eq!(out.context.tokens().as_slice(), &[" ", "a", " "]);
    assert_eq!(out.output, "A");
}

#[test]
fn test_whitespace_rule_with_empty_production() {
    let g = scenario();
    let out = Transducer::new(&g).parse_with_trace("a a").unwrap();
    assert_eq!(out.context.tokens().as_slice(), &[" ", "a", " ", "a", " "]);
    assert_eq!(out.output, "AA");
    assert_eq!(out.context.rule_ids().collect::<Vec<_>>(), vec![0, 2, 0]);
}

#[test]
fn test_unrecognized_span_does_not_abort() {
    let g = scenario();
    let out = Transducer::new(&g).parse_with_trace("a%a").unwrap();
    let warnings = out.context.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].offset(), 1);
    assert_eq!(warnings[0].snippet, "%");
    assert_eq!(out.context.rule_ids().filter(|&r| r == 0).count(), 2);
}

#[test]
fn test_prev_classes_constraint() {
    let g = scenario();
    // "b" follows whitespace
    assert_eq!(parse(&g, "b").unwrap(), "B");
    assert_eq!(parse(&g, "a b").unwrap(), "AB");

    // "b" follows a literal
    let err = parse(&g, "ab").unwrap_err();
    assert_eq!(
        err,
        ParseError::NoMatchAtPosition {
            position: 2,
            token: "b".to_string()
        }
    );
}

#[test]
fn test_onmatch_between_adjacent_tokens() {
    let g = scenario();
    let out = Transducer::new(&g).parse_with_trace("aa").unwrap();
    assert_eq!(out.output, "A-A");
    let matches = out.context.matches();
    assert_eq!(matches[0].onmatch, None);
    assert_eq!(matches[1].onmatch, Some(0));
}

#[test]
fn test_onmatch_not_fired_across_whitespace() {
    let g = scenario();
    assert_eq!(parse(&g, "a a").unwrap(), "AA");
    assert_eq!(parse(&g, "aaa").unwrap(), "A-A-A");
}

// ============================================================================
// Greedy Matching
// ============================================================================

#[test]
fn test_longest_rule_wins() {
    let g = greedy();
    assert_eq!(parse(&g, "ab").unwrap(), "X");
    assert_eq!(parse(&g, "aab").unwrap(), "aX");
    assert_eq!(parse(&g, "ba").unwrap(), "ba");
    assert_eq!(parse(&g, "a b").unwrap(), "a_b");
}

#[test]
fn test_total_consumption() {
    let g = greedy();
    for input in ["", "a", "ab", "abab", "b a b", "  aab  "] {
        let out = Transducer::new(&g).parse_with_trace(input).unwrap();
        assert_eq!(
            out.context.position(),
            out.context.tokens().len() - 1,
            "input {:?}",
            input
        );
    }
}

#[test]
fn test_ambiguity_inspection() {
    let g = greedy();
    let tokens = g.tokenize("ab");
    assert_eq!(match_all_at(&g, tokens.as_slice(), 1).unwrap(), vec![3]);
    assert_eq!(g.match_all_at(tokens.as_slice(), 2).unwrap(), vec![1]);
}

// ============================================================================
// Determinism & Sharing
// ============================================================================

#[test]
fn test_repeated_parses_are_identical() {
    let g = scenario();
    let t = Transducer::new(&g);
    let first = t.parse_with_trace("a%a b").unwrap();
    let second = t.parse_with_trace("a%a b").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_failed_parse_leaves_no_state_behind() {
    let g = scenario();
    let t = Transducer::new(&g);
    assert!(t.parse("ab").is_err());
    assert_eq!(t.parse("aa").unwrap(), "A-A");
}

#[test]
fn test_concurrent_parses_share_grammar() {
    let g = scenario();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| parse(&g, "aa b").unwrap()))
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), "A-AB");
        }
    });
}

#[test]
fn test_parse_batch() {
    let g = scenario();
    let results = g.parse_batch(["a", "ab", "b"]);
    assert_eq!(results[0], Ok("A".to_string()));
    assert!(results[1].is_err());
    assert_eq!(results[2], Ok("B".to_string()));
}

#[test]
fn test_parse_trace_rendering() {
    let g = scenario();
    let out = Transducer::new(&g).parse_with_trace("aa").unwrap();
    let trace = ParseTrace::new(&g, &out.context).render();
    assert_eq!(trace.lines().count(), 2);
    assert!(trace.contains("(onmatch \"-\")"));
}

#[test]
fn test_load_from_data() {
    let data = GrammarData::from_json(SCENARIO).unwrap();
    let g = tokgraph::load(data).unwrap();
    assert_eq!(g.rule_count(), 3);
    assert_eq!(g.rule(1).unwrap().cost, -1.0);
}
