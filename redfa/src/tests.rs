use crate::dfa::Dfa;
use crate::engine::{CompileError, NoPatternError, RegexEngine};
use crate::nfa::{BuildError, Nfa};
use crate::parser;
use ::regex::Regex as LibRegex;
use proptest::prelude::*;
use std::collections::HashSet;

fn engine(pattern: &str) -> RegexEngine {
    let mut engine = RegexEngine::new();
    engine.compile(pattern).unwrap();
    engine
}

fn nfa(pattern: &str) -> Nfa {
    let tokens = parser::tokenize(pattern).unwrap();
    let ast = parser::parse(&tokens).unwrap();
    Nfa::from_ast(&ast).unwrap()
}

fn subset(pattern: &str) -> Dfa {
    nfa(pattern).to_dfa()
}

fn compiled(pattern: &str) -> Dfa {
    let mut dfa = subset(pattern);
    dfa.minimize();
    dfa
}

#[test]
fn whole_string_matching() {
    let cases: &[(&str, &str, bool)] = &[
        ("(a|b)*c{2,3}", "aaabcc", true),
        ("(a|b)*c{2,3}", "ababc", false),
        ("(a|b)*c{2,3}", "abcccc", false),
        ("(a|b)*c{2,3}", "c", false),
        ("(a|b)*c{2,3}", "abcc", true),
        ("(a|b)*c{2,3}", "abccc", true),
        ("a+", "aaa", true),
        ("a+", "", false),
        ("[a-c]{2}", "xabcy", false),
        ("[a-c]{2}", "ab", true),
        ("a*", "", true),
        ("a*", "aaaa", true),
        ("a*", "b", false),
        ("$", "", true),
        ("$", "a", false),
        (".", "x", true),
        (".", "\n", false),
        ("(?:ab)+", "abab", true),
        ("(?:ab)+", "aba", false),
        ("a|", "", true),
        ("a|", "a", true),
        ("[^ab]", "c", true),
        ("[^ab]", "a", false),
    ];
    for &(pattern, input, expected) in cases {
        assert_eq!(
            engine(pattern).is_match(input).unwrap(),
            expected,
            "{pattern:?} on {input:?}"
        );
    }
}

#[test]
fn substring_scanning() {
    let cases: &[(&str, &str, &[&str])] = &[
        ("(a|b)*c{2,3}", "aaabcc", &["aaabcc"]),
        ("(a|b)*c{2,3}", "ababc", &[]),
        // the longest hit from offset 0 uses three of the four c's
        ("(a|b)*c{2,3}", "abcccc", &["abccc"]),
        ("(a|b)*c{2,3}", "aaabccabcccabcccc", &["aaabcc", "abccc", "abccc"]),
        ("a+", "aaa", &["aaa"]),
        // after "ab" matched, the scan resumes at the c, and "cy" is no hit
        ("[a-c]{2}", "xabcy", &["ab"]),
        // zero-width matches are suppressed entirely
        ("a*", "", &[]),
        ("a*", "bbb", &[]),
        ("a*", "baab", &["aa"]),
        // longest, not first-alternative
        ("a|ab", "ab", &["ab"]),
    ];
    for &(pattern, input, expected) in cases {
        let hits = engine(pattern).find_all(input).unwrap();
        let texts: Vec<&str> = hits.iter().map(|hit| hit.text).collect();
        assert_eq!(texts, expected, "{pattern:?} on {input:?}");
    }
}

#[test]
fn scan_offsets_are_byte_offsets() {
    let engine = engine("é+");
    let hits = engine.find_all("xééy").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!((hits[0].start, hits[0].end, hits[0].text), (1, 5, "éé"));
}

#[test]
fn queries_before_compile_are_rejected() {
    let engine = RegexEngine::new();
    assert_eq!(engine.is_match("a"), Err(NoPatternError));
    assert_eq!(engine.find_all("a"), Err(NoPatternError));
    assert!(engine.complement().is_err());
    assert_eq!(engine.recover_pattern(), Err(NoPatternError));
    assert!(engine.dfa().is_none());
}

#[test]
fn failed_compile_keeps_the_previous_pattern() {
    let mut engine = RegexEngine::new();
    engine.compile("ab").unwrap();
    assert!(engine.compile("(a").is_err());
    assert!(engine.is_match("ab").unwrap());
}

#[test]
fn compile_errors_are_stage_tagged() {
    let mut engine = RegexEngine::new();
    assert!(matches!(
        engine.compile("ab\\"),
        Err(CompileError::Lex(_))
    ));
    assert!(matches!(
        engine.compile("a{2"),
        Err(CompileError::Parse(_))
    ));
    assert_eq!(
        engine.compile(r"(a)\1"),
        Err(CompileError::Build(BuildError::UnsupportedBackref(1)))
    );
}

#[test]
fn complement_swaps_acceptance_over_the_alphabet() {
    let engine = engine("(a|b)*c{2,3}");
    let complement = engine.complement().unwrap();
    for input in ["", "a", "cc", "abcc", "ccc", "ababab", "cccc", "abcccc"] {
        assert_ne!(
            engine.is_match(input).unwrap(),
            complement.is_match(input).unwrap(),
            "both engines agree on {input:?}"
        );
    }
}

#[test]
fn double_complement_is_the_original_language() {
    for pattern in ["a+", "(a|b)*c{2,3}", "[a-c]{2}", "$"] {
        let dfa = compiled(pattern);
        assert!(dfa.equivalent_to(&dfa.complement().complement()));
    }
}

#[test]
fn equivalence_ignores_spelling() {
    assert!(compiled("a|b").equivalent_to(&compiled("b|a")));
    assert!(compiled("aa*").equivalent_to(&compiled("a+")));
    assert!(compiled("(ab)?").equivalent_to(&compiled("ab|$")));
    assert!(!compiled("a").equivalent_to(&compiled("b")));
    assert!(!compiled("a").equivalent_to(&compiled("a|$")));
}

#[test]
fn minimization_only_shrinks_and_preserves_the_language() {
    for pattern in ["(a|b)*c{2,3}", "(?:ab)+x?", "[a-f]{1,3}", "a|aa|aaa"] {
        let subset = subset(pattern);
        let mut minimized = subset.clone();
        minimized.minimize();
        assert!(minimized.states().len() <= subset.states().len());
        assert!(minimized.equivalent_to(&subset), "{pattern:?}");
    }
}

#[test]
fn minimization_is_idempotent() {
    for pattern in ["(a|b)*c{2,3}", "a{3,7}", "[ab]*c"] {
        let mut dfa = compiled(pattern);
        let states = dfa.states().len();
        let before = dfa.clone();
        dfa.minimize();
        assert_eq!(dfa.states().len(), states);
        assert!(dfa.equivalent_to(&before));
    }
}

#[test]
fn minimized_automata_have_no_unreachable_states() {
    for pattern in ["(a|b)*c{2,3}", "a?b?c?", "(abc)+"] {
        let dfa = compiled(pattern);
        let reachable = dfa.reachable_state_idx();
        assert_eq!(reachable.len(), dfa.states().len());
        assert!(reachable.contains(&dfa.start_index()));
    }
}

#[test]
fn transition_rows_are_deterministic_and_in_range() {
    let dfa = compiled("(a|b)*c{2,3}");
    assert!(dfa.has_reachable_accepting_state());
    // one slot per alphabet symbol, each holding at most one valid target
    for state in dfa.states() {
        assert_eq!(state.transitions().len(), dfa.alphabet().len());
        for target in state.transitions().iter().flatten() {
            assert!(*target < dfa.states().len());
        }
    }
}

/// Pair-walks two states of one automaton, looking for a suffix on which
/// exactly one of them accepts. Absent transitions walk into a dead spot
/// that never accepts.
fn distinguishable(dfa: &Dfa, a: usize, b: usize) -> bool {
    let mut to_explore = vec![(Some(a), Some(b))];
    let mut explored: HashSet<_> = to_explore.iter().copied().collect();
    while let Some((s1, s2)) = to_explore.pop() {
        let a1 = s1.map_or(false, |s| dfa.states()[s].is_accepting());
        let a2 = s2.map_or(false, |s| dfa.states()[s].is_accepting());
        if a1 != a2 {
            return true;
        }
        for &c in dfa.alphabet() {
            let d1 = s1.and_then(|s| dfa.step(s, c));
            let d2 = s2.and_then(|s| dfa.step(s, c));
            if explored.insert((d1, d2)) {
                to_explore.push((d1, d2));
            }
        }
    }
    false
}

#[test]
fn minimized_states_are_pairwise_distinguishable() {
    for pattern in ["(a|b)*c{2,3}", "(?:ab)+x?", "[a-c]{2}", "a|aa|aaa", "a*b*"] {
        let dfa = compiled(pattern);
        for a in 0..dfa.states().len() {
            for b in a + 1..dfa.states().len() {
                assert!(
                    distinguishable(&dfa, a, b),
                    "states {a} and {b} are interchangeable for {pattern:?}"
                );
            }
        }
    }
}

#[test]
fn recovery_round_trips_through_compilation() {
    for pattern in [
        "a",
        "a|b",
        "(ab)*",
        "(a|b)*c{2,3}",
        "[a-c]{2}",
        "a{2,4}",
        "a+b?",
        "$",
    ] {
        let dfa = compiled(pattern);
        let recovered = compiled(&dfa.to_pattern());
        assert!(dfa.equivalent_to(&recovered), "{pattern:?}");
    }
}

#[test]
fn transition_table_lists_every_state() {
    let dfa = compiled("ab");
    let table = dfa.to_table();
    assert_eq!(table.lines().count(), dfa.states().len() + 1);
    assert!(table.contains('→'));
    assert!(table.contains('*'));
}

fn random_pattern() -> impl Strategy<Value = String> {
    "[a-d]".prop_recursive(6, 32, 8, |inner| {
        prop_oneof![
            4 => prop::collection::vec(inner.clone(), 1..4).prop_map(|vec| vec.join("")),
            3 => prop::collection::vec(inner.clone(), 2..4)
                .prop_map(|vec| format!("({})", vec.join("|"))),
            2 => inner.clone().prop_map(|r| format!("({r})*")),
            2 => inner.clone().prop_map(|r| format!("({r})+")),
            1 => inner.clone().prop_map(|r| format!("({r})?")),
            1 => inner.clone().prop_map(|r| format!("({r}){{2}}")),
            1 => inner.clone().prop_map(|r| format!("({r}){{1,3}}")),
            1 => Just("[a-c]".to_string()),
            1 => Just("[^ab]".to_string()),
        ]
    })
}

proptest! {
    /// Whole-string matching agrees with the reference engine on anchored
    /// patterns.
    #[test]
    fn matching_agrees_with_the_reference_engine(
        pattern in random_pattern(),
        inputs in prop::collection::vec("[a-d]*", 20)
    ) {
        let engine = engine(&pattern);
        let reference = LibRegex::new(&format!("^(?:{pattern})$")).unwrap();
        for input in &inputs {
            prop_assert_eq!(
                engine.is_match(input).unwrap(),
                reference.is_match(input),
                "pattern {} on {:?}", pattern, input
            );
        }
    }

    /// The NFA, the subset-construction DFA and the minimized DFA accept
    /// the same strings.
    #[test]
    fn pipeline_stages_agree(
        pattern in random_pattern(),
        inputs in prop::collection::vec("[a-d]*", 15)
    ) {
        let nfa = nfa(&pattern);
        let subset = nfa.to_dfa();
        let mut minimized = subset.clone();
        minimized.minimize();
        for input in &inputs {
            let expected = nfa.is_match(input);
            prop_assert_eq!(subset.is_match(input), expected);
            prop_assert_eq!(minimized.is_match(input), expected);
        }
    }

    /// Exactly one of pattern and complement matches any string over the
    /// pattern's alphabet.
    #[test]
    fn complement_is_exclusive_and_exhaustive(
        pattern in random_pattern(),
        inputs in prop::collection::vec("[a-d]*", 15)
    ) {
        let dfa = compiled(&pattern);
        let complement = dfa.complement();
        let alphabet: HashSet<char> = dfa.alphabet().iter().copied().collect();
        for input in &inputs {
            let over_alphabet: String =
                input.chars().filter(|c| alphabet.contains(c)).collect();
            prop_assert_ne!(
                dfa.is_match(&over_alphabet),
                complement.is_match(&over_alphabet),
                "pattern {} on {:?}", &pattern, &over_alphabet
            );
        }
    }

    /// Scan hits come in start order, never overlap, are never empty, and
    /// each hit is itself a whole-string match.
    #[test]
    fn scan_hits_are_ordered_disjoint_matches(
        pattern in random_pattern(),
        haystack in "[a-d]*"
    ) {
        let dfa = compiled(&pattern);
        let hits = dfa.find_all(&haystack);
        let mut previous_end = 0;
        for hit in &hits {
            prop_assert!(hit.start >= previous_end);
            prop_assert!(hit.end > hit.start);
            prop_assert_eq!(hit.text, &haystack[hit.start..hit.end]);
            prop_assert!(dfa.is_match(hit.text));
            previous_end = hit.end;
        }
    }

    /// State elimination recovers a pattern for the same language.
    #[test]
    fn recovery_preserves_the_language(pattern in random_pattern()) {
        let dfa = compiled(&pattern);
        let recovered = compiled(&dfa.to_pattern());
        prop_assert!(dfa.equivalent_to(&recovered), "pattern {}", pattern);
    }

    /// Minimizing an already minimized automaton changes nothing.
    #[test]
    fn minimization_is_a_fixed_point(pattern in random_pattern()) {
        let mut dfa = compiled(&pattern);
        let states = dfa.states().len();
        dfa.minimize();
        prop_assert_eq!(dfa.states().len(), states);
    }
}
