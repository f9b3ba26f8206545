//! Pattern recovery by state elimination.
//!
//! The automaton is viewed as a graph whose edges carry pattern fragments
//! instead of single characters. A fresh source is wired by ε to the start
//! state and every accepting state by ε to a fresh target; interior states
//! are then eliminated one by one, each elimination rerouting every path
//! through the removed state `k` by extending the label of the `(i, j)`
//! edge with `R(i,k) R(k,k)* R(k,j)`. When only source and target remain,
//! the label between them is a pattern for the automaton's language.
//!
//! Labels are plain strings: `None` is the impossible edge and the empty
//! string is ε, which lets concatenation skip both trivial cases outright.

use crate::dfa::Dfa;

/// Characters that carry meaning in the pattern syntax and must be escaped
/// when they occur as literal transition labels.
const METACHARACTERS: &[char] = &[
    '|', '*', '+', '?', '(', ')', '[', ']', '{', '}', ',', '.', '$', '\\',
];

impl Dfa {
    /// Recovers a pattern matching exactly this automaton's language.
    ///
    /// Interior states are eliminated in ascending index order, which makes
    /// the output reproducible (elimination order changes the spelling of
    /// the result, never its language). An automaton that accepts nothing
    /// yields the empty string, which as a pattern matches only the empty
    /// string; callers that care can check
    /// [Dfa::has_reachable_accepting_state] first.
    ///
    /// ```
    /// use redfa::RegexEngine;
    ///
    /// let mut engine = RegexEngine::new();
    /// engine.compile("ab|ac").unwrap();
    /// let recovered = engine.recover_pattern().unwrap();
    ///
    /// let mut again = RegexEngine::new();
    /// again.compile(&recovered).unwrap();
    /// assert!(again.is_match("ab").unwrap());
    /// assert!(again.is_match("ac").unwrap());
    /// assert!(!again.is_match("bc").unwrap());
    /// ```
    pub fn to_pattern(&self) -> String {
        let interior = {
            let mut vec: Vec<usize> = self.reachable_state_idx().into_iter().collect();
            vec.sort_unstable();
            vec
        };
        let n = self.states.len();
        let source = n;
        let target = n + 1;
        let mut labels: Vec<Vec<Option<String>>> = vec![vec![None; n + 2]; n + 2];

        for &i in &interior {
            for (symbol, slot) in self.alphabet.iter().zip(&self.states[i].transitions) {
                if let Some(t) = slot {
                    join_alternative(&mut labels[i][*t], escape(*symbol));
                }
            }
            if self.states[i].accepting {
                labels[i][target] = Some(String::new());
            }
        }
        labels[source][self.start] = Some(String::new());

        for &k in &interior {
            let own_loop = labels[k][k].take().map(|r| star(&r)).unwrap_or_default();
            let sources: Vec<(usize, String)> = (0..n + 2)
                .filter(|&i| i != k)
                .filter_map(|i| labels[i][k].take().map(|r| (i, r)))
                .collect();
            let targets: Vec<(usize, String)> = (0..n + 2)
                .filter(|&j| j != k)
                .filter_map(|j| labels[k][j].take().map(|r| (j, r)))
                .collect();
            for (i, into_k) in &sources {
                for (j, out_of_k) in &targets {
                    let bypass = concat([into_k, &own_loop, out_of_k]);
                    join_alternative(&mut labels[*i][*j], bypass);
                }
            }
        }

        labels[source][target].take().unwrap_or_default()
    }
}

fn escape(c: char) -> String {
    if METACHARACTERS.contains(&c) {
        format!("\\{c}")
    } else {
        c.to_string()
    }
}

/// Unions `alternative` into the label, dropping exact duplicates.
fn join_alternative(slot: &mut Option<String>, alternative: String) {
    match slot {
        None => *slot = Some(alternative),
        Some(existing) => {
            if existing
                .split('|')
                .all(|branch| branch != alternative)
            {
                existing.push('|');
                existing.push_str(&alternative);
            }
        }
    }
}

fn concat<'a>(parts: impl IntoIterator<Item = &'a String>) -> String {
    let mut out = String::new();
    for part in parts {
        if !part.is_empty() {
            out.push_str(&grouped(part));
        }
    }
    out
}

fn star(part: &str) -> String {
    if part.is_empty() {
        // ε repeated is still ε
        String::new()
    } else {
        format!("{}*", grouped(part))
    }
}

/// Parenthesizes a fragment unless it is already a single atom.
fn grouped(part: &str) -> String {
    if is_atomic(part) {
        part.to_string()
    } else {
        format!("({part})")
    }
}

fn is_atomic(part: &str) -> bool {
    let mut chars = part.chars();
    match (chars.next(), chars.next()) {
        (Some(_), None) => true,
        (Some('\\'), Some(_)) => chars.next().is_none(),
        _ => false,
    }
}
