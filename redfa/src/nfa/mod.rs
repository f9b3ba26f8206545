//! # Nondeterministic finite automaton with ε-moves
//! The [Nfa] is the intermediate form between the syntax tree and the
//! [Dfa](crate::dfa::Dfa): [built](Nfa::from_ast) by Thompson construction
//! and consumed by the [subset construction](Nfa::to_dfa). It is never
//! mutated once built.
//!
//! States are stored in a vector owned by the automaton and refer to each
//! other by index. Each state keeps its ε-targets separately from its
//! per-symbol targets, so ε is distinct from every input symbol by
//! construction. The alphabet holds exactly the characters that occur in
//! the pattern (with classes and `.` expanded), in order of first
//! appearance.
//!
//! ```
//! use redfa::nfa::Nfa;
//! use redfa::parser;
//!
//! let tokens = parser::tokenize("(ab)+").unwrap();
//! let ast = parser::parse(&tokens).unwrap();
//! let nfa = Nfa::from_ast(&ast).unwrap();
//! assert!(nfa.is_match("abab"));
//! assert!(!nfa.is_match("aba"));
//!
//! // the same language, deterministically
//! let dfa = nfa.to_dfa();
//! assert!(dfa.is_match("abab"));
//! assert!(!dfa.is_match("aba"));
//! ```

use crate::dfa::{Dfa, DfaState};
pub use builder::BuildError;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

pub mod builder;

/// A nondeterministic finite automaton over `char` symbols, with ε-moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    pub(crate) alphabet: Rc<[char]>,
    pub(crate) states: Vec<NfaState>,
    pub(crate) start: usize,
}

/// A state of an [Nfa]: whether it accepts, its ε-targets, and for each
/// element of the alphabet (by index) the set of targets on that symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfaState {
    pub(crate) accepting: bool,
    pub(crate) epsilon: Vec<usize>,
    pub(crate) transitions: Vec<Vec<usize>>,
}

impl NfaState {
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Targets reachable by a single ε-move.
    pub fn epsilon_transitions(&self) -> &[usize] {
        &self.epsilon
    }

    /// Target sets per alphabet symbol, in alphabet order.
    pub fn transitions(&self) -> &[Vec<usize>] {
        &self.transitions
    }
}

impl Nfa {
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    pub fn states(&self) -> &[NfaState] {
        &self.states
    }

    pub fn start_index(&self) -> usize {
        self.start
    }

    /// The ε-closure of `seed`: the least set containing it that is closed
    /// under ε-moves.
    pub(crate) fn closure_of(&self, seed: impl IntoIterator<Item = usize>) -> HashSet<usize> {
        let mut all: HashSet<usize> = seed.into_iter().collect();
        let mut new: Vec<usize> = all.iter().copied().collect();
        while let Some(state) = new.pop() {
            for &target in &self.states[state].epsilon {
                if all.insert(target) {
                    new.push(target);
                }
            }
        }
        all
    }

    /// Checks whether the automaton accepts the whole input.
    pub fn is_match(&self, input: &str) -> bool {
        let symbol_idx: HashMap<char, usize> = self
            .alphabet
            .iter()
            .enumerate()
            .map(|(idx, &c)| (c, idx))
            .collect();
        let mut current = self.closure_of([self.start]);
        for c in input.chars() {
            let Some(&idx) = symbol_idx.get(&c) else {
                return false;
            };
            let moved: HashSet<usize> = current
                .iter()
                .flat_map(|&state| self.states[state].transitions[idx].iter().copied())
                .collect();
            if moved.is_empty() {
                return false;
            }
            current = self.closure_of(moved);
        }
        current.iter().any(|&state| self.states[state].accepting)
    }

    /// Converts this NFA to a DFA by the subset construction, keeping only
    /// the ε-closures actually reachable from the start closure. Symbols on
    /// which a closure has no move are left without a transition rather than
    /// being routed to an explicit dead state.
    pub fn to_dfa(&self) -> Dfa {
        let start_closure = Self::set_to_vec(self.closure_of([self.start]));
        let mut states = vec![DfaState {
            accepting: self.contains_accepting(&start_closure),
            transitions: vec![None; self.alphabet.len()],
        }];
        // closures are identified by their sorted id vector
        let mut discovered: HashMap<Vec<usize>, usize> = HashMap::new();
        discovered.insert(start_closure.clone(), 0);
        let mut queue = VecDeque::from([start_closure]);

        while let Some(closure) = queue.pop_front() {
            let id = discovered[&closure];
            for symbol in 0..self.alphabet.len() {
                let moved: HashSet<usize> = closure
                    .iter()
                    .flat_map(|&state| self.states[state].transitions[symbol].iter().copied())
                    .collect();
                if moved.is_empty() {
                    continue;
                }
                let target = Self::set_to_vec(self.closure_of(moved));
                let target_id = match discovered.get(&target) {
                    Some(&idx) => idx,
                    None => {
                        let idx = states.len();
                        states.push(DfaState {
                            accepting: self.contains_accepting(&target),
                            transitions: vec![None; self.alphabet.len()],
                        });
                        discovered.insert(target.clone(), idx);
                        queue.push_back(target);
                        idx
                    }
                };
                states[id].transitions[symbol] = Some(target_id);
            }
        }

        Dfa {
            alphabet: Rc::clone(&self.alphabet),
            states,
            start: 0,
        }
    }

    fn contains_accepting(&self, set: &[usize]) -> bool {
        set.iter().any(|&state| self.states[state].accepting)
    }

    /// Converts a set to a sorted vector, usable as a deterministic key.
    fn set_to_vec(set: HashSet<usize>) -> Vec<usize> {
        let mut vec: Vec<usize> = set.into_iter().collect();
        vec.sort_unstable();
        vec
    }
}
