//! Step-by-step evaluation of a [Dfa] over input characters.

use crate::dfa::{Dfa, DfaState};
use std::collections::HashMap;

/// One [find_all](Dfa::find_all) hit: half-open byte offsets into the
/// haystack and the matched text itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
}

/// Tracks the current state while feeding characters to a borrowed [Dfa].
/// Once the walk dies (an unknown character or an absent transition) it
/// stays dead until [reset](DfaEvaluator::reset).
#[derive(Debug, Clone)]
pub struct DfaEvaluator<'a> {
    dfa: &'a Dfa,
    symbol_idx: HashMap<char, usize>,
    current: Option<usize>,
}

impl<'a> DfaEvaluator<'a> {
    pub fn is_accepting(&self) -> bool {
        self.current
            .map_or(false, |state| self.dfa.states[state].accepting)
    }

    /// The state the walk is in, or `None` once it has died.
    pub fn current_state(&self) -> Option<&'a DfaState> {
        self.current.map(|state| &self.dfa.states[state])
    }

    /// Steps on one input character and returns the state stepped into.
    pub fn step(&mut self, c: char) -> Option<&'a DfaState> {
        let current = self.current?;
        self.current = self
            .symbol_idx
            .get(&c)
            .and_then(|&idx| self.dfa.states[current].transitions[idx]);
        self.current_state()
    }

    /// Puts the walk back at the start state, keeping the symbol map.
    pub fn reset(&mut self) {
        self.current = Some(self.dfa.start);
    }
}

impl<'a> From<&'a Dfa> for DfaEvaluator<'a> {
    fn from(value: &'a Dfa) -> Self {
        let symbol_idx = value
            .alphabet
            .iter()
            .enumerate()
            .map(|(idx, &c)| (c, idx))
            .collect();
        Self {
            dfa: value,
            symbol_idx,
            current: Some(value.start),
        }
    }
}
