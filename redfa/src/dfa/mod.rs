//! # Deterministic finite automaton
//! The [Dfa] is the artifact the whole pipeline exists to produce: the
//! [subset construction](crate::nfa::Nfa::to_dfa) emits one, and
//! [Dfa::minimize] reduces it to the unique smallest automaton for its
//! language. All queries run against it.
//!
//! Like the [Nfa](crate::nfa::Nfa), states live in a vector owned by the
//! automaton and refer to each other by index. Transitions are partial:
//! a `None` entry simply rejects, there is no explicit dead state until
//! [Dfa::complement] needs one.
//!
//! ## Queries
//! [Dfa::is_match] walks the whole input; [Dfa::find_all] scans for
//! non-overlapping leftmost-longest substring matches; [Dfa::complement]
//! builds the automaton of the complement language over the same alphabet;
//! [Dfa::to_pattern](crate::dfa::Dfa::to_pattern) recovers a pattern by
//! state elimination.
//!
//! ```
//! use redfa::RegexEngine;
//!
//! let mut engine = RegexEngine::new();
//! engine.compile("(a|b)*c{2,3}").unwrap();
//! let dfa = engine.dfa().unwrap();
//! assert!(dfa.is_match("aaabcc"));
//! assert!(!dfa.is_match("ababc"));
//! ```
//!
//! ## Minimization
//! [Dfa::minimize] drops unreachable states, drops dead states (those from
//! which no accepting state can be reached, turning edges into them into
//! absent transitions), then merges states that accept the same set of
//! suffixes. Merging refines the partition {accepting, rejecting} until
//! every block is uniform: two states stay together only while, for every
//! symbol, their targets lie in the same block. A missing transition is a
//! class of its own; with dead states gone that is exactly right, since an
//! absent edge rejects every suffix while a present one accepts some.

use crate::table::Table;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

pub use eval::{DfaEvaluator, Match};

pub mod eval;
mod pattern;

/// A deterministic finite automaton over `char` symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    pub(crate) alphabet: Rc<[char]>,
    pub(crate) states: Vec<DfaState>,
    pub(crate) start: usize,
}

/// A state of a [Dfa]: whether it accepts, and for each element of the
/// alphabet (by index) at most one target state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfaState {
    pub(crate) accepting: bool,
    pub(crate) transitions: Vec<Option<usize>>,
}

impl DfaState {
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Targets per alphabet symbol, in alphabet order. `None` rejects.
    pub fn transitions(&self) -> &[Option<usize>] {
        &self.transitions
    }
}

impl Dfa {
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn start_index(&self) -> usize {
        self.start
    }

    /// An evaluator positioned at the start state.
    pub fn evaluator(&self) -> DfaEvaluator<'_> {
        self.into()
    }

    /// Checks whether the automaton accepts the whole input. The empty
    /// string is accepted iff the start state accepts.
    pub fn is_match(&self, input: &str) -> bool {
        let mut eval = self.evaluator();
        for c in input.chars() {
            if eval.step(c).is_none() {
                return false;
            }
        }
        eval.is_accepting()
    }

    /// Finds all non-overlapping matches, leftmost first and each as long
    /// as possible. After a match the scan resumes at its end; a position
    /// yielding no match advances by one character. Matches are never
    /// empty, so a pattern accepting the empty string reports nothing extra.
    ///
    /// Offsets in the returned [Match]es are byte offsets into `input`.
    pub fn find_all<'a>(&self, input: &'a str) -> Vec<Match<'a>> {
        // byte offset of every char, plus the one-past-the-end offset
        let offsets: Vec<usize> = input
            .char_indices()
            .map(|(offset, _)| offset)
            .chain([input.len()])
            .collect();
        let chars: Vec<char> = input.chars().collect();

        let mut matches = Vec::new();
        let mut eval = self.evaluator();
        let mut i = 0;
        while i < chars.len() {
            eval.reset();
            let mut longest = None;
            let mut j = i;
            while j < chars.len() {
                if eval.step(chars[j]).is_none() {
                    break;
                }
                j += 1;
                if eval.is_accepting() {
                    longest = Some(j);
                }
            }
            match longest {
                Some(end) => {
                    matches.push(Match {
                        start: offsets[i],
                        end: offsets[end],
                        text: &input[offsets[i]..offsets[end]],
                    });
                    i = end;
                }
                None => i += 1,
            }
        }
        matches
    }

    /// The automaton of the complement language over this automaton's
    /// alphabet. The transition function is completed with a sink state
    /// first, so every string over the alphabet lands in some state; only
    /// then is acceptance flipped. Strings using characters outside the
    /// alphabet are rejected by both this automaton and its complement.
    ///
    /// ```
    /// use redfa::RegexEngine;
    ///
    /// let mut engine = RegexEngine::new();
    /// engine.compile("a+").unwrap();
    /// let complement = engine.complement().unwrap();
    /// assert!(complement.is_match("").unwrap());
    /// assert!(!complement.is_match("aa").unwrap());
    /// ```
    pub fn complement(&self) -> Dfa {
        let mut dfa = self.clone();
        dfa.complete();
        for state in &mut dfa.states {
            state.accepting = !state.accepting;
        }
        dfa
    }

    /// Adds a sink state so every state has a transition on every symbol.
    /// Does nothing if the transition function is already total.
    fn complete(&mut self) {
        let partial = self
            .states
            .iter()
            .any(|state| state.transitions.iter().any(Option::is_none));
        if !partial {
            return;
        }
        let sink = self.states.len();
        for state in &mut self.states {
            for slot in &mut state.transitions {
                if slot.is_none() {
                    *slot = Some(sink);
                }
            }
        }
        self.states.push(DfaState {
            accepting: false,
            transitions: vec![Some(sink); self.alphabet.len()],
        });
    }

    /// Minimizes this DFA by removing all unreachable states, removing all
    /// dead states and then merging all indistinguishable states. The
    /// result is the unique smallest DFA for the language, up to state
    /// numbering; minimizing again changes nothing.
    pub fn minimize(&mut self) {
        self.remove_unreachable_states();
        self.remove_dead_states();
        self.merge_indistinguishable_states();
    }

    /// Checks if some accepting state is reachable from the start state,
    /// that is, if the automaton accepts any string at all.
    pub fn has_reachable_accepting_state(&self) -> bool {
        self.reachable_state_idx()
            .iter()
            .any(|idx| self.states[*idx].accepting)
    }

    /// Indices of all states reachable from the start state.
    pub fn reachable_state_idx(&self) -> HashSet<usize> {
        let mut reachable = HashSet::from([self.start]);
        let mut frontier = vec![self.start];
        while let Some(state) = frontier.pop() {
            for &target in self.states[state].transitions.iter().flatten() {
                if reachable.insert(target) {
                    frontier.push(target);
                }
            }
        }
        reachable
    }

    /// Removes every state not reachable from the start state.
    pub fn remove_unreachable_states(&mut self) {
        let reachable = self.reachable_state_idx();
        let to_remove = (0..self.states.len())
            .filter(|idx| !reachable.contains(idx))
            .collect();
        self.remove_states(to_remove);
    }

    /// States from which some accepting state can be reached.
    fn productive_state_idx(&self) -> HashSet<usize> {
        let mut productive: HashSet<usize> = (0..self.states.len())
            .filter(|&idx| self.states[idx].accepting)
            .collect();
        loop {
            let added: Vec<usize> = (0..self.states.len())
                .filter(|idx| !productive.contains(idx))
                .filter(|&idx| {
                    self.states[idx]
                        .transitions
                        .iter()
                        .flatten()
                        .any(|target| productive.contains(target))
                })
                .collect();
            if added.is_empty() {
                return productive;
            }
            productive.extend(added);
        }
    }

    /// Removes every state that cannot reach an accepting state. Edges into
    /// such states become absent transitions, which rejects identically but
    /// earlier. The start state is kept even when the automaton accepts
    /// nothing at all.
    fn remove_dead_states(&mut self) {
        let productive = self.productive_state_idx();
        for state in &mut self.states {
            for slot in &mut state.transitions {
                if slot.map_or(false, |target| !productive.contains(&target)) {
                    *slot = None;
                }
            }
        }
        let to_remove = (0..self.states.len())
            .filter(|idx| !productive.contains(idx) && *idx != self.start)
            .collect();
        self.remove_states(to_remove);
    }

    /// Groups state indices into equivalence classes of indistinguishable
    /// states, by partition refinement. Starting from the split into
    /// accepting and rejecting states, each pass re-groups every state by
    /// its current block and the blocks its transitions lead to, where a
    /// missing transition counts as a distinct "dead" block. A pass that
    /// creates no new block ends the refinement.
    pub fn state_equivalence_classes(&self) -> Vec<Vec<usize>> {
        let mut block_of: Vec<usize> = self
            .states
            .iter()
            .map(|state| usize::from(!state.accepting))
            .collect();
        let mut block_count = {
            let accepting = self.states.iter().any(|s| s.accepting);
            let rejecting = self.states.iter().any(|s| !s.accepting);
            usize::from(accepting) + usize::from(rejecting)
        };

        loop {
            let mut blocks: BTreeMap<(usize, Vec<Option<usize>>), Vec<usize>> = BTreeMap::new();
            for (idx, state) in self.states.iter().enumerate() {
                let signature: Vec<Option<usize>> = state
                    .transitions
                    .iter()
                    .map(|target| target.map(|t| block_of[t]))
                    .collect();
                blocks.entry((block_of[idx], signature)).or_default().push(idx);
            }
            if blocks.len() == block_count {
                return blocks.into_values().collect();
            }
            block_count = blocks.len();
            for (block, members) in blocks.into_values().enumerate() {
                for &state in &members {
                    block_of[state] = block;
                }
            }
        }
    }

    /// Collapses every equivalence class to its lowest-numbered member.
    /// Transition targets are redirected first, so the class members being
    /// dropped are unreferenced by the time they are removed.
    pub fn merge_indistinguishable_states(&mut self) {
        let classes = self.state_equivalence_classes();
        if classes.len() == self.states.len() {
            return;
        }
        let mut mapper = HashMap::new();
        for class in &classes {
            let keep = class[0];
            for &other in &class[1..] {
                mapper.insert(other, keep);
            }
        }
        let map = |idx: usize| mapper.get(&idx).copied();
        self.remap_transitions(map);
        if let Some(start) = map(self.start) {
            self.start = start;
        }
        self.remove_states(mapper.into_keys().collect());
    }

    /// Remaps every transition target `n` to `mapper(n)` where defined.
    fn remap_transitions(&mut self, mapper: impl Fn(usize) -> Option<usize>) {
        for state in &mut self.states {
            for slot in state.transitions.iter_mut().flatten() {
                *slot = mapper(*slot).unwrap_or(*slot);
            }
        }
    }

    /// Removes the given states, renumbering the transitions of the
    /// remaining ones. No remaining state may still reference a removed
    /// one; with debug assertions on, such a dangling reference panics
    /// here. The start state cannot be removed.
    fn remove_states(&mut self, mut to_remove: Vec<usize>) {
        if to_remove.is_empty() {
            return;
        }
        let mut old_state_idx: Vec<usize> = (0..self.states.len()).collect();

        to_remove.sort_unstable();
        match to_remove.binary_search(&self.start) {
            // "less than" states removed before the start state: adjust
            Err(less_than) => self.start -= less_than,
            Ok(_) => panic!("cannot remove the start state"),
        }

        for &idx in to_remove.iter().rev() {
            self.states.remove(idx);
            old_state_idx.remove(idx);
        }

        let map = |idx| {
            let res = old_state_idx.binary_search(&idx);
            if cfg!(debug_assertions) {
                Some(res.expect("no transitions into a removed state"))
            } else {
                res.ok()
            }
        };
        self.remap_transitions(map);
    }

    /// The single transition out of `state` on `c`, if any.
    pub(crate) fn step(&self, state: usize, c: char) -> Option<usize> {
        let idx = self.alphabet.iter().position(|&symbol| symbol == c)?;
        self.states[state].transitions[idx]
    }

    /// Checks whether this DFA accepts the same language as `other`. The
    /// automata may have different alphabets: the walk runs over the union,
    /// and a symbol missing on one side behaves there like a dead state.
    pub fn equivalent_to(&self, other: &Dfa) -> bool {
        let mut symbols: Vec<char> = self
            .alphabet
            .iter()
            .chain(other.alphabet.iter())
            .copied()
            .collect();
        symbols.sort_unstable();
        symbols.dedup();

        // walk all simultaneously reachable state pairs; None is the dead
        // state, which never accepts
        let mut to_explore = vec![(Some(self.start), Some(other.start))];
        let mut explored: HashSet<(Option<usize>, Option<usize>)> =
            to_explore.iter().copied().collect();

        while let Some((s1, s2)) = to_explore.pop() {
            let a1 = s1.map_or(false, |s| self.states[s].accepting);
            let a2 = s2.map_or(false, |s| other.states[s].accepting);
            if a1 != a2 {
                return false;
            }
            for &c in &symbols {
                let d1 = s1.and_then(|s| self.step(s, c));
                let d2 = s2.and_then(|s| other.step(s, c));
                if explored.insert((d1, d2)) {
                    to_explore.push((d1, d2));
                }
            }
        }
        true
    }

    /// Renders the transition table, one row per state. The start state is
    /// marked with `→` and accepting states with `*`; `-` is an absent
    /// transition. Meant for diagnostics, not for re-parsing.
    pub fn to_table(&self) -> String {
        let mut table = Table::default();

        let mut header = vec![String::new(), String::new(), String::new()];
        header.extend(self.alphabet.iter().map(|c| c.to_string()));
        table.push_row(header);

        for (idx, state) in self.states.iter().enumerate() {
            let arrow = if idx == self.start { "→" } else { "" };
            let accepting = if state.accepting { "*" } else { "" };
            let mut row = vec![arrow.to_string(), accepting.to_string(), idx.to_string()];
            row.extend(state.transitions.iter().map(|target| match target {
                Some(t) => t.to_string(),
                None => "-".to_string(),
            }));
            table.push_row(row);
        }
        table.render(" ")
    }
}
