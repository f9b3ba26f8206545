//! # Thompson construction
//! Builds an [Nfa] from an [Ast] by structural recursion. Every node yields
//! a self-contained fragment with one entry state and a set of accepting
//! exit states; composite nodes splice the fragments of their children
//! together with ε-edges, clearing the accepting flag of every exit state
//! they absorb. The accepting states of the root fragment are the accepting
//! states of the finished automaton.
//!
//! All states live in one arena owned by the builder, so "transferring" a
//! sub-fragment into its parent is just wiring indices. State ids and the
//! interned alphabet are local to one build, which keeps repeated builds
//! reproducible and independent.
//!
//! Counted repetitions re-run the construction on their subtree once per
//! copy. Copies never share states.

use crate::ast::{printable, Ast, ClassItem};
use crate::nfa::{Nfa, NfaState};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;
use thiserror::Error;

/// The syntax tree asks for something with no finite-state equivalent.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    #[error("backreference \\{0} cannot be compiled to a finite automaton")]
    UnsupportedBackref(u32),
    #[error("repetition bounds out of order ({min} > {max})")]
    RepeatBounds { min: u32, max: u32 },
}

impl Nfa {
    /// Compiles a syntax tree into an NFA with ε-moves.
    pub fn from_ast(ast: &Ast) -> Result<Nfa, BuildError> {
        let mut builder = NfaBuilder::new();
        let fragment = builder.fragment(ast)?;
        Ok(builder.finish(fragment))
    }
}

/// One sub-automaton under construction: its entry state and its accepting
/// exit states.
struct Fragment {
    start: usize,
    finals: Vec<usize>,
}

struct NfaBuilder {
    states: Vec<NfaState>,
    alphabet: Vec<char>,
    symbol_idx: HashMap<char, usize>,
}

impl NfaBuilder {
    fn new() -> Self {
        Self {
            states: Vec::new(),
            alphabet: Vec::new(),
            symbol_idx: HashMap::new(),
        }
    }

    fn finish(mut self, fragment: Fragment) -> Nfa {
        // transition rows grow lazily; bring every state up to the full
        // alphabet before handing the automaton out
        let len = self.alphabet.len();
        for state in &mut self.states {
            state.transitions.resize(len, Vec::new());
        }
        Nfa {
            alphabet: Rc::from(self.alphabet),
            states: self.states,
            start: fragment.start,
        }
    }

    fn fragment(&mut self, ast: &Ast) -> Result<Fragment, BuildError> {
        match ast {
            Ast::Char(c) => Ok(self.char_fragment(*c)),
            Ast::Empty => Ok(self.empty_fragment()),
            Ast::Concat(l, r) => {
                let left = self.fragment(l)?;
                let right = self.fragment(r)?;
                Ok(self.splice(left, right))
            }
            Ast::Alt(l, r) => {
                let left = self.fragment(l)?;
                let right = self.fragment(r)?;
                Ok(self.alternate(left, right))
            }
            Ast::Star(child) => {
                let inner = self.fragment(child)?;
                Ok(self.star(inner))
            }
            // capturing or not, a group is transparent to the automaton
            Ast::Group { child, .. } => {
                let inner = self.fragment(child)?;
                Ok(self.wrap(inner))
            }
            Ast::Repeat { child, min, max } => self.repeat(child, *min, *max),
            Ast::RepeatExact(child, n) => self.repeat_exact(child, *n),
            Ast::Range { items, negated } => Ok(self.class_fragment(items, *negated)),
            Ast::CharSet(chars) => Ok(self.set_fragment(chars)),
            Ast::Backref(group) => Err(BuildError::UnsupportedBackref(*group)),
        }
    }

    fn new_state(&mut self, accepting: bool) -> usize {
        self.states.push(NfaState {
            accepting,
            epsilon: Vec::new(),
            transitions: Vec::new(),
        });
        self.states.len() - 1
    }

    fn symbol_index(&mut self, c: char) -> usize {
        if let Some(&idx) = self.symbol_idx.get(&c) {
            idx
        } else {
            let idx = self.alphabet.len();
            self.alphabet.push(c);
            self.symbol_idx.insert(c, idx);
            idx
        }
    }

    fn add_transition(&mut self, from: usize, c: char, to: usize) {
        let idx = self.symbol_index(c);
        let row = &mut self.states[from].transitions;
        if row.len() <= idx {
            row.resize(idx + 1, Vec::new());
        }
        row[idx].push(to);
    }

    fn char_fragment(&mut self, c: char) -> Fragment {
        let start = self.new_state(false);
        let end = self.new_state(true);
        self.add_transition(start, c, end);
        Fragment {
            start,
            finals: vec![end],
        }
    }

    fn empty_fragment(&mut self) -> Fragment {
        let start = self.new_state(false);
        let end = self.new_state(true);
        self.states[start].epsilon.push(end);
        Fragment {
            start,
            finals: vec![end],
        }
    }

    /// Sequencing: the exits of `left` stop accepting and flow into `right`.
    fn splice(&mut self, left: Fragment, right: Fragment) -> Fragment {
        for state in left.finals {
            self.states[state].accepting = false;
            self.states[state].epsilon.push(right.start);
        }
        Fragment {
            start: left.start,
            finals: right.finals,
        }
    }

    fn alternate(&mut self, left: Fragment, right: Fragment) -> Fragment {
        let start = self.new_state(false);
        let end = self.new_state(true);
        self.states[start].epsilon.push(left.start);
        self.states[start].epsilon.push(right.start);
        for state in left.finals.into_iter().chain(right.finals) {
            self.states[state].accepting = false;
            self.states[state].epsilon.push(end);
        }
        Fragment {
            start,
            finals: vec![end],
        }
    }

    fn star(&mut self, inner: Fragment) -> Fragment {
        let start = self.new_state(false);
        let end = self.new_state(true);
        self.states[start].epsilon.push(inner.start);
        self.states[start].epsilon.push(end);
        for state in inner.finals {
            self.states[state].accepting = false;
            self.states[state].epsilon.push(inner.start);
            self.states[state].epsilon.push(end);
        }
        Fragment {
            start,
            finals: vec![end],
        }
    }

    /// Fresh entry and exit states around `inner`, connected by ε-edges.
    fn wrap(&mut self, inner: Fragment) -> Fragment {
        let start = self.new_state(false);
        let end = self.new_state(true);
        self.states[start].epsilon.push(inner.start);
        for state in inner.finals {
            self.states[state].accepting = false;
            self.states[state].epsilon.push(end);
        }
        Fragment {
            start,
            finals: vec![end],
        }
    }

    /// `inner` or the empty string, shaped like an alternation with ε.
    fn optional(&mut self, inner: Fragment) -> Fragment {
        let start = self.new_state(false);
        let end = self.new_state(true);
        self.states[start].epsilon.push(inner.start);
        self.states[start].epsilon.push(end);
        for state in inner.finals {
            self.states[state].accepting = false;
            self.states[state].epsilon.push(end);
        }
        Fragment {
            start,
            finals: vec![end],
        }
    }

    fn repeat(&mut self, child: &Ast, min: u32, max: Option<u32>) -> Result<Fragment, BuildError> {
        if let Some(max) = max {
            if min > max {
                return Err(BuildError::RepeatBounds { min, max });
            }
        }
        // the exact lower bound, then either a star tail or optional copies
        let mut fragment = self.repeat_exact(child, min)?;
        match max {
            None => {
                let inner = self.fragment(child)?;
                let star = self.star(inner);
                fragment = self.splice(fragment, star);
            }
            Some(max) => {
                for _ in min..max {
                    let inner = self.fragment(child)?;
                    let optional = self.optional(inner);
                    fragment = self.splice(fragment, optional);
                }
            }
        }
        Ok(fragment)
    }

    fn repeat_exact(&mut self, child: &Ast, count: u32) -> Result<Fragment, BuildError> {
        if count == 0 {
            return Ok(self.empty_fragment());
        }
        let mut fragment = self.fragment(child)?;
        for _ in 1..count {
            let next = self.fragment(child)?;
            fragment = self.splice(fragment, next);
        }
        Ok(fragment)
    }

    fn class_fragment(&mut self, items: &[ClassItem], negated: bool) -> Fragment {
        let mut set = BTreeSet::new();
        for item in items {
            match *item {
                ClassItem::Single(c) => {
                    set.insert(c);
                }
                ClassItem::Span(lo, hi) => {
                    for c in lo..=hi {
                        set.insert(c);
                    }
                }
            }
        }
        let chars: Vec<char> = if negated {
            printable().filter(|c| !set.contains(c)).collect()
        } else {
            set.into_iter().collect()
        };
        self.set_fragment(&chars)
    }

    fn set_fragment(&mut self, chars: &[char]) -> Fragment {
        let start = self.new_state(false);
        let end = self.new_state(true);
        for &c in chars {
            self.add_transition(start, c, end);
        }
        Fragment {
            start,
            finals: vec![end],
        }
    }
}
