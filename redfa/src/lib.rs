//!# redfa
//!
//! `redfa` is a regular expression engine built on the classical automaton
//! pipeline: a pattern is tokenized, parsed into a syntax tree, compiled to
//! an NFA by Thompson construction, made deterministic by the subset
//! construction and finally minimized. Queries run against the minimized
//! DFA only.
//!
//! ## Usage
//!
//! ```rust
//! use redfa::RegexEngine;
//!
//! let mut engine = RegexEngine::new();
//! engine.compile("[a-c]{2}").unwrap();
//! assert!(engine.is_match("ab").unwrap());
//! assert!(!engine.is_match("abc").unwrap());
//!
//! // non-overlapping leftmost-longest scan
//! let hits = engine.find_all("xabcy").unwrap();
//! assert_eq!(hits.len(), 1);
//! assert_eq!((hits[0].start, hits[0].end, hits[0].text), (1, 3, "ab"));
//!
//! // the complement automaton accepts exactly the other strings
//! let complement = engine.complement().unwrap();
//! assert!(complement.is_match("abc").unwrap());
//! assert!(!complement.is_match("ab").unwrap());
//!
//! // a pattern can be recovered from the automaton by state elimination
//! let recovered = engine.recover_pattern().unwrap();
//! let mut again = RegexEngine::new();
//! again.compile(&recovered).unwrap();
//! assert!(again.is_match("bc").unwrap());
//! ```
//!
//! ## Pattern syntax
//!
//! Alternation `|`, concatenation, quantifiers `*` `+` `?` `{n}` `{n,}`
//! `{n,m}`, groups `(...)` and `(?:...)`, character classes `[...]`,
//! `[^...]` and `[a-z]`, the `.` wildcard, and `\c` escapes. Two dialect
//! quirks to be aware of:
//!
//! * `$` is an *empty-string atom*, not an end-of-string anchor. Whole
//!   patterns are implicitly anchored on both sides anyway, so there is
//!   nothing for an anchor to do.
//! * Backreferences `\1`..`\9` are recognized by the parser but rejected at
//!   compile time: the languages they describe are not regular, so no
//!   finite automaton can match them.
//!
//! `.` and negated classes range over printable ASCII (space through `~`).
//!
//! ## Pipeline stages
//!
//! Each stage is public and usable on its own:
//!
//! * [Tokenizing](parser::tokenize) and [parsing](parser::parse) patterns
//!   into an [Ast](ast::Ast)
//! * [Thompson construction](nfa::Nfa::from_ast) of an [Nfa](nfa::Nfa)
//! * [Subset construction](nfa::Nfa::to_dfa) of a [Dfa](dfa::Dfa)
//! * [Minimization](dfa::Dfa::minimize) by partition refinement
//! * [Whole-string matching](dfa::Dfa::is_match),
//!   [substring scanning](dfa::Dfa::find_all) and the
//!   [complement automaton](dfa::Dfa::complement)
//! * [Pattern recovery](dfa::Dfa::to_pattern) by state elimination
//! * [Equivalence checking](dfa::Dfa::equivalent_to) of two automata
//!
//! The [RegexEngine] facade runs the stages in order and keeps only the
//! minimized DFA. Compilation is a pure function of the pattern: state
//! numbering, the interned alphabet and the minimized automaton come out
//! the same on every compile, with no global counters involved.
//!
//! Character classes and `.` are expanded into individual transitions over
//! the printable-ASCII universe, so an automaton's alphabet never exceeds
//! 95 symbols; wide spans like `[ -~]{20}` stay well-behaved.

pub mod ast;
pub mod dfa;
pub mod engine;
pub mod nfa;
pub mod parser;
mod table;

pub use engine::{CompileError, NoPatternError, RegexEngine};

#[cfg(test)]
mod tests;
