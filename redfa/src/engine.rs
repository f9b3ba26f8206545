//! # Engine facade
//! A [RegexEngine] runs the whole compilation pipeline and keeps hold of
//! its result. Compilation is all or nothing: on failure the previously
//! retained automaton stays in place, and a partial one is never kept.
//! Everything between the pattern string and the minimized DFA (the token
//! stream, the syntax tree, the NFA, the subset-construction DFA) is
//! dropped when [RegexEngine::compile] returns.
//!
//! Queries before the first successful compile fail with
//! [NoPatternError] rather than guessing.

use crate::dfa::{Dfa, Match};
use crate::nfa::{BuildError, Nfa};
use crate::parser::{self, LexError, ParseError};
use thiserror::Error;

/// A failure in some stage of [RegexEngine::compile], tagged with the stage
/// it came from.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("cannot tokenize pattern: {0}")]
    Lex(#[from] LexError),
    #[error("cannot parse pattern: {0}")]
    Parse(#[from] ParseError),
    #[error("cannot build automaton: {0}")]
    Build(#[from] BuildError),
}

/// A query was made before any pattern compiled successfully.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Default)]
#[error("no pattern has been compiled")]
pub struct NoPatternError;

/// Compiles patterns and answers queries against the compiled automaton.
///
/// ```
/// use redfa::RegexEngine;
///
/// let mut engine = RegexEngine::new();
/// engine.compile("(a|b)*c{2,3}").unwrap();
/// assert!(engine.is_match("aaabcc").unwrap());
/// assert!(!engine.is_match("ababc").unwrap());
///
/// let hits = engine.find_all("abcccc").unwrap();
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].text, "abccc");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegexEngine {
    dfa: Option<Dfa>,
}

impl RegexEngine {
    /// An engine with no compiled pattern.
    pub fn new() -> Self {
        Self { dfa: None }
    }

    /// Compiles `pattern` through the whole pipeline and retains only the
    /// minimized DFA, replacing whatever was compiled before. On error the
    /// previous automaton, if any, is kept as it was.
    pub fn compile(&mut self, pattern: &str) -> Result<(), CompileError> {
        let tokens = parser::tokenize(pattern)?;
        let ast = parser::parse(&tokens)?;
        let nfa = Nfa::from_ast(&ast)?;
        let mut dfa = nfa.to_dfa();
        dfa.minimize();
        self.dfa = Some(dfa);
        Ok(())
    }

    /// Checks whether the compiled pattern matches the whole input.
    pub fn is_match(&self, input: &str) -> Result<bool, NoPatternError> {
        Ok(self.compiled()?.is_match(input))
    }

    /// Finds all non-overlapping matches of the compiled pattern in
    /// `input`, in order of their start offset.
    pub fn find_all<'a>(&self, input: &'a str) -> Result<Vec<Match<'a>>, NoPatternError> {
        Ok(self.compiled()?.find_all(input))
    }

    /// A new engine whose pattern language is the complement of this one's,
    /// over this pattern's alphabet.
    pub fn complement(&self) -> Result<RegexEngine, NoPatternError> {
        Ok(RegexEngine {
            dfa: Some(self.compiled()?.complement()),
        })
    }

    /// Recovers a pattern for the compiled automaton by state elimination.
    /// The recovered spelling usually differs from the compiled one, but it
    /// matches exactly the same strings.
    pub fn recover_pattern(&self) -> Result<String, NoPatternError> {
        Ok(self.compiled()?.to_pattern())
    }

    /// The retained minimized DFA, if a pattern has been compiled.
    pub fn dfa(&self) -> Option<&Dfa> {
        self.dfa.as_ref()
    }

    fn compiled(&self) -> Result<&Dfa, NoPatternError> {
        self.dfa.as_ref().ok_or(NoPatternError)
    }
}
