//! # Pattern lexer
//! A [Lexer] is a cursor over the pattern string producing one [Token] per
//! call, ending with an endless supply of [TokenKind::End]. Individual
//! tokens are recognized by nom combinators; the cursor only tracks how far
//! into the pattern we are so every token carries its char offset.
//!
//! Every character maps to some token, so the single way lexing can fail is
//! a dangling `\` at the very end of the pattern.

use crate::parser::token::{Token, TokenKind};
use nom::branch::alt;
use nom::bytes::complete::{tag, take};
use nom::character::complete::{char as metachar, digit1, satisfy};
use nom::combinator::{map, recognize};
use nom::sequence::preceded;
use nom::IResult;
use thiserror::Error;

/// The pattern ends in a bare `\` with nothing to escape.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("dangling escape at end of pattern (position {position})")]
pub struct LexError {
    /// Char offset of the offending backslash.
    pub position: usize,
}

/// Stateful cursor producing the token stream of a pattern.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    pattern: &'a str,
    rest: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(pattern: &'a str) -> Self {
        Self {
            pattern,
            rest: pattern,
        }
    }

    /// Char offset of the next unconsumed character.
    fn position(&self) -> usize {
        let consumed = self.pattern.len() - self.rest.len();
        self.pattern[..consumed].chars().count()
    }

    /// Produces the next token. Once the pattern is exhausted, every call
    /// yields the `End` token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let position = self.position();
        if self.rest.is_empty() {
            return Ok(Token {
                kind: TokenKind::End,
                lexeme: String::new(),
                position,
            });
        }
        match token(self.rest) {
            Ok((rest, (kind, lexeme))) => {
                self.rest = rest;
                Ok(Token {
                    kind,
                    lexeme: lexeme.to_string(),
                    position,
                })
            }
            Err(_) => Err(LexError { position }),
        }
    }
}

/// Tokenizes a whole pattern. The returned stream always ends with the
/// `End` token.
pub fn tokenize(pattern: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(pattern);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::End;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

fn token(input: &str) -> IResult<&str, (TokenKind, &str)> {
    alt((
        map(tag("(?:"), |s| (TokenKind::NonCapturingGroupStart, s)),
        // `\` + digit run is a backreference; `\` + anything else strips the
        // character of any special meaning
        map(preceded(metachar('\\'), digit1), |s| (TokenKind::Backref, s)),
        map(preceded(metachar('\\'), take(1usize)), |s| {
            (TokenKind::EscapedChar, s)
        }),
        dedicated('|', TokenKind::Or),
        dedicated('*', TokenKind::Star),
        dedicated('+', TokenKind::Plus),
        dedicated('?', TokenKind::Question),
        dedicated('(', TokenKind::GroupStart),
        dedicated(')', TokenKind::GroupEnd),
        dedicated('[', TokenKind::RangeStart),
        dedicated(']', TokenKind::RangeEnd),
        dedicated('{', TokenKind::RepeatStart),
        dedicated('}', TokenKind::RepeatEnd),
        dedicated(',', TokenKind::Comma),
        dedicated('.', TokenKind::AnyChar),
        dedicated('$', TokenKind::Empty),
        map(recognize(satisfy(|c: char| c.is_ascii_digit())), |s| {
            (TokenKind::Digit, s)
        }),
        // a lone trailing `\` must not fall through to here
        map(recognize(satisfy(|c| c != '\\')), |s| {
            (TokenKind::Literal, s)
        }),
    ))(input)
}

fn dedicated(c: char, kind: TokenKind) -> impl Fn(&str) -> IResult<&str, (TokenKind, &str)> {
    move |input| map(recognize(metachar(c)), |s: &str| (kind, s))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::token::TokenKind::*;

    fn kinds(pattern: &str) -> Vec<TokenKind> {
        tokenize(pattern)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn metacharacters_get_dedicated_tokens() {
        assert_eq!(
            kinds("a|b*c+d?(e).,$"),
            vec![
                Literal, Or, Literal, Star, Literal, Plus, Literal, Question, GroupStart, Literal,
                GroupEnd, AnyChar, Comma, Empty, End
            ]
        );
    }

    #[test]
    fn escapes_and_backrefs() {
        let tokens = tokenize(r"\*\a\12x").unwrap();
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![EscapedChar, EscapedChar, Backref, Literal, End]
        );
        assert_eq!(tokens[0].lexeme, "*");
        assert_eq!(tokens[2].lexeme, "12");
        assert_eq!(tokens[3].position, 7);
    }

    #[test]
    fn non_capturing_group_opener_is_one_token() {
        assert_eq!(kinds("(?:a)"), vec![NonCapturingGroupStart, Literal, GroupEnd, End]);
        // a bare `(?` is a group opener followed by a quantifier token
        assert_eq!(kinds("(?"), vec![GroupStart, Question, End]);
    }

    #[test]
    fn digits_and_repeat_braces() {
        assert_eq!(
            kinds("a{10,2}"),
            vec![Literal, RepeatStart, Digit, Digit, Comma, Digit, RepeatEnd, End]
        );
    }

    #[test]
    fn dangling_escape_is_an_error() {
        assert_eq!(tokenize("ab\\"), Err(LexError { position: 2 }));
    }

    #[test]
    fn empty_pattern_is_just_the_end_token() {
        assert_eq!(kinds(""), vec![End]);
    }
}
