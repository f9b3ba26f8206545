//! # Pattern parser
//! Turns a pattern string into an [Ast] in two steps: the [lexer] produces
//! a token stream (ending with an `End` token), and a recursive-descent
//! parser consumes it. Precedence is fixed by the grammar recursion:
//! alternation binds loosest, then concatenation, then quantifiers, then
//! atoms.
//!
//! ```text
//! regex      := term ('|' term)*
//! term       := factor*                    (zero factors is the empty string)
//! factor     := atom quantifier*
//! quantifier := '*' | '+' | '?' | '{' n (',' m?)? '}'
//! atom       := char | '.' | '$' | '(' regex ')' | '(?:' regex ')'
//!             | '[' class ']' | backreference
//! class      := '^'? item+ ;  item := char | char '-' char
//! ```
//!
//! Supported sugar: `x+` is `x{1,}`, `x?` is `x{0,1}`. `.` stands for any
//! printable character (newline and carriage return excluded). `$` is an
//! empty-string atom, not an end-of-string anchor; this follows the pattern
//! dialect this engine was built for and is called out in the crate docs.
//! Capturing groups are numbered left to right from 1; `(?:` groups are not
//! numbered. Digits and commas are ordinary characters outside `{...}`.
//!
//! ```
//! use redfa::ast::Ast;
//! use redfa::parser;
//!
//! let tokens = parser::tokenize("a|b").unwrap();
//! let ast = parser::parse(&tokens).unwrap();
//! assert_eq!(
//!     ast,
//!     Ast::Alt(Box::new(Ast::Char('a')), Box::new(Ast::Char('b')))
//! );
//! ```

pub mod lexer;
pub mod token;

use crate::ast::{printable, Ast, ClassItem};
use crate::parser::token::{Token, TokenKind};
pub use lexer::{tokenize, LexError, Lexer};
use thiserror::Error;

/// Parse failure, with the char offset it was detected at.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected token '{lexeme}' at position {position}")]
    UnexpectedToken { lexeme: String, position: usize },
    #[error("unterminated group opened at position {position}")]
    UnterminatedGroup { position: usize },
    #[error("unterminated character class opened at position {position}")]
    UnterminatedClass { position: usize },
    #[error("empty character class at position {position}")]
    EmptyClass { position: usize },
    #[error("malformed repetition bound at position {position}")]
    MalformedRepeat { position: usize },
    #[error("repetition bounds out of order ({min} > {max}) at position {position}")]
    RepeatBoundsOrder { min: u32, max: u32, position: usize },
    #[error("character span out of order ('{lo}' > '{hi}') at position {position}")]
    ClassSpanOrder { lo: char, hi: char, position: usize },
}

/// Parses a token stream (as produced by [tokenize]) into a syntax tree.
/// The whole stream must be consumed.
pub fn parse(tokens: &[Token]) -> Result<Ast, ParseError> {
    let mut parser = Parser::new(tokens);
    let ast = parser.regex()?;
    let trailing = parser.peek();
    if trailing.kind != TokenKind::End {
        return Err(ParseError::UnexpectedToken {
            lexeme: trailing.lexeme.clone(),
            position: trailing.position,
        });
    }
    Ok(ast)
}

struct Parser<'a> {
    tokens: &'a [Token],
    cursor: usize,
    groups: u32,
    end: Token,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        // Fabricated end token, returned if the caller's stream runs out
        let end = Token {
            kind: TokenKind::End,
            lexeme: String::new(),
            position: tokens.last().map_or(0, |t| t.position),
        };
        Self {
            tokens,
            cursor: 0,
            groups: 0,
            end,
        }
    }

    fn peek(&self) -> &Token {
        self.peek_ahead(0)
    }

    fn peek_ahead(&self, offset: usize) -> &Token {
        self.tokens.get(self.cursor + offset).unwrap_or(&self.end)
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::End {
            self.cursor += 1;
        }
        token
    }

    fn regex(&mut self) -> Result<Ast, ParseError> {
        let mut node = self.term()?;
        while self.peek().kind == TokenKind::Or {
            self.bump();
            let right = self.term()?;
            node = Ast::Alt(Box::new(node), Box::new(right));
        }
        Ok(node)
    }

    fn term(&mut self) -> Result<Ast, ParseError> {
        let mut factors = Vec::new();
        while self.starts_atom() {
            factors.push(self.factor()?);
        }
        let mut iter = factors.into_iter();
        match iter.next() {
            None => Ok(Ast::Empty),
            Some(first) => Ok(iter.fold(first, |l, r| Ast::Concat(Box::new(l), Box::new(r)))),
        }
    }

    fn starts_atom(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Literal
                | TokenKind::EscapedChar
                | TokenKind::Digit
                | TokenKind::Comma
                | TokenKind::AnyChar
                | TokenKind::Empty
                | TokenKind::GroupStart
                | TokenKind::NonCapturingGroupStart
                | TokenKind::RangeStart
                | TokenKind::Backref
        )
    }

    fn factor(&mut self) -> Result<Ast, ParseError> {
        let mut node = self.atom()?;
        loop {
            match self.peek().kind {
                TokenKind::Star => {
                    self.bump();
                    node = Ast::Star(Box::new(node));
                }
                TokenKind::Plus => {
                    self.bump();
                    node = Ast::Repeat {
                        child: Box::new(node),
                        min: 1,
                        max: None,
                    };
                }
                TokenKind::Question => {
                    self.bump();
                    node = Ast::Repeat {
                        child: Box::new(node),
                        min: 0,
                        max: Some(1),
                    };
                }
                TokenKind::RepeatStart => node = self.repeat(node)?,
                _ => return Ok(node),
            }
        }
    }

    fn atom(&mut self) -> Result<Ast, ParseError> {
        let token = self.bump();
        match token.kind {
            TokenKind::Literal
            | TokenKind::EscapedChar
            | TokenKind::Digit
            | TokenKind::Comma => match token.char() {
                Some(c) => Ok(Ast::Char(c)),
                None => Err(ParseError::UnexpectedToken {
                    lexeme: token.lexeme,
                    position: token.position,
                }),
            },
            TokenKind::AnyChar => Ok(Ast::CharSet(printable().collect())),
            TokenKind::Empty => Ok(Ast::Empty),
            TokenKind::GroupStart => {
                self.groups += 1;
                let index = self.groups;
                let child = self.regex()?;
                self.expect_group_end(token.position)?;
                Ok(Ast::Group {
                    child: Box::new(child),
                    capturing: true,
                    index: Some(index),
                })
            }
            TokenKind::NonCapturingGroupStart => {
                let child = self.regex()?;
                self.expect_group_end(token.position)?;
                Ok(Ast::Group {
                    child: Box::new(child),
                    capturing: false,
                    index: None,
                })
            }
            TokenKind::RangeStart => self.class(token.position),
            TokenKind::Backref => match token.lexeme.parse() {
                Ok(group) => Ok(Ast::Backref(group)),
                Err(_) => Err(ParseError::UnexpectedToken {
                    lexeme: token.lexeme,
                    position: token.position,
                }),
            },
            _ => Err(ParseError::UnexpectedToken {
                lexeme: token.lexeme,
                position: token.position,
            }),
        }
    }

    fn expect_group_end(&mut self, opened_at: usize) -> Result<(), ParseError> {
        match self.peek().kind {
            TokenKind::GroupEnd => {
                self.bump();
                Ok(())
            }
            TokenKind::End => Err(ParseError::UnterminatedGroup {
                position: opened_at,
            }),
            _ => {
                let token = self.peek();
                Err(ParseError::UnexpectedToken {
                    lexeme: token.lexeme.clone(),
                    position: token.position,
                })
            }
        }
    }

    /// Parses `{n}`, `{n,}` or `{n,m}`, the opening brace not yet consumed.
    fn repeat(&mut self, child: Ast) -> Result<Ast, ParseError> {
        self.bump();
        let at = self.peek().position;
        let Some(min) = self.number() else {
            return Err(ParseError::MalformedRepeat { position: at });
        };
        let node = if self.peek().kind == TokenKind::Comma {
            self.bump();
            if self.peek().kind == TokenKind::Digit {
                let at = self.peek().position;
                let Some(max) = self.number() else {
                    return Err(ParseError::MalformedRepeat { position: at });
                };
                if min > max {
                    return Err(ParseError::RepeatBoundsOrder {
                        min,
                        max,
                        position: at,
                    });
                }
                Ast::Repeat {
                    child: Box::new(child),
                    min,
                    max: Some(max),
                }
            } else {
                Ast::Repeat {
                    child: Box::new(child),
                    min,
                    max: None,
                }
            }
        } else {
            Ast::RepeatExact(Box::new(child), min)
        };
        if self.peek().kind != TokenKind::RepeatEnd {
            let token = self.peek();
            return Err(ParseError::MalformedRepeat {
                position: token.position,
            });
        }
        self.bump();
        Ok(node)
    }

    /// Consumes a run of digit tokens as one number. `None` when there is no
    /// digit or the number overflows.
    fn number(&mut self) -> Option<u32> {
        let mut digits = String::new();
        while self.peek().kind == TokenKind::Digit {
            digits.push_str(&self.bump().lexeme);
        }
        digits.parse().ok()
    }

    /// Parses the inside of `[...]`, the opening bracket already consumed.
    fn class(&mut self, opened_at: usize) -> Result<Ast, ParseError> {
        let mut negated = false;
        if self.peek().kind == TokenKind::Literal && self.peek().lexeme == "^" {
            negated = true;
            self.bump();
        }
        let mut items = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::RangeEnd => {
                    self.bump();
                    break;
                }
                TokenKind::End => {
                    return Err(ParseError::UnterminatedClass {
                        position: opened_at,
                    })
                }
                _ => {
                    let token = self.bump();
                    // multi-char tokens lose their meaning inside a class and
                    // contribute their characters one by one
                    if matches!(
                        token.kind,
                        TokenKind::NonCapturingGroupStart | TokenKind::Backref
                    ) {
                        items.extend(token.lexeme.chars().map(ClassItem::Single));
                        continue;
                    }
                    let Some(lo) = token.char() else {
                        return Err(ParseError::UnexpectedToken {
                            lexeme: token.lexeme,
                            position: token.position,
                        });
                    };
                    // An unescaped `-` between two characters forms a span; a
                    // trailing `-` is an ordinary character
                    let dash = self.peek().kind == TokenKind::Literal && self.peek().lexeme == "-";
                    let closes = matches!(
                        self.peek_ahead(1).kind,
                        TokenKind::RangeEnd | TokenKind::End
                    );
                    if dash && !closes {
                        self.bump();
                        let hi_token = self.bump();
                        let Some(hi) = hi_token.char() else {
                            return Err(ParseError::UnexpectedToken {
                                lexeme: hi_token.lexeme,
                                position: hi_token.position,
                            });
                        };
                        if lo > hi {
                            return Err(ParseError::ClassSpanOrder {
                                lo,
                                hi,
                                position: hi_token.position,
                            });
                        }
                        items.push(ClassItem::Span(lo, hi));
                    } else {
                        items.push(ClassItem::Single(lo));
                    }
                }
            }
        }
        if items.is_empty() {
            return Err(ParseError::EmptyClass {
                position: opened_at,
            });
        }
        Ok(Ast::Range { items, negated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ast::*;

    fn parsed(pattern: &str) -> Ast {
        parse(&tokenize(pattern).unwrap()).unwrap()
    }

    fn error(pattern: &str) -> ParseError {
        parse(&tokenize(pattern).unwrap()).unwrap_err()
    }

    #[test]
    fn precedence_alternation_concatenation_quantifier() {
        // a|bc* parses as a | (b (c*))
        assert_eq!(
            parsed("a|bc*"),
            Alt(
                Box::new(Char('a')),
                Box::new(Concat(
                    Box::new(Char('b')),
                    Box::new(Star(Box::new(Char('c'))))
                ))
            )
        );
    }

    #[test]
    fn quantifier_sugar() {
        assert_eq!(
            parsed("a+"),
            Repeat {
                child: Box::new(Char('a')),
                min: 1,
                max: None
            }
        );
        assert_eq!(
            parsed("a?"),
            Repeat {
                child: Box::new(Char('a')),
                min: 0,
                max: Some(1)
            }
        );
        assert_eq!(parsed("a{3}"), RepeatExact(Box::new(Char('a')), 3));
        assert_eq!(
            parsed("a{2,5}"),
            Repeat {
                child: Box::new(Char('a')),
                min: 2,
                max: Some(5)
            }
        );
        assert_eq!(
            parsed("a{12,}"),
            Repeat {
                child: Box::new(Char('a')),
                min: 12,
                max: None
            }
        );
    }

    #[test]
    fn empty_terms() {
        assert_eq!(parsed(""), Empty);
        assert_eq!(parsed("$"), Empty);
        assert_eq!(parsed("a|"), Alt(Box::new(Char('a')), Box::new(Empty)));
    }

    #[test]
    fn group_numbering_skips_non_capturing_groups() {
        let ast = parsed("(a)(?:b)(c)");
        let Concat(left, last) = ast else {
            panic!("expected concatenation")
        };
        let Concat(first, middle) = *left else {
            panic!("expected concatenation")
        };
        assert!(matches!(
            *first,
            Group {
                capturing: true,
                index: Some(1),
                ..
            }
        ));
        assert!(matches!(
            *middle,
            Group {
                capturing: false,
                index: None,
                ..
            }
        ));
        assert!(matches!(
            *last,
            Group {
                capturing: true,
                index: Some(2),
                ..
            }
        ));
    }

    #[test]
    fn character_classes() {
        assert_eq!(
            parsed("[a-cx]"),
            Range {
                items: vec![ClassItem::Span('a', 'c'), ClassItem::Single('x')],
                negated: false,
            }
        );
        assert_eq!(
            parsed("[^ab]"),
            Range {
                items: vec![ClassItem::Single('a'), ClassItem::Single('b')],
                negated: true,
            }
        );
        // trailing dash is an ordinary character
        assert_eq!(
            parsed("[a-]"),
            Range {
                items: vec![ClassItem::Single('a'), ClassItem::Single('-')],
                negated: false,
            }
        );
        // an escaped dash never forms a span
        assert_eq!(
            parsed(r"[a\-z]"),
            Range {
                items: vec![
                    ClassItem::Single('a'),
                    ClassItem::Single('-'),
                    ClassItem::Single('z')
                ],
                negated: false,
            }
        );
    }

    #[test]
    fn digits_and_commas_are_literals_outside_braces() {
        assert_eq!(
            parsed("1,"),
            Concat(Box::new(Char('1')), Box::new(Char(',')))
        );
    }

    #[test]
    fn backrefs_parse() {
        assert_eq!(parsed(r"\3"), Backref(3));
    }

    #[test]
    fn reported_errors() {
        assert_eq!(error("(a"), ParseError::UnterminatedGroup { position: 0 });
        assert_eq!(error("x[ab"), ParseError::UnterminatedClass { position: 1 });
        assert_eq!(error("[]"), ParseError::EmptyClass { position: 0 });
        assert_eq!(error("a{"), ParseError::MalformedRepeat { position: 2 });
        assert_eq!(error("a{x}"), ParseError::MalformedRepeat { position: 2 });
        assert_eq!(
            error("a{3,1}"),
            ParseError::RepeatBoundsOrder {
                min: 3,
                max: 1,
                position: 4
            }
        );
        assert_eq!(
            error("[b-a]"),
            ParseError::ClassSpanOrder {
                lo: 'b',
                hi: 'a',
                position: 3
            }
        );
        assert_eq!(
            error("a)"),
            ParseError::UnexpectedToken {
                lexeme: ")".to_string(),
                position: 1
            }
        );
    }
}
