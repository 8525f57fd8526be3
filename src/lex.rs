use std::fmt::Display;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
#[error("Invalid input: Please use numbers and valid operators only.")]
#[diagnostic(
    code(calc::invalid_character),
    help("remove or replace `{token}`: only digits, `.`, `+ - * /`, parentheses and spaces are allowed")
)]
pub struct InvalidCharacter {
    #[source_code]
    src: NamedSource<String>,

    #[label("this character")]
    bad_bit: SourceSpan,

    pub token: char,
}

impl InvalidCharacter {
    pub fn new(whole: &str, offset: usize, token: char) -> Self {
        InvalidCharacter {
            src: NamedSource::new("<input>", whole.to_string()),
            bad_bit: SourceSpan::from(offset..offset + token.len_utf8()),
            token,
        }
    }

    /// Byte offset of the offending character.
    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Plus,
    Minus,
    Star,
    Slash,
}

impl Op {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Op::Plus),
            '-' => Some(Op::Minus),
            '*' => Some(Op::Star),
            '/' => Some(Op::Slash),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Op::Plus => '+',
            Op::Minus => '-',
            Op::Star => '*',
            Op::Slash => '/',
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    /// Byte offset of the token in the expression.
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    Operator(Op),
    LeftParen,
    RightParen,
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            TokenKind::Number => write!(f, "NUMBER {lit}"),
            TokenKind::Operator(Op::Plus) => write!(f, "PLUS {lit}"),
            TokenKind::Operator(Op::Minus) => write!(f, "MINUS {lit}"),
            TokenKind::Operator(Op::Star) => write!(f, "STAR {lit}"),
            TokenKind::Operator(Op::Slash) => write!(f, "SLASH {lit}"),
            TokenKind::LeftParen => write!(f, "LEFT_PAREN {lit}"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN {lit}"),
        }
    }
}

pub(crate) fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

fn is_allowed(c: char) -> bool {
    is_number_char(c) || Op::from_char(c).is_some() || matches!(c, ' ' | '(' | ')')
}

/// Rejects the expression at its first character outside the calculator alphabet.
pub fn validate_characters(expr: &str) -> Result<(), InvalidCharacter> {
    match expr.char_indices().find(|&(_, c)| !is_allowed(c)) {
        Some((offset, token)) => {
            log::debug!("invalid character {token:?} at byte {offset}");
            Err(InvalidCharacter::new(expr, offset, token))
        }
        None => Ok(()),
    }
}

pub struct Lexer<'de> {
    whole: &'de str,
    rest: &'de str,
    byte: usize,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer {
            whole: input,
            rest: input,
            byte: 0,
        }
    }
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Result<Token<'de>, InvalidCharacter>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            let offset = self.byte;
            let literal = &self.rest[..c.len_utf8()];
            let cur = self.rest;
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            let process = |kind: TokenKind| {
                Some(Ok(Token {
                    kind,
                    literal,
                    offset,
                }))
            };

            match c {
                '(' => return process(TokenKind::LeftParen),
                ')' => return process(TokenKind::RightParen),
                ' ' => continue,
                c if is_number_char(c) => {
                    let end = cur.find(|c| !is_number_char(c)).unwrap_or(cur.len());
                    let literal = &cur[..end];

                    let extra_bytes = literal.len() - c.len_utf8();
                    self.byte += extra_bytes;
                    self.rest = &self.rest[extra_bytes..];

                    return Some(Ok(Token {
                        kind: TokenKind::Number,
                        literal,
                        offset,
                    }));
                }
                c => {
                    if let Some(op) = Op::from_char(c) {
                        return process(TokenKind::Operator(op));
                    }
                    return Some(Err(InvalidCharacter::new(self.whole, offset, c)));
                }
            }
        }
    }
}
