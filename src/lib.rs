//! Infix arithmetic through postfix notation.
//!
//! An expression goes through four stages, each of which can stop it:
//! character validation ([`lex`]), syntax checks ([`check`]), conversion to
//! postfix ([`parse`]) and evaluation of the postfix sequence ([`eval`]).
//! All four operators share one precedence level, so `2+3*4` is `20`.

use miette::Diagnostic;
use thiserror::Error;

pub mod check;
pub mod eval;
pub mod lex;
pub mod parse;

pub use check::{SyntaxError, check_syntax};
pub use eval::{EvalError, evaluate};
pub use lex::{InvalidCharacter, Lexer, Op, Token, TokenKind, validate_characters};
pub use parse::{Postfix, Term, convert};

#[derive(Error, Debug, Diagnostic)]
pub enum CalcError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] InvalidCharacter),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Eval(#[from] EvalError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Calculation<'de> {
    pub postfix: Postfix<'de>,
    pub value: f64,
}

/// Runs the whole pipeline on one expression.
pub fn calculate(expr: &str) -> Result<Calculation<'_>, CalcError> {
    validate_characters(expr)?;
    check_syntax(expr)?;
    let postfix = convert(expr);
    let value = evaluate(&postfix)?;
    log::debug!("{expr:?} = {value}");
    Ok(Calculation { postfix, value })
}
