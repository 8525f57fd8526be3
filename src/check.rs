//! Syntax checks that run on the raw expression before conversion.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::lex::{Op, is_number_char};

#[derive(Error, Debug, Diagnostic)]
pub enum SyntaxError {
    #[error("Error: Cannot divide by zero.")]
    #[diagnostic(
        code(calc::division_by_zero),
        help("a `/` may not be followed directly by `0`")
    )]
    DivisionByZero {
        #[source_code]
        src: NamedSource<String>,
        #[label("division by zero")]
        span: SourceSpan,
    },

    #[error("Syntax Error: Operator without required operands.")]
    #[diagnostic(
        code(calc::missing_operand),
        help("every operator needs a number before it, and the expression must end with a number")
    )]
    MissingOperand {
        #[source_code]
        src: NamedSource<String>,
        #[label("operand missing here")]
        span: SourceSpan,
    },

    #[error("Syntax Error: Unmatched closing parenthesis.")]
    #[diagnostic(code(calc::unmatched_closing_paren), help("remove this `)` or add a `(` before it"))]
    UnmatchedClosingParen {
        #[source_code]
        src: NamedSource<String>,
        #[label("no `(` to close")]
        span: SourceSpan,
    },

    #[error("Syntax Error: Unmatched opening parenthesis.")]
    #[diagnostic(code(calc::unmatched_opening_paren), help("add a `)` to close this group"))]
    UnmatchedOpeningParen {
        #[source_code]
        src: NamedSource<String>,
        #[label("this `(` is never closed")]
        span: SourceSpan,
    },
}

impl SyntaxError {
    pub fn span(&self) -> SourceSpan {
        match self {
            SyntaxError::DivisionByZero { span, .. }
            | SyntaxError::MissingOperand { span, .. }
            | SyntaxError::UnmatchedClosingParen { span, .. }
            | SyntaxError::UnmatchedOpeningParen { span, .. } => *span,
        }
    }
}

fn source(expr: &str) -> NamedSource<String> {
    NamedSource::new("<input>", expr.to_string())
}

/// Runs every syntax check in priority order and stops at the first failure.
///
/// The order is division by zero, then operand presence, then parenthesis
/// balance. Character validation is expected to have happened already.
pub fn check_syntax(expr: &str) -> Result<(), SyntaxError> {
    check_division_by_zero(expr)?;
    check_operands(expr)?;
    check_parentheses(expr)?;
    log::debug!("syntax ok: {expr:?}");
    Ok(())
}

/// Fails when a `/` is immediately followed by the character `0`.
///
/// This is a lexical test on the raw text: `/ 0` and `/.0` pass, `/0.5` does not.
pub fn check_division_by_zero(expr: &str) -> Result<(), SyntaxError> {
    match expr.find("/0") {
        Some(at) => Err(SyntaxError::DivisionByZero {
            src: source(expr),
            span: SourceSpan::from(at..at + 2),
        }),
        None => Ok(()),
    }
}

/// Checks that operators have operands using a buffer of number characters.
///
/// Digits and `.` are pushed onto the buffer. An operator needs a non-empty
/// buffer and then pops the contiguous run of number characters on top of it.
/// After the scan the buffer must still hold something, so the expression has
/// to end with a number after its last operator (and the empty expression fails).
pub fn check_operands(expr: &str) -> Result<(), SyntaxError> {
    let mut buffer: Vec<char> = Vec::new();
    let mut last_operator = None;

    for (at, c) in expr.char_indices() {
        if is_number_char(c) {
            buffer.push(c);
        } else if Op::from_char(c).is_some() {
            if buffer.is_empty() {
                return Err(SyntaxError::MissingOperand {
                    src: source(expr),
                    span: SourceSpan::from(at..at + 1),
                });
            }
            while buffer.last().is_some_and(|&top| is_number_char(top)) {
                buffer.pop();
            }
            last_operator = Some(at);
        }
    }

    if buffer.is_empty() {
        let span = match last_operator {
            Some(at) => SourceSpan::from(at..at + 1),
            None => SourceSpan::from(expr.len()..expr.len()),
        };
        return Err(SyntaxError::MissingOperand {
            src: source(expr),
            span,
        });
    }
    Ok(())
}

/// Checks that every `(` has a matching `)` and vice versa.
pub fn check_parentheses(expr: &str) -> Result<(), SyntaxError> {
    let mut open: Vec<usize> = Vec::new();

    for (at, c) in expr.char_indices() {
        match c {
            '(' => open.push(at),
            ')' => {
                if open.pop().is_none() {
                    return Err(SyntaxError::UnmatchedClosingParen {
                        src: source(expr),
                        span: SourceSpan::from(at..at + 1),
                    });
                }
            }
            _ => {}
        }
    }

    match open.pop() {
        Some(at) => Err(SyntaxError::UnmatchedOpeningParen {
            src: source(expr),
            span: SourceSpan::from(at..at + 1),
        }),
        None => Ok(()),
    }
}
