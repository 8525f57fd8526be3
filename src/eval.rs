use std::num::ParseFloatError;

use miette::Diagnostic;
use thiserror::Error;

use crate::{
    lex::Op,
    parse::{Postfix, Term},
};

#[derive(Error, Debug, Diagnostic)]
pub enum EvalError {
    #[error("Evaluation Error: operator `{op}` needs two operands but only {found} available")]
    #[diagnostic(
        code(calc::stack_underflow),
        help("the postfix sequence has an operator before enough numbers")
    )]
    StackUnderflow {
        op: Op,
        /// Index of the operator in the postfix sequence.
        position: usize,
        found: usize,
    },

    #[error("Evaluation Error: expected exactly one value at the end, found {remaining}")]
    #[diagnostic(code(calc::malformed_postfix))]
    MalformedPostfix { remaining: usize },

    #[error("Evaluation Error: `{literal}` is not a number")]
    #[diagnostic(
        code(calc::invalid_number),
        url("https://doc.rust-lang.org/std/num/struct.ParseFloatError.html"),
        help("a number may contain at most one `.` and at least one digit")
    )]
    InvalidNumber {
        literal: String,
        #[source]
        source: ParseFloatError,
    },
}

fn apply(op: Op, lhs: f64, rhs: f64) -> f64 {
    match op {
        Op::Plus => lhs + rhs,
        Op::Minus => lhs - rhs,
        Op::Star => lhs * rhs,
        // no zero guard: a divisor that evaluates to zero gives inf or NaN
        Op::Slash => lhs / rhs,
    }
}

/// Evaluates a postfix sequence with a value stack.
///
/// Each operator pops its right operand first, then its left one.
pub fn evaluate(postfix: &Postfix<'_>) -> Result<f64, EvalError> {
    let mut values: Vec<f64> = Vec::with_capacity(postfix.len());

    for (position, term) in postfix.iter().enumerate() {
        match *term {
            Term::Number { literal, .. } => {
                let value = literal
                    .parse::<f64>()
                    .map_err(|source| EvalError::InvalidNumber {
                        literal: literal.to_string(),
                        source,
                    })?;
                log::trace!("push {value}");
                values.push(value);
            }
            Term::Operator { op, .. } => {
                let found = values.len();
                let (Some(rhs), Some(lhs)) = (values.pop(), values.pop()) else {
                    return Err(EvalError::StackUnderflow {
                        op,
                        position,
                        found,
                    });
                };
                let result = apply(op, lhs, rhs);
                log::trace!("{lhs} {op} {rhs} = {result}");
                values.push(result);
            }
        }
    }

    match values.as_slice() {
        [value] => Ok(*value),
        rest => Err(EvalError::MalformedPostfix {
            remaining: rest.len(),
        }),
    }
}
