use std::fmt::Display;

use crate::lex::{Lexer, Op, TokenKind};

/// One element of a postfix sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Term<'de> {
    Number { literal: &'de str, offset: usize },
    Operator { op: Op, offset: usize },
}

impl Term<'_> {
    /// Byte offset of the term in the infix expression.
    pub fn offset(&self) -> usize {
        match self {
            Term::Number { offset, .. } | Term::Operator { offset, .. } => *offset,
        }
    }
}

impl Display for Term<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Number { literal, .. } => write!(f, "{literal}"),
            Term::Operator { op, .. } => write!(f, "{op}"),
        }
    }
}

/// An expression in postfix order.
#[derive(Debug, Clone, PartialEq)]
pub struct Postfix<'de> {
    terms: Vec<Term<'de>>,
}

impl<'de> Postfix<'de> {
    pub fn iter(&self) -> std::slice::Iter<'_, Term<'de>> {
        self.terms.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.terms.len()
    }

    /// Scans the sequence with a depth counter (+1 per number, -1 per
    /// operator) and reports whether it never dips below zero and ends at one.
    pub fn is_well_formed(&self) -> bool {
        let mut depth: usize = 0;
        for term in &self.terms {
            match term {
                Term::Number { .. } => depth += 1,
                Term::Operator { .. } => {
                    if depth < 2 {
                        return false;
                    }
                    depth -= 1;
                }
            }
        }
        depth == 1
    }
}

impl Display for Postfix<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut terms = self.terms.iter();
        if let Some(first) = terms.next() {
            write!(f, "{first}")?;
            for term in terms {
                write!(f, " {term}")?;
            }
        }
        Ok(())
    }
}

/// Entries of the operator stack.
#[derive(Debug, Clone, Copy)]
enum Pending {
    LeftParen,
    Operator { op: Op, offset: usize },
}

/// Converts an infix expression to postfix with a flat-precedence shunting-yard.
///
/// All four operators share one precedence level: an incoming operator pops
/// every operator above the nearest `(` before it is pushed, so `2+3*4`
/// becomes `2 3 + 4 *`. The input is not re-validated. Characters outside
/// the alphabet are skipped and unbalanced parentheses never reach the output.
pub fn convert(expr: &str) -> Postfix<'_> {
    let mut output: Vec<Term<'_>> = Vec::new();
    let mut operators: Vec<Pending> = Vec::new();

    for token in Lexer::new(expr).filter_map(Result::ok) {
        match token.kind {
            TokenKind::Number => output.push(Term::Number {
                literal: token.literal,
                offset: token.offset,
            }),
            TokenKind::LeftParen => operators.push(Pending::LeftParen),
            TokenKind::RightParen => {
                drain_to_paren(&mut operators, &mut output);
                operators.pop();
            }
            TokenKind::Operator(op) => {
                drain_to_paren(&mut operators, &mut output);
                log::trace!("push {op}");
                operators.push(Pending::Operator {
                    op,
                    offset: token.offset,
                });
            }
        }
    }

    output.extend(operators.into_iter().rev().filter_map(|pending| match pending {
        Pending::Operator { op, offset } => Some(Term::Operator { op, offset }),
        Pending::LeftParen => None,
    }));

    let postfix = Postfix { terms: output };
    log::debug!("postfix: {postfix}");
    postfix
}

/// Moves operators from the stack to the output until a `(` (left in place) or the bottom.
fn drain_to_paren(operators: &mut Vec<Pending>, output: &mut Vec<Term<'_>>) {
    while let Some(&Pending::Operator { op, offset }) = operators.last() {
        log::trace!("emit {op}");
        output.push(Term::Operator { op, offset });
        operators.pop();
    }
}
