//! Expression evaluation.
//!
//! An expression is tokenized once, then `*` and `-` are reclassified as
//! dereference and negation wherever they cannot be binary (first token, or
//! preceded by an operator or `(`). Evaluation recurses over half-open token
//! ranges:
//! 1. An empty range is a missing operand.
//! 2. A single token is a literal or register.
//! 3. A range wrapped in one matching pair of parentheses is unwrapped.
//! 4. Otherwise the loosest-binding operator outside parentheses splits the
//!    range. Among binary operators of equal priority the rightmost wins, which
//!    makes chains left-associative. Among prefix operators the leftmost wins, so
//!    `-~x` applies `~` first.
//!
//! Arithmetic is on unsigned 64-bit words with wrap-around. Comparisons and
//! logical operators yield 0 or 1.

use std::ops::Range;

use crate::common::ExprError;
use crate::sdb::lexer::{Token, TokenKind, tokenize};

/// Machine state an expression may read.
pub trait EvalContext {
    /// Value of the register named `name` (without the `$`).
    ///
    /// # Errors
    ///
    /// Returns `ExprError::UnknownRegister` for names outside the register table.
    fn register(&self, name: &str) -> Result<u64, ExprError>;

    /// One byte of physical memory.
    ///
    /// # Errors
    ///
    /// Returns `ExprError::BadAddress` if `addr` is outside physical memory.
    fn read_byte(&self, addr: u64) -> Result<u8, ExprError>;
}

/// A tokenized expression, ready to be evaluated any number of times.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expr {
    text: String,
    tokens: Vec<Token>,
}

impl Expr {
    /// Tokenizes `text` and resolves unary operators.
    ///
    /// # Errors
    ///
    /// Returns the lexer's `ExprError`.
    pub fn parse(text: &str) -> Result<Self, ExprError> {
        let mut tokens = tokenize(text)?;
        for i in 0..tokens.len() {
            let prefix_position = i == 0 || {
                let prev = tokens[i - 1].kind;
                !prev.is_operand() && prev != TokenKind::RParen
            };
            if prefix_position {
                match tokens[i].kind {
                    TokenKind::Star => tokens[i].kind = TokenKind::Deref,
                    TokenKind::Minus => tokens[i].kind = TokenKind::Neg,
                    _ => {}
                }
            }
        }
        Ok(Self {
            text: text.trim().to_owned(),
            tokens,
        })
    }

    /// The source text, trimmed.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The token sequence after unary reclassification.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Evaluates against machine state.
    ///
    /// # Errors
    ///
    /// Returns an `ExprError` for malformed expressions, unknown registers,
    /// unresolvable symbols, division by zero or unreadable memory.
    pub fn eval(&self, ctx: &dyn EvalContext) -> Result<u64, ExprError> {
        Evaluator {
            tokens: &self.tokens,
            ctx,
        }
        .eval(0..self.tokens.len())
    }
}

/// Parses and evaluates in one go.
///
/// # Errors
///
/// See `Expr::parse` and `Expr::eval`.
pub fn evaluate(text: &str, ctx: &dyn EvalContext) -> Result<u64, ExprError> {
    Expr::parse(text)?.eval(ctx)
}

struct Evaluator<'a> {
    tokens: &'a [Token],
    ctx: &'a dyn EvalContext,
}

impl Evaluator<'_> {
    fn eval(&self, r: Range<usize>) -> Result<u64, ExprError> {
        match r.len() {
            0 => Err(ExprError::MissingOperand),
            1 => self.operand(&self.tokens[r.start]),
            _ if self.wrapped(r.clone())? => self.eval(r.start + 1..r.end - 1),
            _ => {
                let op = self.main_operator(r.clone())?;
                let kind = self.tokens[op].kind;
                if kind.is_unary() {
                    if op != r.start {
                        return Err(ExprError::MisplacedUnary);
                    }
                    let val = self.eval(op + 1..r.end)?;
                    self.unary(kind, val)
                } else {
                    let lhs = self.eval(r.start..op)?;
                    let rhs = self.eval(op + 1..r.end)?;
                    binary(kind, lhs, rhs)
                }
            }
        }
    }

    fn operand(&self, tok: &Token) -> Result<u64, ExprError> {
        let bad = || ExprError::BadNumber(tok.text.clone());
        match tok.kind {
            TokenKind::Num => tok.text.parse().map_err(|_| bad()),
            TokenKind::Hex => u64::from_str_radix(&tok.text[2..], 16).map_err(|_| bad()),
            TokenKind::Reg => self.ctx.register(&tok.text[1..]),
            TokenKind::Symbol => Err(ExprError::UnresolvedSymbol(tok.text.clone())),
            _ => Err(ExprError::MissingOperand),
        }
    }

    /// True if the whole range is one parenthesized group.
    fn wrapped(&self, r: Range<usize>) -> Result<bool, ExprError> {
        if self.tokens[r.start].kind != TokenKind::LParen
            || self.tokens[r.end - 1].kind != TokenKind::RParen
        {
            return Ok(false);
        }
        let mut depth = 0usize;
        for i in r.clone() {
            match self.tokens[i].kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth = depth.checked_sub(1).ok_or(ExprError::Unbalanced)?;
                    if depth == 0 && i != r.end - 1 {
                        return Ok(false);
                    }
                }
                _ => {}
            }
        }
        if depth == 0 {
            Ok(true)
        } else {
            Err(ExprError::Unbalanced)
        }
    }

    /// Position of the operator the range splits at.
    fn main_operator(&self, r: Range<usize>) -> Result<usize, ExprError> {
        let mut depth = 0usize;
        let mut best: Option<(usize, u8)> = None;

        for i in r {
            let kind = self.tokens[i].kind;
            match kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth = depth.checked_sub(1).ok_or(ExprError::Unbalanced)?;
                }
                _ if depth > 0 => {}
                _ => {
                    let Some(prio) = kind.priority() else {
                        continue;
                    };
                    let take = match best {
                        None => true,
                        Some((_, cur)) if kind.is_unary() => prio > cur,
                        Some((_, cur)) => prio >= cur,
                    };
                    if take {
                        best = Some((i, prio));
                    }
                }
            }
        }

        if depth != 0 {
            return Err(ExprError::Unbalanced);
        }
        best.map(|(i, _)| i).ok_or(ExprError::MissingOperator)
    }

    fn unary(&self, kind: TokenKind, val: u64) -> Result<u64, ExprError> {
        Ok(match kind {
            TokenKind::Neg => val.wrapping_neg(),
            TokenKind::Not => u64::from(val == 0),
            TokenKind::BitNot => !val,
            _ => u64::from(self.ctx.read_byte(val)?),
        })
    }
}

fn binary(kind: TokenKind, l: u64, r: u64) -> Result<u64, ExprError> {
    Ok(match kind {
        TokenKind::Plus => l.wrapping_add(r),
        TokenKind::Minus => l.wrapping_sub(r),
        TokenKind::Star => l.wrapping_mul(r),
        TokenKind::Slash => l.checked_div(r).ok_or(ExprError::DivideByZero)?,
        TokenKind::Percent => l.checked_rem(r).ok_or(ExprError::DivideByZero)?,
        TokenKind::Shl => u32::try_from(r).ok().and_then(|s| l.checked_shl(s)).unwrap_or(0),
        TokenKind::Shr => u32::try_from(r).ok().and_then(|s| l.checked_shr(s)).unwrap_or(0),
        TokenKind::Eq => u64::from(l == r),
        TokenKind::Ne => u64::from(l != r),
        TokenKind::Lt => u64::from(l < r),
        TokenKind::Gt => u64::from(l > r),
        TokenKind::Le => u64::from(l <= r),
        TokenKind::Ge => u64::from(l >= r),
        TokenKind::LogAnd => u64::from(l != 0 && r != 0),
        TokenKind::LogOr => u64::from(l != 0 || r != 0),
        TokenKind::BitAnd => l & r,
        TokenKind::BitXor => l ^ r,
        _ => l | r,
    })
}
