//! Expression tokenizer.
//!
//! Rules are tried in a fixed order at every position and the first match wins,
//! so multi-character operators precede their one-character prefixes and hex
//! literals precede decimal ones. Whitespace is matched and dropped.

use crate::common::ExprError;
use crate::common::constants::{MAX_LEXEME_LEN, MAX_TOKENS};

/// Token type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Decimal literal.
    Num,
    /// `0x`-prefixed literal.
    Hex,
    /// `$name` register reference.
    Reg,
    /// Bare identifier; lexed but never resolved.
    Symbol,
    /// `+`
    Plus,
    /// Binary `-`.
    Minus,
    /// Binary `*`.
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `&&`
    LogAnd,
    /// `||`
    LogOr,
    /// `&`
    BitAnd,
    /// `^`
    BitXor,
    /// `|`
    BitOr,
    /// `!`
    Not,
    /// `~`
    BitNot,
    /// Prefix `*`: read one byte of memory.
    Deref,
    /// Prefix `-`: two's-complement negation.
    Neg,
}

impl TokenKind {
    /// True for literals, registers and symbols.
    pub const fn is_operand(self) -> bool {
        matches!(self, Self::Num | Self::Hex | Self::Reg | Self::Symbol)
    }

    /// True for prefix operators.
    pub const fn is_unary(self) -> bool {
        matches!(self, Self::Not | Self::BitNot | Self::Deref | Self::Neg)
    }

    /// Binding priority; a smaller number binds tighter. `None` for non-operators.
    pub const fn priority(self) -> Option<u8> {
        Some(match self {
            Self::Not | Self::BitNot | Self::Deref | Self::Neg => 2,
            Self::Star | Self::Slash | Self::Percent => 3,
            Self::Plus | Self::Minus => 4,
            Self::Shl | Self::Shr => 5,
            Self::Lt | Self::Gt | Self::Le | Self::Ge => 6,
            Self::Eq | Self::Ne => 7,
            Self::BitAnd => 8,
            Self::BitXor => 9,
            Self::BitOr => 10,
            Self::LogAnd => 11,
            Self::LogOr => 12,
            Self::Num
            | Self::Hex
            | Self::Reg
            | Self::Symbol
            | Self::LParen
            | Self::RParen => return None,
        })
    }
}

/// One lexeme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Token type.
    pub kind: TokenKind,
    /// Matched text.
    pub text: String,
}

/// Pattern side of a lexical rule.
#[derive(Clone, Copy, Debug)]
enum Pattern {
    /// `[ \t]+`
    Space,
    /// Exact text.
    Lit(&'static str),
    /// `0[xX][0-9a-fA-F]+`
    Hex,
    /// `[0-9]+`
    Dec,
    /// `\$[a-zA-Z0-9_]+`
    Reg,
    /// `[a-zA-Z][a-zA-Z0-9_]*`
    Ident,
}

impl Pattern {
    /// Length of the match at the start of `input`, or 0.
    fn match_len(self, input: &[u8]) -> usize {
        let run = |from: usize, ok: fn(u8) -> bool| {
            input[from..].iter().take_while(|&&b| ok(b)).count()
        };
        match self {
            Self::Space => run(0, |b| b == b' ' || b == b'\t'),
            Self::Lit(lit) => {
                if input.starts_with(lit.as_bytes()) {
                    lit.len()
                } else {
                    0
                }
            }
            Self::Hex => {
                if input.len() > 2 && input[0] == b'0' && matches!(input[1], b'x' | b'X') {
                    match run(2, |b| b.is_ascii_hexdigit()) {
                        0 => 0,
                        n => n + 2,
                    }
                } else {
                    0
                }
            }
            Self::Dec => run(0, |b| b.is_ascii_digit()),
            Self::Reg => {
                if input.first() == Some(&b'$') {
                    match run(1, |b| b.is_ascii_alphanumeric() || b == b'_') {
                        0 => 0,
                        n => n + 1,
                    }
                } else {
                    0
                }
            }
            Self::Ident => {
                if input.first().is_some_and(u8::is_ascii_alphabetic) {
                    run(0, |b| b.is_ascii_alphanumeric() || b == b'_')
                } else {
                    0
                }
            }
        }
    }
}

/// Rule table in priority order. `None` marks whitespace.
const RULES: &[(Pattern, Option<TokenKind>)] = &[
    (Pattern::Space, None),
    (Pattern::Lit("+"), Some(TokenKind::Plus)),
    (Pattern::Lit("-"), Some(TokenKind::Minus)),
    (Pattern::Lit("=="), Some(TokenKind::Eq)),
    (Pattern::Lit("!="), Some(TokenKind::Ne)),
    (Pattern::Hex, Some(TokenKind::Hex)),
    (Pattern::Dec, Some(TokenKind::Num)),
    (Pattern::Reg, Some(TokenKind::Reg)),
    (Pattern::Ident, Some(TokenKind::Symbol)),
    (Pattern::Lit("*"), Some(TokenKind::Star)),
    (Pattern::Lit("/"), Some(TokenKind::Slash)),
    (Pattern::Lit("%"), Some(TokenKind::Percent)),
    (Pattern::Lit("("), Some(TokenKind::LParen)),
    (Pattern::Lit(")"), Some(TokenKind::RParen)),
    (Pattern::Lit("<<"), Some(TokenKind::Shl)),
    (Pattern::Lit(">>"), Some(TokenKind::Shr)),
    (Pattern::Lit("<="), Some(TokenKind::Le)),
    (Pattern::Lit(">="), Some(TokenKind::Ge)),
    (Pattern::Lit("<"), Some(TokenKind::Lt)),
    (Pattern::Lit(">"), Some(TokenKind::Gt)),
    (Pattern::Lit("&&"), Some(TokenKind::LogAnd)),
    (Pattern::Lit("||"), Some(TokenKind::LogOr)),
    (Pattern::Lit("&"), Some(TokenKind::BitAnd)),
    (Pattern::Lit("^"), Some(TokenKind::BitXor)),
    (Pattern::Lit("|"), Some(TokenKind::BitOr)),
    (Pattern::Lit("!"), Some(TokenKind::Not)),
    (Pattern::Lit("~"), Some(TokenKind::BitNot)),
];

/// Splits `text` into tokens.
///
/// # Errors
///
/// * `ExprError::NoMatch` - no rule matches at some byte offset.
/// * `ExprError::LexemeTooLong` - a lexeme exceeds `MAX_LEXEME_LEN` bytes.
/// * `ExprError::TooManyTokens` - more than `MAX_TOKENS` tokens.
pub fn tokenize(text: &str) -> Result<Vec<Token>, ExprError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let rest = &bytes[pos..];
        let (rule, len, kind) = RULES
            .iter()
            .enumerate()
            .find_map(|(i, &(pat, kind))| match pat.match_len(rest) {
                0 => None,
                n => Some((i, n, kind)),
            })
            .ok_or(ExprError::NoMatch { pos })?;

        // Every rule matches ASCII only, so the slice is on char boundaries.
        let lexeme = &text[pos..pos + len];
        tracing::debug!(rule, pos, len, lexeme, "token rule matched");

        if let Some(kind) = kind {
            if len > MAX_LEXEME_LEN {
                return Err(ExprError::LexemeTooLong {
                    pos,
                    limit: MAX_LEXEME_LEN,
                });
            }
            if tokens.len() == MAX_TOKENS {
                return Err(ExprError::TooManyTokens { limit: MAX_TOKENS });
            }
            tokens.push(Token {
                kind,
                text: lexeme.to_owned(),
            });
        }
        pos += len;
    }
    Ok(tokens)
}
