//! Error definitions.
//!
//! This module defines the error handling for the simulator. It provides:
//! 1. **Memory Errors:** Out-of-range or malformed physical accesses.
//! 2. **Simulation Errors:** Failures that end a run (decode, fetch, image loading).
//! 3. **Debugger Errors:** Lexing, evaluation, watchpoint and command failures that leave the
//!    debugger running.

use thiserror::Error;

/// Failure of a physical memory access.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MemError {
    /// The access touched bytes outside the RAM window.
    #[error("address {addr:#x} (len {len}) is outside physical memory [{base:#x}, {end:#x})")]
    OutOfBounds {
        /// First byte of the access.
        addr: u64,
        /// Width of the access in bytes.
        len: usize,
        /// First valid physical address.
        base: u64,
        /// One past the last valid physical address.
        end: u64,
    },

    /// The access width is not 1, 2, 4 or 8 bytes.
    #[error("unsupported access width {0}")]
    BadWidth(usize),
}

/// Failure that stops the current run.
///
/// Any of these raised while an instruction is in flight moves the simulator
/// to the aborted state.
#[derive(Debug, Error)]
pub enum SimError {
    /// No instruction pattern matched the fetched word.
    #[error("invalid instruction {raw:#010x} at pc = {pc:#x}")]
    InvalidInstruction {
        /// Address of the instruction.
        pc: u64,
        /// The raw encoding.
        raw: u32,
    },

    /// The instruction word could not be read.
    #[error("instruction fetch failed at pc = {pc:#x}: {source}")]
    Fetch {
        /// Address of the failed fetch.
        pc: u64,
        /// Underlying memory failure.
        #[source]
        source: MemError,
    },

    /// A load or store issued by an instruction failed.
    #[error(transparent)]
    Memory(#[from] MemError),

    /// The differential-test collaborator reported diverging state.
    #[error(transparent)]
    Diff(#[from] DiffMismatch),

    /// An image file could not be read from disk.
    #[error("cannot read image '{path}': {source}")]
    Io {
        /// Path that was opened.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// An ELF image could not be parsed.
    #[error("malformed ELF image: {0}")]
    Elf(String),

    /// A configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Divergence reported by a differential-test reference stepper.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("difftest mismatch at pc = {pc:#x}: {what}")]
pub struct DiffMismatch {
    /// Address of the instruction after which the states diverged.
    pub pc: u64,
    /// Description of the diverging state.
    pub what: String,
}

/// Failure to lex or evaluate a debugger expression.
///
/// These never touch simulator state; the caller reports them and carries on.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExprError {
    /// No lexical rule matched at the given byte offset.
    #[error("no match at position {pos}")]
    NoMatch {
        /// Byte offset of the unrecognised input.
        pos: usize,
    },

    /// The expression produced more tokens than the lexer holds.
    #[error("too many tokens (limit {limit})")]
    TooManyTokens {
        /// Token capacity.
        limit: usize,
    },

    /// A single lexeme exceeded the maximum length.
    #[error("token at position {pos} is longer than {limit} characters")]
    LexemeTooLong {
        /// Byte offset of the lexeme.
        pos: usize,
        /// Maximum lexeme length.
        limit: usize,
    },

    /// The expression or one of its operands is empty.
    #[error("missing operand")]
    MissingOperand,

    /// Two operands appear with no operator between them.
    #[error("missing operator")]
    MissingOperator,

    /// Parentheses do not pair up.
    #[error("unbalanced parentheses")]
    Unbalanced,

    /// A prefix operator has tokens on its left.
    #[error("unexpected operand before unary operator")]
    MisplacedUnary,

    /// A numeric literal does not fit a machine word.
    #[error("invalid number '{0}'")]
    BadNumber(String),

    /// The register name is not in the register table.
    #[error("unknown register '{0}'")]
    UnknownRegister(String),

    /// Symbol names are lexed but not resolved.
    #[error("cannot resolve symbol '{0}'")]
    UnresolvedSymbol(String),

    /// Division or remainder with a zero divisor.
    #[error("division by zero")]
    DivideByZero,

    /// Dereference of an address outside physical memory.
    #[error("cannot access memory at {0:#x}")]
    BadAddress(u64),
}

/// Failure of a watchpoint operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WatchError {
    /// Every slot of the pool is active.
    #[error("no free watchpoint (all {0} slots in use)")]
    PoolFull(usize),

    /// No active watchpoint carries this number.
    #[error("watchpoint {0} does not exist")]
    NotFound(usize),

    /// The expression text does not fit a slot.
    #[error("expression is longer than {0} bytes")]
    TooLong(usize),

    /// The expression does not lex or evaluate.
    #[error("invalid expression: {0}")]
    Expr(#[from] ExprError),
}

/// Failure of a debugger command.
///
/// Reported to the user; the command loop keeps running.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SdbError {
    /// The command needs an argument that was not given.
    #[error("usage: {0}")]
    Usage(&'static str),

    /// An argument is not a valid number.
    #[error("invalid number '{0}'")]
    BadCount(String),

    /// An `info` subcommand other than `r` or `w`.
    #[error("unknown info subcommand '{0}' (expected r or w)")]
    UnknownInfo(String),

    /// The command name is not in the command table.
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    /// The expression argument failed to lex or evaluate.
    #[error("invalid expression: {0}")]
    Expr(#[from] ExprError),

    /// A watchpoint operation failed.
    #[error(transparent)]
    Watch(#[from] WatchError),

    /// A memory scan left physical memory.
    #[error(transparent)]
    Memory(#[from] MemError),
}
