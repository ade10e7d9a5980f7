//! Fixed capacities and sentinel values.

/// Number of architectural general-purpose registers.
pub const NR_GPR: usize = 32;

/// Step budget meaning "run until the guest halts".
pub const RUN_UNBOUNDED: u64 = u64::MAX;

/// Maximum number of tokens an expression may lex into.
pub const MAX_TOKENS: usize = 32;

/// Maximum length in bytes of a single lexeme.
pub const MAX_LEXEME_LEN: usize = 32;

/// Number of slots in the watchpoint pool.
pub const WATCH_POOL_SIZE: usize = 32;

/// Maximum length in bytes of a watched expression.
pub const WATCH_EXPR_MAX: usize = 64;

/// Widest instruction encoding, in bytes. Trace lines pad raw bytes to this width.
pub const INSTR_BYTES_MAX: usize = 4;
