//! Simple debugger.
//!
//! The operator-facing half of the simulator. It provides:
//! 1. **Lexer:** Ordered-rule tokenizer for query and watch expressions.
//! 2. **Evaluator:** Precedence-splitting evaluator with context-sensitive prefix operators.
//! 3. **Watchpoints:** Fixed pool of watched expressions checked after every step.
//! 4. **Commands:** The `(rvdb)` command loop.

/// Command table and loop.
pub mod command;
/// Expression evaluation.
pub mod expr;
/// Expression tokenizer.
pub mod lexer;
/// Watchpoint pool.
pub mod watchpoint;

pub use command::{Debugger, Flow};
pub use expr::{EvalContext, Expr};
pub use watchpoint::{WatchChange, WatchInfo, WatchPool};
