//! Common utilities and types used throughout the simulator.
//!
//! This module provides the building blocks shared by every component:
//! 1. **Constants:** Fixed capacities of the debugger and engine.
//! 2. **Error Handling:** One error enum per concern, derived with `thiserror`.
//! 3. **Register Management:** The general-purpose register file.
//! 4. **Console:** Line output to the user's terminal.

/// Line output that logs failed writes.
pub mod console;

/// Fixed limits and sentinels.
pub mod constants;

/// Error types for memory, execution, expressions and watchpoints.
pub mod error;

/// Register file implementation.
pub mod reg;

pub use error::{DiffMismatch, ExprError, MemError, SdbError, SimError, WatchError};
pub use reg::RegisterFile;
