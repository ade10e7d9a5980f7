//! Simulation driver.
//!
//! Provides the execution engine together with the pieces it is assembled from:
//! the opcode dispatch table, the run state, image loading and the function
//! symbol table.

/// Opcode id to handler table.
pub mod dispatch;
/// The execution engine.
pub mod engine;
/// Raw, ELF and built-in image loading.
pub mod loader;
/// Run state and halt information.
pub mod state;
/// Function symbol ranges.
pub mod symbols;

pub use dispatch::DispatchTable;
pub use engine::{Engine, MachineView, RunReport};
pub use state::{RunState, SimState};
pub use symbols::{Symbol, SymbolTable};
