//! Steppable RISC-V instruction-set simulator with an interactive debugger.
//!
//! This crate implements an RV64IM functional simulator driven one instruction at a time:
//! 1. **Engine:** Fetch, decode, dispatch and retire loop with run-state tracking and statistics.
//! 2. **ISA:** Pattern-based RV64IM decoder, per-opcode handlers and a disassembler.
//! 3. **Diagnostics:** Instruction ring trace, call/return tracing and a differential-test hook.
//! 4. **Debugger:** Expression lexer and evaluator, watchpoint pool and the command layer.
//! 5. **Simulation:** Image loading, configuration and physical memory.

/// Common types and constants (errors, register file, limits).
pub mod common;
/// Simulator configuration (defaults and JSON loading).
pub mod config;
/// Architectural CPU state, the machine context and the per-step decode record.
pub mod cpu;
/// Per-step diagnostics (instruction trace, call trace, difftest).
pub mod diag;
/// Instruction set (handler capability, decoding, disassembly, RV64IM).
pub mod isa;
/// Physical memory (RAM device and backing buffer).
pub mod memory;
/// Debugger surface (expressions, watchpoints, commands).
pub mod sdb;
/// Execution engine, dispatch table, run state and image loading.
pub mod sim;
/// Instruction count and host timing statistics.
pub mod stats;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// Machine context handed to opcode handlers.
pub use crate::cpu::Machine;
/// Reference RV64IM instruction set.
pub use crate::isa::rv64::Rv64;
/// Interactive command layer wrapping an engine.
pub use crate::sdb::Debugger;
/// Execution engine; construct with `Engine::new`.
pub use crate::sim::Engine;
