//! # Unit Components
//!
//! Tests grouped by the component they exercise through the public API.


/// Configuration defaults and JSON loading.
pub mod config;

/// Differential testing against a mocked reference stepper.
pub mod difftest;

/// Execution engine: step budgets, halts, aborts and traces.
pub mod engine;

/// Expression evaluation: precedence, unary operators and failures.
pub mod expr;

/// Raw, ELF and built-in image loading.
pub mod loader;

/// Watchpoint pool lifecycle and change detection.
pub mod watchpoint;
