//! Shared test infrastructure.



/// A minimal instruction set implementing the `Isa` collaborator.
pub mod toy;
