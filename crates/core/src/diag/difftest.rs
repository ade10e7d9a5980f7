//! Differential-test hook.
//!
//! After every retired instruction the engine hands the reference stepper the
//! pc that was executed, the pc about to execute and the resulting CPU state.
//! How the reference runs and how it compares state is its own business.

use crate::common::DiffMismatch;
use crate::cpu::CpuState;

/// Reference-implementation stepper.
pub trait DiffTest {
    /// Advances the reference by one instruction and compares.
    ///
    /// # Arguments
    ///
    /// * `pc` - Address of the instruction just retired.
    /// * `npc` - Address of the next instruction.
    /// * `cpu` - State of this simulator after the instruction.
    ///
    /// # Errors
    ///
    /// Returns `DiffMismatch` if the reference disagrees; the engine aborts the run.
    fn step(&mut self, pc: u64, npc: u64, cpu: &CpuState) -> Result<(), DiffMismatch>;
}
