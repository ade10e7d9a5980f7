//! General-Purpose Register File.
//!
//! This module implements the integer register file of the simulated hart.
//! It performs the following:
//! 1. **Storage:** Maintains 32 integer registers (`x0`-`x31`).
//! 2. **Invariant Enforcement:** Register `x0` reads as zero and ignores writes.
//! 3. **Observability:** Formats the register state for the debugger.

use super::constants::NR_GPR;

/// Integer register file.
///
/// Indexed by architectural register number. Register `x0` is hardwired to zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [u64; NR_GPR],
}

impl RegisterFile {
    /// Creates a new register file with all registers initialized to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a general-purpose register.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31). Register `x0` always returns 0.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not a valid register index.
    #[inline(always)]
    pub fn read(&self, idx: usize) -> u64 {
        if idx == 0 { 0 } else { self.regs[idx] }
    }

    /// Writes a general-purpose register. Writes to `x0` are ignored.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    /// * `val` - The 64-bit value to write.
    #[inline(always)]
    pub fn write(&mut self, idx: usize, val: u64) {
        if idx != 0 {
            self.regs[idx] = val;
        }
    }

    /// Formats all registers, four per line, using the supplied names.
    ///
    /// # Arguments
    ///
    /// * `name` - Maps a register index to its display name.
    pub fn dump(&self, name: impl Fn(usize) -> &'static str) -> Vec<String> {
        (0..NR_GPR)
            .step_by(4)
            .map(|row| {
                (row..row + 4)
                    .map(|i| format!("{:<4}:{:#018x}", name(i), self.read(i)))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect()
    }
}
