//! CPU state and the machine context.
//!
//! This module defines what opcode handlers operate on:
//! 1. **Architectural State:** Program counter and integer register file.
//! 2. **Machine Context:** CPU state plus physical memory and the halt request
//!    a handler raises when the guest asks to stop.
//! 3. **Decode Record:** The per-step scratch record shared by decode, execute
//!    and the diagnostics.

/// Per-step decode record.
pub mod decode;

use std::fmt;

use crate::common::{MemError, RegisterFile};
use crate::memory::Memory;

pub use decode::Decode;

/// Architectural state of the simulated hart.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuState {
    /// Program counter.
    pub pc: u64,
    /// General-purpose registers.
    pub gpr: RegisterFile,
}

/// Stop request raised by a handler on behalf of the guest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaltRequest {
    /// Clean halt with an exit code; zero is a good trap.
    Exit(u64),
    /// Abnormal halt.
    Abort,
}

/// The simulated machine: CPU state and physical memory.
///
/// Only opcode handlers and the engine's pc update write to it.
pub struct Machine {
    /// Architectural CPU state.
    pub cpu: CpuState,
    /// Physical memory.
    pub mem: Box<dyn Memory>,
    halt: Option<HaltRequest>,
}

impl Machine {
    /// Creates a machine with zeroed registers and the pc at `pc`.
    pub fn new(mem: Box<dyn Memory>, pc: u64) -> Self {
        Self {
            cpu: CpuState {
                pc,
                gpr: RegisterFile::new(),
            },
            mem,
            halt: None,
        }
    }

    /// Reads a general-purpose register.
    #[inline(always)]
    pub fn reg(&self, idx: usize) -> u64 {
        self.cpu.gpr.read(idx)
    }

    /// Writes a general-purpose register; `x0` stays zero.
    #[inline(always)]
    pub fn set_reg(&mut self, idx: usize, val: u64) {
        self.cpu.gpr.write(idx, val);
    }

    /// Reads `len` bytes of physical memory.
    ///
    /// # Errors
    ///
    /// Propagates the memory device's `MemError`.
    #[inline]
    pub fn load(&self, addr: u64, len: usize) -> Result<u64, MemError> {
        self.mem.read(addr, len)
    }

    /// Writes `len` bytes of physical memory.
    ///
    /// # Errors
    ///
    /// Propagates the memory device's `MemError`.
    #[inline]
    pub fn store(&mut self, addr: u64, len: usize, val: u64) -> Result<(), MemError> {
        self.mem.write(addr, len, val)
    }

    /// Asks the engine to stop after the current instruction retires.
    pub fn request_halt(&mut self, req: HaltRequest) {
        self.halt = Some(req);
    }

    /// Takes the pending halt request, if any.
    pub(crate) fn take_halt(&mut self) -> Option<HaltRequest> {
        self.halt.take()
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("cpu", &self.cpu)
            .field("halt", &self.halt)
            .finish_non_exhaustive()
    }
}
