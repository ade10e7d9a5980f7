//! Instruction Set Architecture (ISA) interface.
//!
//! The engine never interprets instruction bits itself; it asks an `Isa` to
//! fetch and decode, then dispatches on the returned opcode id. This module provides:
//! 1. **Handler Capability:** `Handler`, the single "execute" operation every opcode implements.
//! 2. **Instruction List:** `InstrEntry`, the static list an ISA hands to the dispatch table.
//! 3. **ISA Collaborator:** `Isa`, fetch/decode, disassembly and register naming.
//! 4. **RV64IM:** The reference implementation in `rv64`.

/// ABI register names and lookup.
pub mod abi;
/// Immediate extraction for the base instruction formats.
pub mod decode;
/// Mnemonic rendering for trace lines.
pub mod disasm;
/// Major opcodes and function codes of RV64IM.
pub mod encoding;
/// Instruction field accessors and the decoded-instruction record.
pub mod instruction;
/// Reference RV64IM instruction set.
pub mod rv64;

use std::fmt;

use crate::common::SimError;
use crate::cpu::{Decode, Machine};
use crate::memory::Memory;

/// Dense index of an instruction form in its ISA's instruction list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpcodeId(pub usize);

/// The effect of one instruction form.
///
/// A handler reads its operands from the decode record, updates the machine and,
/// for control transfers, overwrites `Decode::dnpc`.
pub trait Handler {
    /// Performs the instruction.
    ///
    /// # Errors
    ///
    /// Returns a `SimError` if the instruction faults (for example a load outside
    /// physical memory). The engine aborts the run.
    fn execute(&self, s: &mut Decode, m: &mut Machine) -> Result<(), SimError>;
}

impl<F> Handler for F
where
    F: Fn(&mut Decode, &mut Machine) -> Result<(), SimError>,
{
    #[inline(always)]
    fn execute(&self, s: &mut Decode, m: &mut Machine) -> Result<(), SimError> {
        self(s, m)
    }
}

/// One entry of an ISA's static instruction list.
pub struct InstrEntry {
    /// Mnemonic, used for logging.
    pub name: &'static str,
    /// Effect of the instruction.
    pub handler: Box<dyn Handler>,
}

impl InstrEntry {
    /// Wraps a handler under a mnemonic.
    pub fn new(name: &'static str, handler: impl Handler + 'static) -> Self {
        Self {
            name,
            handler: Box::new(handler),
        }
    }
}

impl fmt::Debug for InstrEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstrEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Instruction-set collaborator consumed by the engine and the debugger.
pub trait Isa {
    /// The static instruction list. Position `i` is `OpcodeId(i)`.
    fn instructions(&self) -> Vec<InstrEntry>;

    /// Fetches and decodes the instruction at `s.pc`.
    ///
    /// On success the record carries the raw word, operand fields and length, and
    /// `snpc` points past the instruction. The returned id is always an index into
    /// `instructions()`.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Fetch` if the word cannot be read and
    /// `SimError::InvalidInstruction` if no instruction form matches.
    fn fetch_decode(&self, s: &mut Decode, mem: &dyn Memory) -> Result<OpcodeId, SimError>;

    /// Renders the decoded instruction as assembly text.
    fn disassemble(&self, s: &Decode) -> String;

    /// Display name of general register `idx`.
    fn reg_name(&self, idx: usize) -> &'static str;

    /// Register index for a name written without the leading `$`.
    fn reg_index(&self, name: &str) -> Option<usize>;
}
