//! The per-step decode record.

use crate::isa::OpcodeId;
use crate::isa::instruction::Decoded;

/// Everything known about the instruction currently in flight.
///
/// Built fresh for every step and dropped once the diagnostics have seen it.
#[derive(Clone, Debug, Default)]
pub struct Decode {
    /// Address of the instruction.
    pub pc: u64,
    /// Statically predicted next pc (the fall-through address).
    pub snpc: u64,
    /// Dynamically resolved next pc; handlers overwrite it on taken branches and jumps.
    pub dnpc: u64,
    /// Decoded instruction fields.
    pub inst: Decoded,
    /// Encoded length in bytes.
    pub ilen: usize,
    /// Dispatch-table index selected by the decoder.
    pub opcode: OpcodeId,
    /// Formatted trace line (pc, raw bytes, disassembly).
    pub logbuf: String,
}

impl Decode {
    /// Starts a record for the instruction at `pc`.
    pub fn new(pc: u64) -> Self {
        Self {
            pc,
            snpc: pc,
            dnpc: pc,
            ..Self::default()
        }
    }

    /// The raw instruction bytes in memory order.
    pub fn bytes(&self) -> Vec<u8> {
        let len = self.ilen.min(4);
        self.inst.raw.to_le_bytes()[..len].to_vec()
    }
}
