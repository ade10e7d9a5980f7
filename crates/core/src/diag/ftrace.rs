//! Call/return tracer.
//!
//! Recognises control transfers from the low opcode bits of the retired
//! instruction and names them against the function symbol table:
//! - `jal`/`jalr` that link a register are calls, named by the target address.
//! - The canonical `ret` (`jalr zero, 0(ra)`) is a return, named by the function
//!   it leaves.
//!
//! Plain jumps (no link register) are neither. Addresses outside every known
//! function are named `??`.

use crate::cpu::Decode;
use crate::isa::encoding::{OP_JAL, OP_JALR, RET};
use crate::isa::instruction::InstructionBits;
use crate::sim::symbols::SymbolTable;

/// Name printed for addresses outside every known function.
const UNKNOWN: &str = "??";

/// Kind of control transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transfer {
    /// Linking jump.
    Call,
    /// Function return.
    Return,
}

/// Classifies a raw instruction word.
pub fn classify(raw: u32) -> Option<Transfer> {
    match raw.opcode() {
        OP_JAL | OP_JALR if raw == RET => Some(Transfer::Return),
        OP_JAL | OP_JALR if raw.rd() != 0 => Some(Transfer::Call),
        _ => None,
    }
}

/// Call-depth tracker.
#[derive(Clone, Debug, Default)]
pub struct CallTracer {
    depth: usize,
}

impl CallTracer {
    /// Creates a tracer at depth zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nesting depth.
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Inspects a retired instruction.
    ///
    /// # Returns
    ///
    /// The indented `call[name@addr]` or `ret[name]` line, prefixed with the pc,
    /// if the instruction is a traced transfer.
    pub fn observe(&mut self, s: &Decode, symbols: &SymbolTable) -> Option<String> {
        let name = |addr| symbols.lookup(addr).map_or(UNKNOWN, |sym| sym.name.as_str());
        match classify(s.inst.raw)? {
            Transfer::Call => {
                let line = format!(
                    "{:x}:{}call[{}@{:#010x}]",
                    s.pc,
                    " ".repeat(self.depth),
                    name(s.dnpc),
                    s.dnpc
                );
                self.depth += 1;
                Some(line)
            }
            Transfer::Return => {
                self.depth = self.depth.saturating_sub(1);
                Some(format!("{:x}:{}ret[{}]", s.pc, " ".repeat(self.depth), name(s.pc)))
            }
        }
    }
}
