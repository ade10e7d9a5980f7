//! Instruction field extraction.
//!
//! Provides bit extraction for the fixed fields of a 32-bit RISC-V encoding
//! and the `Decoded` record the handlers read their operands from.

/// Bit mask for the opcode field (bits 0-6).
pub const OPCODE_MASK: u32 = 0x7F;
/// Bit mask for a register field once shifted down.
pub const REG_MASK: u32 = 0x1F;
/// Bit mask for the funct3 field (bits 12-14).
pub const FUNCT3_MASK: u32 = 0x7;
/// Bit mask for the funct7 field (bits 25-31).
pub const FUNCT7_MASK: u32 = 0x7F;

/// Field accessors for a raw instruction word.
pub trait InstructionBits {
    /// Major opcode (bits 0-6).
    fn opcode(&self) -> u32;

    /// Destination register index (bits 7-11).
    fn rd(&self) -> usize;

    /// First source register index (bits 15-19).
    fn rs1(&self) -> usize;

    /// Second source register index (bits 20-24).
    fn rs2(&self) -> usize;

    /// Function code distinguishing operations under one opcode (bits 12-14).
    fn funct3(&self) -> u32;

    /// Alternate-encoding selector of R-type instructions (bits 25-31).
    fn funct7(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        self & OPCODE_MASK
    }

    #[inline(always)]
    fn rd(&self) -> usize {
        ((self >> 7) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs1(&self) -> usize {
        ((self >> 15) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs2(&self) -> usize {
        ((self >> 20) & REG_MASK) as usize
    }

    #[inline(always)]
    fn funct3(&self) -> u32 {
        (self >> 12) & FUNCT3_MASK
    }

    #[inline(always)]
    fn funct7(&self) -> u32 {
        (self >> 25) & FUNCT7_MASK
    }
}

/// Decoded instruction fields.
///
/// The immediate is sign-extended according to the instruction's format; it is
/// zero for R-type encodings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Raw 32-bit instruction encoding.
    pub raw: u32,
    /// Extracted opcode field.
    pub opcode: u32,
    /// Destination register index.
    pub rd: usize,
    /// First source register index.
    pub rs1: usize,
    /// Second source register index.
    pub rs2: usize,
    /// Function code field 3.
    pub funct3: u32,
    /// Function code field 7.
    pub funct7: u32,
    /// Sign-extended immediate value.
    pub imm: i64,
}
