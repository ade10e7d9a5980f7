//! RV64IM encoding constants.
//!
//! Major opcodes (bits 6-0) and the function codes that select an operation
//! within one opcode. Shared by the immediate decoder, the disassembler and the
//! call tracer.

/// Load instructions (LB, LH, LW, LD, ...).
pub const OP_LOAD: u32 = 0b0000011;
/// Memory ordering (FENCE).
pub const OP_MISC_MEM: u32 = 0b0001111;
/// Immediate arithmetic (ADDI, ANDI, SLLI, ...).
pub const OP_IMM: u32 = 0b0010011;
/// Add Upper Immediate to PC.
pub const OP_AUIPC: u32 = 0b0010111;
/// 32-bit immediate arithmetic (ADDIW, SLLIW, ...).
pub const OP_IMM_32: u32 = 0b0011011;
/// Store instructions (SB, SH, SW, SD).
pub const OP_STORE: u32 = 0b0100011;
/// Register-register arithmetic, including the M extension.
pub const OP_REG: u32 = 0b0110011;
/// Load Upper Immediate.
pub const OP_LUI: u32 = 0b0110111;
/// 32-bit register-register arithmetic (ADDW, MULW, ...).
pub const OP_REG_32: u32 = 0b0111011;
/// Conditional branches.
pub const OP_BRANCH: u32 = 0b1100011;
/// Jump and Link Register.
pub const OP_JALR: u32 = 0b1100111;
/// Jump and Link.
pub const OP_JAL: u32 = 0b1101111;
/// ECALL / EBREAK.
pub const OP_SYSTEM: u32 = 0b1110011;

/// `ebreak`, the guest halt request.
pub const EBREAK: u32 = 0x0010_0073;
/// `jalr zero, 0(ra)`, the canonical return.
pub const RET: u32 = 0x0000_8067;

/// funct7 of the M extension.
pub const M_EXTENSION: u32 = 0b0000001;
/// funct7 selecting SUB and SRA.
pub const ALT: u32 = 0b0100000;

/// funct3 codes of loads.
pub mod load {
    /// Load Byte.
    pub const LB: u32 = 0b000;
    /// Load Halfword.
    pub const LH: u32 = 0b001;
    /// Load Word.
    pub const LW: u32 = 0b010;
    /// Load Doubleword.
    pub const LD: u32 = 0b011;
    /// Load Byte Unsigned.
    pub const LBU: u32 = 0b100;
    /// Load Halfword Unsigned.
    pub const LHU: u32 = 0b101;
    /// Load Word Unsigned.
    pub const LWU: u32 = 0b110;
}

/// funct3 codes of stores.
pub mod store {
    /// Store Byte.
    pub const SB: u32 = 0b000;
    /// Store Halfword.
    pub const SH: u32 = 0b001;
    /// Store Word.
    pub const SW: u32 = 0b010;
    /// Store Doubleword.
    pub const SD: u32 = 0b011;
}

/// funct3 codes of branches.
pub mod branch {
    /// Branch Equal.
    pub const BEQ: u32 = 0b000;
    /// Branch Not Equal.
    pub const BNE: u32 = 0b001;
    /// Branch Less Than.
    pub const BLT: u32 = 0b100;
    /// Branch Greater or Equal.
    pub const BGE: u32 = 0b101;
    /// Branch Less Than Unsigned.
    pub const BLTU: u32 = 0b110;
    /// Branch Greater or Equal Unsigned.
    pub const BGEU: u32 = 0b111;
}

/// funct3 codes of integer arithmetic (register and immediate forms).
pub mod alu {
    /// Add / Subtract.
    pub const ADD_SUB: u32 = 0b000;
    /// Shift Left Logical.
    pub const SLL: u32 = 0b001;
    /// Set Less Than.
    pub const SLT: u32 = 0b010;
    /// Set Less Than Unsigned.
    pub const SLTU: u32 = 0b011;
    /// Exclusive OR.
    pub const XOR: u32 = 0b100;
    /// Shift Right Logical / Arithmetic.
    pub const SRL_SRA: u32 = 0b101;
    /// OR.
    pub const OR: u32 = 0b110;
    /// AND.
    pub const AND: u32 = 0b111;
}

/// funct3 codes of the M extension.
pub mod muldiv {
    /// Multiply, low half.
    pub const MUL: u32 = 0b000;
    /// Multiply High (signed x signed).
    pub const MULH: u32 = 0b001;
    /// Multiply High (signed x unsigned).
    pub const MULHSU: u32 = 0b010;
    /// Multiply High (unsigned x unsigned).
    pub const MULHU: u32 = 0b011;
    /// Divide.
    pub const DIV: u32 = 0b100;
    /// Divide Unsigned.
    pub const DIVU: u32 = 0b101;
    /// Remainder.
    pub const REM: u32 = 0b110;
    /// Remainder Unsigned.
    pub const REMU: u32 = 0b111;
}
