//! Field and immediate decoder.
//!
//! Splits a 32-bit RISC-V encoding into a `Decoded` record. Immediates are
//! reassembled and sign-extended per format:
//! - I-type: `imm[11:0] | rs1 | funct3 | rd | opcode`
//! - S-type: `imm[11:5] | rs2 | rs1 | funct3 | imm[4:0] | opcode`
//! - B-type: `imm[12] | imm[10:5] | rs2 | rs1 | funct3 | imm[4:1] | imm[11] | opcode`
//! - U-type: `imm[31:12] | rd | opcode`
//! - J-type: `imm[20] | imm[10:1] | imm[11] | imm[19:12] | rd | opcode`

use crate::isa::encoding::{
    OP_AUIPC, OP_BRANCH, OP_IMM, OP_IMM_32, OP_JAL, OP_JALR, OP_LOAD, OP_LUI, OP_STORE,
};
use crate::isa::instruction::{Decoded, InstructionBits};

/// Total width of an instruction in bits.
const INSTRUCTION_WIDTH: u32 = 32;

/// Decodes a raw word into its fields.
///
/// # Arguments
///
/// * `inst` - The 32-bit instruction encoding.
///
/// # Returns
///
/// The extracted fields; `imm` is zero for formats without an immediate.
pub fn decode(inst: u32) -> Decoded {
    let opcode = inst.opcode();
    let imm = match opcode {
        OP_IMM | OP_IMM_32 | OP_LOAD | OP_JALR => imm_i(inst),
        OP_STORE => imm_s(inst),
        OP_BRANCH => imm_b(inst),
        OP_LUI | OP_AUIPC => imm_u(inst),
        OP_JAL => imm_j(inst),
        _ => 0,
    };

    Decoded {
        raw: inst,
        opcode,
        rd: inst.rd(),
        rs1: inst.rs1(),
        rs2: inst.rs2(),
        funct3: inst.funct3(),
        funct7: inst.funct7(),
        imm,
    }
}

/// I-type immediate (loads, JALR, immediate arithmetic).
pub const fn imm_i(inst: u32) -> i64 {
    ((inst as i32) >> 20) as i64
}

/// S-type immediate (stores).
pub const fn imm_s(inst: u32) -> i64 {
    let low = (inst >> 7) & 0x1F;
    let high = (inst >> 25) & 0x7F;
    sign_extend((high << 5) | low, 12)
}

/// B-type immediate (conditional branches); always even.
pub const fn imm_b(inst: u32) -> i64 {
    let bit_11 = (inst >> 7) & 1;
    let bits_4_1 = (inst >> 8) & 0xF;
    let bits_10_5 = (inst >> 25) & 0x3F;
    let bit_12 = (inst >> 31) & 1;
    sign_extend(
        (bit_12 << 12) | (bit_11 << 11) | (bits_10_5 << 5) | (bits_4_1 << 1),
        13,
    )
}

/// U-type immediate (LUI, AUIPC), already shifted into bits 31:12.
pub const fn imm_u(inst: u32) -> i64 {
    ((inst & 0xFFFF_F000) as i32) as i64
}

/// J-type immediate (JAL); always even.
pub const fn imm_j(inst: u32) -> i64 {
    let bits_19_12 = (inst >> 12) & 0xFF;
    let bit_11 = (inst >> 20) & 1;
    let bits_10_1 = (inst >> 21) & 0x3FF;
    let bit_20 = (inst >> 31) & 1;
    sign_extend(
        (bit_20 << 20) | (bits_19_12 << 12) | (bit_11 << 11) | (bits_10_1 << 1),
        21,
    )
}

/// Sign extends the low `bits` of `val` to 64 bits.
const fn sign_extend(val: u32, bits: u32) -> i64 {
    let shift = INSTRUCTION_WIDTH - bits;
    (((val << shift) as i32) >> shift) as i64
}
