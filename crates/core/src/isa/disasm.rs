//! Instruction disassembler for RV64IM.
//!
//! Converts a 32-bit instruction encoding into the mnemonic text shown in
//! trace lines and the ring-buffer dump.

use crate::isa::abi::name as xreg;
use crate::isa::decode::{imm_b, imm_i, imm_j, imm_s, imm_u};
use crate::isa::encoding::{
    ALT, EBREAK, M_EXTENSION, OP_AUIPC, OP_BRANCH, OP_IMM, OP_IMM_32, OP_JAL, OP_JALR, OP_LOAD,
    OP_LUI, OP_MISC_MEM, OP_REG, OP_REG_32, OP_STORE, OP_SYSTEM, alu, branch, load, muldiv,
    store,
};
use crate::isa::instruction::InstructionBits;

/// Disassembles a 32-bit instruction.
///
/// Branch and jump targets are printed as absolute addresses computed from `pc`.
///
/// # Arguments
///
/// * `pc` - Address of the instruction.
/// * `inst` - The raw 32-bit encoding.
///
/// # Returns
///
/// A mnemonic like `"add a0, a1, a2"`, or `"unknown (0x...)"` for encodings
/// outside RV64IM.
pub fn disassemble(pc: u64, inst: u32) -> String {
    let rd = inst.rd();
    let rs1 = inst.rs1();
    let rs2 = inst.rs2();
    let f3 = inst.funct3();
    let f7 = inst.funct7();

    match inst.opcode() {
        OP_REG => disasm_op_reg(rd, rs1, rs2, f3, f7, false),
        OP_REG_32 => disasm_op_reg(rd, rs1, rs2, f3, f7, true),
        OP_IMM => disasm_op_imm(rd, rs1, f3, imm_i(inst), false),
        OP_IMM_32 => disasm_op_imm(rd, rs1, f3, imm_i(inst), true),

        OP_LOAD => {
            let mn = match f3 {
                load::LB => "lb",
                load::LH => "lh",
                load::LW => "lw",
                load::LD => "ld",
                load::LBU => "lbu",
                load::LHU => "lhu",
                load::LWU => "lwu",
                _ => "l??",
            };
            format!("{mn} {}, {}({})", xreg(rd), imm_i(inst), xreg(rs1))
        }

        OP_STORE => {
            let mn = match f3 {
                store::SB => "sb",
                store::SH => "sh",
                store::SW => "sw",
                store::SD => "sd",
                _ => "s??",
            };
            format!("{mn} {}, {}({})", xreg(rs2), imm_s(inst), xreg(rs1))
        }

        OP_BRANCH => {
            let mn = match f3 {
                branch::BEQ => "beq",
                branch::BNE => "bne",
                branch::BLT => "blt",
                branch::BGE => "bge",
                branch::BLTU => "bltu",
                branch::BGEU => "bgeu",
                _ => "b??",
            };
            let target = pc.wrapping_add(imm_b(inst) as u64);
            format!("{mn} {}, {}, {target:#x}", xreg(rs1), xreg(rs2))
        }

        OP_LUI => format!("lui {}, {:#x}", xreg(rd), (imm_u(inst) >> 12) & 0xFFFFF),
        OP_AUIPC => format!("auipc {}, {:#x}", xreg(rd), (imm_u(inst) >> 12) & 0xFFFFF),

        OP_JAL => {
            let target = pc.wrapping_add(imm_j(inst) as u64);
            format!("jal {}, {target:#x}", xreg(rd))
        }
        OP_JALR => format!("jalr {}, {}({})", xreg(rd), imm_i(inst), xreg(rs1)),

        OP_MISC_MEM => "fence".to_string(),
        OP_SYSTEM if inst == EBREAK => "ebreak".to_string(),

        _ => format!("unknown ({inst:#010x})"),
    }
}

/// Disassemble OP_REG / OP_REG_32 (R-type register-register).
fn disasm_op_reg(rd: usize, rs1: usize, rs2: usize, f3: u32, f7: u32, is_w: bool) -> String {
    let suffix = if is_w { "w" } else { "" };

    let mn = if f7 == M_EXTENSION {
        match f3 {
            muldiv::MUL => "mul",
            muldiv::MULH => "mulh",
            muldiv::MULHSU => "mulhsu",
            muldiv::MULHU => "mulhu",
            muldiv::DIV => "div",
            muldiv::DIVU => "divu",
            muldiv::REM => "rem",
            _ => "remu",
        }
    } else {
        match (f3, f7) {
            (alu::ADD_SUB, ALT) => "sub",
            (alu::ADD_SUB, _) => "add",
            (alu::SLL, _) => "sll",
            (alu::SLT, _) => "slt",
            (alu::SLTU, _) => "sltu",
            (alu::XOR, _) => "xor",
            (alu::SRL_SRA, ALT) => "sra",
            (alu::SRL_SRA, _) => "srl",
            (alu::OR, _) => "or",
            _ => "and",
        }
    };
    format!("{mn}{suffix} {}, {}, {}", xreg(rd), xreg(rs1), xreg(rs2))
}

/// Disassemble OP_IMM / OP_IMM_32 (I-type immediate arithmetic).
fn disasm_op_imm(rd: usize, rs1: usize, f3: u32, imm: i64, is_w: bool) -> String {
    let suffix = if is_w { "w" } else { "" };
    let shamt = imm & 0x3F;
    let mn = match f3 {
        alu::ADD_SUB => "addi",
        alu::SLT => "slti",
        alu::SLTU => "sltiu",
        alu::XOR => "xori",
        alu::OR => "ori",
        alu::AND => "andi",
        alu::SLL => return format!("slli{suffix} {}, {}, {shamt}", xreg(rd), xreg(rs1)),
        _ => {
            let mn = if (imm >> 10) & 1 != 0 { "srai" } else { "srli" };
            return format!("{mn}{suffix} {}, {}, {shamt}", xreg(rd), xreg(rs1));
        }
    };
    format!("{mn}{suffix} {}, {}, {imm}", xreg(rd), xreg(rs1))
}
