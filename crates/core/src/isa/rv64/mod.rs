//! RV64IM reference instruction set.
//!
//! Decoding is pattern based. Every instruction form is described by a 32-character
//! bit pattern (`0`, `1`, `?` for don't-care; spaces are ignored), folded at compile
//! time into a mask/match pair. The first pattern that matches a fetched word wins,
//! and its position in the table is the opcode id handed to the dispatch table.

/// Instruction handlers.
pub mod exec;

use crate::common::SimError;
use crate::cpu::{Decode, Machine};
use crate::isa::decode::decode;
use crate::isa::{InstrEntry, Isa, OpcodeId, abi, disasm};
use crate::memory::Memory;

/// Width of every RV64IM encoding in bytes.
const INSTR_LEN: usize = 4;

type Exec = fn(&mut Decode, &mut Machine) -> Result<(), SimError>;

/// One row of the decode table.
struct Pattern {
    name: &'static str,
    mask: u32,
    bits: u32,
    exec: Exec,
}

/// Folds a bit pattern into `(mask, match)`.
const fn pattern(text: &str) -> (u32, u32) {
    let bytes = text.as_bytes();
    let mut mask = 0u32;
    let mut bits = 0u32;
    let mut width = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'0' => {
                mask = (mask << 1) | 1;
                bits <<= 1;
                width += 1;
            }
            b'1' => {
                mask = (mask << 1) | 1;
                bits = (bits << 1) | 1;
                width += 1;
            }
            b'?' => {
                mask <<= 1;
                bits <<= 1;
                width += 1;
            }
            b' ' => {}
            _ => panic!("pattern characters are 0, 1, ? and space"),
        }
        i += 1;
    }
    assert!(width == 32, "pattern must describe 32 bits");
    (mask, bits)
}

macro_rules! instr {
    ($pat:literal, $name:literal, $exec:path) => {{
        let (mask, bits) = pattern($pat);
        Pattern {
            name: $name,
            mask,
            bits,
            exec: $exec,
        }
    }};
}

#[rustfmt::skip]
static PATTERNS: &[Pattern] = &[
    instr!("??????? ????? ????? ??? ????? 01101 11", "lui",    exec::lui),
    instr!("??????? ????? ????? ??? ????? 00101 11", "auipc",  exec::auipc),
    instr!("??????? ????? ????? ??? ????? 11011 11", "jal",    exec::jal),
    instr!("??????? ????? ????? 000 ????? 11001 11", "jalr",   exec::jalr),

    instr!("??????? ????? ????? 000 ????? 11000 11", "beq",    exec::beq),
    instr!("??????? ????? ????? 001 ????? 11000 11", "bne",    exec::bne),
    instr!("??????? ????? ????? 100 ????? 11000 11", "blt",    exec::blt),
    instr!("??????? ????? ????? 101 ????? 11000 11", "bge",    exec::bge),
    instr!("??????? ????? ????? 110 ????? 11000 11", "bltu",   exec::bltu),
    instr!("??????? ????? ????? 111 ????? 11000 11", "bgeu",   exec::bgeu),

    instr!("??????? ????? ????? 000 ????? 00000 11", "lb",     exec::lb),
    instr!("??????? ????? ????? 001 ????? 00000 11", "lh",     exec::lh),
    instr!("??????? ????? ????? 010 ????? 00000 11", "lw",     exec::lw),
    instr!("??????? ????? ????? 011 ????? 00000 11", "ld",     exec::ld),
    instr!("??????? ????? ????? 100 ????? 00000 11", "lbu",    exec::lbu),
    instr!("??????? ????? ????? 101 ????? 00000 11", "lhu",    exec::lhu),
    instr!("??????? ????? ????? 110 ????? 00000 11", "lwu",    exec::lwu),

    instr!("??????? ????? ????? 000 ????? 01000 11", "sb",     exec::sb),
    instr!("??????? ????? ????? 001 ????? 01000 11", "sh",     exec::sh),
    instr!("??????? ????? ????? 010 ????? 01000 11", "sw",     exec::sw),
    instr!("??????? ????? ????? 011 ????? 01000 11", "sd",     exec::sd),

    instr!("??????? ????? ????? 000 ????? 00100 11", "addi",   exec::addi),
    instr!("??????? ????? ????? 010 ????? 00100 11", "slti",   exec::slti),
    instr!("??????? ????? ????? 011 ????? 00100 11", "sltiu",  exec::sltiu),
    instr!("??????? ????? ????? 100 ????? 00100 11", "xori",   exec::xori),
    instr!("??????? ????? ????? 110 ????? 00100 11", "ori",    exec::ori),
    instr!("??????? ????? ????? 111 ????? 00100 11", "andi",   exec::andi),
    instr!("000000? ????? ????? 001 ????? 00100 11", "slli",   exec::slli),
    instr!("000000? ????? ????? 101 ????? 00100 11", "srli",   exec::srli),
    instr!("010000? ????? ????? 101 ????? 00100 11", "srai",   exec::srai),

    instr!("??????? ????? ????? 000 ????? 00110 11", "addiw",  exec::addiw),
    instr!("0000000 ????? ????? 001 ????? 00110 11", "slliw",  exec::slliw),
    instr!("0000000 ????? ????? 101 ????? 00110 11", "srliw",  exec::srliw),
    instr!("0100000 ????? ????? 101 ????? 00110 11", "sraiw",  exec::sraiw),

    instr!("0000000 ????? ????? 000 ????? 01100 11", "add",    exec::add),
    instr!("0100000 ????? ????? 000 ????? 01100 11", "sub",    exec::sub),
    instr!("0000000 ????? ????? 001 ????? 01100 11", "sll",    exec::sll),
    instr!("0000000 ????? ????? 010 ????? 01100 11", "slt",    exec::slt),
    instr!("0000000 ????? ????? 011 ????? 01100 11", "sltu",   exec::sltu),
    instr!("0000000 ????? ????? 100 ????? 01100 11", "xor",    exec::xor),
    instr!("0000000 ????? ????? 101 ????? 01100 11", "srl",    exec::srl),
    instr!("0100000 ????? ????? 101 ????? 01100 11", "sra",    exec::sra),
    instr!("0000000 ????? ????? 110 ????? 01100 11", "or",     exec::or),
    instr!("0000000 ????? ????? 111 ????? 01100 11", "and",    exec::and),

    instr!("0000000 ????? ????? 000 ????? 01110 11", "addw",   exec::addw),
    instr!("0100000 ????? ????? 000 ????? 01110 11", "subw",   exec::subw),
    instr!("0000000 ????? ????? 001 ????? 01110 11", "sllw",   exec::sllw),
    instr!("0000000 ????? ????? 101 ????? 01110 11", "srlw",   exec::srlw),
    instr!("0100000 ????? ????? 101 ????? 01110 11", "sraw",   exec::sraw),

    instr!("0000001 ????? ????? 000 ????? 01100 11", "mul",    exec::mul),
    instr!("0000001 ????? ????? 001 ????? 01100 11", "mulh",   exec::mulh),
    instr!("0000001 ????? ????? 010 ????? 01100 11", "mulhsu", exec::mulhsu),
    instr!("0000001 ????? ????? 011 ????? 01100 11", "mulhu",  exec::mulhu),
    instr!("0000001 ????? ????? 100 ????? 01100 11", "div",    exec::div),
    instr!("0000001 ????? ????? 101 ????? 01100 11", "divu",   exec::divu),
    instr!("0000001 ????? ????? 110 ????? 01100 11", "rem",    exec::rem),
    instr!("0000001 ????? ????? 111 ????? 01100 11", "remu",   exec::remu),

    instr!("0000001 ????? ????? 000 ????? 01110 11", "mulw",   exec::mulw),
    instr!("0000001 ????? ????? 100 ????? 01110 11", "divw",   exec::divw),
    instr!("0000001 ????? ????? 101 ????? 01110 11", "divuw",  exec::divuw),
    instr!("0000001 ????? ????? 110 ????? 01110 11", "remw",   exec::remw),
    instr!("0000001 ????? ????? 111 ????? 01110 11", "remuw",  exec::remuw),

    instr!("??????? ????? ????? 000 ????? 00011 11", "fence",  exec::fence),
    instr!("0000000 00001 00000 000 00000 11100 11", "ebreak", exec::ebreak),
];

/// The RV64IM instruction set.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rv64;

impl Rv64 {
    /// Creates the instruction set.
    pub const fn new() -> Self {
        Self
    }

    /// Finds the first instruction form matching `raw`.
    fn lookup(raw: u32) -> Option<usize> {
        PATTERNS.iter().position(|p| raw & p.mask == p.bits)
    }
}

impl Isa for Rv64 {
    fn instructions(&self) -> Vec<InstrEntry> {
        PATTERNS
            .iter()
            .map(|p| InstrEntry::new(p.name, p.exec))
            .collect()
    }

    fn fetch_decode(&self, s: &mut Decode, mem: &dyn Memory) -> Result<OpcodeId, SimError> {
        let pc = s.pc;
        let raw = mem
            .read(pc, INSTR_LEN)
            .map_err(|source| SimError::Fetch { pc, source })? as u32;

        s.inst = decode(raw);
        s.ilen = INSTR_LEN;
        s.snpc = pc.wrapping_add(INSTR_LEN as u64);
        s.dnpc = s.snpc;

        let id = Self::lookup(raw).ok_or(SimError::InvalidInstruction { pc, raw })?;
        s.opcode = OpcodeId(id);
        Ok(s.opcode)
    }

    fn disassemble(&self, s: &Decode) -> String {
        disasm::disassemble(s.pc, s.inst.raw)
    }

    fn reg_name(&self, idx: usize) -> &'static str {
        abi::name(idx)
    }

    fn reg_index(&self, name: &str) -> Option<usize> {
        abi::index(name)
    }
}
