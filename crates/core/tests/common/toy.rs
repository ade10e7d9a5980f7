use rvdb_core::common::SimError;
use rvdb_core::cpu::{Decode, HaltRequest, Machine};
use rvdb_core::isa::{InstrEntry, Isa, OpcodeId};
use rvdb_core::memory::Memory;

/// Word of the toy `nop`.
pub const TOY_NOP: u32 = 0;
/// Word of the toy `inc`, which adds one to `r1`.
pub const TOY_INC: u32 = 1;
/// Word of the toy `halt`, which exits with `r1`.
pub const TOY_HALT: u32 = 2;

/// Three-instruction ISA with 4-byte words, used to drive the engine without RISC-V encodings.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToyIsa;

fn nop(_: &mut Decode, _: &mut Machine) -> Result<(), SimError> {
    Ok(())
}

fn inc(_: &mut Decode, m: &mut Machine) -> Result<(), SimError> {
    m.set_reg(1, m.reg(1) + 1);
    Ok(())
}

fn halt(_: &mut Decode, m: &mut Machine) -> Result<(), SimError> {
    m.request_halt(HaltRequest::Exit(m.reg(1)));
    Ok(())
}

impl Isa for ToyIsa {
    fn instructions(&self) -> Vec<InstrEntry> {
        vec![
            InstrEntry::new("nop", nop),
            InstrEntry::new("inc", inc),
            InstrEntry::new("halt", halt),
        ]
    }

    fn fetch_decode(&self, s: &mut Decode, mem: &dyn Memory) -> Result<OpcodeId, SimError> {
        let pc = s.pc;
        let raw = mem
            .read(pc, 4)
            .map_err(|source| SimError::Fetch { pc, source })? as u32;
        s.inst.raw = raw;
        s.ilen = 4;
        s.snpc = pc + 4;
        s.dnpc = s.snpc;
        match raw {
            TOY_NOP | TOY_INC | TOY_HALT => {
                s.opcode = OpcodeId(raw as usize);
                Ok(s.opcode)
            }
            _ => Err(SimError::InvalidInstruction { pc, raw }),
        }
    }

    fn disassemble(&self, s: &Decode) -> String {
        match s.inst.raw {
            TOY_NOP => "nop".into(),
            TOY_INC => "inc".into(),
            TOY_HALT => "halt".into(),
            raw => format!(".word {raw:#x}"),
        }
    }

    fn reg_name(&self, _idx: usize) -> &'static str {
        "r"
    }

    fn reg_index(&self, name: &str) -> Option<usize> {
        name.strip_prefix('r')?.parse().ok().filter(|&i| i < 32)
    }
}
