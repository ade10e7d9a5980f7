//! RV64IM instruction handlers.
//!
//! One function per instruction form, each with the `Handler` signature. Operands
//! come from the `Decoded` fields of the record; control transfers write `dnpc`.
//! `W`-suffixed forms operate on the low 32 bits and sign-extend the result.
//! Division follows the RISC-V rules: a zero divisor yields all ones (quotient) or
//! the dividend (remainder), and signed overflow wraps.

use crate::common::SimError;
use crate::cpu::{Decode, HaltRequest, Machine};
use crate::isa::abi::REG_A0;

type Outcome = Result<(), SimError>;

#[inline(always)]
const fn sext32(v: u64) -> u64 {
    v as i32 as i64 as u64
}

/// R-type: `rd = f(rs1, rs2)`.
macro_rules! rtype {
    ($(#[$doc:meta])* $name:ident, |$a:ident, $b:ident| $body:expr) => {
        $(#[$doc])*
        pub fn $name(s: &mut Decode, m: &mut Machine) -> Outcome {
            let $a = m.reg(s.inst.rs1);
            let $b = m.reg(s.inst.rs2);
            m.set_reg(s.inst.rd, $body);
            Ok(())
        }
    };
}

/// I-type arithmetic: `rd = f(rs1, imm)`.
macro_rules! itype {
    ($(#[$doc:meta])* $name:ident, |$a:ident, $imm:ident| $body:expr) => {
        $(#[$doc])*
        pub fn $name(s: &mut Decode, m: &mut Machine) -> Outcome {
            let $a = m.reg(s.inst.rs1);
            let $imm = s.inst.imm as u64;
            m.set_reg(s.inst.rd, $body);
            Ok(())
        }
    };
}

/// Conditional branch to `pc + imm`.
macro_rules! branch {
    ($(#[$doc:meta])* $name:ident, |$a:ident, $b:ident| $cond:expr) => {
        $(#[$doc])*
        pub fn $name(s: &mut Decode, m: &mut Machine) -> Outcome {
            let $a = m.reg(s.inst.rs1);
            let $b = m.reg(s.inst.rs2);
            if $cond {
                s.dnpc = s.pc.wrapping_add(s.inst.imm as u64);
            }
            Ok(())
        }
    };
}

/// Load of `$len` bytes at `rs1 + imm`, extended by `$ext`.
macro_rules! load {
    ($(#[$doc:meta])* $name:ident, $len:literal, |$v:ident| $ext:expr) => {
        $(#[$doc])*
        pub fn $name(s: &mut Decode, m: &mut Machine) -> Outcome {
            let addr = m.reg(s.inst.rs1).wrapping_add(s.inst.imm as u64);
            let $v = m.load(addr, $len)?;
            m.set_reg(s.inst.rd, $ext);
            Ok(())
        }
    };
}

/// Store of the low `$len` bytes of `rs2` at `rs1 + imm`.
macro_rules! store {
    ($(#[$doc:meta])* $name:ident, $len:literal) => {
        $(#[$doc])*
        pub fn $name(s: &mut Decode, m: &mut Machine) -> Outcome {
            let addr = m.reg(s.inst.rs1).wrapping_add(s.inst.imm as u64);
            m.store(addr, $len, m.reg(s.inst.rs2))?;
            Ok(())
        }
    };
}

/// Load Upper Immediate.
pub fn lui(s: &mut Decode, m: &mut Machine) -> Outcome {
    m.set_reg(s.inst.rd, s.inst.imm as u64);
    Ok(())
}

/// Add Upper Immediate to PC.
pub fn auipc(s: &mut Decode, m: &mut Machine) -> Outcome {
    m.set_reg(s.inst.rd, s.pc.wrapping_add(s.inst.imm as u64));
    Ok(())
}

/// Jump and Link.
pub fn jal(s: &mut Decode, m: &mut Machine) -> Outcome {
    m.set_reg(s.inst.rd, s.snpc);
    s.dnpc = s.pc.wrapping_add(s.inst.imm as u64);
    Ok(())
}

/// Jump and Link Register. The target is computed before `rd` is written.
pub fn jalr(s: &mut Decode, m: &mut Machine) -> Outcome {
    let target = m.reg(s.inst.rs1).wrapping_add(s.inst.imm as u64) & !1;
    m.set_reg(s.inst.rd, s.snpc);
    s.dnpc = target;
    Ok(())
}

branch!(
    /// Branch if equal.
    beq, |a, b| a == b
);
branch!(
    /// Branch if not equal.
    bne, |a, b| a != b
);
branch!(
    /// Branch if less than (signed).
    blt, |a, b| (a as i64) < (b as i64)
);
branch!(
    /// Branch if greater or equal (signed).
    bge, |a, b| (a as i64) >= (b as i64)
);
branch!(
    /// Branch if less than (unsigned).
    bltu, |a, b| a < b
);
branch!(
    /// Branch if greater or equal (unsigned).
    bgeu, |a, b| a >= b
);

load!(
    /// Load byte, sign-extended.
    lb, 1, |v| v as i8 as i64 as u64
);
load!(
    /// Load halfword, sign-extended.
    lh, 2, |v| v as i16 as i64 as u64
);
load!(
    /// Load word, sign-extended.
    lw, 4, |v| sext32(v)
);
load!(
    /// Load doubleword.
    ld, 8, |v| v
);
load!(
    /// Load byte, zero-extended.
    lbu, 1, |v| v
);
load!(
    /// Load halfword, zero-extended.
    lhu, 2, |v| v
);
load!(
    /// Load word, zero-extended.
    lwu, 4, |v| v
);

store!(
    /// Store byte.
    sb, 1
);
store!(
    /// Store halfword.
    sh, 2
);
store!(
    /// Store word.
    sw, 4
);
store!(
    /// Store doubleword.
    sd, 8
);

itype!(
    /// Add immediate.
    addi, |a, imm| a.wrapping_add(imm)
);
itype!(
    /// Set if less than immediate (signed).
    slti, |a, imm| ((a as i64) < (imm as i64)) as u64
);
itype!(
    /// Set if less than immediate (unsigned compare of the sign-extended immediate).
    sltiu, |a, imm| (a < imm) as u64
);
itype!(
    /// XOR immediate.
    xori, |a, imm| a ^ imm
);
itype!(
    /// OR immediate.
    ori, |a, imm| a | imm
);
itype!(
    /// AND immediate.
    andi, |a, imm| a & imm
);
itype!(
    /// Shift left logical by a 6-bit immediate.
    slli, |a, imm| a << (imm & 0x3F)
);
itype!(
    /// Shift right logical by a 6-bit immediate.
    srli, |a, imm| a >> (imm & 0x3F)
);
itype!(
    /// Shift right arithmetic by a 6-bit immediate.
    srai, |a, imm| ((a as i64) >> (imm & 0x3F)) as u64
);
itype!(
    /// Add immediate, 32-bit.
    addiw, |a, imm| sext32(a.wrapping_add(imm))
);
itype!(
    /// Shift left logical immediate, 32-bit.
    slliw, |a, imm| sext32(((a as u32) << (imm & 0x1F)) as u64)
);
itype!(
    /// Shift right logical immediate, 32-bit.
    srliw, |a, imm| sext32(((a as u32) >> (imm & 0x1F)) as u64)
);
itype!(
    /// Shift right arithmetic immediate, 32-bit.
    sraiw, |a, imm| ((a as i32) >> (imm & 0x1F)) as i64 as u64
);

rtype!(
    /// Add.
    add, |a, b| a.wrapping_add(b)
);
rtype!(
    /// Subtract.
    sub, |a, b| a.wrapping_sub(b)
);
rtype!(
    /// Shift left logical.
    sll, |a, b| a << (b & 0x3F)
);
rtype!(
    /// Set if less than (signed).
    slt, |a, b| ((a as i64) < (b as i64)) as u64
);
rtype!(
    /// Set if less than (unsigned).
    sltu, |a, b| (a < b) as u64
);
rtype!(
    /// XOR.
    xor, |a, b| a ^ b
);
rtype!(
    /// Shift right logical.
    srl, |a, b| a >> (b & 0x3F)
);
rtype!(
    /// Shift right arithmetic.
    sra, |a, b| ((a as i64) >> (b & 0x3F)) as u64
);
rtype!(
    /// OR.
    or, |a, b| a | b
);
rtype!(
    /// AND.
    and, |a, b| a & b
);
rtype!(
    /// Add, 32-bit.
    addw, |a, b| sext32(a.wrapping_add(b))
);
rtype!(
    /// Subtract, 32-bit.
    subw, |a, b| sext32(a.wrapping_sub(b))
);
rtype!(
    /// Shift left logical, 32-bit.
    sllw, |a, b| sext32(((a as u32) << (b & 0x1F)) as u64)
);
rtype!(
    /// Shift right logical, 32-bit.
    srlw, |a, b| sext32(((a as u32) >> (b & 0x1F)) as u64)
);
rtype!(
    /// Shift right arithmetic, 32-bit.
    sraw, |a, b| ((a as i32) >> (b & 0x1F)) as i64 as u64
);

rtype!(
    /// Multiply, low 64 bits.
    mul, |a, b| a.wrapping_mul(b)
);
rtype!(
    /// Multiply high, signed x signed.
    mulh, |a, b| (((a as i64 as i128) * (b as i64 as i128)) >> 64) as u64
);
rtype!(
    /// Multiply high, signed x unsigned.
    mulhsu, |a, b| (((a as i64 as i128) * (b as u128 as i128)) >> 64) as u64
);
rtype!(
    /// Multiply high, unsigned x unsigned.
    mulhu, |a, b| (((a as u128) * (b as u128)) >> 64) as u64
);
rtype!(
    /// Divide (signed).
    div, |a, b| if b == 0 { u64::MAX } else { (a as i64).wrapping_div(b as i64) as u64 }
);
rtype!(
    /// Divide (unsigned).
    divu, |a, b| if b == 0 { u64::MAX } else { a / b }
);
rtype!(
    /// Remainder (signed).
    rem, |a, b| if b == 0 { a } else { (a as i64).wrapping_rem(b as i64) as u64 }
);
rtype!(
    /// Remainder (unsigned).
    remu, |a, b| if b == 0 { a } else { a % b }
);
rtype!(
    /// Multiply, 32-bit.
    mulw, |a, b| (a as i32).wrapping_mul(b as i32) as i64 as u64
);
rtype!(
    /// Divide, 32-bit signed.
    divw, |a, b| if b as i32 == 0 {
        u64::MAX
    } else {
        (a as i32).wrapping_div(b as i32) as i64 as u64
    }
);
rtype!(
    /// Divide, 32-bit unsigned.
    divuw, |a, b| if b as u32 == 0 {
        u64::MAX
    } else {
        sext32(((a as u32) / (b as u32)) as u64)
    }
);
rtype!(
    /// Remainder, 32-bit signed.
    remw, |a, b| if b as i32 == 0 {
        sext32(a)
    } else {
        (a as i32).wrapping_rem(b as i32) as i64 as u64
    }
);
rtype!(
    /// Remainder, 32-bit unsigned.
    remuw, |a, b| if b as u32 == 0 {
        sext32(a)
    } else {
        sext32(((a as u32) % (b as u32)) as u64)
    }
);

/// Memory fence. Single-hart and in order, so nothing to do.
pub fn fence(_s: &mut Decode, _m: &mut Machine) -> Outcome {
    Ok(())
}

/// Environment breakpoint: the guest asks to halt with exit code `a0`.
pub fn ebreak(_s: &mut Decode, m: &mut Machine) -> Outcome {
    let code = m.reg(REG_A0);
    m.request_halt(HaltRequest::Exit(code));
    Ok(())
}
