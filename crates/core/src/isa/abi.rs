//! RISC-V integer register names.
//!
//! Standard ABI names for `x0`-`x31` plus the lookup used by the expression
//! evaluator. Accepted spellings are the ABI name, `0` and `zero` for `x0`,
//! `fp` for `s0`, and the numeric `x0`-`x31` forms.

use crate::common::constants::NR_GPR;

/// Register x0 (hardwired zero).
pub const REG_ZERO: usize = 0;
/// Register x8 (saved register / frame pointer, s0).
pub const REG_S0: usize = 8;
/// Register x10 (first argument / return value, a0).
pub const REG_A0: usize = 10;

/// ABI names for x0-x31.
pub const REG_NAMES: [&str; NR_GPR] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// Returns the ABI name for an integer register index.
#[inline]
pub fn name(idx: usize) -> &'static str {
    REG_NAMES.get(idx).copied().unwrap_or("x??")
}

/// Resolves a register name written without its `$` prefix.
///
/// # Returns
///
/// The architectural index, or `None` if the name is not a general register.
pub fn index(name: &str) -> Option<usize> {
    match name {
        "0" => return Some(REG_ZERO),
        "fp" => return Some(REG_S0),
        _ => {}
    }
    if let Some(pos) = REG_NAMES.iter().position(|&n| n == name) {
        return Some(pos);
    }
    let num = name.strip_prefix('x')?;
    if num.len() > 1 && num.starts_with('0') {
        return None;
    }
    num.parse::<usize>().ok().filter(|&i| i < NR_GPR)
}
