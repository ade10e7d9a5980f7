//! # Expression Evaluation Tests
//!
//! Arithmetic, precedence, unary disambiguation, dereference and structural
//! failures, evaluated against a scripted context.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use rvdb_core::common::ExprError;
use rvdb_core::sdb::Expr;
use rvdb_core::sdb::expr::evaluate;

use crate::common::harness::ScratchContext;

fn eval(text: &str) -> Result<u64, ExprError> {
    evaluate(text, &ScratchContext::new())
}

#[rstest]
#[case("1+2*3", 7)]
#[case("(1+2)*3", 9)]
#[case("10/3", 3)]
#[case("10%3", 1)]
#[case("10-3-2", 5)]
#[case("64/4/2", 8)]
#[case("1<<4>>2", 4)]
#[case("0x10 + 010", 26)]
#[case("3 < 4 && 4 <= 4", 1)]
#[case("1 == 2 || 2 != 2", 0)]
#[case("0xf0 | 0x0f ^ 0xff & 0x3c", 0xf0 | (0x0f ^ (0xff & 0x3c)))]
#[case("!0 + !7", 1)]
#[case("~0", u64::MAX)]
fn arithmetic(#[case] text: &str, #[case] expected: u64) {
    assert_eq!(eval(text), Ok(expected));
}

#[test]
fn leading_minus_is_negation() {
    assert_eq!(eval("-5+3"), Ok((-2i64) as u64));
}

#[test]
fn minus_after_operator_is_negation() {
    assert_eq!(eval("1*-2"), Ok((-2i64) as u64));
    assert_eq!(eval("4-(-2)"), Ok(6));
}

#[test]
fn stacked_prefix_operators() {
    assert_eq!(eval("- -3"), Ok(3));
    assert_eq!(eval("-~0"), Ok(1));
    assert_eq!(eval("!!5"), Ok(1));
}

#[test]
fn star_after_operand_is_multiplication() {
    let expr = Expr::parse("2*3").unwrap();
    assert_eq!(expr.eval(&ScratchContext::new()), Ok(6));
}

#[test]
fn dereference_reads_one_byte() {
    let mut ctx = ScratchContext::new().byte(0x1000, 0xab).byte(0x1001, 0xcd);
    assert_eq!(evaluate("*0x1000", &ctx), Ok(0xab));

    ctx.poke(0x1000, 0x07);
    assert_eq!(evaluate("*0x1000", &ctx), Ok(0x07));
    assert_eq!(evaluate("*0x1000 + *(0x1000 + 1)", &ctx), Ok(0x07 + 0xcd));
}

#[test]
fn dereference_of_unmapped_address_fails() {
    assert_eq!(eval("*0x2000"), Err(ExprError::BadAddress(0x2000)));
}

#[test]
fn registers_are_read_from_context() {
    let ctx = ScratchContext::new().reg("a0", 40).reg("sp", 0x8000);
    assert_eq!(evaluate("$a0 + 2", &ctx), Ok(42));
    assert_eq!(evaluate("$sp - 8", &ctx), Ok(0x7ff8));
    assert_eq!(
        evaluate("$t9", &ctx),
        Err(ExprError::UnknownRegister("$t9".into()))
    );
}

#[rstest]
#[case("(1+2", ExprError::Unbalanced)]
#[case("1+2)", ExprError::Unbalanced)]
#[case("", ExprError::MissingOperand)]
#[case("1+", ExprError::MissingOperand)]
#[case("()", ExprError::MissingOperand)]
#[case("1 2", ExprError::MissingOperator)]
#[case("1/0", ExprError::DivideByZero)]
#[case("5%0", ExprError::DivideByZero)]
#[case("main + 1", ExprError::UnresolvedSymbol("main".into()))]
#[case("1 # 2", ExprError::NoMatch { pos: 2 })]
fn malformed_expressions_fail(#[case] text: &str, #[case] expected: ExprError) {
    assert_eq!(eval(text), Err(expected));
}

#[test]
fn evaluation_has_no_side_effects() {
    let ctx = ScratchContext::new().reg("a0", 1);
    let expr = Expr::parse("$a0 * 3").unwrap();
    assert_eq!(expr.eval(&ctx), Ok(3));
    assert_eq!(expr.eval(&ctx), Ok(3));
    assert_eq!(expr.text(), "$a0 * 3");
}

proptest! {
    #[test]
    fn matches_machine_arithmetic(a in any::<u32>(), b in any::<u32>(), c in any::<u32>()) {
        let (a, b, c) = (u64::from(a), u64::from(b), u64::from(c));
        prop_assert_eq!(eval(&format!("{a}+{b}*{c}")), Ok(a.wrapping_add(b.wrapping_mul(c))));
        prop_assert_eq!(eval(&format!("({a}-{b})*{c}")), Ok(a.wrapping_sub(b).wrapping_mul(c)));
        prop_assert_eq!(eval(&format!("{a} - {b} - {c}")), Ok(a.wrapping_sub(b).wrapping_sub(c)));
    }

    #[test]
    fn division_matches_machine_arithmetic(a in any::<u32>(), b in 1u32..) {
        let (a, b) = (u64::from(a), u64::from(b));
        prop_assert_eq!(eval(&format!("{a}/{b}")), Ok(a / b));
        prop_assert_eq!(eval(&format!("{a}%{b}")), Ok(a % b));
        prop_assert_eq!(eval(&format!("{a:#x}/{b:#x}")), Ok(a / b));
    }

    #[test]
    fn negation_wraps(a in any::<u32>()) {
        prop_assert_eq!(eval(&format!("-{a}")), Ok(u64::from(a).wrapping_neg()));
        prop_assert_eq!(eval(&format!("1*-{a}")), Ok(u64::from(a).wrapping_neg()));
    }
}
