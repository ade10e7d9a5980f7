//! # Differential Testing Tests
//!
//! The engine forwards every retired instruction to the reference stepper and
//! aborts on the first disagreement.

use mockall::predicate::eq;
use pretty_assertions::assert_eq;
use rvdb_core::common::DiffMismatch;
use rvdb_core::common::constants::RUN_UNBOUNDED;
use rvdb_core::config::Config;
use rvdb_core::sim::RunState;

use crate::common::harness::{ADDI_A0, EBREAK, engine_with};
use crate::common::mocks::MockReference;

const BASE: u64 = 0x8000_0000;

fn difftest_config() -> Config {
    let mut config = Config::default();
    config.trace.difftest = true;
    config
}

#[test]
fn every_step_is_forwarded() {
    let mut reference = MockReference::new();
    let _ = reference
        .expect_step()
        .with(eq(BASE), eq(BASE + 4), mockall::predicate::always())
        .times(1)
        .returning(|_, _, cpu| {
            assert_eq!(cpu.gpr.read(10), 1);
            Ok(())
        });
    let _ = reference
        .expect_step()
        .with(eq(BASE + 4), eq(BASE + 8), mockall::predicate::always())
        .times(1)
        .returning(|_, _, _| Ok(()));

    let (engine, _out) = engine_with(&[ADDI_A0, EBREAK], &difftest_config());
    let mut engine = engine.with_difftest(reference);

    let report = engine.run(RUN_UNBOUNDED);
    assert_eq!(report.state, RunState::Ended);
}

#[test]
fn mismatch_aborts_the_run() {
    let mut reference = MockReference::new();
    let _ = reference.expect_step().times(2).returning(|pc, _, _| {
        if pc == BASE + 4 {
            Err(DiffMismatch {
                pc,
                what: "a0 is 2, reference has 3".into(),
            })
        } else {
            Ok(())
        }
    });

    let (engine, out) = engine_with(&[ADDI_A0, ADDI_A0, ADDI_A0, EBREAK], &difftest_config());
    let mut engine = engine.with_difftest(reference);

    let report = engine.run(RUN_UNBOUNDED);
    assert_eq!(report.executed, 2);
    assert_eq!(report.state, RunState::Aborted);
    assert_eq!(engine.state().halt_pc, BASE + 4);

    let text = out.contents();
    assert!(text.contains("difftest mismatch at pc = 0x80000004: a0 is 2, reference has 3"));
    assert!(text.contains("--> 0x0000000080000004:"));
    assert!(text.contains("ABORT"));
}

#[test]
fn stepper_is_ignored_when_disabled() {
    let mut reference = MockReference::new();
    let _ = reference.expect_step().never();

    let (engine, _out) = engine_with(&[ADDI_A0, EBREAK], &Config::default());
    let mut engine = engine.with_difftest(reference);

    let report = engine.run(RUN_UNBOUNDED);
    assert_eq!(report.state, RunState::Ended);
}
