//! # Execution Engine Tests
//!
//! Step budgets, watch-triggered stops, guest halts, decode aborts and the
//! per-step trace output, driven through hand-assembled RV64 programs.

use pretty_assertions::assert_eq;
use rvdb_core::common::constants::RUN_UNBOUNDED;
use rvdb_core::config::Config;
use rvdb_core::isa::Isa;
use rvdb_core::sdb::WatchChange;
use rvdb_core::sim::{RunState, Symbol, SymbolTable};
use rvdb_core::{Engine, Rv64};

use crate::common::harness::{
    ADDI_A0, EBREAK, JAL_RA_8, LI_A0_0, LI_A0_1, RET, SharedBuf, engine, engine_with,
    init_tracing,
};

const BASE: u64 = 0x8000_0000;

/// Eight increments of `a0`, then `ebreak`.
fn counter() -> Vec<u32> {
    let mut program = vec![ADDI_A0; 8];
    program.push(EBREAK);
    program
}

#[test]
fn run_executes_exactly_the_budget() {
    let (mut engine, _out) = engine(&counter());

    let report = engine.run(5);
    assert_eq!(report.executed, 5);
    assert_eq!(report.state, RunState::Stopped);
    assert!(report.changes.is_empty());
    assert_eq!(engine.stats().instructions, 5);
    assert_eq!(engine.machine().reg(10), 5);
    assert_eq!(engine.machine().cpu.pc, BASE + 20);
}

#[test]
fn zero_budget_executes_nothing() {
    let (mut engine, _out) = engine(&counter());
    let report = engine.run(0);
    assert_eq!(report.executed, 0);
    assert_eq!(report.state, RunState::Stopped);
}

#[test]
fn halt_stops_before_budget_is_spent() {
    let (mut engine, out) = engine(&counter());
    let _ = engine.run(5);

    let report = engine.run(100);
    assert_eq!(report.executed, 4);
    assert_eq!(report.state, RunState::Ended);
    assert_eq!(engine.stats().instructions, 9);
    assert_eq!(engine.state().halt_pc, BASE + 32);
    assert_eq!(engine.state().halt_ret, 8);
    assert!(!engine.state().is_good_exit());

    let text = out.contents();
    assert!(text.contains("HIT BAD TRAP"));
    assert!(text.contains("at pc = 0x0000000080000020"));
    assert!(text.contains("total guest instructions = 9"));
}

#[test]
fn run_after_end_is_a_noop() {
    let (mut engine, out) = engine(&[LI_A0_0, EBREAK]);
    let _ = engine.run(RUN_UNBOUNDED);
    assert_eq!(engine.state().run_state, RunState::Ended);
    out.clear();

    let report = engine.run(3);
    assert_eq!(report.executed, 0);
    assert_eq!(report.state, RunState::Ended);
    assert_eq!(engine.stats().instructions, 2);
    assert_eq!(
        out.contents(),
        "Program execution has ended. To restart the program, exit rvdb and run again.\n"
    );
}

#[test]
fn watch_change_stops_the_run() {
    let (mut engine, out) = engine(&counter());
    let id = engine.add_watch("$a0").unwrap();

    let report = engine.run(5);
    assert_eq!(report.executed, 1);
    assert_eq!(report.state, RunState::Stopped);
    let change = WatchChange {
        id,
        expr: "$a0".into(),
        old: 0,
        new: 1,
    };
    assert_eq!(report.changes, vec![change.clone()]);

    let text = out.contents();
    assert!(text.contains("Watchpoint value changed:"));
    assert!(text.contains(&change.line()));

    let report = engine.run(5);
    assert_eq!(report.executed, 1);
    assert_eq!(report.changes[0].old, 1);
    assert_eq!(report.changes[0].new, 2);
}

#[test]
fn unchanged_watch_does_not_stop() {
    let (mut engine, _out) = engine(&counter());
    let _ = engine.add_watch("$a1 + 1").unwrap();

    let report = engine.run(5);
    assert_eq!(report.executed, 5);
    assert!(report.changes.is_empty());
}

#[test]
fn removed_watch_no_longer_fires() {
    let (mut engine, _out) = engine(&counter());
    let id = engine.add_watch("$a0").unwrap();
    engine.remove_watch(id).unwrap();
    assert!(engine.watches().is_empty());

    let report = engine.run(3);
    assert_eq!(report.executed, 3);
}

#[test]
fn watch_evaluation_can_be_disabled() {
    let mut config = Config::default();
    config.trace.watchpoints = false;
    let (mut engine, _out) = engine_with(&counter(), &config);
    let _ = engine.add_watch("$a0").unwrap();

    let report = engine.run(5);
    assert_eq!(report.executed, 5);
}

#[test]
fn watch_change_on_halting_step_keeps_end_state() {
    let (mut engine, _out) = engine(&[LI_A0_1, EBREAK]);
    let _ = engine.add_watch("$pc").unwrap();

    let _ = engine.run(1);
    let report = engine.run(RUN_UNBOUNDED);
    assert_eq!(report.executed, 1);
    assert_eq!(report.changes.len(), 1);
    assert_eq!(report.state, RunState::Ended);
}

#[test]
fn builtin_program_hits_good_trap() {
    init_tracing();
    let out = SharedBuf::default();
    let mut engine = Engine::boot(Rv64::new(), &Config::default(), None)
        .unwrap()
        .with_output(out.clone());

    assert_eq!(engine.evaluate("*0x80000010"), Ok(0xef));
    let report = engine.run(RUN_UNBOUNDED);
    assert_eq!(report.executed, 4);
    assert_eq!(report.state, RunState::Ended);
    assert_eq!(engine.state().halt_ret, 0);
    assert_eq!(engine.state().halt_pc, BASE + 12);
    assert!(engine.state().is_good_exit());
    assert_eq!(engine.evaluate("*0x80000010"), Ok(0));
    assert_eq!(engine.evaluate("$a0"), Ok(0));

    let text = out.contents();
    assert!(text.contains("HIT GOOD TRAP"));
    assert!(text.contains("total guest instructions = 4"));
}

#[test]
fn invalid_instruction_aborts_and_dumps_ring() {
    let (mut engine, out) = engine(&[ADDI_A0, 0x0000_0000]);

    let report = engine.run(RUN_UNBOUNDED);
    assert_eq!(report.executed, 1);
    assert_eq!(report.state, RunState::Aborted);
    assert_eq!(engine.state().halt_pc, BASE + 4);
    assert_eq!(engine.state().halt_ret, u64::MAX);
    assert!(!engine.state().is_good_exit());

    let text = out.contents();
    assert!(text.contains("invalid instruction 0x00000000"));
    assert!(text.contains("    0x0000000080000000: 13 05 15 00 addi a0, a0, 1"));
    assert!(text.contains("--> 0x0000000080000004: 00 00 00 00 unknown (0x00000000)"));
    assert!(text.contains("ABORT"));

    let again = engine.run(RUN_UNBOUNDED);
    assert_eq!(again.executed, 0);
    assert_eq!(engine.stats().instructions, 1);
}

#[test]
fn fetch_outside_memory_aborts() {
    let (mut engine, out) = engine(&[ADDI_A0]);
    engine.machine_mut().cpu.pc = 0x10;

    let report = engine.run(1);
    assert_eq!(report.executed, 0);
    assert_eq!(report.state, RunState::Aborted);
    assert!(out.contents().contains("instruction fetch failed at pc = 0x10"));
}

#[test]
fn short_runs_echo_each_instruction() {
    let (mut engine, out) = engine(&counter());
    let _ = engine.run(3);

    let text = out.contents();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "0x0000000080000000: 13 05 15 00 addi a0, a0, 1");
    assert!(lines[2].starts_with("0x0000000080000008:"));
}

#[test]
fn long_runs_do_not_echo() {
    let (mut engine, out) = engine(&counter());
    let _ = engine.run(10);
    assert!(!out.contents().contains("addi a0, a0, 1"));
}

#[test]
fn call_trace_names_functions() {
    let mut config = Config::default();
    config.trace.ftrace = true;
    let (engine, out) = engine_with(&[JAL_RA_8, EBREAK, RET], &config);
    let mut engine = engine.with_symbols(SymbolTable::new(vec![
        Symbol::new("leaf", BASE + 8, 4),
        Symbol::new("main", BASE, 8),
    ]));

    let report = engine.run(RUN_UNBOUNDED);
    assert_eq!(report.executed, 3);
    assert!(engine.state().is_good_exit());

    let text = out.contents();
    assert!(text.contains("80000000:call[leaf@0x80000008]\n"));
    assert!(text.contains("80000008:ret[leaf]\n"));
}

#[test]
fn quit_reports_statistics() {
    let (mut engine, out) = engine(&counter());
    let _ = engine.run(2);
    out.clear();

    engine.quit();
    assert_eq!(engine.state().run_state, RunState::Quit);
    assert!(engine.state().is_good_exit());
    assert!(out.contents().contains("total guest instructions = 2"));
}

#[test]
fn register_dump_ends_with_pc() {
    let (mut engine, _out) = engine(&counter());
    let _ = engine.run(5);

    let lines = engine.register_lines();
    assert_eq!(lines.len(), 9);
    assert!(lines[2].contains("a0  :0x0000000000000005"));
    assert_eq!(lines[8], "pc  :0x0000000080000014");
}

#[test]
fn dispatch_table_covers_the_instruction_list() {
    let (engine, _out) = engine(&[]);
    assert_eq!(engine.opcode_count(), engine.isa().instructions().len());
}

#[test]
fn engine_runs_any_isa() {
    use crate::common::harness::TEST_RAM;
    use crate::common::toy::{TOY_HALT, TOY_INC, TOY_NOP, ToyIsa};
    use rvdb_core::Machine;
    use rvdb_core::memory::{Memory, Ram};

    let words = [TOY_INC, TOY_NOP, TOY_INC, TOY_HALT];
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    let mut ram = Ram::new(BASE, TEST_RAM);
    ram.load(BASE, &bytes).unwrap();

    let out = SharedBuf::default();
    let mut engine = Engine::new(ToyIsa, Machine::new(Box::new(ram), BASE), &Config::default())
        .with_output(out.clone());
    assert_eq!(engine.opcode_count(), 3);
    assert_eq!(engine.evaluate("$r1"), Ok(0));

    let _ = engine.run(3);
    assert!(out.contents().contains("0x0000000080000004: 00 00 00 00 nop"));
    assert_eq!(engine.evaluate("$r1"), Ok(2));
    assert!(engine.evaluate("$a0").is_err());

    let report = engine.run(RUN_UNBOUNDED);
    assert_eq!(report.executed, 1);
    assert_eq!(engine.state().halt_ret, 2);
    assert_eq!(engine.state().run_state, RunState::Ended);
}
