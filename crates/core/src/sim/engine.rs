//! Execution engine.
//!
//! Owns the machine, the run state and every per-step consumer. One step is:
//! 1. **Fetch/Decode:** The ISA fills a fresh `Decode` record and names an opcode id.
//! 2. **Dispatch:** The handler for that id executes against the machine.
//! 3. **Retire:** The pc moves to the resolved next pc and the counter ticks.
//! 4. **Observe:** Diagnostics consume the record, then watchpoints are re-evaluated.
//!
//! `run` repeats this until the step budget is spent or the run state leaves
//! `Running`.

use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::common::console;
use crate::common::{ExprError, MemError, SimError, WatchError};
use crate::config::{Config, TraceConfig};
use crate::cpu::{Decode, HaltRequest, Machine};
use crate::diag::{DiffTest, Diagnostics, itrace};
use crate::isa::Isa;
use crate::memory::Ram;
use crate::sdb::expr::{EvalContext, evaluate};
use crate::sdb::watchpoint::{WatchChange, WatchInfo, WatchPool};
use crate::sim::dispatch::DispatchTable;
use crate::sim::loader;
use crate::sim::state::{RunState, SimState};
use crate::sim::symbols::SymbolTable;
use crate::stats::SimStats;

const ANSI_RED: &str = "\x1b[1;31m";
const ANSI_GREEN: &str = "\x1b[1;32m";
const ANSI_NONE: &str = "\x1b[0m";

/// Exit code recorded when the simulator itself aborts the run.
const ABORT_RET: u64 = u64::MAX;

/// Outcome of one `run` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Instructions executed by this call.
    pub executed: u64,
    /// Watch changes detected by this call, in detection order.
    pub changes: Vec<WatchChange>,
    /// Run state on return.
    pub state: RunState,
}

/// Read-only view of the machine for the expression evaluator.
#[derive(Clone, Copy)]
pub struct MachineView<'a> {
    isa: &'a dyn Isa,
    machine: &'a Machine,
}

impl<'a> MachineView<'a> {
    /// Creates a view.
    pub fn new(isa: &'a dyn Isa, machine: &'a Machine) -> Self {
        Self { isa, machine }
    }
}

impl fmt::Debug for MachineView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineView")
            .field("machine", &self.machine)
            .finish_non_exhaustive()
    }
}

impl EvalContext for MachineView<'_> {
    fn register(&self, name: &str) -> Result<u64, ExprError> {
        if name == "pc" {
            return Ok(self.machine.cpu.pc);
        }
        self.isa
            .reg_index(name)
            .map(|idx| self.machine.reg(idx))
            .ok_or_else(|| ExprError::UnknownRegister(format!("${name}")))
    }

    fn read_byte(&self, addr: u64) -> Result<u8, ExprError> {
        self.machine
            .load(addr, 1)
            .map(|v| v as u8)
            .map_err(|_| ExprError::BadAddress(addr))
    }
}

/// The fetch-decode-dispatch-retire loop and everything it owns.
pub struct Engine {
    isa: Box<dyn Isa>,
    table: DispatchTable,
    machine: Machine,
    state: SimState,
    stats: SimStats,
    diag: Diagnostics,
    watches: WatchPool,
    symbols: SymbolTable,
    trace: TraceConfig,
    out: Box<dyn Write>,
}

impl Engine {
    /// Creates an engine around an already loaded machine.
    ///
    /// The dispatch table is built here, once. Console output goes to stdout
    /// until replaced with `with_output`.
    pub fn new(isa: impl Isa + 'static, machine: Machine, config: &Config) -> Self {
        let isa: Box<dyn Isa> = Box::new(isa);
        let table = DispatchTable::build(isa.as_ref());
        Self {
            isa,
            table,
            machine,
            state: SimState::default(),
            stats: SimStats::default(),
            diag: Diagnostics::new(&config.trace),
            watches: WatchPool::default(),
            symbols: SymbolTable::default(),
            trace: config.trace.clone(),
            out: Box::new(io::stdout()),
        }
    }

    /// Creates RAM from the configuration, loads an image and builds the engine.
    ///
    /// # Arguments
    ///
    /// * `isa` - Instruction set to execute.
    /// * `config` - Memory map and trace settings.
    /// * `image` - Image file; the built-in program is used when `None`.
    ///
    /// # Errors
    ///
    /// Returns the loader's `SimError`.
    pub fn boot(
        isa: impl Isa + 'static,
        config: &Config,
        image: Option<&Path>,
    ) -> Result<Self, SimError> {
        let base = config.general.ram_base;
        let mut ram = Ram::new(base, config.general.ram_size);
        let loaded = match image {
            Some(path) => loader::load_file(path, &mut ram, base)?,
            None => {
                info!("no image given, using the built-in program");
                loader::load_builtin(&mut ram, base)?
            }
        };
        let pc = loaded.entry.unwrap_or_else(|| config.general.entry_pc());
        let machine = Machine::new(Box::new(ram), pc);
        Ok(Self::new(isa, machine, config).with_symbols(loaded.symbols))
    }

    /// Redirects console output (trace echo, halt line, statistics, watch reports).
    #[must_use]
    pub fn with_output(mut self, out: impl Write + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    /// Attaches a differential-test reference stepper.
    ///
    /// The stepper only runs when `trace.difftest` is enabled.
    #[must_use]
    pub fn with_difftest(mut self, stepper: impl DiffTest + 'static) -> Self {
        if self.trace.difftest {
            self.diag.set_difftest(Box::new(stepper));
        } else {
            warn!("difftest stepper attached but trace.difftest is off");
        }
        self
    }

    /// Supplies the function symbols used by the call tracer.
    #[must_use]
    pub fn with_symbols(mut self, symbols: SymbolTable) -> Self {
        self.symbols = symbols;
        self
    }

    /// Runs up to `max_steps` instructions; `RUN_UNBOUNDED` runs until the guest halts.
    ///
    /// Stops early when a watch changes or the run ends or aborts. Once the run
    /// has ended or aborted, further calls only print a notice.
    pub fn run(&mut self, max_steps: u64) -> RunReport {
        let echo = max_steps < self.trace.print_step_limit;

        if self.state.run_state.is_terminal() {
            self.say("Program execution has ended. To restart the program, exit rvdb and run again.");
            return RunReport {
                executed: 0,
                changes: Vec::new(),
                state: self.state.run_state,
            };
        }
        self.state.run_state = RunState::Running;

        let start = Instant::now();
        let before = self.stats.instructions;
        let mut changes = Vec::new();
        let mut remaining = max_steps;
        while remaining > 0 {
            self.exec_once(echo, &mut changes);
            if self.state.run_state != RunState::Running {
                break;
            }
            remaining -= 1;
        }
        self.stats.add_time(start.elapsed());

        match self.state.run_state {
            RunState::Running => self.state.run_state = RunState::Stopped,
            RunState::Ended | RunState::Aborted => {
                self.report_halt();
                self.report_statistics();
            }
            RunState::Stopped | RunState::Quit => {}
        }

        RunReport {
            executed: self.stats.instructions - before,
            changes,
            state: self.state.run_state,
        }
    }

    fn exec_once(&mut self, echo: bool, changes: &mut Vec<WatchChange>) {
        let pc = self.machine.cpu.pc;
        let mut s = Decode::new(pc);

        let decoded = self.isa.fetch_decode(&mut s, self.machine.mem.as_ref());
        if self.diag.wants_line() && s.ilen > 0 {
            s.logbuf = itrace::format_line(pc, &s.bytes(), &self.isa.disassemble(&s));
            self.diag.record(&s.logbuf);
        }
        let id = match decoded {
            Ok(id) => id,
            Err(err) => return self.abort(pc, &err),
        };

        if let Err(err) = self.table.handler(id).execute(&mut s, &mut self.machine) {
            tracing::debug!(op = self.table.name(id).unwrap_or("?"), "handler faulted");
            return self.abort(pc, &err);
        }
        self.machine.cpu.pc = s.dnpc;
        self.stats.instructions += 1;

        match self.machine.take_halt() {
            Some(HaltRequest::Exit(code)) => self.state.halt(RunState::Ended, pc, code),
            Some(HaltRequest::Abort) => self.state.halt(RunState::Aborted, pc, ABORT_RET),
            None => {}
        }

        let consumed = self.diag.consume(
            &s,
            &self.machine.cpu,
            &self.symbols,
            echo,
            self.out.as_mut(),
        );
        if let Err(mismatch) = consumed {
            error!(%mismatch, "reference stepper disagrees");
            self.say(mismatch);
            self.state.halt(RunState::Aborted, pc, ABORT_RET);
        }
        if self.state.run_state == RunState::Aborted {
            self.dump_ring();
        }

        if self.trace.watchpoints && !self.watches.is_empty() {
            let view = MachineView::new(self.isa.as_ref(), &self.machine);
            let found = self.watches.check(&view);
            if !found.is_empty() {
                self.say("Watchpoint value changed:");
                for change in &found {
                    self.say(change.line());
                }
                if self.state.run_state == RunState::Running {
                    self.state.run_state = RunState::Stopped;
                }
                changes.extend(found);
            }
        }
    }

    fn abort(&mut self, pc: u64, err: &SimError) {
        error!(pc, %err, "run aborted");
        self.say(err);
        self.state.halt(RunState::Aborted, pc, ABORT_RET);
        self.dump_ring();
    }

    fn dump_ring(&mut self) {
        for line in self.diag.ring_dump() {
            self.say(line);
        }
    }

    fn report_halt(&mut self) {
        let (color, label) = match (self.state.run_state, self.state.halt_ret) {
            (RunState::Aborted, _) => (ANSI_RED, "ABORT"),
            (_, 0) => (ANSI_GREEN, "HIT GOOD TRAP"),
            _ => (ANSI_RED, "HIT BAD TRAP"),
        };
        info!(pc = self.state.halt_pc, ret = self.state.halt_ret, "{label}");
        let pc = self.state.halt_pc;
        self.say(format_args!("rvdb: {color}{label}{ANSI_NONE} at pc = {pc:#018x}"));
    }

    fn report_statistics(&mut self) {
        for line in self.stats.summary() {
            info!("{line}");
            self.say(line);
        }
    }

    /// Ends the session at the user's request and prints the statistics summary.
    pub fn quit(&mut self) {
        self.state.run_state = RunState::Quit;
        self.report_statistics();
    }

    /// Evaluates an expression against the current machine state.
    ///
    /// # Errors
    ///
    /// Returns the evaluator's `ExprError`; no state is changed.
    pub fn evaluate(&self, text: &str) -> Result<u64, ExprError> {
        evaluate(text, &self.view())
    }

    /// Adds a watch on `text`.
    ///
    /// # Errors
    ///
    /// See `WatchPool::add`.
    pub fn add_watch(&mut self, text: &str) -> Result<usize, WatchError> {
        let view = MachineView::new(self.isa.as_ref(), &self.machine);
        self.watches.add(text, &view)
    }

    /// Removes watch `id`.
    ///
    /// # Errors
    ///
    /// Returns `WatchError::NotFound` if no such watch is active.
    pub fn remove_watch(&mut self, id: usize) -> Result<(), WatchError> {
        self.watches.remove(id)
    }

    /// Active watches, most recently added first.
    pub fn watches(&self) -> Vec<WatchInfo> {
        self.watches.list()
    }

    /// Current status.
    pub const fn state(&self) -> &SimState {
        &self.state
    }

    /// Cumulative counters.
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// The simulated machine.
    pub const fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Mutable access to the machine, for loading and setup between runs.
    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    /// The instruction set.
    pub fn isa(&self) -> &dyn Isa {
        self.isa.as_ref()
    }

    /// Number of instruction forms in the dispatch table.
    pub fn opcode_count(&self) -> usize {
        self.table.len()
    }

    /// Evaluation context over the current machine state.
    pub fn view(&self) -> MachineView<'_> {
        MachineView::new(self.isa.as_ref(), &self.machine)
    }

    /// Reads physical memory.
    ///
    /// # Errors
    ///
    /// Returns the memory device's `MemError`.
    pub fn read_memory(&self, addr: u64, len: usize) -> Result<u64, MemError> {
        self.machine.load(addr, len)
    }

    /// Register dump, four registers per line, then the pc.
    pub fn register_lines(&self) -> Vec<String> {
        let isa = self.isa.as_ref();
        let mut lines = self.machine.cpu.gpr.dump(|i| isa.reg_name(i));
        lines.push(format!("{:<4}:{:#018x}", "pc", self.machine.cpu.pc));
        lines
    }

    /// Console output shared with the command layer.
    pub fn out(&mut self) -> &mut dyn Write {
        self.out.as_mut()
    }

    /// Prints one line to the console.
    pub fn say(&mut self, line: impl fmt::Display) {
        console::say(self.out.as_mut(), line);
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("table", &self.table)
            .field("machine", &self.machine)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .field("diag", &self.diag)
            .field("watches", &self.watches)
            .finish_non_exhaustive()
    }
}
