//! Per-step diagnostics.
//!
//! Everything here consumes the decode record of the instruction that just
//! retired. It provides:
//! 1. **Instruction Trace:** Formatted trace lines, echoed on short runs and kept in a
//!    ring buffer for the abort dump.
//! 2. **Call Trace:** Indented `call`/`ret` lines against the function symbol table.
//! 3. **Differential Test:** Forwards each step to a reference stepper.
//!
//! Each side-channel is switched on or off by `TraceConfig`.

/// Reference-stepper hook.
pub mod difftest;
/// Call/return tracer.
pub mod ftrace;
/// Trace line formatting and the ring buffer.
pub mod itrace;

use std::fmt;
use std::io::Write;

use crate::common::DiffMismatch;
use crate::common::console;
use crate::config::TraceConfig;
use crate::cpu::{CpuState, Decode};
use crate::sim::symbols::SymbolTable;

pub use difftest::DiffTest;
pub use ftrace::CallTracer;
pub use itrace::RingBuffer;

/// The diagnostics sink.
pub struct Diagnostics {
    itrace: bool,
    ring: Option<RingBuffer>,
    calls: Option<CallTracer>,
    difftest: Option<Box<dyn DiffTest>>,
}

impl Diagnostics {
    /// Builds the sink from the trace configuration. No reference stepper is attached.
    pub fn new(cfg: &TraceConfig) -> Self {
        Self {
            itrace: cfg.itrace,
            ring: cfg.iringbuf.then(|| RingBuffer::new(cfg.ringbuf_size)),
            calls: cfg.ftrace.then(CallTracer::new),
            difftest: None,
        }
    }

    /// Attaches a reference stepper.
    pub fn set_difftest(&mut self, stepper: Box<dyn DiffTest>) {
        self.difftest = Some(stepper);
    }

    /// True if any consumer needs the formatted trace line.
    pub const fn wants_line(&self) -> bool {
        self.itrace || self.ring.is_some()
    }

    /// Stores a freshly decoded instruction's line in the ring.
    pub fn record(&mut self, line: &str) {
        if let Some(ring) = self.ring.as_mut() {
            ring.push(line.to_owned());
        }
    }

    /// Ring contents, oldest first, newest marked. Empty if the ring is off.
    pub fn ring_dump(&self) -> Vec<String> {
        self.ring.as_ref().map(RingBuffer::dump).unwrap_or_default()
    }

    /// Consumes a retired instruction.
    ///
    /// # Arguments
    ///
    /// * `s` - Decode record of the instruction; `dnpc` is the new pc.
    /// * `cpu` - CPU state after the instruction.
    /// * `symbols` - Function table for the call tracer.
    /// * `echo` - Print the trace line to `out` (short runs only).
    /// * `out` - Console output.
    ///
    /// # Errors
    ///
    /// Returns the reference stepper's `DiffMismatch`.
    pub fn consume(
        &mut self,
        s: &Decode,
        cpu: &CpuState,
        symbols: &SymbolTable,
        echo: bool,
        out: &mut dyn Write,
    ) -> Result<(), DiffMismatch> {
        if self.itrace {
            tracing::trace!(target: "itrace", "{}", s.logbuf);
            if echo {
                console::say(out, &s.logbuf);
            }
        }

        if let Some(calls) = self.calls.as_mut() {
            if let Some(line) = calls.observe(s, symbols) {
                tracing::debug!(target: "ftrace", "{line}");
                console::say(out, line);
            }
        }

        match self.difftest.as_mut() {
            Some(stepper) => stepper.step(s.pc, s.dnpc, cpu),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("itrace", &self.itrace)
            .field("ring", &self.ring)
            .field("calls", &self.calls)
            .field("difftest", &self.difftest.is_some())
            .finish()
    }
}
