//! Configuration system for the simulator.
//!
//! This module defines the configuration structures used to parameterize a run.
//! It provides:
//! 1. **Defaults:** Baseline memory map and diagnostic settings.
//! 2. **Structures:** `general` (memory map, start pc, batch mode) and `trace`
//!    (which diagnostics are active and how verbose they are).
//!
//! Configuration is read from JSON with `Config::from_json`; every field is optional.

use serde::Deserialize;

use crate::common::SimError;

/// Default configuration constants for the simulator.
mod defaults {
    /// Base address of main system RAM (2 GiB).
    pub const RAM_BASE: u64 = 0x8000_0000;

    /// Total size of main system RAM (128 MiB).
    pub const RAM_SIZE: usize = 128 * 1024 * 1024;

    /// Number of formatted instructions kept by the ring trace.
    pub const RINGBUF_SIZE: usize = 16;

    /// Runs shorter than this many steps echo each instruction as it retires.
    pub const PRINT_STEP_LIMIT: u64 = 10;
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Memory map and start-up settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Diagnostic side-channels.
    #[serde(default)]
    pub trace: TraceConfig,
}

impl Config {
    /// Parses a configuration document.
    ///
    /// # Arguments
    ///
    /// * `text` - JSON text; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` if the text is not valid JSON for this schema.
    pub fn from_json(text: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Memory map and start-up settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Main RAM base address.
    #[serde(default = "GeneralConfig::default_ram_base")]
    pub ram_base: u64,

    /// Main RAM size in bytes.
    #[serde(default = "GeneralConfig::default_ram_size")]
    pub ram_size: usize,

    /// Initial PC value for raw images; `None` starts at `ram_base`.
    /// ELF images override it with their entry.
    #[serde(default)]
    pub start_pc: Option<u64>,

    /// Run to completion without reading debugger commands.
    #[serde(default)]
    pub batch: bool,
}

impl GeneralConfig {
    fn default_ram_base() -> u64 {
        defaults::RAM_BASE
    }

    fn default_ram_size() -> usize {
        defaults::RAM_SIZE
    }

    /// PC a raw image starts at: `start_pc` if set, otherwise the RAM base.
    pub const fn entry_pc(&self) -> u64 {
        match self.start_pc {
            Some(pc) => pc,
            None => self.ram_base,
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            ram_base: defaults::RAM_BASE,
            ram_size: defaults::RAM_SIZE,
            start_pc: None,
            batch: false,
        }
    }
}

/// Diagnostic side-channels consumed after every retired instruction.
#[derive(Debug, Clone, Deserialize)]
pub struct TraceConfig {
    /// Format every instruction (pc, raw bytes, disassembly) into the trace line.
    #[serde(default = "TraceConfig::enabled")]
    pub itrace: bool,

    /// Keep the last `ringbuf_size` trace lines for the abort dump.
    #[serde(default = "TraceConfig::enabled")]
    pub iringbuf: bool,

    /// Capacity of the instruction ring buffer.
    #[serde(default = "TraceConfig::default_ringbuf_size")]
    pub ringbuf_size: usize,

    /// Echo retired instructions when a run is shorter than this many steps.
    #[serde(default = "TraceConfig::default_print_step_limit")]
    pub print_step_limit: u64,

    /// Trace calls and returns against the image's function symbols.
    #[serde(default)]
    pub ftrace: bool,

    /// Evaluate watchpoints after every instruction.
    #[serde(default = "TraceConfig::enabled")]
    pub watchpoints: bool,

    /// Forward every step to an attached reference stepper.
    #[serde(default)]
    pub difftest: bool,
}

impl TraceConfig {
    fn enabled() -> bool {
        true
    }

    fn default_ringbuf_size() -> usize {
        defaults::RINGBUF_SIZE
    }

    fn default_print_step_limit() -> u64 {
        defaults::PRINT_STEP_LIMIT
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            itrace: true,
            iringbuf: true,
            ringbuf_size: defaults::RINGBUF_SIZE,
            print_step_limit: defaults::PRINT_STEP_LIMIT,
            ftrace: false,
            watchpoints: true,
            difftest: false,
        }
    }
}
