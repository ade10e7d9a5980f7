//! Debugger command layer.
//!
//! Line-oriented commands over the engine. The first word selects an entry of
//! the command table and the rest of the line is its argument string. Errors
//! are printed and the loop carries on; only `q` and end of input leave it.

use std::io::{self, BufRead, Write};

use crate::common::SdbError;
use crate::common::constants::RUN_UNBOUNDED;
use crate::sim::Engine;

/// Prompt printed before each command.
pub const PROMPT: &str = "(rvdb) ";

/// Bytes per word of the `x` memory scan.
const SCAN_WORD: u64 = 4;

/// Whether the command loop continues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// Leave the loop.
    Exit,
}

type CmdFn = fn(&mut Debugger, &str) -> Result<Flow, SdbError>;

struct Command {
    name: &'static str,
    description: &'static str,
    handler: CmdFn,
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        description: "Display information about all supported commands",
        handler: Debugger::cmd_help,
    },
    Command {
        name: "c",
        description: "Continue the execution of the program",
        handler: Debugger::cmd_c,
    },
    Command {
        name: "q",
        description: "Exit rvdb",
        handler: Debugger::cmd_q,
    },
    Command {
        name: "si",
        description: "Step N instructions (default 1): si [N]",
        handler: Debugger::cmd_si,
    },
    Command {
        name: "info",
        description: "Show registers or watchpoints: info r | info w",
        handler: Debugger::cmd_info,
    },
    Command {
        name: "x",
        description: "Scan N 4-byte words of memory at EXPR: x N EXPR",
        handler: Debugger::cmd_x,
    },
    Command {
        name: "p",
        description: "Evaluate an expression: p EXPR",
        handler: Debugger::cmd_p,
    },
    Command {
        name: "w",
        description: "Stop when the value of EXPR changes: w EXPR",
        handler: Debugger::cmd_w,
    },
    Command {
        name: "d",
        description: "Delete watchpoint N: d N",
        handler: Debugger::cmd_d,
    },
];

/// Interactive debugger wrapping an engine.
#[derive(Debug)]
pub struct Debugger {
    engine: Engine,
    batch: bool,
}

impl Debugger {
    /// Wraps an engine.
    pub const fn new(engine: Engine) -> Self {
        Self {
            engine,
            batch: false,
        }
    }

    /// In batch mode `mainloop` runs the program to completion without reading commands.
    #[must_use]
    pub const fn batch(mut self, on: bool) -> Self {
        self.batch = on;
        self
    }

    /// The wrapped engine.
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The wrapped engine, mutably.
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Unwraps the engine.
    pub fn into_engine(self) -> Engine {
        self.engine
    }

    /// Reads and executes commands until `q` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading the input fails.
    pub fn mainloop(&mut self, mut input: impl BufRead) -> io::Result<()> {
        if self.batch {
            let _ = self.engine.run(RUN_UNBOUNDED);
            return Ok(());
        }

        let mut line = String::new();
        loop {
            let out = self.engine.out();
            write!(out, "{PROMPT}")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                return Ok(());
            }
            if self.execute(&line) == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Executes one command line, printing any error.
    pub fn execute(&mut self, line: &str) -> Flow {
        let line = line.trim();
        let (name, args) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(n, a)| (n, a.trim()));
        if name.is_empty() {
            return Flow::Continue;
        }

        let result = COMMANDS
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| SdbError::UnknownCommand(name.to_owned()))
            .and_then(|c| (c.handler)(self, args));

        match result {
            Ok(flow) => flow,
            Err(err) => {
                tracing::debug!(command = name, %err, "command failed");
                self.say(&err.to_string());
                Flow::Continue
            }
        }
    }

    fn say(&mut self, text: &str) {
        self.engine.say(text);
    }

    fn cmd_help(&mut self, args: &str) -> Result<Flow, SdbError> {
        let lines: Vec<String> = match args.split_whitespace().next() {
            None => COMMANDS
                .iter()
                .map(|c| format!("{} - {}", c.name, c.description))
                .collect(),
            Some(name) => {
                let c = COMMANDS
                    .iter()
                    .find(|c| c.name == name)
                    .ok_or_else(|| SdbError::UnknownCommand(name.to_owned()))?;
                vec![format!("{} - {}", c.name, c.description)]
            }
        };
        for line in lines {
            self.say(&line);
        }
        Ok(Flow::Continue)
    }

    fn cmd_c(&mut self, _args: &str) -> Result<Flow, SdbError> {
        let _ = self.engine.run(RUN_UNBOUNDED);
        Ok(Flow::Continue)
    }

    fn cmd_q(&mut self, _args: &str) -> Result<Flow, SdbError> {
        self.engine.quit();
        Ok(Flow::Exit)
    }

    fn cmd_si(&mut self, args: &str) -> Result<Flow, SdbError> {
        let steps = match args.split_whitespace().next() {
            None => 1,
            Some(n) => parse_count(n)?,
        };
        let _ = self.engine.run(steps);
        Ok(Flow::Continue)
    }

    fn cmd_info(&mut self, args: &str) -> Result<Flow, SdbError> {
        let lines = match args.split_whitespace().next() {
            Some("r") => self.engine.register_lines(),
            Some("w") => {
                let watches = self.engine.watches();
                if watches.is_empty() {
                    vec!["No watchpoint yet".to_string()]
                } else {
                    std::iter::once(format!("{:<8}{}", "Num", "What"))
                        .chain(watches.iter().map(|w| format!("{:<8}{}", w.id, w.expr)))
                        .collect()
                }
            }
            Some(other) => return Err(SdbError::UnknownInfo(other.to_owned())),
            None => return Err(SdbError::Usage("info r | info w")),
        };
        for line in lines {
            self.say(&line);
        }
        Ok(Flow::Continue)
    }

    fn cmd_x(&mut self, args: &str) -> Result<Flow, SdbError> {
        let (count, expr) = args
            .split_once(char::is_whitespace)
            .ok_or(SdbError::Usage("x N EXPR"))?;
        let count = parse_count(count)?;
        let base = self.engine.evaluate(expr.trim())?;

        // Words print as they are read; an unreadable byte ends the scan.
        for i in 0..count {
            let addr = base.wrapping_add(i.wrapping_mul(SCAN_WORD));
            let mut bytes = [0u8; SCAN_WORD as usize];
            for (j, b) in bytes.iter_mut().enumerate() {
                *b = self.engine.read_memory(addr.wrapping_add(j as u64), 1)? as u8;
            }
            let hex: Vec<String> = bytes.iter().map(|b| format!("{b:#04x}")).collect();
            let dec: String = bytes.iter().map(|b| format!("{b:<4}")).collect();
            self.say(&format!("{addr:#010x}:  {}    {}", hex.join(" "), dec.trim_end()));
        }
        Ok(Flow::Continue)
    }

    fn cmd_p(&mut self, args: &str) -> Result<Flow, SdbError> {
        if args.is_empty() {
            return Err(SdbError::Usage("p EXPR"));
        }
        let value = self.engine.evaluate(args)?;
        self.say(&format!("{value} ({value:#x})"));
        Ok(Flow::Continue)
    }

    fn cmd_w(&mut self, args: &str) -> Result<Flow, SdbError> {
        if args.is_empty() {
            return Err(SdbError::Usage("w EXPR"));
        }
        let id = self.engine.add_watch(args)?;
        self.say(&format!("Watchpoint {id}: {args}"));
        Ok(Flow::Continue)
    }

    fn cmd_d(&mut self, args: &str) -> Result<Flow, SdbError> {
        let id = args
            .split_whitespace()
            .next()
            .ok_or(SdbError::Usage("d N"))?;
        let id = parse_count(id)?;
        let id = usize::try_from(id).map_err(|_| SdbError::BadCount(id.to_string()))?;
        self.engine.remove_watch(id)?;
        Ok(Flow::Continue)
    }
}

/// Parses a decimal or `0x` count.
fn parse_count(text: &str) -> Result<u64, SdbError> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|_| SdbError::BadCount(text.to_owned()))
}
