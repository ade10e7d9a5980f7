//! Console output.
//!
//! Every user-facing line (trace echo, halt report, statistics, command
//! results) goes through `say`. A failed write does not stop the simulator;
//! it is logged and the line is lost.

use std::fmt::Display;
use std::io::Write;

use tracing::warn;

/// Writes `line` and a newline to `out`, logging a failed write.
pub fn say(out: &mut dyn Write, line: impl Display) {
    if let Err(err) = writeln!(out, "{line}") {
        warn!(%err, "console write failed");
    }
}
