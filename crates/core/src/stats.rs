//! Simulation statistics.
//!
//! Tracks the two counters the summary reports: guest instructions executed
//! and host time spent inside `run`.

use std::time::Duration;

/// Microseconds per second.
const US_PER_SEC: u128 = 1_000_000;

/// Cumulative execution counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Guest instructions executed.
    pub instructions: u64,
    /// Host time spent executing.
    pub elapsed: Duration,
}

impl SimStats {
    /// Adds the wall time of one `run` call.
    pub fn add_time(&mut self, d: Duration) {
        self.elapsed += d;
    }

    /// Simulation frequency in instructions per second, if the run took at least 1 us.
    pub fn frequency(&self) -> Option<u128> {
        let us = self.elapsed.as_micros();
        (us > 0).then(|| u128::from(self.instructions) * US_PER_SEC / us)
    }

    /// The summary report, one line each.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![
            format!("host time spent = {} us", group(self.elapsed.as_micros())),
            format!(
                "total guest instructions = {}",
                group(u128::from(self.instructions))
            ),
        ];
        lines.push(match self.frequency() {
            Some(freq) => format!("simulation frequency = {} instr/s", group(freq)),
            None => {
                "Finish running in less than 1 us and can not calculate the simulation frequency"
                    .to_string()
            }
        });
        lines
    }
}

/// Formats with thousands separators.
fn group(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
