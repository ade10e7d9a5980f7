//! Instruction trace.
//!
//! Formats each retired instruction as `pc: raw-bytes  disassembly` and keeps
//! the most recent lines in a ring buffer that is dumped when a run aborts.

use crate::common::constants::INSTR_BYTES_MAX;

/// Marker placed in front of the newest ring entry.
const CURRENT: &str = "--> ";
/// Padding placed in front of older ring entries.
const OLDER: &str = "    ";

/// Formats one trace line.
///
/// Raw bytes are printed in memory order and padded to the widest encoding so
/// that the disassembly column lines up.
///
/// # Arguments
///
/// * `pc` - Address of the instruction.
/// * `bytes` - Raw instruction bytes.
/// * `text` - Disassembly.
pub fn format_line(pc: u64, bytes: &[u8], text: &str) -> String {
    let raw: String = bytes.iter().map(|b| format!(" {b:02x}")).collect();
    let mut line = format!("{pc:#018x}:{raw}");
    let pad = INSTR_BYTES_MAX.saturating_sub(bytes.len()) * 3 + 1;
    line.extend(std::iter::repeat_n(' ', pad));
    line.push_str(text);
    line
}

/// Fixed-capacity ring of the most recent trace lines.
#[derive(Clone, Debug)]
pub struct RingBuffer {
    lines: Vec<String>,
    capacity: usize,
    /// Slot of the newest entry.
    head: usize,
}

impl RingBuffer {
    /// Creates an empty ring holding at most `capacity` lines (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    /// Number of lines held.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Records a line, overwriting the oldest once full.
    pub fn push(&mut self, line: String) {
        if self.lines.len() < self.capacity {
            self.lines.push(line);
            self.head = self.lines.len() - 1;
        } else {
            self.head = (self.head + 1) % self.capacity;
            self.lines[self.head] = line;
        }
    }

    /// The held lines, oldest first, with the newest one marked.
    pub fn dump(&self) -> Vec<String> {
        let n = self.lines.len();
        let oldest = if n < self.capacity { 0 } else { (self.head + 1) % n };
        (0..n)
            .map(|i| {
                let idx = (oldest + i) % n;
                let mark = if idx == self.head { CURRENT } else { OLDER };
                format!("{mark}{}", self.lines[idx])
            })
            .collect()
    }
}
