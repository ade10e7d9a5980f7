//! Simulator run state.

use std::fmt;

/// Where the simulator is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Executing inside `run`.
    Running,
    /// Paused; `run` may resume.
    #[default]
    Stopped,
    /// The guest halted cleanly. Terminal.
    Ended,
    /// The run failed. Terminal.
    Aborted,
    /// The user quit.
    Quit,
}

impl RunState {
    /// True for states from which `run` refuses to continue.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Aborted)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Ended => "ended",
            Self::Aborted => "aborted",
            Self::Quit => "quit",
        })
    }
}

/// Simulator status. Only the engine writes it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimState {
    /// Current run state.
    pub run_state: RunState,
    /// Address of the instruction that ended or aborted the run.
    pub halt_pc: u64,
    /// Exit code of the guest; zero is a good trap.
    pub halt_ret: u64,
}

impl SimState {
    /// Moves to a terminal state at `pc`.
    pub fn halt(&mut self, state: RunState, pc: u64, ret: u64) {
        self.run_state = state;
        self.halt_pc = pc;
        self.halt_ret = ret;
    }

    /// True if the session ended the way a passing test program should:
    /// the user quit, or the guest halted with exit code zero.
    pub const fn is_good_exit(&self) -> bool {
        match self.run_state {
            RunState::Quit => true,
            RunState::Ended => self.halt_ret == 0,
            _ => false,
        }
    }
}
