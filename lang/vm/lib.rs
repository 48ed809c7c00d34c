pub mod brainfuck;
pub mod config;
pub mod error;
pub mod interpret;
pub mod io;
pub(crate) mod r#macro;
pub mod run;
pub mod stack;

pub use config::*;
pub use error::*;
pub use interpret::{PietVm, PointerState};
pub use io::{InputOutcome, InputRead, IoPort, IoStaging, SharedIo};
pub use run::*;

use lang_component::Codel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// The instruction stream ended.
    EndOfProgram,
    /// No way out of the current block, or stuck sliding in white.
    Blocked,
    /// A read found no input and the exhausted-input policy says halt.
    InputExhausted,
    /// The host asked the run to stop.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    AwaitingInput,
    Halted(HaltReason),
}

/// The single-step contract every language engine offers the scheduler.
pub trait Interpreter {
    /// Executes one instruction. Returns the status after it; a halted
    /// engine keeps returning the same halted status.
    fn step(&mut self) -> Status;

    fn status(&self) -> Status;

    fn is_running(&self) -> bool {
        !matches!(self.status(), Status::Halted(_))
    }

    /// Halts the engine with `HaltReason::Stopped` unless it already halted.
    fn request_stop(&mut self);

    /// Codel the engine currently stands on, for hosts that draw the program.
    fn position(&self) -> Option<Codel> {
        None
    }

    fn language(&self) -> &'static str;
}
