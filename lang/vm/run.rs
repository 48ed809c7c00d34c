use std::{
    thread,
    time::{Duration, Instant},
};

use tracing::{debug, info};

use crate::{
    config::{IoMode, SchedulerConfig},
    error::LoadError,
    io::{InputOutcome, IoStaging, SharedIo, STOP_MSG},
    HaltReason, Interpreter, Status,
};

const STOP_POLL: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing loaded yet.
    Idle,
    Running,
    /// No steps are fed until a new input record is accepted.
    AwaitingInput,
    Finished(HaltReason),
}

/// Drives one engine at a time in bursts sized by wall-clock time.
///
/// Everything happens on the host's thread: the host calls `burst` from its
/// frame loop and never has two bursts in flight.
pub struct Scheduler {
    config: SchedulerConfig,
    io: SharedIo,
    vm: Option<Box<dyn Interpreter>>,
    state: RunState,
    stop_requested: bool,
    last_burst: Instant,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            io: IoStaging::shared(IoMode::Interactive),
            vm: None,
            state: RunState::Idle,
            stop_requested: false,
            last_burst: Instant::now(),
        }
    }

    /// Current contents of the I/O buffer.
    pub fn output(&self) -> String {
        self.io.borrow().contents().to_string()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running | RunState::AwaitingInput)
    }

    pub fn interpreter(&self) -> Option<&dyn Interpreter> {
        self.vm.as_deref()
    }

    /// Stops any run still in progress, builds a new engine on the shared
    /// port with `load` and starts it on a freshly primed buffer. Staged runs
    /// wait for their input before stepping.
    pub fn run<F>(&mut self, mode: IoMode, now: Instant, load: F) -> Result<(), LoadError>
    where
        F: FnOnce(SharedIo) -> Result<Box<dyn Interpreter>, LoadError>,
    {
        if self.is_running() {
            self.stop();
        }
        let vm = load(self.io.clone())?;

        info!(language = vm.language(), mode = ?mode, "starting run");
        self.io.borrow_mut().reset(mode);
        self.vm = Some(vm);
        self.stop_requested = false;
        self.last_burst = now;
        self.state = match mode {
            IoMode::Interactive => RunState::Running,
            IoMode::Staged => RunState::AwaitingInput,
        };

        Ok(())
    }

    /// Executes up to `elapsed × ops_per_ms` steps, never more than the
    /// configured maximum burst.
    pub fn burst(&mut self, now: Instant) -> RunState {
        let elapsed = now.saturating_duration_since(self.last_burst);
        self.last_burst = now;

        if !self.is_running() {
            return self.state;
        }
        let Some(vm) = self.vm.as_mut() else {
            return self.state;
        };

        if self.stop_requested {
            vm.request_stop();
        }

        if self.state == RunState::AwaitingInput {
            if !vm.is_running() || self.io.borrow().has_pending() {
                self.state = RunState::Running;
            } else {
                return self.state;
            }
        }

        let budget = (elapsed.as_micros() as u64)
            .saturating_mul(self.config.ops_per_ms as u64)
            / 1000;
        let budget = budget.min(self.config.max_burst());

        let mut executed = 0;
        loop {
            if let Status::Halted(reason) = vm.status() {
                let mut io = self.io.borrow_mut();
                io.append_line_break(false);
                io.append_output(STOP_MSG);
                info!(reason = ?reason, "run finished");
                self.state = RunState::Finished(reason);
                break;
            }
            if executed >= budget {
                break;
            }

            executed += 1;
            if vm.step() == Status::AwaitingInput {
                debug!("waiting for input");
                self.state = RunState::AwaitingInput;
                break;
            }
        }

        self.state
    }

    /// Asks the current run to halt. The next burst acknowledges it.
    pub fn request_stop(&mut self) {
        if self.is_running() && !self.stop_requested {
            info!("stop requested");
            self.stop_requested = true;
        }
    }

    /// Requests a halt and waits until a burst has acknowledged it.
    /// Calling it with nothing running does nothing.
    pub fn stop(&mut self) {
        self.request_stop();
        while self.is_running() {
            self.burst(Instant::now());
            if self.is_running() {
                thread::sleep(STOP_POLL);
            }
        }
    }

    /// Offers the host's view of the buffer; see `IoStaging::set_input`.
    pub fn set_input(&mut self, text: &str) -> InputOutcome {
        self.io.borrow_mut().set_input(text)
    }
}
