use std::{
    io::{self, BufRead, IsTerminal, Write},
    thread,
    time::{Duration, Instant},
};

use tracing::debug;

use lang_vm::{HaltReason, InputOutcome, RunState, Scheduler};

use crate::launch::Launch;

const FRAME: Duration = Duration::from_millis(16);

/// Runs `launch` to completion against stdin/stdout.
///
/// New buffer text is mirrored to stdout after every burst. When the engine
/// waits for input one line of stdin is submitted; EOF stops the run.
pub fn run(sched: &mut Scheduler, launch: &Launch) -> anyhow::Result<HaltReason> {
    launch.start(sched)?;

    let stdin = io::stdin();
    let echoed = stdin.is_terminal();
    let mut stdout = io::stdout().lock();
    let mut shown = 0;

    loop {
        let state = sched.burst(Instant::now());

        let buffer = sched.output();
        if buffer.len() > shown {
            stdout.write_all(buffer[shown..].as_bytes())?;
            stdout.flush()?;
            shown = buffer.len();
        }

        match state {
            RunState::Finished(reason) => return Ok(reason),
            RunState::AwaitingInput => {
                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 {
                    debug!("stdin closed, stopping");
                    sched.stop();
                    continue;
                }
                if !line.ends_with('\n') {
                    line.push('\n');
                }

                let outcome = sched.set_input(&format!("{}{}", buffer, line));
                if outcome == InputOutcome::Accepted && echoed {
                    // the terminal already shows what was typed
                    shown += line.len();
                }
            }
            RunState::Running => thread::sleep(FRAME),
            RunState::Idle => return Ok(HaltReason::Stopped),
        }
    }
}
