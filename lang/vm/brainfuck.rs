use tracing::{debug, trace};

use crate::{
    error::LoadError,
    io::{InputRead, IoPort},
    HaltReason, Interpreter, Status,
};

pub const TAPE_SIZE: usize = 0x10000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Right,
    Left,
    Increment,
    Decrement,
    Output,
    Input,
    // operand is the index of the matching bracket
    JumpForward(usize),
    JumpBack(usize),
}

fn parse(source: &str) -> Result<Vec<Command>, LoadError> {
    let mut commands = Vec::new();
    let mut open = Vec::new();

    for ch in source.chars() {
        let command = match ch {
            '>' => Command::Right,
            '<' => Command::Left,
            '+' => Command::Increment,
            '-' => Command::Decrement,
            '.' => Command::Output,
            ',' => Command::Input,
            '[' => {
                open.push(commands.len());
                Command::JumpForward(0)
            }
            ']' => {
                let Some(start) = open.pop() else {
                    return Err(LoadError::UnmatchedBracket {
                        position: commands.len(),
                    });
                };
                commands[start] = Command::JumpForward(commands.len());
                Command::JumpBack(start)
            }
            _ => continue,
        };
        commands.push(command);
    }

    match open.pop() {
        Some(position) => Err(LoadError::UnmatchedBracket { position }),
        None => Ok(commands),
    }
}

/// Byte-tape machine sharing the scheduler and I/O staging with the Piet
/// engine.
pub struct BrainfuckVm<P: IoPort> {
    commands: Vec<Command>,
    pc: usize,
    tape: Vec<u8>,
    head: usize,
    io: P,
    status: Status,
    steps: u64,
}

impl<P: IoPort> BrainfuckVm<P> {
    /// Positions in `LoadError::UnmatchedBracket` count commands only.
    pub fn new(source: &str, io: P) -> Result<Self, LoadError> {
        let commands = parse(source)?;
        debug!(commands = commands.len(), "loaded brainfuck source");

        Ok(Self {
            commands,
            pc: 0,
            tape: vec![0; TAPE_SIZE],
            head: 0,
            io,
            status: Status::Running,
            steps: 0,
        })
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn cell(&self) -> u8 {
        self.tape[self.head]
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn interpret1(&mut self) -> Status {
        if let Status::Halted(_) = self.status {
            return self.status;
        }

        let Some(command) = self.commands.get(self.pc).copied() else {
            debug!(steps = self.steps, "end of program");
            self.status = Status::Halted(HaltReason::EndOfProgram);
            return self.status;
        };
        self.steps += 1;
        trace!(pc = self.pc, command = ?command, head = self.head, "step");

        let cell = &mut self.tape[self.head];
        match command {
            Command::Right => self.head = (self.head + 1) % TAPE_SIZE,
            Command::Left => self.head = (self.head + TAPE_SIZE - 1) % TAPE_SIZE,
            Command::Increment => *cell = cell.wrapping_add(1),
            Command::Decrement => *cell = cell.wrapping_sub(1),
            Command::Output => {
                let ch = char::from(*cell);
                self.io.write_str(ch.encode_utf8(&mut [0; 4]));
            }
            Command::Input => match self.io.read_char() {
                InputRead::Ready(ch) => *cell = ch as u32 as u8,
                InputRead::Malformed => (),
                InputRead::Exhausted => {
                    if self.io.is_interactive() {
                        self.status = Status::AwaitingInput;
                        return self.status;
                    }
                }
            },
            Command::JumpForward(end) => {
                if *cell == 0 {
                    self.pc = end;
                }
            }
            Command::JumpBack(start) => {
                if *cell != 0 {
                    self.pc = start;
                }
            }
        }

        self.pc += 1;
        self.status = Status::Running;
        self.status
    }
}

impl<P: IoPort> Interpreter for BrainfuckVm<P> {
    fn step(&mut self) -> Status {
        self.interpret1()
    }

    fn status(&self) -> Status {
        self.status
    }

    fn request_stop(&mut self) {
        if !matches!(self.status, Status::Halted(_)) {
            self.status = Status::Halted(HaltReason::Stopped);
        }
    }

    fn language(&self) -> &'static str {
        "brainfuck"
    }
}
