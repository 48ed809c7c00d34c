use std::{cell::RefCell, rc::Rc};

use tracing::debug;

use crate::config::IoMode;

pub const RUN_MSG: &str = "### Running...\n\n";
pub const INPUT_MSG: &str = "### Input:\n\n";
pub const STOP_MSG: &str = "\n### Stopped.\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRead<T> {
    Ready(T),
    /// Input was consumed but did not make a value.
    Malformed,
    /// Nothing left in the pending record.
    Exhausted,
}

/// What an engine sees of its host: the pending input record and an
/// append-only output surface.
pub trait IoPort {
    fn read_char(&mut self) -> InputRead<char>;
    fn read_number(&mut self) -> InputRead<i64>;
    fn write_str(&mut self, s: &str);
    /// Whether an exhausted record should suspend the run.
    fn is_interactive(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Accepted,
    /// A valid extension that is not newline-terminated yet.
    Pending,
    /// The edit touched accepted text; the host must show `contents()` again.
    Rejected,
}

/// Chars `write-char` is allowed to emit.
pub fn printable(code: i64) -> Option<char> {
    match code {
        9 | 10 | 13 | 32..=126 | 160..=255 => char::from_u32(code as u32),
        _ => None,
    }
}

/// The shared text buffer between an engine and its host.
///
/// `accepted` is everything the host has seen and cannot edit anymore:
/// program output plus accepted input lines. Any new text from the host must
/// extend it.
#[derive(Debug, Clone)]
pub struct IoStaging {
    accepted: String,
    record: Vec<char>,
    cursor: usize,
    mode: IoMode,
    staged_open: bool,
}

pub type SharedIo = Rc<RefCell<IoStaging>>;

impl IoStaging {
    pub fn new(mode: IoMode) -> Self {
        let mut io = Self {
            accepted: String::new(),
            record: Vec::new(),
            cursor: 0,
            mode,
            staged_open: false,
        };
        io.reset(mode);
        io
    }

    pub fn shared(mode: IoMode) -> SharedIo {
        Rc::new(RefCell::new(Self::new(mode)))
    }

    /// Clears input and primes the buffer with the banner of `mode`.
    pub fn reset(&mut self, mode: IoMode) {
        self.mode = mode;
        self.record.clear();
        self.cursor = 0;
        self.staged_open = mode == IoMode::Staged;
        self.accepted = match mode {
            IoMode::Interactive => RUN_MSG.to_string(),
            IoMode::Staged => INPUT_MSG.to_string(),
        };
    }

    pub fn contents(&self) -> &str {
        &self.accepted
    }

    pub fn has_pending(&self) -> bool {
        self.cursor < self.record.len()
    }

    pub fn append_output(&mut self, s: &str) {
        self.accepted.push_str(s);
    }

    /// Pads the buffer until it ends with one (or, `doubled`, two) newlines.
    pub fn append_line_break(&mut self, doubled: bool) {
        let line_break = if doubled { "\n\n" } else { "\n" };
        while !self.accepted.ends_with(line_break) {
            self.accepted.push('\n');
        }
    }

    fn is_extension(&self, text: &str) -> bool {
        text.len() > self.accepted.len() && text.starts_with(&self.accepted)
    }

    /// Offers the host's view of the buffer. A newline-terminated extension
    /// becomes the next input record and replaces what was left of the
    /// previous one.
    pub fn set_input(&mut self, text: &str) -> InputOutcome {
        if !self.is_extension(text) {
            debug!(len = text.len(), "rejected edit of accepted text");
            return InputOutcome::Rejected;
        }
        if !text.ends_with('\n') {
            return InputOutcome::Pending;
        }

        let mut record = text[self.accepted.len()..].to_string();
        self.accepted = text.to_string();

        if self.staged_open {
            record.pop();
            record.push('\0');
            self.staged_open = false;
            self.append_line_break(true);
            self.append_output(RUN_MSG);
        }

        debug!(record = ?record, "accepted input");
        self.record = record.chars().collect();
        self.cursor = 0;

        InputOutcome::Accepted
    }

    fn peek(&self) -> Option<char> {
        self.record.get(self.cursor).copied()
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut taken = String::new();
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            taken.push(ch);
            self.cursor += 1;
        }
        taken
    }
}

impl IoPort for IoStaging {
    fn read_char(&mut self) -> InputRead<char> {
        match self.peek() {
            Some(ch) => {
                self.cursor += 1;
                InputRead::Ready(ch)
            }
            None => InputRead::Exhausted,
        }
    }

    fn read_number(&mut self) -> InputRead<i64> {
        self.take_while(|ch| ch.is_whitespace() || ch == '\0');

        let Some(first) = self.peek() else {
            return InputRead::Exhausted;
        };

        let mut literal = String::new();
        if first == '-' || first == '+' {
            literal.push(first);
            self.cursor += 1;
        }
        let digits = self.take_while(|ch| ch.is_ascii_digit());
        if digits.is_empty() {
            if literal.is_empty() {
                self.cursor += 1;
            }
            return InputRead::Malformed;
        }
        literal.push_str(&digits);

        match literal.parse() {
            Ok(n) => InputRead::Ready(n),
            Err(_) => InputRead::Malformed,
        }
    }

    fn write_str(&mut self, s: &str) {
        self.append_output(s);
    }

    fn is_interactive(&self) -> bool {
        self.mode == IoMode::Interactive
    }
}

impl IoPort for SharedIo {
    fn read_char(&mut self) -> InputRead<char> {
        self.borrow_mut().read_char()
    }

    fn read_number(&mut self) -> InputRead<i64> {
        self.borrow_mut().read_number()
    }

    fn write_str(&mut self, s: &str) {
        self.borrow_mut().write_str(s)
    }

    fn is_interactive(&self) -> bool {
        self.borrow().is_interactive()
    }
}
