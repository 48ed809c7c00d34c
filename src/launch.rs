use std::{fs, path::Path, time::Instant};

use anyhow::Context as _;

use lang_compiler::{compile_source, Program, UnknownColors};
use lang_vm::{
    brainfuck::BrainfuckVm, Interpreter, IoMode, LoadError, PietConfig, PietVm, Scheduler,
};

use crate::cli::Language;

pub enum Source {
    Piet(Program),
    Brainfuck(String),
}

/// Everything needed to (re)start the same program on a scheduler.
pub struct Launch {
    pub source: Source,
    pub mode: IoMode,
    pub piet: PietConfig,
}

impl Launch {
    pub fn from_file(
        path: &Path,
        language: Language,
        unknown: UnknownColors,
        mode: IoMode,
        piet: PietConfig,
    ) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;

        let source = match language {
            Language::Piet => Source::Piet(
                compile_source(&text, unknown)
                    .with_context(|| format!("cannot compile {}", path.display()))?,
            ),
            Language::Brainfuck => Source::Brainfuck(text),
        };

        Ok(Self { source, mode, piet })
    }

    pub fn program(&self) -> Option<&Program> {
        match &self.source {
            Source::Piet(program) => Some(program),
            Source::Brainfuck(_) => None,
        }
    }

    /// Builds a fresh engine on the scheduler's port and runs it, stopping
    /// whatever ran before.
    pub fn start(&self, sched: &mut Scheduler) -> Result<(), LoadError> {
        sched.run(self.mode, Instant::now(), |io| {
            let vm: Box<dyn Interpreter> = match &self.source {
                Source::Piet(program) => Box::new(PietVm::new(program.clone(), io, self.piet)),
                Source::Brainfuck(text) => Box::new(BrainfuckVm::new(text, io)?),
            };
            Ok(vm)
        })
    }
}
