use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

use lang_compiler::UnknownColors;
use lang_vm::{ExhaustedInput, IoMode, SchedulerConfig};

#[derive(Parser)]
#[command(name = "esolangs")]
#[command(version, about = "Run codel-grid programs and their line-oriented cousins")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a program
    Run(RunArgs),

    /// Compile a codel grid and report its block graph
    Check {
        /// Path to a codel grid (`#RRGGBB` rows)
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = UnknownColorsArg::Reject)]
        unknown_colors: UnknownColorsArg,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Path to the program source
    pub file: PathBuf,

    /// Language of the program; guessed from the file extension if omitted
    #[arg(long)]
    pub lang: Option<Language>,

    /// `staged` asks for the whole input before the run starts
    #[arg(long, value_enum, default_value_t = ModeArg::Interactive)]
    pub mode: ModeArg,

    /// Steps executed per millisecond of wall-clock time
    #[arg(long, env = "ESOLANGS_OPS_PER_MS", default_value_t = SchedulerConfig::DEFAULT_OPS_PER_MS)]
    pub ops_per_ms: u32,

    /// Largest burst, in milliseconds worth of steps
    #[arg(long, default_value_t = SchedulerConfig::DEFAULT_MAX_BURST_MULTIPLIER)]
    pub max_burst: u32,

    #[arg(long, value_enum, default_value_t = UnknownColorsArg::Reject)]
    pub unknown_colors: UnknownColorsArg,

    /// What a staged read does once the input is used up
    #[arg(long, value_enum, default_value_t = ExhaustedArg::Skip)]
    pub exhausted_input: ExhaustedArg,

    /// Open a window showing the grid instead of using the terminal
    #[cfg(feature = "window")]
    #[arg(long)]
    pub window: bool,
}

impl RunArgs {
    pub fn language(&self) -> Language {
        self.lang.unwrap_or_else(|| Language::guess(&self.file))
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            ops_per_ms: self.ops_per_ms,
            max_burst_multiplier: self.max_burst,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Language {
    Piet,
    Brainfuck,
}

impl Language {
    pub fn guess(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("b") | Some("bf") => Language::Brainfuck,
            _ => Language::Piet,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Interactive,
    Staged,
}

impl From<ModeArg> for IoMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Interactive => IoMode::Interactive,
            ModeArg::Staged => IoMode::Staged,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnknownColorsArg {
    Reject,
    White,
    Black,
}

impl From<UnknownColorsArg> for UnknownColors {
    fn from(arg: UnknownColorsArg) -> Self {
        match arg {
            UnknownColorsArg::Reject => UnknownColors::Reject,
            UnknownColorsArg::White => UnknownColors::AsWhite,
            UnknownColorsArg::Black => UnknownColors::AsBlack,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExhaustedArg {
    Skip,
    Zero,
    Halt,
}

impl From<ExhaustedArg> for ExhaustedInput {
    fn from(arg: ExhaustedArg) -> Self {
        match arg {
            ExhaustedArg::Skip => ExhaustedInput::Skip,
            ExhaustedArg::Zero => ExhaustedInput::PushZero,
            ExhaustedArg::Halt => ExhaustedInput::Halt,
        }
    }
}
