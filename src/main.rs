mod cli;
mod launch;
mod terminal;
#[cfg(feature = "window")]
mod viewer;

use anyhow::Context as _;
use clap::Parser;
use tracing::info;

use lang_compiler::{compile_source, UnknownColors};
use lang_vm::{PietConfig, Scheduler};

use crate::{
    cli::{Cli, Commands, RunArgs},
    launch::Launch,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Check {
            file,
            unknown_colors,
        } => check(&file, unknown_colors.into()),
    }
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let piet = PietConfig {
        exhausted_input: args.exhausted_input.into(),
    };
    let launch = Launch::from_file(
        &args.file,
        args.language(),
        args.unknown_colors.into(),
        args.mode.into(),
        piet,
    )?;
    let mut sched = Scheduler::new(args.scheduler_config());

    #[cfg(feature = "window")]
    if args.window {
        return viewer::run(sched, launch);
    }

    let reason = terminal::run(&mut sched, &launch)?;
    info!(reason = ?reason, "done");

    Ok(())
}

fn check(path: &std::path::Path, unknown: UnknownColors) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let program = compile_source(&text, unknown)?;

    println!(
        "{}: {}x{} codels, {} blocks, {} live transitions",
        path.display(),
        program.grid.width(),
        program.grid.height(),
        program.blocks.len(),
        program.live_transitions()
    );

    Ok(())
}
