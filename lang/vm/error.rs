use lang_compiler::CompileError;
use thiserror::Error;

/// Failures that keep a program from being loaded. Nothing a running
/// program does is an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("unmatched bracket at offset {position}")]
    UnmatchedBracket { position: usize },
}
