mod graph;
mod segment;
mod tokenize;

use thiserror::Error;
use tracing::debug;

use lang_component::{Codel, CodelGrid, GridError};

pub use graph::{build_edges, exit_codel, Transition, TransitionTable};
pub use segment::{segment, BlockId, ColorBlock, Membership, Segmentation};
pub use tokenize::{tokenize, UnknownColors};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("line {line}, codel {column}: {hex} is not a legal codel color")]
    UnknownColor {
        line: usize,
        column: usize,
        hex: String,
    },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// A codel grid compiled into its block graph. Immutable for the lifetime
/// of one run.
#[derive(Debug, Clone)]
pub struct Program {
    pub grid: CodelGrid,
    pub blocks: Vec<ColorBlock>,
    pub membership: Membership,
    pub edges: Vec<TransitionTable>,
}

impl Program {
    pub fn block(&self, id: BlockId) -> &ColorBlock {
        &self.blocks[id.0]
    }

    pub fn exits(&self, id: BlockId) -> &TransitionTable {
        &self.edges[id.0]
    }

    pub fn block_at(&self, codel: Codel) -> Option<BlockId> {
        self.membership.get(codel)
    }

    /// Number of non-blocked transitions out of colored blocks.
    pub fn live_transitions(&self) -> usize {
        self.edges.iter().map(|t| t.live()).sum()
    }
}

pub fn compile(grid: CodelGrid) -> Program {
    let Segmentation { blocks, membership } = segment(&grid);
    let edges = build_edges(&blocks, &membership, &grid);

    let program = Program {
        grid,
        blocks,
        membership,
        edges,
    };
    debug!(
        width = program.grid.width(),
        height = program.grid.height(),
        blocks = program.blocks.len(),
        transitions = program.live_transitions(),
        "compiled codel grid"
    );

    program
}

/// Reads a textual grid and compiles it. A ragged or empty grid is rejected
/// before segmentation starts.
pub fn compile_source(source: &str, unknown: UnknownColors) -> Result<Program, CompileError> {
    let rows = tokenize(source, unknown)?;
    let grid = CodelGrid::new(rows)?;
    Ok(compile(grid))
}
