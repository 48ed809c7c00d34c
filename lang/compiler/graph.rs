use lang_component::{Chooser, Codel, CodelGrid, Direction};

use crate::segment::{BlockId, ColorBlock, Membership};

/// A way out of a block: leave through `exit`, land on `entry` which belongs
/// to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub exit: Codel,
    pub target: BlockId,
    pub entry: Codel,
}

/// The 8 (direction, chooser) exits of one block. Absent entries are
/// blocked by the grid border or by black codels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    entries: [[Option<Transition>; 2]; 4],
}

impl TransitionTable {
    pub fn get(&self, dp: Direction, cc: Chooser) -> Option<Transition> {
        self.entries[dp.index()][cc.index()]
    }

    /// Number of entries that are not blocked.
    pub fn live(&self) -> usize {
        self.entries.iter().flatten().filter(|e| e.is_some()).count()
    }

    fn set(&mut self, dp: Direction, cc: Chooser, transition: Option<Transition>) {
        self.entries[dp.index()][cc.index()] = transition;
    }
}

// how far `codel` lies towards `dir`; larger is further
fn reach(codel: Codel, dir: Direction) -> isize {
    let (dx, dy) = dir.offset();
    codel.x as isize * dx + codel.y as isize * dy
}

fn furthest(codels: &[Codel], dir: Direction) -> Vec<Codel> {
    let max = codels.iter().map(|c| reach(*c, dir)).max();

    match max {
        Some(max) => codels
            .iter()
            .copied()
            .filter(|c| reach(*c, dir) == max)
            .collect(),
        None => Vec::new(),
    }
}

/// The codel a block is left through for the given pointer state: the
/// direction picks the block's furthest edge, the chooser picks the end of
/// that edge on its side.
pub fn exit_codel(block: &ColorBlock, dp: Direction, cc: Chooser) -> Option<Codel> {
    let edge = furthest(&block.codels, dp);
    let side = cc.side_of(dp);
    edge.into_iter().max_by_key(|c| reach(*c, side))
}

/// Derives the transition table of every block. White blocks get an empty
/// table: the pointer crosses white codel by codel.
pub fn build_edges(
    blocks: &[ColorBlock],
    membership: &Membership,
    grid: &CodelGrid,
) -> Vec<TransitionTable> {
    blocks
        .iter()
        .map(|block| {
            let mut table = TransitionTable::default();
            if block.color.is_white() {
                return table;
            }

            for dp in Direction::ALL {
                for cc in Chooser::ALL {
                    let transition = exit_codel(block, dp, cc).and_then(|exit| {
                        let entry = grid.step(exit, dp)?;
                        if grid.get(entry)?.is_black() {
                            return None;
                        }
                        let target = membership.get(entry)?;
                        Some(Transition {
                            exit,
                            target,
                            entry,
                        })
                    });
                    table.set(dp, cc, transition);
                }
            }

            table
        })
        .collect()
}
