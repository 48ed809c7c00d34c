use std::{collections::VecDeque, fmt};

use lang_component::{Codel, CodelGrid, Color, Direction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A maximal 4-connected region of same-colored codels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorBlock {
    pub id: BlockId,
    pub color: Color,
    pub codels: Vec<Codel>,
}

impl ColorBlock {
    /// Number of member codels; this is also the value `push` uses.
    pub fn size(&self) -> usize {
        self.codels.len()
    }
}

/// Codel to block lookup. Black codels have no block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    width: usize,
    height: usize,
    ids: Vec<Option<BlockId>>,
}

impl Membership {
    fn new(grid: &CodelGrid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            ids: vec![None; grid.len()],
        }
    }

    pub fn get(&self, codel: Codel) -> Option<BlockId> {
        if codel.x < self.width && codel.y < self.height {
            self.ids[codel.y * self.width + codel.x]
        } else {
            None
        }
    }

    fn assign(&mut self, codel: Codel, id: BlockId) {
        self.ids[codel.y * self.width + codel.x] = Some(id);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    pub blocks: Vec<ColorBlock>,
    pub membership: Membership,
}

/// Splits `grid` into color blocks. Ids follow scan order, so the same grid
/// always yields the same ids.
pub fn segment(grid: &CodelGrid) -> Segmentation {
    let mut membership = Membership::new(grid);
    let mut blocks = Vec::new();

    for start in grid.codels() {
        if membership.get(start).is_some() {
            continue;
        }

        let color = match grid.get(start) {
            Some(color) if !color.is_black() => color,
            _ => continue,
        };

        let id = BlockId(blocks.len());
        let codels = flood_fill(grid, &mut membership, start, color, id);
        blocks.push(ColorBlock { id, color, codels });
    }

    Segmentation { blocks, membership }
}

fn flood_fill(
    grid: &CodelGrid,
    membership: &mut Membership,
    start: Codel,
    color: Color,
    id: BlockId,
) -> Vec<Codel> {
    let mut codels = Vec::new();
    let mut queue = VecDeque::from([start]);
    membership.assign(start, id);

    while let Some(codel) = queue.pop_front() {
        codels.push(codel);

        for dir in Direction::ALL {
            let Some(next) = grid.step(codel, dir) else {
                continue;
            };
            if membership.get(next).is_none() && grid.get(next) == Some(color) {
                membership.assign(next, id);
                queue.push_back(next);
            }
        }
    }

    codels
}
