use thiserror::Error;

use crate::{codel::Codel, codel::Color, pointer::Direction};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("codel grid is empty")]
    Empty,
    #[error("row {row} has {found} codels, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Rectangular, row-major grid of codel colors. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodelGrid {
    width: usize,
    height: usize,
    cells: Vec<Color>,
}

impl CodelGrid {
    pub fn new(rows: Vec<Vec<Color>>) -> Result<Self, GridError> {
        let width = match rows.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => return Err(GridError::Empty),
        };

        let height = rows.len();
        let mut cells = Vec::with_capacity(width * height);
        for (row, colors) in rows.into_iter().enumerate() {
            if colors.len() != width {
                return Err(GridError::Ragged {
                    row,
                    expected: width,
                    found: colors.len(),
                });
            }
            cells.extend(colors);
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row-major position of `codel`, used to index per-codel tables.
    pub fn index(&self, codel: Codel) -> usize {
        codel.y * self.width + codel.x
    }

    pub fn contains(&self, codel: Codel) -> bool {
        codel.x < self.width && codel.y < self.height
    }

    pub fn get(&self, codel: Codel) -> Option<Color> {
        if self.contains(codel) {
            Some(self.cells[self.index(codel)])
        } else {
            None
        }
    }

    /// The neighbour of `codel` one step towards `dir`, if it is inside the
    /// grid.
    pub fn step(&self, codel: Codel, dir: Direction) -> Option<Codel> {
        let (dx, dy) = dir.offset();
        let x = codel.x.checked_add_signed(dx)?;
        let y = codel.y.checked_add_signed(dy)?;
        let next = Codel::new(x, y);

        if self.contains(next) {
            Some(next)
        } else {
            None
        }
    }

    /// Codels in scan order: row by row, left to right.
    pub fn codels(&self) -> impl Iterator<Item = Codel> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Codel::new(x, y)))
    }
}
