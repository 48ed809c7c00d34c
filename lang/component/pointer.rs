/// Direction pointer. Variants are declared in clockwise order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn rotate_clockwise(self) -> Self {
        Self::ALL[(self.index() + 1) % 4]
    }

    pub fn rotate_counterclockwise(self) -> Self {
        Self::ALL[(self.index() + 3) % 4]
    }

    /// Rotates `times` steps clockwise; negative values rotate
    /// counterclockwise.
    pub fn rotate(self, times: i64) -> Self {
        let steps = times.rem_euclid(4) as usize;
        Self::ALL[(self.index() + steps) % 4]
    }

    /// Unit offset `(dx, dy)` of one step in this direction.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
        }
    }
}

/// Codel chooser, relative to the direction pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chooser {
    Left,
    Right,
}

impl Chooser {
    pub const ALL: [Chooser; 2] = [Chooser::Left, Chooser::Right];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn toggle(self) -> Self {
        match self {
            Chooser::Left => Chooser::Right,
            Chooser::Right => Chooser::Left,
        }
    }

    /// Toggles `times` times; only the parity of `times` matters.
    pub fn toggle_times(self, times: i64) -> Self {
        if times.rem_euclid(2) == 1 {
            self.toggle()
        } else {
            self
        }
    }

    /// The absolute direction this chooser points to when facing `dp`.
    pub fn side_of(self, dp: Direction) -> Direction {
        match self {
            Chooser::Left => dp.rotate_counterclockwise(),
            Chooser::Right => dp.rotate_clockwise(),
        }
    }
}
