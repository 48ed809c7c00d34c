pub mod codel;
pub mod grid;
pub mod pointer;
pub mod vm;

pub use codel::{Codel, Color, Hue, Lightness};
pub use grid::{CodelGrid, GridError};
pub use pointer::{Chooser, Direction};
