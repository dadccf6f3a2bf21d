pub mod cell;
pub mod generation;
pub mod grid;

pub use cell::{Cell, CellView, Color, Encounter, FruitTree};
pub use generation::{FruitKind, RandomBoardParams, generate_board};
pub use grid::Grid;
