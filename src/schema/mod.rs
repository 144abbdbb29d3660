//! Schema module - Problem input, chromosome and configuration types.

mod evolution;
mod grid;
mod tile;

pub use evolution::*;
pub use grid::*;
pub use tile::*;
