pub mod board;
pub mod movegen;
pub mod moves;
pub mod notation;
pub mod pieces;
pub mod square;

pub use board::*;
pub use moves::*;
pub use notation::*;
pub use pieces::*;
pub use square::*;
