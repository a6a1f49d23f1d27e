//! The six game engines.
//!
//! Each module exposes a state struct with the same inherent surface:
//! `new(starting_role)`, `turn()`, `validate(mv, role)`, `apply(mv, role)`,
//! `is_terminal()`, `verdict()`, `legal_moves(role)`. Dispatch across games
//! happens through [`crate::BoardState`].

pub mod atari_go;
pub mod cats_dogs;
pub mod dominorio;
pub mod nex;
pub mod produto;
pub mod quelhas;

use serde::{Deserialize, Serialize};

/// A cell on a square board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Orthogonal neighbors within a `size` × `size` board
    pub fn orthogonal(&self, size: usize) -> impl Iterator<Item = Coord> + '_ {
        let (r, c) = (self.row as isize, self.col as isize);
        [(r - 1, c), (r + 1, c), (r, c - 1), (r, c + 1)]
            .into_iter()
            .filter(move |&(nr, nc)| {
                nr >= 0 && nc >= 0 && (nr as usize) < size && (nc as usize) < size
            })
            .map(|(nr, nc)| Coord::new(nr as usize, nc as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orthogonal_center() {
        let n: Vec<Coord> = Coord::new(4, 4).orthogonal(9).collect();
        assert_eq!(n.len(), 4);
    }

    #[test]
    fn test_orthogonal_corner() {
        let n: Vec<Coord> = Coord::new(0, 0).orthogonal(9).collect();
        assert_eq!(n.len(), 2);
        assert!(n.contains(&Coord::new(0, 1)));
        assert!(n.contains(&Coord::new(1, 0)));
    }
}
