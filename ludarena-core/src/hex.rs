//! Hex board geometry with axial coordinates
//!
//! Used by Produto: a hexagonal board of radius 4 (61 cells).

use serde::{Deserialize, Serialize};

/// Board radius (distance from center to edge)
pub const BOARD_RADIUS: i8 = 4;

/// Number of cells on a radius-4 board (3r² + 3r + 1)
pub const CELL_COUNT: usize = 61;

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hex {
    pub q: i8,
    pub r: i8,
}

impl Hex {
    pub const fn new(q: i8, r: i8) -> Self {
        Self { q, r }
    }

    /// Check if this hex is on the board
    pub fn is_valid(&self) -> bool {
        self.q.abs() <= BOARD_RADIUS
            && self.r.abs() <= BOARD_RADIUS
            && (self.q + self.r).abs() <= BOARD_RADIUS
    }

    /// The six adjacent hexes (some may be off-board)
    pub fn neighbors(&self) -> impl Iterator<Item = Hex> + '_ {
        DIRECTIONS
            .iter()
            .map(move |(dq, dr)| Hex::new(self.q + dq, self.r + dr))
    }
}

/// Direction vectors in axial coordinates (dq, dr)
/// Index: 0=N, 1=NE, 2=SE, 3=S, 4=SW, 5=NW
pub const DIRECTIONS: [(i8, i8); 6] = [
    (0, -1),  // N
    (1, -1),  // NE
    (1, 0),   // SE
    (0, 1),   // S
    (-1, 1),  // SW
    (-1, 0),  // NW
];

/// Iterate every cell of the board
pub fn all_cells() -> impl Iterator<Item = Hex> {
    (-BOARD_RADIUS..=BOARD_RADIUS).flat_map(|q| {
        (-BOARD_RADIUS..=BOARD_RADIUS)
            .map(move |r| Hex::new(q, r))
            .filter(|h| h.is_valid())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_validity() {
        assert!(Hex::new(0, 0).is_valid());
        assert!(Hex::new(4, 0).is_valid());
        assert!(Hex::new(0, 4).is_valid());
        assert!(Hex::new(-4, 0).is_valid());
        assert!(!Hex::new(5, 0).is_valid());
        assert!(!Hex::new(3, 3).is_valid()); // q + r = 6 > 4
    }

    #[test]
    fn test_cell_count() {
        assert_eq!(all_cells().count(), CELL_COUNT);
    }

    #[test]
    fn test_neighbors_of_center() {
        let n: Vec<Hex> = Hex::new(0, 0).neighbors().collect();
        assert_eq!(n.len(), 6);
        assert!(n.iter().all(|h| h.is_valid()));
    }

    #[test]
    fn test_neighbors_of_corner() {
        // A corner cell keeps only 3 on-board neighbors
        let on_board = Hex::new(4, 0).neighbors().filter(|h| h.is_valid()).count();
        assert_eq!(on_board, 3);
    }
}
