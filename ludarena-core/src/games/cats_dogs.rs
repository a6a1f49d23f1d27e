//! Gatos & Cães - placement game, last mover wins
//!
//! 8×8 board. P1 places cats, P2 places dogs. The first cat must land in the
//! central 2×2 zone, the first dog outside it, and no piece may ever touch
//! the opposite species orthogonally. A player left without a placement
//! loses (the player who just moved wins). Each species caps at 28 pieces.

use serde::{Deserialize, Serialize};

use super::Coord;
use crate::{Role, Verdict};

pub const BOARD_SIZE: usize = 8;
pub const PIECE_CAP: u8 = 28;

/// Central zone: rows 3..=4 × cols 3..=4
fn in_central_zone(c: Coord) -> bool {
    (3..=4).contains(&c.row) && (3..=4).contains(&c.col)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Empty,
    Cat,
    Dog,
}

fn species(role: Role) -> Cell {
    match role {
        Role::P1 => Cell::Cat,
        Role::P2 => Cell::Dog,
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatsDogsState {
    board: [[Cell; BOARD_SIZE]; BOARD_SIZE],
    turn: Role,
    cat_placed: bool,
    dog_placed: bool,
    cats: u8,
    dogs: u8,
}

impl CatsDogsState {
    pub fn new(starting_role: Role) -> Self {
        Self {
            board: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
            turn: starting_role,
            cat_placed: false,
            dog_placed: false,
            cats: 0,
            dogs: 0,
        }
    }

    pub fn turn(&self) -> Role {
        self.turn
    }

    pub fn cell(&self, c: Coord) -> Cell {
        self.board[c.row][c.col]
    }

    fn placed_count(&self, role: Role) -> u8 {
        match role {
            Role::P1 => self.cats,
            Role::P2 => self.dogs,
        }
    }

    fn first_placed(&self, role: Role) -> bool {
        match role {
            Role::P1 => self.cat_placed,
            Role::P2 => self.dog_placed,
        }
    }

    /// Placement legality for `role` irrespective of whose turn it is.
    /// Used by `legal_moves` so mobility can be probed for either side.
    fn placement_ok(&self, c: Coord, role: Role) -> bool {
        if c.row >= BOARD_SIZE || c.col >= BOARD_SIZE {
            return false;
        }
        if self.board[c.row][c.col] != Cell::Empty {
            return false;
        }
        if self.placed_count(role) >= PIECE_CAP {
            return false;
        }
        if !self.first_placed(role) {
            let must_be_central = role == Role::P1;
            if in_central_zone(c) != must_be_central {
                return false;
            }
        }
        let enemy = species(role.opponent());
        !c.orthogonal(BOARD_SIZE).any(|n| self.cell(n) == enemy)
    }

    pub fn validate(&self, mv: &Coord, role: Role) -> bool {
        !self.is_terminal() && self.turn == role && self.placement_ok(*mv, role)
    }

    /// Precondition: `validate` holds
    pub fn apply(&self, mv: &Coord, role: Role) -> Self {
        let mut next = self.clone();
        next.board[mv.row][mv.col] = species(role);
        match role {
            Role::P1 => {
                next.cat_placed = true;
                next.cats += 1;
            }
            Role::P2 => {
                next.dog_placed = true;
                next.dogs += 1;
            }
        }
        next.turn = role.opponent();
        next
    }

    pub fn legal_moves(&self, role: Role) -> Vec<Coord> {
        let mut moves = Vec::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let c = Coord::new(row, col);
                if self.placement_ok(c, role) {
                    moves.push(c);
                }
            }
        }
        moves
    }

    /// The game ends when the player to move has no placement
    pub fn is_terminal(&self) -> bool {
        self.legal_moves(self.turn).is_empty()
    }

    pub fn verdict(&self) -> Verdict {
        if self.is_terminal() {
            // Last mover wins
            Verdict::win_for(self.turn.opponent())
        } else {
            Verdict::Ongoing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_cat_must_be_central() {
        let s = CatsDogsState::new(Role::P1);
        assert!(!s.validate(&Coord::new(0, 0), Role::P1));
        assert!(s.validate(&Coord::new(3, 3), Role::P1));
    }

    #[test]
    fn test_first_dog_must_be_outside_center() {
        let s = CatsDogsState::new(Role::P1);
        let s = s.apply(&Coord::new(3, 3), Role::P1);
        assert!(!s.validate(&Coord::new(3, 4), Role::P2));
        assert!(s.validate(&Coord::new(0, 0), Role::P2));
    }

    #[test]
    fn test_adjacency_ban() {
        let s = CatsDogsState::new(Role::P1);
        let s = s.apply(&Coord::new(3, 3), Role::P1);
        let s = s.apply(&Coord::new(0, 0), Role::P2);
        // Cat next to the dog at (0,0) is forbidden
        assert!(!s.validate(&Coord::new(0, 1), Role::P1));
        assert!(!s.validate(&Coord::new(1, 0), Role::P1));
        // Diagonal contact is fine
        assert!(s.validate(&Coord::new(1, 1), Role::P1));
    }

    #[test]
    fn test_turn_enforced() {
        let s = CatsDogsState::new(Role::P1);
        assert!(!s.validate(&Coord::new(0, 0), Role::P2));
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let s = CatsDogsState::new(Role::P1);
        let s = s.apply(&Coord::new(3, 3), Role::P1);
        let s = s.apply(&Coord::new(0, 0), Role::P2);
        assert!(!s.validate(&Coord::new(3, 3), Role::P1));
    }

    #[test]
    fn test_second_game_starts_with_p2() {
        let s = CatsDogsState::new(Role::P2);
        assert_eq!(s.turn(), Role::P2);
        // P2's first dog still has to avoid the central zone
        assert!(!s.validate(&Coord::new(4, 4), Role::P2));
        assert!(s.validate(&Coord::new(7, 7), Role::P2));
    }

    #[test]
    fn test_mobility_probe_ignores_turn() {
        let s = CatsDogsState::new(Role::P1);
        // Dogs have moves available even though it is P1's turn
        assert!(!s.legal_moves(Role::P2).is_empty());
    }
}
