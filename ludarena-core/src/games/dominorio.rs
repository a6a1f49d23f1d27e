//! Dominório - domino placement, last mover wins
//!
//! 8×8 board. P1 places vertical dominoes (two row-adjacent cells in one
//! column), P2 horizontal ones. The first player left without a placement
//! loses.

use serde::{Deserialize, Serialize};

use crate::{Role, Verdict};

pub const BOARD_SIZE: usize = 8;

/// Two cells of a domino, adjacent in the mover's orientation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DominoMove {
    pub row1: usize,
    pub col1: usize,
    pub row2: usize,
    pub col2: usize,
}

impl DominoMove {
    pub const fn new(row1: usize, col1: usize, row2: usize, col2: usize) -> Self {
        Self {
            row1,
            col1,
            row2,
            col2,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DominorioState {
    board: [[Option<Role>; BOARD_SIZE]; BOARD_SIZE],
    turn: Role,
}

impl DominorioState {
    pub fn new(starting_role: Role) -> Self {
        Self {
            board: [[None; BOARD_SIZE]; BOARD_SIZE],
            turn: starting_role,
        }
    }

    pub fn turn(&self) -> Role {
        self.turn
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Role> {
        self.board[row][col]
    }

    fn placement_ok(&self, mv: &DominoMove, role: Role) -> bool {
        let DominoMove {
            row1,
            col1,
            row2,
            col2,
        } = *mv;
        if row1 >= BOARD_SIZE || col1 >= BOARD_SIZE || row2 >= BOARD_SIZE || col2 >= BOARD_SIZE {
            return false;
        }
        let oriented = match role {
            // Vertical: same column, adjacent rows
            Role::P1 => col1 == col2 && row1.abs_diff(row2) == 1,
            // Horizontal: same row, adjacent columns
            Role::P2 => row1 == row2 && col1.abs_diff(col2) == 1,
        };
        oriented && self.board[row1][col1].is_none() && self.board[row2][col2].is_none()
    }

    pub fn validate(&self, mv: &DominoMove, role: Role) -> bool {
        !self.is_terminal() && self.turn == role && self.placement_ok(mv, role)
    }

    /// Precondition: `validate` holds
    pub fn apply(&self, mv: &DominoMove, role: Role) -> Self {
        let mut next = self.clone();
        next.board[mv.row1][mv.col1] = Some(role);
        next.board[mv.row2][mv.col2] = Some(role);
        next.turn = role.opponent();
        next
    }

    pub fn legal_moves(&self, role: Role) -> Vec<DominoMove> {
        let mut moves = Vec::new();
        match role {
            Role::P1 => {
                for col in 0..BOARD_SIZE {
                    for row in 0..BOARD_SIZE - 1 {
                        if self.board[row][col].is_none() && self.board[row + 1][col].is_none() {
                            moves.push(DominoMove::new(row, col, row + 1, col));
                        }
                    }
                }
            }
            Role::P2 => {
                for row in 0..BOARD_SIZE {
                    for col in 0..BOARD_SIZE - 1 {
                        if self.board[row][col].is_none() && self.board[row][col + 1].is_none() {
                            moves.push(DominoMove::new(row, col, row, col + 1));
                        }
                    }
                }
            }
        }
        moves
    }

    pub fn is_terminal(&self) -> bool {
        self.legal_moves(self.turn).is_empty()
    }

    pub fn verdict(&self) -> Verdict {
        if self.is_terminal() {
            // The blocked player loses
            Verdict::win_for(self.turn.opponent())
        } else {
            Verdict::Ongoing
        }
    }
}
