//! Quelhas - misère segment placement with a one-shot swap
//!
//! 10×10 board of unattributed pieces. The vertical player fills a
//! contiguous run of ≥2 empty cells in one column, the horizontal player in
//! one row. P1 starts vertical; on move #2 (and only then) P2 may `swap`
//! instead of placing, exchanging orientations for the rest of the game.
//! Misère: the player who makes the last placement loses.

use serde::{Deserialize, Serialize};

use super::Coord;
use crate::{Role, Verdict};

pub const BOARD_SIZE: usize = 10;

/// Either a segment of cells or the swap declaration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentMove {
    #[serde(default)]
    pub cells: Vec<Coord>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub swap: bool,
}

impl SegmentMove {
    pub fn segment(cells: Vec<Coord>) -> Self {
        Self { cells, swap: false }
    }

    pub fn swap() -> Self {
        Self {
            cells: Vec::new(),
            swap: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuelhasState {
    board: [[bool; BOARD_SIZE]; BOARD_SIZE],
    turn: Role,
    swapped: bool,
    move_count: u32,
}

impl QuelhasState {
    pub fn new(starting_role: Role) -> Self {
        Self {
            board: [[false; BOARD_SIZE]; BOARD_SIZE],
            turn: starting_role,
            swapped: false,
            move_count: 0,
        }
    }

    pub fn turn(&self) -> Role {
        self.turn
    }

    pub fn swapped(&self) -> bool {
        self.swapped
    }

    pub fn filled(&self, c: Coord) -> bool {
        self.board[c.row][c.col]
    }

    /// Which role currently plays verticals
    pub fn vertical_role(&self) -> Role {
        if self.swapped {
            Role::P2
        } else {
            Role::P1
        }
    }

    fn swap_available(&self, role: Role) -> bool {
        self.move_count == 1 && role == Role::P2 && !self.swapped
    }

    fn segment_ok(&self, cells: &[Coord], role: Role) -> bool {
        if cells.len() < 2 {
            return false;
        }
        if cells
            .iter()
            .any(|c| c.row >= BOARD_SIZE || c.col >= BOARD_SIZE || self.filled(*c))
        {
            return false;
        }
        let vertical = role == self.vertical_role();
        let mut lines: Vec<usize> = if vertical {
            if cells.iter().any(|c| c.col != cells[0].col) {
                return false;
            }
            cells.iter().map(|c| c.row).collect()
        } else {
            if cells.iter().any(|c| c.row != cells[0].row) {
                return false;
            }
            cells.iter().map(|c| c.col).collect()
        };
        lines.sort_unstable();
        // Contiguous and free of duplicates
        lines.windows(2).all(|w| w[1] == w[0] + 1)
    }

    pub fn validate(&self, mv: &SegmentMove, role: Role) -> bool {
        if self.is_terminal() || self.turn != role {
            return false;
        }
        if mv.swap {
            return self.swap_available(role);
        }
        self.segment_ok(&mv.cells, role)
    }

    /// Precondition: `validate` holds
    pub fn apply(&self, mv: &SegmentMove, role: Role) -> Self {
        let mut next = self.clone();
        if mv.swap {
            next.swapped = true;
        } else {
            for c in &mv.cells {
                next.board[c.row][c.col] = true;
            }
        }
        next.move_count += 1;
        next.turn = role.opponent();
        next
    }

    pub fn legal_moves(&self, role: Role) -> Vec<SegmentMove> {
        let mut moves = Vec::new();
        if self.swap_available(role) {
            moves.push(SegmentMove::swap());
        }
        let vertical = role == self.vertical_role();
        for line in 0..BOARD_SIZE {
            // Maximal runs of empty cells along this column (or row)
            let mut start = 0;
            while start < BOARD_SIZE {
                let empty = |i: usize| {
                    if vertical {
                        !self.board[i][line]
                    } else {
                        !self.board[line][i]
                    }
                };
                if !empty(start) {
                    start += 1;
                    continue;
                }
                let mut end = start;
                while end + 1 < BOARD_SIZE && empty(end + 1) {
                    end += 1;
                }
                // Every contiguous sub-segment of length ≥ 2; the
                // (line, offset, length) key is canonical by construction
                for s in start..=end {
                    for e in s + 1..=end {
                        let cells = (s..=e)
                            .map(|i| {
                                if vertical {
                                    Coord::new(i, line)
                                } else {
                                    Coord::new(line, i)
                                }
                            })
                            .collect();
                        moves.push(SegmentMove::segment(cells));
                    }
                }
                start = end + 1;
            }
        }
        moves
    }

    pub fn is_terminal(&self) -> bool {
        self.no_moves_for(self.turn)
    }

    fn no_moves_for(&self, role: Role) -> bool {
        if self.swap_available(role) {
            return false;
        }
        let vertical = role == self.vertical_role();
        for line in 0..BOARD_SIZE {
            let mut run = 0;
            for i in 0..BOARD_SIZE {
                let empty = if vertical {
                    !self.board[i][line]
                } else {
                    !self.board[line][i]
                };
                if empty {
                    run += 1;
                    if run >= 2 {
                        return false;
                    }
                } else {
                    run = 0;
                }
            }
        }
        true
    }

    pub fn verdict(&self) -> Verdict {
        if self.is_terminal() {
            // Misère: the player who just moved loses, so the blocked
            // player wins
            Verdict::win_for(self.turn)
        } else {
            Verdict::Ongoing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(cells: &[(usize, usize)]) -> SegmentMove {
        SegmentMove::segment(cells.iter().map(|&(r, c)| Coord::new(r, c)).collect())
    }

    #[test]
    fn test_p1_plays_verticals() {
        let s = QuelhasState::new(Role::P1);
        assert!(s.validate(&seg(&[(0, 0), (1, 0)]), Role::P1));
        assert!(!s.validate(&seg(&[(0, 0), (0, 1)]), Role::P1));
    }

    #[test]
    fn test_single_cell_rejected() {
        let s = QuelhasState::new(Role::P1);
        assert!(!s.validate(&seg(&[(0, 0)]), Role::P1));
    }

    #[test]
    fn test_gap_rejected() {
        let s = QuelhasState::new(Role::P1);
        assert!(!s.validate(&seg(&[(0, 0), (2, 0)]), Role::P1));
        assert!(!s.validate(&seg(&[(0, 0), (0, 0)]), Role::P1));
    }

    #[test]
    fn test_swap_only_on_move_two() {
        let s = QuelhasState::new(Role::P1);
        // Move #1: no swap for anyone
        assert!(!s.validate(&SegmentMove::swap(), Role::P1));
        let s = s.apply(&seg(&[(0, 0), (1, 0)]), Role::P1);
        // Move #2: P2 may swap
        assert!(s.validate(&SegmentMove::swap(), Role::P2));
        let after = s.apply(&SegmentMove::swap(), Role::P2);
        assert_eq!(after.turn(), Role::P1);
        assert!(after.swapped());
        // Orientations exchanged: P1 now horizontal, P2 vertical
        assert!(after.validate(&seg(&[(5, 0), (5, 1)]), Role::P1));
        assert!(!after.validate(&seg(&[(5, 0), (6, 0)]), Role::P1));
        // And no second swap later
        let later = after.apply(&seg(&[(5, 0), (5, 1)]), Role::P1);
        assert!(!later.validate(&SegmentMove::swap(), Role::P2));
    }

    #[test]
    fn test_longer_segments_allowed() {
        let s = QuelhasState::new(Role::P1);
        assert!(s.validate(&seg(&[(0, 3), (1, 3), (2, 3), (3, 3)]), Role::P1));
    }

    #[test]
    fn test_misere_blocked_player_wins() {
        // Leave a single empty vertical pair; P1 fills it as the last legal
        // placement and loses under the misère rule.
        let mut s = QuelhasState::new(Role::P1);
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                s.board[row][col] = !(col == 0 && row < 2);
            }
        }
        s.move_count = 30;
        let done = s.apply(&seg(&[(0, 0), (1, 0)]), Role::P1);
        assert!(done.is_terminal());
        assert_eq!(done.verdict(), Verdict::P2Wins);
    }

    #[test]
    fn test_enumeration_counts_initial_column() {
        // One fully empty 10-cell line yields sum over lengths 2..=10 of
        // (11 - len) = 45 sub-segments
        let s = QuelhasState::new(Role::P1);
        let per_line = 45;
        assert_eq!(s.legal_moves(Role::P1).len(), per_line * BOARD_SIZE);
    }
}
