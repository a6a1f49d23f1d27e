//! Nex - connection game with neutral pieces and a swap
//!
//! 11×11 grid with the hex neighborhood laid out on square coordinates
//! (see [`NEX_NEIGHBORS`]). Black connects the top and bottom rows, white
//! the left and right columns. P1 plays black and P2 white until a swap
//! (move #2, P2 only) reverses the mapping. A move either places one own
//! piece plus one neutral piece, or converts two neutral pieces to own
//! color while giving one own piece back to neutral. First connection wins;
//! there is no draw.

use serde::{Deserialize, Serialize};

use super::Coord;
use crate::{Role, Verdict};

pub const BOARD_SIZE: usize = 11;

/// Hex adjacency on the square grid: `(dr, dc)` offsets
pub const NEX_NEIGHBORS: [(isize, isize); 6] =
    [(-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0)];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NexCell {
    Empty,
    Black,
    White,
    Neutral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NexColor {
    Black,
    White,
}

impl NexColor {
    fn cell(self) -> NexCell {
        match self {
            NexColor::Black => NexCell::Black,
            NexColor::White => NexCell::White,
        }
    }
}

/// The three move kinds of Nex
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NexMove {
    Place {
        #[serde(rename = "ownPiece")]
        own_piece: Coord,
        #[serde(rename = "neutralPiece")]
        neutral_piece: Coord,
    },
    Convert {
        #[serde(rename = "neutralsToConvert")]
        neutrals_to_convert: Vec<Coord>,
        #[serde(rename = "ownToNeutral")]
        own_to_neutral: Coord,
    },
    Swap,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NexState {
    board: Vec<Vec<NexCell>>,
    turn: Role,
    swapped: bool,
    move_count: u32,
    winner: Option<Role>,
}

impl NexState {
    pub fn new(starting_role: Role) -> Self {
        Self {
            board: vec![vec![NexCell::Empty; BOARD_SIZE]; BOARD_SIZE],
            turn: starting_role,
            swapped: false,
            move_count: 0,
            winner: None,
        }
    }

    pub fn turn(&self) -> Role {
        self.turn
    }

    pub fn swapped(&self) -> bool {
        self.swapped
    }

    pub fn cell(&self, c: Coord) -> NexCell {
        self.board[c.row][c.col]
    }

    /// Which color a role currently owns
    pub fn role_color(&self, role: Role) -> NexColor {
        match (role, self.swapped) {
            (Role::P1, false) | (Role::P2, true) => NexColor::Black,
            (Role::P2, false) | (Role::P1, true) => NexColor::White,
        }
    }

    fn in_bounds(c: Coord) -> bool {
        c.row < BOARD_SIZE && c.col < BOARD_SIZE
    }

    fn neighbors(c: Coord) -> impl Iterator<Item = Coord> {
        NEX_NEIGHBORS.into_iter().filter_map(move |(dr, dc)| {
            let nr = c.row as isize + dr;
            let nc = c.col as isize + dc;
            if nr >= 0 && nc >= 0 && (nr as usize) < BOARD_SIZE && (nc as usize) < BOARD_SIZE {
                Some(Coord::new(nr as usize, nc as usize))
            } else {
                None
            }
        })
    }

    fn swap_available(&self, role: Role) -> bool {
        self.move_count == 1 && role == Role::P2 && !self.swapped
    }

    pub fn validate(&self, mv: &NexMove, role: Role) -> bool {
        if self.is_terminal() || self.turn != role {
            return false;
        }
        match mv {
            NexMove::Place {
                own_piece,
                neutral_piece,
            } => {
                own_piece != neutral_piece
                    && Self::in_bounds(*own_piece)
                    && Self::in_bounds(*neutral_piece)
                    && self.cell(*own_piece) == NexCell::Empty
                    && self.cell(*neutral_piece) == NexCell::Empty
            }
            NexMove::Convert {
                neutrals_to_convert,
                own_to_neutral,
            } => {
                let own = self.role_color(role).cell();
                neutrals_to_convert.len() == 2
                    && neutrals_to_convert[0] != neutrals_to_convert[1]
                    && neutrals_to_convert.iter().all(|c| {
                        Self::in_bounds(*c) && self.cell(*c) == NexCell::Neutral
                    })
                    && Self::in_bounds(*own_to_neutral)
                    && self.cell(*own_to_neutral) == own
            }
            NexMove::Swap => self.swap_available(role),
        }
    }

    /// Precondition: `validate` holds
    pub fn apply(&self, mv: &NexMove, role: Role) -> Self {
        let mut next = self.clone();
        match mv {
            NexMove::Place {
                own_piece,
                neutral_piece,
            } => {
                let own = next.role_color(role).cell();
                next.board[own_piece.row][own_piece.col] = own;
                next.board[neutral_piece.row][neutral_piece.col] = NexCell::Neutral;
            }
            NexMove::Convert {
                neutrals_to_convert,
                own_to_neutral,
            } => {
                let own = next.role_color(role).cell();
                for c in neutrals_to_convert {
                    next.board[c.row][c.col] = own;
                }
                next.board[own_to_neutral.row][own_to_neutral.col] = NexCell::Neutral;
            }
            NexMove::Swap => {
                next.swapped = true;
            }
        }
        if !matches!(mv, NexMove::Swap) && next.connects(next.role_color(role)) {
            next.winner = Some(role);
        }
        next.move_count += 1;
        next.turn = role.opponent();
        next
    }

    /// Does `color` connect its two target edges? Black joins the top and
    /// bottom rows, white the left and right columns, whoever owns it.
    fn connects(&self, color: NexColor) -> bool {
        let cell = color.cell();
        let starts: Vec<Coord> = match color {
            NexColor::Black => (0..BOARD_SIZE).map(|c| Coord::new(0, c)).collect(),
            NexColor::White => (0..BOARD_SIZE).map(|r| Coord::new(r, 0)).collect(),
        };
        let reached = |c: Coord| match color {
            NexColor::Black => c.row == BOARD_SIZE - 1,
            NexColor::White => c.col == BOARD_SIZE - 1,
        };
        let mut seen = vec![vec![false; BOARD_SIZE]; BOARD_SIZE];
        let mut stack: Vec<Coord> = starts
            .into_iter()
            .filter(|c| self.cell(*c) == cell)
            .collect();
        while let Some(c) = stack.pop() {
            if seen[c.row][c.col] {
                continue;
            }
            seen[c.row][c.col] = true;
            if reached(c) {
                return true;
            }
            for n in Self::neighbors(c) {
                if !seen[n.row][n.col] && self.cell(n) == cell {
                    stack.push(n);
                }
            }
        }
        false
    }

    pub fn is_terminal(&self) -> bool {
        self.winner.is_some()
    }

    pub fn verdict(&self) -> Verdict {
        match self.winner {
            Some(role) => Verdict::win_for(role),
            None => Verdict::Ongoing,
        }
    }

    /// Placements dominate the enumeration; conversions only enter once no
    /// empty pair remains, which keeps the move list bounded.
    pub fn legal_moves(&self, role: Role) -> Vec<NexMove> {
        let mut moves = Vec::new();
        if self.swap_available(role) {
            moves.push(NexMove::Swap);
        }
        let mut empties = Vec::new();
        let mut neutrals = Vec::new();
        let mut own_cells = Vec::new();
        let own = self.role_color(role).cell();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let c = Coord::new(row, col);
                match self.cell(c) {
                    NexCell::Empty => empties.push(c),
                    NexCell::Neutral => neutrals.push(c),
                    cell if cell == own => own_cells.push(c),
                    _ => {}
                }
            }
        }
        if empties.len() >= 2 {
            for &a in &empties {
                for &b in &empties {
                    if a != b {
                        moves.push(NexMove::Place {
                            own_piece: a,
                            neutral_piece: b,
                        });
                    }
                }
            }
        } else if neutrals.len() >= 2 && !own_cells.is_empty() {
            for i in 0..neutrals.len() {
                for j in i + 1..neutrals.len() {
                    for &o in &own_cells {
                        moves.push(NexMove::Convert {
                            neutrals_to_convert: vec![neutrals[i], neutrals[j]],
                            own_to_neutral: o,
                        });
                    }
                }
            }
        }
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(own: (usize, usize), neutral: (usize, usize)) -> NexMove {
        NexMove::Place {
            own_piece: Coord::new(own.0, own.1),
            neutral_piece: Coord::new(neutral.0, neutral.1),
        }
    }

    #[test]
    fn test_place_requires_two_distinct_empties() {
        let s = NexState::new(Role::P1);
        assert!(s.validate(&place((0, 0), (5, 5)), Role::P1));
        assert!(!s.validate(&place((0, 0), (0, 0)), Role::P1));
        let s = s.apply(&place((0, 0), (5, 5)), Role::P1);
        assert!(!s.validate(&place((0, 0), (1, 1)), Role::P2));
        assert!(!s.validate(&place((1, 1), (5, 5)), Role::P2));
    }

    #[test]
    fn test_swap_flips_colors() {
        let s = NexState::new(Role::P1);
        let s = s.apply(&place((0, 0), (5, 5)), Role::P1);
        assert!(s.validate(&NexMove::Swap, Role::P2));
        let s = s.apply(&NexMove::Swap, Role::P2);
        assert_eq!(s.turn(), Role::P1);
        assert_eq!(s.role_color(Role::P1), NexColor::White);
        assert_eq!(s.role_color(Role::P2), NexColor::Black);
        // Swap is one-shot
        let s = s.apply(&place((3, 3), (7, 7)), Role::P1);
        assert!(!s.validate(&NexMove::Swap, Role::P2));
    }

    #[test]
    fn test_convert_moves() {
        let s = NexState::new(Role::P1);
        let s = s.apply(&place((0, 0), (5, 5)), Role::P1);
        let s = s.apply(&place((10, 10), (5, 6)), Role::P2);
        let convert = NexMove::Convert {
            neutrals_to_convert: vec![Coord::new(5, 5), Coord::new(5, 6)],
            own_to_neutral: Coord::new(0, 0),
        };
        assert!(s.validate(&convert, Role::P1));
        let s = s.apply(&convert, Role::P1);
        assert_eq!(s.cell(Coord::new(5, 5)), NexCell::Black);
        assert_eq!(s.cell(Coord::new(5, 6)), NexCell::Black);
        assert_eq!(s.cell(Coord::new(0, 0)), NexCell::Neutral);
    }

    #[test]
    fn test_convert_rejects_wrong_pieces() {
        let s = NexState::new(Role::P1);
        let s = s.apply(&place((0, 0), (5, 5)), Role::P1);
        let s = s.apply(&place((10, 10), (5, 6)), Role::P2);
        // Converting the opponent's stone back to neutral is not allowed
        let bad = NexMove::Convert {
            neutrals_to_convert: vec![Coord::new(5, 5), Coord::new(5, 6)],
            own_to_neutral: Coord::new(10, 10),
        };
        assert!(!s.validate(&bad, Role::P1));
        // Both conversion targets must be neutral
        let bad = NexMove::Convert {
            neutrals_to_convert: vec![Coord::new(5, 5), Coord::new(4, 4)],
            own_to_neutral: Coord::new(0, 0),
        };
        assert!(!s.validate(&bad, Role::P1));
    }

    #[test]
    fn test_black_connects_top_to_bottom() {
        let mut s = NexState::new(Role::P1);
        // Hand-build a black column, leaving the last cell for the move
        for row in 0..BOARD_SIZE - 1 {
            s.board[row][0] = NexCell::Black;
        }
        let s = s.apply(&place((BOARD_SIZE - 1, 0), (5, 5)), Role::P1);
        assert!(s.is_terminal());
        assert_eq!(s.verdict(), Verdict::P1Wins);
    }

    #[test]
    fn test_hex_adjacency_diagonal() {
        // (r, c) connects to (r+1, c-1) but not (r+1, c+1)
        let mut s = NexState::new(Role::P1);
        s.board[0][5] = NexCell::Black;
        // Zig-zag path down using the (r+1, c-1) diagonal
        let mut col = 5;
        for row in 1..BOARD_SIZE - 1 {
            col = if row % 2 == 0 { col } else { col - 1 };
            s.board[row][col] = NexCell::Black;
        }
        assert!(!s.connects(NexColor::Black));
        s.board[BOARD_SIZE - 1][col] = NexCell::Black;
        assert!(s.connects(NexColor::Black));
    }

    #[test]
    fn test_white_connects_left_to_right() {
        let mut s = NexState::new(Role::P1);
        for col in 0..BOARD_SIZE {
            s.board[4][col] = NexCell::White;
        }
        assert!(s.connects(NexColor::White));
        assert!(!s.connects(NexColor::Black));
    }
}
