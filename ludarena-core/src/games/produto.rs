//! Produto - hexagonal placement with product scoring
//!
//! Radius-4 axial hex board, 61 cells. A move places one piece on the first
//! turn and exactly two afterwards, of any color mix. When the board is
//! full, each color scores the product of its two largest connected groups;
//! the higher product wins, ties going to the player with fewer pieces of
//! their own color, then to a draw. P1 owns black, P2 white.

use serde::{Deserialize, Serialize};

use crate::hex::{self, Hex};
use crate::{Role, Verdict};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Black,
    White,
}

/// P1 owns black, P2 white
pub fn role_color(role: Role) -> Color {
    match role {
        Role::P1 => Color::Black,
        Role::P2 => Color::White,
    }
}

/// One piece of a move: where and which color
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub coord: Hex,
    pub color: Color,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProdutoMove {
    pub placements: Vec<Placement>,
}

impl ProdutoMove {
    pub fn one(coord: Hex, color: Color) -> Self {
        Self {
            placements: vec![Placement { coord, color }],
        }
    }

    pub fn two(a: (Hex, Color), b: (Hex, Color)) -> Self {
        Self {
            placements: vec![
                Placement {
                    coord: a.0,
                    color: a.1,
                },
                Placement {
                    coord: b.0,
                    color: b.1,
                },
            ],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProdutoState {
    /// Stones in placement order; the board stays small enough that a
    /// linear scan is the whole lookup story
    stones: Vec<Placement>,
    turn: Role,
    move_count: u32,
}

impl ProdutoState {
    pub fn new(starting_role: Role) -> Self {
        Self {
            stones: Vec::new(),
            turn: starting_role,
            move_count: 0,
        }
    }

    pub fn turn(&self) -> Role {
        self.turn
    }

    pub fn color_at(&self, h: Hex) -> Option<Color> {
        self.stones
            .iter()
            .find(|p| p.coord == h)
            .map(|p| p.color)
    }

    fn required_arity(&self) -> usize {
        if self.move_count == 0 {
            1
        } else {
            2
        }
    }

    pub fn validate(&self, mv: &ProdutoMove, role: Role) -> bool {
        if self.is_terminal() || self.turn != role {
            return false;
        }
        if mv.placements.len() != self.required_arity() {
            return false;
        }
        if mv
            .placements
            .iter()
            .any(|p| !p.coord.is_valid() || self.color_at(p.coord).is_some())
        {
            return false;
        }
        // Distinct target cells
        !(mv.placements.len() == 2 && mv.placements[0].coord == mv.placements[1].coord)
    }

    /// Precondition: `validate` holds
    pub fn apply(&self, mv: &ProdutoMove, role: Role) -> Self {
        let mut next = self.clone();
        next.stones.extend(mv.placements.iter().copied());
        next.move_count += 1;
        next.turn = role.opponent();
        next
    }

    pub fn is_terminal(&self) -> bool {
        self.stones.len() == hex::CELL_COUNT
    }

    fn empties(&self) -> Vec<Hex> {
        hex::all_cells()
            .filter(|h| self.color_at(*h).is_none())
            .collect()
    }

    /// Connected group sizes for a color, largest first
    fn group_sizes(&self, color: Color) -> Vec<u64> {
        let mine: Vec<Hex> = self
            .stones
            .iter()
            .filter(|p| p.color == color)
            .map(|p| p.coord)
            .collect();
        let mut seen: Vec<Hex> = Vec::new();
        let mut sizes = Vec::new();
        for &start in &mine {
            if seen.contains(&start) {
                continue;
            }
            let mut stack = vec![start];
            let mut size = 0u64;
            while let Some(h) = stack.pop() {
                if seen.contains(&h) {
                    continue;
                }
                seen.push(h);
                size += 1;
                for n in h.neighbors() {
                    if mine.contains(&n) && !seen.contains(&n) {
                        stack.push(n);
                    }
                }
            }
            sizes.push(size);
        }
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes
    }

    /// Product of the two largest groups; fewer than two groups scores 0
    pub fn score(&self, color: Color) -> u64 {
        let sizes = self.group_sizes(color);
        if sizes.len() < 2 {
            0
        } else {
            sizes[0] * sizes[1]
        }
    }

    fn piece_count(&self, color: Color) -> usize {
        self.stones.iter().filter(|p| p.color == color).count()
    }

    pub fn verdict(&self) -> Verdict {
        if !self.is_terminal() {
            return Verdict::Ongoing;
        }
        let black = self.score(Color::Black);
        let white = self.score(Color::White);
        if black != white {
            return if black > white {
                Verdict::P1Wins
            } else {
                Verdict::P2Wins
            };
        }
        // Equal products: fewer pieces of one's own color wins
        let black_pieces = self.piece_count(Color::Black);
        let white_pieces = self.piece_count(Color::White);
        if black_pieces < white_pieces {
            Verdict::P1Wins
        } else if white_pieces < black_pieces {
            Verdict::P2Wins
        } else {
            Verdict::Draw
        }
    }

    pub fn legal_moves(&self, role: Role) -> Vec<ProdutoMove> {
        let _ = role; // any color may be placed by either player
        let empties = self.empties();
        let colors = [Color::Black, Color::White];
        let mut moves = Vec::new();
        if self.required_arity() == 1 {
            for &h in &empties {
                for c in colors {
                    moves.push(ProdutoMove::one(h, c));
                }
            }
        } else {
            for i in 0..empties.len() {
                for j in i + 1..empties.len() {
                    for ca in colors {
                        for cb in colors {
                            moves.push(ProdutoMove::two((empties[i], ca), (empties[j], cb)));
                        }
                    }
                }
            }
        }
        moves
    }
}
