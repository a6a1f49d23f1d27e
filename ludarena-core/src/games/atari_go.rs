//! Atari Go - 9×9, first capture wins
//!
//! Go placement rules without ko: a move must either capture an adjacent
//! opposing group or leave the placed stone's own group with at least one
//! liberty. The first player to capture any stone wins on the spot; two
//! consecutive passes end the game in a draw. P1 is black.

use serde::{Deserialize, Serialize};

use super::Coord;
use crate::{Role, Verdict};

pub const BOARD_SIZE: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stone {
    Black,
    White,
}

fn stone_of(role: Role) -> Stone {
    match role {
        Role::P1 => Stone::Black,
        Role::P2 => Stone::White,
    }
}

/// A placement `{row, col}` or a pass `{pass: true}`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoneMove {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<usize>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pass: bool,
}

impl StoneMove {
    pub fn place(row: usize, col: usize) -> Self {
        Self {
            row: Some(row),
            col: Some(col),
            pass: false,
        }
    }

    pub fn pass() -> Self {
        Self {
            row: None,
            col: None,
            pass: true,
        }
    }

    fn coord(&self) -> Option<Coord> {
        match (self.row, self.col) {
            (Some(r), Some(c)) => Some(Coord::new(r, c)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AtariGoState {
    board: [[Option<Stone>; BOARD_SIZE]; BOARD_SIZE],
    turn: Role,
    consecutive_passes: u8,
    black_captures: u32,
    white_captures: u32,
    winner: Option<Role>,
}

impl AtariGoState {
    pub fn new(starting_role: Role) -> Self {
        Self {
            board: [[None; BOARD_SIZE]; BOARD_SIZE],
            turn: starting_role,
            consecutive_passes: 0,
            black_captures: 0,
            white_captures: 0,
            winner: None,
        }
    }

    pub fn turn(&self) -> Role {
        self.turn
    }

    pub fn stone_at(&self, c: Coord) -> Option<Stone> {
        self.board[c.row][c.col]
    }

    pub fn captures(&self, role: Role) -> u32 {
        match role {
            Role::P1 => self.black_captures,
            Role::P2 => self.white_captures,
        }
    }

    /// Collect the group containing `start` (same color, orthogonally
    /// connected) and count its liberties
    fn group_and_liberties(&self, start: Coord) -> (Vec<Coord>, usize) {
        let color = match self.stone_at(start) {
            Some(c) => c,
            None => return (Vec::new(), 0),
        };
        let mut group = Vec::new();
        let mut liberties = Vec::new();
        let mut stack = vec![start];
        while let Some(c) = stack.pop() {
            if group.contains(&c) {
                continue;
            }
            group.push(c);
            for n in c.orthogonal(BOARD_SIZE) {
                match self.stone_at(n) {
                    Some(s) if s == color => {
                        if !group.contains(&n) {
                            stack.push(n);
                        }
                    }
                    Some(_) => {}
                    None => {
                        if !liberties.contains(&n) {
                            liberties.push(n);
                        }
                    }
                }
            }
        }
        let libs = liberties.len();
        (group, libs)
    }

    /// Count of `role`'s groups with exactly one liberty (used by bots)
    pub fn atari_groups(&self, role: Role) -> usize {
        let color = stone_of(role);
        let mut counted: Vec<Coord> = Vec::new();
        let mut ataris = 0;
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let c = Coord::new(row, col);
                if self.stone_at(c) == Some(color) && !counted.contains(&c) {
                    let (group, libs) = self.group_and_liberties(c);
                    if libs == 1 {
                        ataris += 1;
                    }
                    counted.extend(group);
                }
            }
        }
        ataris
    }

    /// Place the stone and resolve captures on a scratch board.
    /// Returns the resulting state and the number of stones captured,
    /// or None if the placement would be suicidal.
    fn try_place(&self, c: Coord, role: Role) -> Option<(Self, u32)> {
        let mut next = self.clone();
        let color = stone_of(role);
        next.board[c.row][c.col] = Some(color);

        let mut captured = 0u32;
        for n in c.orthogonal(BOARD_SIZE) {
            if next.stone_at(n) == Some(stone_of(role.opponent())) {
                let (group, libs) = next.group_and_liberties(n);
                if libs == 0 {
                    captured += group.len() as u32;
                    for g in group {
                        next.board[g.row][g.col] = None;
                    }
                }
            }
        }

        if captured == 0 {
            let (_, libs) = next.group_and_liberties(c);
            if libs == 0 {
                return None; // suicide
            }
        }
        Some((next, captured))
    }

    pub fn validate(&self, mv: &StoneMove, role: Role) -> bool {
        if self.is_terminal() || self.turn != role {
            return false;
        }
        if mv.pass {
            return true;
        }
        let c = match mv.coord() {
            Some(c) => c,
            None => return false,
        };
        if c.row >= BOARD_SIZE || c.col >= BOARD_SIZE || self.stone_at(c).is_some() {
            return false;
        }
        self.try_place(c, role).is_some()
    }

    /// Precondition: `validate` holds
    pub fn apply(&self, mv: &StoneMove, role: Role) -> Self {
        if mv.pass {
            let mut next = self.clone();
            next.consecutive_passes += 1;
            next.turn = role.opponent();
            return next;
        }
        // validate guarantees coord() and try_place succeed
        let c = mv.coord().unwrap_or(Coord::new(0, 0));
        let (mut next, captured) = match self.try_place(c, role) {
            Some(r) => r,
            None => (self.clone(), 0),
        };
        next.consecutive_passes = 0;
        if captured > 0 {
            match role {
                Role::P1 => next.black_captures += captured,
                Role::P2 => next.white_captures += captured,
            }
            next.winner = Some(role);
        }
        next.turn = role.opponent();
        next
    }

    pub fn is_terminal(&self) -> bool {
        self.winner.is_some() || self.consecutive_passes >= 2
    }

    pub fn verdict(&self) -> Verdict {
        match self.winner {
            Some(role) => Verdict::win_for(role),
            None if self.consecutive_passes >= 2 => Verdict::Draw,
            None => Verdict::Ongoing,
        }
    }

    pub fn legal_moves(&self, role: Role) -> Vec<StoneMove> {
        let mut moves = Vec::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let c = Coord::new(row, col);
                if self.stone_at(c).is_none() && self.try_place(c, role).is_some() {
                    moves.push(StoneMove::place(row, col));
                }
            }
        }
        moves.push(StoneMove::pass());
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_capture_wins() {
        // Black 1-0, white 0-0 (corner), black 0-1 captures the corner stone
        let s = AtariGoState::new(Role::P1);
        let s = s.apply(&StoneMove::place(1, 0), Role::P1);
        let s = s.apply(&StoneMove::place(0, 0), Role::P2);
        assert!(s.validate(&StoneMove::place(0, 1), Role::P1));
        let s = s.apply(&StoneMove::place(0, 1), Role::P1);
        assert!(s.is_terminal());
        assert_eq!(s.verdict(), Verdict::P1Wins);
        assert_eq!(s.captures(Role::P1), 1);
        assert_eq!(s.stone_at(Coord::new(0, 0)), None);
    }

    #[test]
    fn test_suicide_rejected() {
        // White surrounds the corner point, black may not play into it
        let s = AtariGoState::new(Role::P1);
        let s = s.apply(&StoneMove::place(4, 4), Role::P1);
        let s = s.apply(&StoneMove::place(0, 1), Role::P2);
        let s = s.apply(&StoneMove::place(5, 5), Role::P1);
        let s = s.apply(&StoneMove::place(1, 0), Role::P2);
        assert!(!s.validate(&StoneMove::place(0, 0), Role::P1));
    }

    #[test]
    fn test_capture_beats_suicide_rule() {
        // Placing with zero liberties is fine when it captures first:
        // white at (0,0) with black at (1,0); white's stone has one
        // liberty at (0,1). Black plays (0,1): its stone would have no
        // liberty... except the white group dies first.
        let s = AtariGoState::new(Role::P1);
        let s = s.apply(&StoneMove::place(1, 0), Role::P1);
        let s = s.apply(&StoneMove::place(0, 0), Role::P2);
        let s = s.apply(&StoneMove::place(1, 1), Role::P1);
        let s = s.apply(&StoneMove::place(8, 8), Role::P2);
        assert!(s.validate(&StoneMove::place(0, 1), Role::P1));
        let s = s.apply(&StoneMove::place(0, 1), Role::P1);
        assert_eq!(s.verdict(), Verdict::P1Wins);
    }

    #[test]
    fn test_two_passes_draw() {
        let s = AtariGoState::new(Role::P1);
        let s = s.apply(&StoneMove::pass(), Role::P1);
        assert!(!s.is_terminal());
        let s = s.apply(&StoneMove::pass(), Role::P2);
        assert!(s.is_terminal());
        assert_eq!(s.verdict(), Verdict::Draw);
    }

    #[test]
    fn test_pass_resets_on_placement() {
        let s = AtariGoState::new(Role::P1);
        let s = s.apply(&StoneMove::pass(), Role::P1);
        let s = s.apply(&StoneMove::place(2, 2), Role::P2);
        let s = s.apply(&StoneMove::pass(), Role::P1);
        assert!(!s.is_terminal());
    }

    #[test]
    fn test_atari_group_counting() {
        let s = AtariGoState::new(Role::P1);
        let s = s.apply(&StoneMove::place(1, 0), Role::P1);
        let s = s.apply(&StoneMove::place(0, 0), Role::P2);
        // White's corner stone has a single liberty
        assert_eq!(s.atari_groups(Role::P2), 1);
        assert_eq!(s.atari_groups(Role::P1), 0);
    }
}
