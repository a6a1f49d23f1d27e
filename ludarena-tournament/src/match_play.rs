//! Best-of-three match control
//!
//! A match owns its slots, score and game progression; sessions are created
//! by the coordinator from what [`Match::record_game_result`] reports. The
//! starting role alternates per game number (odd games open with P1),
//! independent of who won the previous game.

use serde::{Deserialize, Serialize};

use ludarena_core::Role;

/// Which bracket a match belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSide {
    Winners,
    Losers,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    Waiting,
    Playing,
    Finished,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub p1_wins: u8,
    pub p2_wins: u8,
}

/// What recording a game result led to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchProgress {
    /// Play on: create the next session with this starting role
    NextGame { game_number: u8, starting_role: Role },
    /// The match is decided
    Finished { winner: String, loser: String },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub round: u32,
    pub bracket: BracketSide,
    pub p1: Option<String>,
    pub p2: Option<String>,
    pub score: Score,
    pub best_of: u8,
    /// 0 before the match starts, then the game being played
    pub current_game: u8,
    pub starting_role: Option<Role>,
    pub phase: MatchPhase,
    pub winner: Option<String>,
    pub loser: Option<String>,
    pub advance_winner_to: Option<String>,
    pub advance_loser_to: Option<String>,
    /// Set once the tournament manager has propagated this result
    #[serde(default)]
    pub advanced: bool,
}

impl Match {
    pub fn new(id: String, round: u32, bracket: BracketSide) -> Self {
        Self {
            id,
            round,
            bracket,
            p1: None,
            p2: None,
            score: Score::default(),
            best_of: 3,
            current_game: 0,
            starting_role: None,
            phase: MatchPhase::Waiting,
            winner: None,
            loser: None,
            advance_winner_to: None,
            advance_loser_to: None,
            advanced: false,
        }
    }

    pub fn wins_needed(&self) -> u8 {
        self.best_of / 2 + 1
    }

    pub fn slots_filled(&self) -> usize {
        self.p1.iter().count() + self.p2.iter().count()
    }

    /// Fill the leftmost open slot
    pub fn assign(&mut self, player_id: &str) {
        if self.p1.is_none() {
            self.p1 = Some(player_id.to_string());
        } else if self.p2.is_none() {
            self.p2 = Some(player_id.to_string());
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase == MatchPhase::Waiting && self.p1.is_some() && self.p2.is_some()
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.role_of(player_id).is_some()
    }

    pub fn role_of(&self, player_id: &str) -> Option<Role> {
        if self.p1.as_deref() == Some(player_id) {
            Some(Role::P1)
        } else if self.p2.as_deref() == Some(player_id) {
            Some(Role::P2)
        } else {
            None
        }
    }

    pub fn player(&self, role: Role) -> Option<&str> {
        match role {
            Role::P1 => self.p1.as_deref(),
            Role::P2 => self.p2.as_deref(),
        }
    }

    /// Game `g` opens with P1 when odd, P2 when even
    fn starting_role_for(game_number: u8) -> Role {
        if game_number % 2 == 1 {
            Role::P1
        } else {
            Role::P2
        }
    }

    /// Begin play: only valid on a ready match
    pub fn start(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.phase = MatchPhase::Playing;
        self.current_game = 1;
        self.starting_role = Some(Role::P1);
        true
    }

    /// Record one game's winner (None for a draw). Draws consume a game
    /// number without scoring, so play continues until someone reaches the
    /// required wins.
    pub fn record_game_result(&mut self, winner_id: Option<&str>) -> MatchProgress {
        match winner_id {
            Some(w) if self.p1.as_deref() == Some(w) => self.score.p1_wins += 1,
            Some(w) if self.p2.as_deref() == Some(w) => self.score.p2_wins += 1,
            _ => {}
        }
        let needed = self.wins_needed();
        if self.score.p1_wins >= needed || self.score.p2_wins >= needed {
            let (winner, loser) = if self.score.p1_wins >= needed {
                (self.p1.clone(), self.p2.clone())
            } else {
                (self.p2.clone(), self.p1.clone())
            };
            self.winner = winner.clone();
            self.loser = loser.clone();
            self.phase = MatchPhase::Finished;
            MatchProgress::Finished {
                winner: winner.unwrap_or_default(),
                loser: loser.unwrap_or_default(),
            }
        } else {
            self.current_game += 1;
            let starting_role = Self::starting_role_for(self.current_game);
            self.starting_role = Some(starting_role);
            MatchProgress::NextGame {
                game_number: self.current_game,
                starting_role,
            }
        }
    }

    /// Finish immediately with a sole participant (no loser recorded)
    pub fn finish_as_bye(&mut self, winner_id: &str) {
        self.winner = Some(winner_id.to_string());
        self.loser = None;
        self.phase = MatchPhase::Finished;
    }

    /// Finish with no participants at all (an empty pairing, or a reset
    /// that never gets played)
    pub fn finish_empty(&mut self) {
        self.winner = None;
        self.loser = None;
        self.phase = MatchPhase::Finished;
    }
}
