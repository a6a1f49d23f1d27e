//! Game sessions - one playing of one game inside a match

use chrono::{DateTime, Utc};
use serde::Serialize;

use ludarena_core::{BoardState, GameId, GameMove, MoveError, Role, Verdict};

/// One accepted move, as kept in the session log
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub player_id: String,
    #[serde(rename = "move")]
    pub mv: GameMove,
    pub timestamp: DateTime<Utc>,
}

/// What a successful move did to the game
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub game_over: bool,
    pub winner_role: Option<Role>,
    pub draw: bool,
}

/// A single game being played inside a match. The session owns the engine
/// state; once `finished` latches, no further moves are accepted.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: String,
    pub tournament_id: String,
    pub match_id: String,
    pub game_number: u8,
    pub game_id: GameId,
    state: BoardState,
    finished: bool,
    outcome: Verdict,
    moves: Vec<MoveRecord>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl GameSession {
    pub fn new(
        tournament_id: &str,
        match_id: &str,
        game_number: u8,
        game_id: GameId,
        starting_role: Role,
    ) -> Self {
        Self {
            id: crate::new_id("session"),
            tournament_id: tournament_id.to_string(),
            match_id: match_id.to_string(),
            game_number,
            game_id,
            state: BoardState::new(game_id, starting_role),
            finished: false,
            outcome: Verdict::Ongoing,
            moves: Vec::new(),
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn turn(&self) -> Role {
        self.state.turn()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn outcome(&self) -> Verdict {
        self.outcome
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Serialized engine state for broadcasts and observers
    pub fn state_json(&self) -> serde_json::Value {
        self.state.serialize()
    }

    /// Validate and apply one move for `role`, logging it on success
    pub fn submit_move(
        &mut self,
        player_id: &str,
        role: Role,
        mv: &GameMove,
    ) -> Result<MoveOutcome, MoveError> {
        if self.finished {
            return Err(MoveError::GameFinished);
        }
        self.state = self.state.apply(mv, role)?;
        self.moves.push(MoveRecord {
            player_id: player_id.to_string(),
            mv: mv.clone(),
            timestamp: Utc::now(),
        });
        if self.state.is_terminal() {
            self.finished = true;
            self.outcome = self.state.verdict();
            self.finished_at = Some(Utc::now());
        }
        Ok(MoveOutcome {
            game_over: self.finished,
            winner_role: self.outcome.winner(),
            draw: self.outcome == Verdict::Draw,
        })
    }
}

/// Sessions keyed by match: at most one per match, and a new one only
/// replaces a finished one
#[derive(Default)]
pub struct SessionManager {
    sessions: std::collections::HashMap<String, GameSession>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the session for the next game of a match. Replacing an
    /// unfinished session would break the one-active-session invariant, so
    /// that is refused.
    pub fn create_session(
        &mut self,
        tournament_id: &str,
        match_id: &str,
        game_number: u8,
        game_id: GameId,
        starting_role: Role,
    ) -> Option<&GameSession> {
        if let Some(existing) = self.sessions.get(match_id) {
            if !existing.is_finished() {
                return None;
            }
        }
        let session = GameSession::new(tournament_id, match_id, game_number, game_id, starting_role);
        self.sessions.insert(match_id.to_string(), session);
        self.sessions.get(match_id)
    }

    pub fn get(&self, match_id: &str) -> Option<&GameSession> {
        self.sessions.get(match_id)
    }

    pub fn get_mut(&mut self, match_id: &str) -> Option<&mut GameSession> {
        self.sessions.get_mut(match_id)
    }

    pub fn remove_for_match(&mut self, match_id: &str) {
        self.sessions.remove(match_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ludarena_core::games::dominorio::DominoMove;
    use ludarena_core::Coord;

    fn domino(r1: usize, c1: usize, r2: usize, c2: usize) -> GameMove {
        GameMove::Dominorio(DominoMove::new(r1, c1, r2, c2))
    }

    #[test]
    fn test_submit_move_happy_path() {
        let mut s = GameSession::new("t1", "m1", 1, GameId::Dominorio, Role::P1);
        let out = s
            .submit_move("alice", Role::P1, &domino(0, 0, 1, 0))
            .unwrap();
        assert!(!out.game_over);
        assert_eq!(s.turn(), Role::P2);
        assert_eq!(s.moves().len(), 1);
        assert_eq!(s.moves()[0].player_id, "alice");
    }

    #[test]
    fn test_out_of_turn_rejected() {
        let mut s = GameSession::new("t1", "m1", 1, GameId::Dominorio, Role::P1);
        let err = s
            .submit_move("bob", Role::P2, &domino(0, 0, 0, 1))
            .unwrap_err();
        assert_eq!(err, MoveError::NotYourTurn);
        assert!(s.moves().is_empty());
    }

    #[test]
    fn test_invalid_move_leaves_state_unchanged() {
        let mut s = GameSession::new("t1", "m1", 1, GameId::CatsDogs, Role::P1);
        let err = s
            .submit_move("alice", Role::P1, &GameMove::CatsDogs(Coord::new(0, 0)))
            .unwrap_err();
        assert_eq!(err, MoveError::InvalidMove);
        assert_eq!(s.turn(), Role::P1);
    }

    #[test]
    fn test_finish_latches() {
        use ludarena_core::games::atari_go::StoneMove;
        let mut s = GameSession::new("t1", "m1", 1, GameId::AtariGo, Role::P1);
        s.submit_move("a", Role::P1, &GameMove::AtariGo(StoneMove::place(1, 0)))
            .unwrap();
        s.submit_move("b", Role::P2, &GameMove::AtariGo(StoneMove::place(0, 0)))
            .unwrap();
        let out = s
            .submit_move("a", Role::P1, &GameMove::AtariGo(StoneMove::place(0, 1)))
            .unwrap();
        assert!(out.game_over);
        assert_eq!(out.winner_role, Some(Role::P1));
        assert!(s.finished_at.is_some());
        // No further moves
        let err = s
            .submit_move("b", Role::P2, &GameMove::AtariGo(StoneMove::place(5, 5)))
            .unwrap_err();
        assert_eq!(err, MoveError::GameFinished);
    }

    #[test]
    fn test_manager_one_active_session_per_match() {
        let mut mgr = SessionManager::new();
        assert!(mgr
            .create_session("t1", "m1", 1, GameId::Dominorio, Role::P1)
            .is_some());
        // Second game cannot start while the first is unfinished
        assert!(mgr
            .create_session("t1", "m1", 2, GameId::Dominorio, Role::P2)
            .is_none());
    }
}
