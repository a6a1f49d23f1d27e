//! LUDARENA Tournament - match and bracket orchestration
//!
//! This crate provides the layers between the game engines and the network
//! coordinator:
//! - Game sessions (one playing of one game inside a match)
//! - Best-of-three match control with starting-role alternation
//! - Double-elimination bracket construction with grand final and reset
//! - The tournament manager: registration, advancement, champion detection

pub mod bracket;
pub mod match_play;
pub mod session;
pub mod tournament;

pub use match_play::{BracketSide, Match, MatchPhase, MatchProgress, Score};
pub use session::{GameSession, MoveOutcome, MoveRecord, SessionManager};
pub use tournament::{
    AdvancementReport, Player, Standing, Tournament, TournamentError, TournamentManager,
    TournamentPhase,
};

/// Fresh process-unique identifier with a readable prefix
pub(crate) fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}
