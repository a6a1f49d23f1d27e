//! LUDARENA Core - Game engines
//!
//! This crate provides the deterministic rules for the six tournament games:
//! - Board geometry (square grids and an axial hex grid)
//! - Per-game state, move validation and application
//! - Terminal detection and winner reporting
//! - Legal-move enumeration (used for no-move terminal conditions and by bots)
//!
//! Every engine is a pure value: applying a move yields a new state and never
//! mutates the old one.

pub mod games;
pub mod hex;

use serde::{Deserialize, Serialize};

pub use games::atari_go::AtariGoState;
pub use games::cats_dogs::CatsDogsState;
pub use games::dominorio::DominorioState;
pub use games::nex::NexState;
pub use games::produto::ProdutoState;
pub use games::quelhas::QuelhasState;
pub use games::Coord;
pub use hex::{Hex, BOARD_RADIUS};

/// The two seats in a game. `P1` is always the mover-one species
/// (cats, black, vertical); `P2` the mover-two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    P1,
    P2,
}

impl Role {
    pub fn opponent(self) -> Self {
        match self {
            Role::P1 => Role::P2,
            Role::P2 => Role::P1,
        }
    }
}

/// Game outcome as reported by an engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Ongoing,
    P1Wins,
    P2Wins,
    Draw,
}

impl Verdict {
    /// The winning role, if any
    pub fn winner(self) -> Option<Role> {
        match self {
            Verdict::P1Wins => Some(Role::P1),
            Verdict::P2Wins => Some(Role::P2),
            Verdict::Ongoing | Verdict::Draw => None,
        }
    }

    pub fn win_for(role: Role) -> Self {
        match role {
            Role::P1 => Verdict::P1Wins,
            Role::P2 => Verdict::P2Wins,
        }
    }
}

/// Identifies one of the six supported games
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameId {
    CatsDogs,
    Dominorio,
    Quelhas,
    Produto,
    AtariGo,
    Nex,
}

impl GameId {
    pub const ALL: [GameId; 6] = [
        GameId::CatsDogs,
        GameId::Dominorio,
        GameId::Quelhas,
        GameId::Produto,
        GameId::AtariGo,
        GameId::Nex,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GameId::CatsDogs => "cats_dogs",
            GameId::Dominorio => "dominorio",
            GameId::Quelhas => "quelhas",
            GameId::Produto => "produto",
            GameId::AtariGo => "atari_go",
            GameId::Nex => "nex",
        }
    }
}

impl std::str::FromStr for GameId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameId::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or(())
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an engine rejected a move
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("game already finished")]
    GameFinished,
    #[error("not your turn")]
    NotYourTurn,
    #[error("illegal move")]
    InvalidMove,
}

/// A move for any of the six games.
///
/// Serializes to the game-specific wire payload; decoding always goes through
/// [`GameMove::from_value`] with a known [`GameId`], never blind.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GameMove {
    CatsDogs(Coord),
    Dominorio(games::dominorio::DominoMove),
    Quelhas(games::quelhas::SegmentMove),
    Produto(games::produto::ProdutoMove),
    AtariGo(games::atari_go::StoneMove),
    Nex(games::nex::NexMove),
}

impl GameMove {
    /// Decode a wire payload against the game it is meant for.
    pub fn from_value(game: GameId, value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match game {
            GameId::CatsDogs => GameMove::CatsDogs(serde_json::from_value(value.clone())?),
            GameId::Dominorio => GameMove::Dominorio(serde_json::from_value(value.clone())?),
            GameId::Quelhas => GameMove::Quelhas(serde_json::from_value(value.clone())?),
            GameId::Produto => GameMove::Produto(serde_json::from_value(value.clone())?),
            GameId::AtariGo => GameMove::AtariGo(serde_json::from_value(value.clone())?),
            GameId::Nex => GameMove::Nex(serde_json::from_value(value.clone())?),
        })
    }
}

/// Board state for any of the six games (clone to mutate).
///
/// The tag names match [`GameId`]'s wire names so a serialized state is
/// self-describing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum BoardState {
    CatsDogs(CatsDogsState),
    Dominorio(DominorioState),
    Quelhas(QuelhasState),
    Produto(ProdutoState),
    AtariGo(AtariGoState),
    Nex(NexState),
}

impl BoardState {
    /// Initial position for a game, with `starting_role` to move first.
    pub fn new(game: GameId, starting_role: Role) -> Self {
        match game {
            GameId::CatsDogs => BoardState::CatsDogs(CatsDogsState::new(starting_role)),
            GameId::Dominorio => BoardState::Dominorio(DominorioState::new(starting_role)),
            GameId::Quelhas => BoardState::Quelhas(QuelhasState::new(starting_role)),
            GameId::Produto => BoardState::Produto(ProdutoState::new(starting_role)),
            GameId::AtariGo => BoardState::AtariGo(AtariGoState::new(starting_role)),
            GameId::Nex => BoardState::Nex(NexState::new(starting_role)),
        }
    }

    pub fn game_id(&self) -> GameId {
        match self {
            BoardState::CatsDogs(_) => GameId::CatsDogs,
            BoardState::Dominorio(_) => GameId::Dominorio,
            BoardState::Quelhas(_) => GameId::Quelhas,
            BoardState::Produto(_) => GameId::Produto,
            BoardState::AtariGo(_) => GameId::AtariGo,
            BoardState::Nex(_) => GameId::Nex,
        }
    }

    /// Whose turn it is
    pub fn turn(&self) -> Role {
        match self {
            BoardState::CatsDogs(s) => s.turn(),
            BoardState::Dominorio(s) => s.turn(),
            BoardState::Quelhas(s) => s.turn(),
            BoardState::Produto(s) => s.turn(),
            BoardState::AtariGo(s) => s.turn(),
            BoardState::Nex(s) => s.turn(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            BoardState::CatsDogs(s) => s.is_terminal(),
            BoardState::Dominorio(s) => s.is_terminal(),
            BoardState::Quelhas(s) => s.is_terminal(),
            BoardState::Produto(s) => s.is_terminal(),
            BoardState::AtariGo(s) => s.is_terminal(),
            BoardState::Nex(s) => s.is_terminal(),
        }
    }

    pub fn verdict(&self) -> Verdict {
        match self {
            BoardState::CatsDogs(s) => s.verdict(),
            BoardState::Dominorio(s) => s.verdict(),
            BoardState::Quelhas(s) => s.verdict(),
            BoardState::Produto(s) => s.verdict(),
            BoardState::AtariGo(s) => s.verdict(),
            BoardState::Nex(s) => s.verdict(),
        }
    }

    /// Check a move without applying it. A move variant for the wrong game
    /// is simply invalid.
    pub fn validate(&self, mv: &GameMove, role: Role) -> bool {
        match (self, mv) {
            (BoardState::CatsDogs(s), GameMove::CatsDogs(m)) => s.validate(m, role),
            (BoardState::Dominorio(s), GameMove::Dominorio(m)) => s.validate(m, role),
            (BoardState::Quelhas(s), GameMove::Quelhas(m)) => s.validate(m, role),
            (BoardState::Produto(s), GameMove::Produto(m)) => s.validate(m, role),
            (BoardState::AtariGo(s), GameMove::AtariGo(m)) => s.validate(m, role),
            (BoardState::Nex(s), GameMove::Nex(m)) => s.validate(m, role),
            _ => false,
        }
    }

    /// Apply a move, returning the successor state.
    pub fn apply(&self, mv: &GameMove, role: Role) -> Result<BoardState, MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameFinished);
        }
        if self.turn() != role {
            return Err(MoveError::NotYourTurn);
        }
        if !self.validate(mv, role) {
            return Err(MoveError::InvalidMove);
        }
        Ok(match (self, mv) {
            (BoardState::CatsDogs(s), GameMove::CatsDogs(m)) => {
                BoardState::CatsDogs(s.apply(m, role))
            }
            (BoardState::Dominorio(s), GameMove::Dominorio(m)) => {
                BoardState::Dominorio(s.apply(m, role))
            }
            (BoardState::Quelhas(s), GameMove::Quelhas(m)) => {
                BoardState::Quelhas(s.apply(m, role))
            }
            (BoardState::Produto(s), GameMove::Produto(m)) => {
                BoardState::Produto(s.apply(m, role))
            }
            (BoardState::AtariGo(s), GameMove::AtariGo(m)) => {
                BoardState::AtariGo(s.apply(m, role))
            }
            (BoardState::Nex(s), GameMove::Nex(m)) => BoardState::Nex(s.apply(m, role)),
            _ => return Err(MoveError::InvalidMove),
        })
    }

    /// Enumerate moves that would be legal for `role` on its turn
    pub fn legal_moves(&self, role: Role) -> Vec<GameMove> {
        match self {
            BoardState::CatsDogs(s) => s
                .legal_moves(role)
                .into_iter()
                .map(GameMove::CatsDogs)
                .collect(),
            BoardState::Dominorio(s) => s
                .legal_moves(role)
                .into_iter()
                .map(GameMove::Dominorio)
                .collect(),
            BoardState::Quelhas(s) => s
                .legal_moves(role)
                .into_iter()
                .map(GameMove::Quelhas)
                .collect(),
            BoardState::Produto(s) => s
                .legal_moves(role)
                .into_iter()
                .map(GameMove::Produto)
                .collect(),
            BoardState::AtariGo(s) => s
                .legal_moves(role)
                .into_iter()
                .map(GameMove::AtariGo)
                .collect(),
            BoardState::Nex(s) => s.legal_moves(role).into_iter().map(GameMove::Nex).collect(),
        }
    }

    /// External representation of the state (wire and snapshot form)
    pub fn serialize(&self) -> serde_json::Value {
        // Derived serialization is infallible for these types
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
