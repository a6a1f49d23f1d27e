//! Wire protocol - JSON frames over the WebSocket
//!
//! Every frame carries a lowercase_underscore `type`. Field names are
//! camelCase on the wire. Inbound frames with an unknown `type` produce
//! `UNKNOWN_MESSAGE`; frames that name a known type but fail to decode
//! produce `PARSE_ERROR`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use ludarena_core::{GameId, Role};
use ludarena_tournament::{Score, Standing};

/// Client → coordinator commands
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    JoinTournament {
        game_id: String,
        player_name: String,
        #[serde(default)]
        class_id: Option<String>,
        #[serde(default)]
        player_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ReadyForMatch { match_id: String },
    #[serde(rename_all = "camelCase")]
    SubmitMove {
        match_id: String,
        game_number: u8,
        #[serde(rename = "move")]
        mv: Value,
    },
    LeaveTournament,
}

/// The frame types this build understands
const KNOWN_TYPES: [&str; 4] = [
    "join_tournament",
    "ready_for_match",
    "submit_move",
    "leave_tournament",
];

/// How an inbound frame failed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// Not JSON, no `type`, or missing required fields
    Parse,
    /// Valid JSON with a `type` this server does not know
    UnknownMessage,
}

impl ClientMessage {
    /// Decode one text frame
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(text).map_err(|_| DecodeError::Parse)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DecodeError::Parse)?;
        if !KNOWN_TYPES.contains(&kind) {
            return Err(DecodeError::UnknownMessage);
        }
        serde_json::from_value(value).map_err(|_| DecodeError::Parse)
    }
}

/// Canonical error codes of the protocol
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    JoinFailed,
    NotInTournament,
    MatchNotFound,
    NotInMatch,
    NoActiveGame,
    InvalidMove,
    ParseError,
    UnknownMessage,
}

/// Coordinator → client notifications
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    Welcome {
        player_id: String,
        player_name: String,
        tournament_id: String,
        game_id: GameId,
    },
    #[serde(rename_all = "camelCase")]
    TournamentStateUpdate { tournament: Value },
    #[serde(rename_all = "camelCase")]
    MatchAssigned {
        match_id: String,
        your_role: Role,
        opponent_id: Option<String>,
        opponent_name: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    GameStart {
        match_id: String,
        game_number: u8,
        session_id: String,
        state: Value,
        your_role: Role,
        your_turn: bool,
    },
    #[serde(rename_all = "camelCase")]
    GameStateUpdate {
        match_id: String,
        game_number: u8,
        state: Value,
        your_turn: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        last_move: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        last_move_by: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    GameEnd {
        match_id: String,
        game_number: u8,
        winner_id: Option<String>,
        winner_role: Option<Role>,
        is_draw: bool,
        final_state: Value,
        match_score: Score,
    },
    #[serde(rename_all = "camelCase")]
    MatchEnd {
        match_id: String,
        winner_id: String,
        winner_name: String,
        final_score: Score,
        you_won: bool,
        eliminated_from_tournament: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        next_match_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    TournamentEnd {
        champion_id: String,
        champion_name: String,
        final_standings: Vec<Standing>,
    },
    Error { code: ErrorCode, message: String },
    Info { message: String },
}

impl ServerMessage {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        ServerMessage::Info {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_join() {
        let msg = ClientMessage::decode(
            r#"{"type":"join_tournament","gameId":"atari_go","playerName":"Ana"}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::JoinTournament {
                game_id,
                player_name,
                class_id,
                player_id,
            } => {
                assert_eq!(game_id, "atari_go");
                assert_eq!(player_name, "Ana");
                assert!(class_id.is_none());
                assert!(player_id.is_none());
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_decode_unknown_type() {
        let err = ClientMessage::decode(r#"{"type":"dance"}"#).unwrap_err();
        assert_eq!(err, DecodeError::UnknownMessage);
    }

    #[test]
    fn test_decode_missing_field_is_parse_error() {
        let err = ClientMessage::decode(r#"{"type":"submit_move","matchId":"m1"}"#).unwrap_err();
        assert_eq!(err, DecodeError::Parse);
    }

    #[test]
    fn test_decode_garbage_is_parse_error() {
        assert_eq!(
            ClientMessage::decode("not json").unwrap_err(),
            DecodeError::Parse
        );
        assert_eq!(ClientMessage::decode("42").unwrap_err(), DecodeError::Parse);
    }

    #[test]
    fn test_unknown_extra_fields_ignored() {
        let msg = ClientMessage::decode(
            r#"{"type":"ready_for_match","matchId":"m1","glitter":true}"#,
        );
        assert!(msg.is_ok());
    }

    #[test]
    fn test_error_frame_shape() {
        let frame = serde_json::to_value(ServerMessage::error(
            ErrorCode::InvalidMove,
            "illegal move",
        ))
        .unwrap();
        assert_eq!(frame["type"], "error");
        assert_eq!(frame["code"], "INVALID_MOVE");
    }

    #[test]
    fn test_server_message_types_are_snake_case() {
        let frame = serde_json::to_value(ServerMessage::info("hi")).unwrap();
        assert_eq!(frame["type"], "info");
        let frame = serde_json::to_value(ServerMessage::TournamentStateUpdate {
            tournament: Value::Null,
        })
        .unwrap();
        assert_eq!(frame["type"], "tournament_state_update");
    }
}
