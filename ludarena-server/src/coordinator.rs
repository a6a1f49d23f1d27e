//! Session coordinator - the single writer behind the WebSocket
//!
//! All tournament, session and connection state lives behind one async
//! mutex: inbound commands, bot moves and timed continuations each take the
//! lock, mutate, queue outbound frames (queueing never blocks - sockets are
//! drained by per-connection writer tasks) and hand any follow-up work back
//! as delayed tasks spawned after the lock is released. A bot-vs-bot match
//! is therefore a chain of short lock holds with sleeps in between, never a
//! blocking loop.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use ludarena_bot::{BotLevel, BotPolicy};
use ludarena_core::{GameId, GameMove, MoveError, Role};
use ludarena_tournament::{
    MatchPhase, MatchProgress, MoveOutcome, SessionManager, TournamentError, TournamentManager,
    TournamentPhase,
};

use crate::connection::ConnectionRegistry;
use crate::protocol::{ClientMessage, DecodeError, ErrorCode, ServerMessage};

/// Hard ceiling on moves per session; bounds a pathological bot loop
const MAX_SESSION_MOVES: usize = 1000;

#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    /// Pause before a bot answers, for perceptual clarity
    pub bot_delay_ms: u64,
    /// Pause between the games of a match
    pub inter_game_pause_ms: u64,
    pub bot_level: BotLevel,
    /// Seeds the bracket shuffle and the bot RNG
    pub seed: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            bot_delay_ms: 150,
            inter_game_pause_ms: 1000,
            bot_level: BotLevel::Advanced,
            seed: 42,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AdminError {
    #[error("unknown game id")]
    UnknownGame,
    #[error(transparent)]
    Tournament(#[from] TournamentError),
}

/// Work to do after the current lock is released
enum Delayed {
    BotMove {
        tournament_id: String,
        match_id: String,
    },
    NextGame {
        tournament_id: String,
        match_id: String,
        game_number: u8,
        starting_role: Role,
    },
}

pub struct Coordinator {
    config: CoordinatorConfig,
    inner: Mutex<CoordinatorState>,
}

struct CoordinatorState {
    manager: TournamentManager,
    sessions: SessionManager,
    connections: ConnectionRegistry,
    /// match id → players that sent ready_for_match
    ready: HashMap<String, HashSet<String>>,
    /// matches whose pairing has been announced
    assigned_notified: HashSet<String>,
    player_tournament: HashMap<String, String>,
    bots: BotPolicy,
    rng: ChaCha8Rng,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Arc<Self> {
        let state = CoordinatorState {
            manager: TournamentManager::new(),
            sessions: SessionManager::new(),
            connections: ConnectionRegistry::new(),
            ready: HashMap::new(),
            assigned_notified: HashSet::new(),
            player_tournament: HashMap::new(),
            bots: BotPolicy::with_seed(config.seed),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        };
        Arc::new(Self {
            config,
            inner: Mutex::new(state),
        })
    }

    pub async fn on_connect(&self, conn_id: &str, sender: UnboundedSender<ServerMessage>) {
        let mut state = self.inner.lock().await;
        state.connections.register(conn_id, sender);
        debug!(conn = %conn_id, "connection registered");
    }

    pub async fn on_disconnect(self: &Arc<Self>, conn_id: &str) {
        let mut state = self.inner.lock().await;
        if let Some(player_id) = state.connections.unregister(conn_id) {
            if let Some(tid) = state.player_tournament.get(&player_id).cloned() {
                let _ = state.manager.set_online(&tid, &player_id, false);
                state.broadcast_tournament_state(&tid);
                info!(player = %player_id, "player went offline");
            }
        }
    }

    /// Entry point for one inbound text frame
    pub async fn handle_frame(self: &Arc<Self>, conn_id: &str, text: &str) {
        let msg = match ClientMessage::decode(text) {
            Ok(msg) => msg,
            Err(DecodeError::Parse) => {
                let mut state = self.inner.lock().await;
                state.connections.send_to_conn(
                    conn_id,
                    ServerMessage::error(ErrorCode::ParseError, "malformed frame"),
                );
                return;
            }
            Err(DecodeError::UnknownMessage) => {
                let mut state = self.inner.lock().await;
                state.connections.send_to_conn(
                    conn_id,
                    ServerMessage::error(ErrorCode::UnknownMessage, "unknown message type"),
                );
                return;
            }
        };

        let mut delayed = Vec::new();
        {
            let mut state = self.inner.lock().await;
            match msg {
                ClientMessage::JoinTournament {
                    game_id,
                    player_name,
                    class_id,
                    player_id,
                } => state.join(conn_id, &game_id, &player_name, class_id, player_id),
                ClientMessage::ReadyForMatch { match_id } => {
                    state.ready_for_match(conn_id, &match_id, &mut delayed)
                }
                ClientMessage::SubmitMove {
                    match_id,
                    game_number,
                    mv,
                } => state.submit_move(conn_id, &match_id, game_number, mv, &mut delayed),
                ClientMessage::LeaveTournament => state.leave(conn_id),
            }
        }
        self.spawn_delayed(delayed);
    }

    // ------------------------------------------------------------------
    // Admin surface (used by the REST routes and by tests)
    // ------------------------------------------------------------------

    pub async fn list_tournaments(&self) -> Vec<Value> {
        let state = self.inner.lock().await;
        state
            .manager
            .list()
            .into_iter()
            .map(|t| {
                json!({
                    "id": t.id,
                    "gameId": t.game_id,
                    "label": t.label,
                    "phase": t.phase,
                    "playerCount": t.players.len(),
                    "championId": t.champion_id,
                })
            })
            .collect()
    }

    pub async fn create_tournament(
        &self,
        game_id: &str,
        label: Option<String>,
        bot_count: usize,
    ) -> Result<Value, AdminError> {
        let game: GameId = game_id.parse().map_err(|_| AdminError::UnknownGame)?;
        let mut state = self.inner.lock().await;
        let tid = state.manager.create(game, label)?.id.clone();
        if bot_count > 0 {
            state.manager.add_bots(&tid, bot_count)?;
        }
        Ok(state.manager.snapshot(&tid)?)
    }

    pub async fn add_bots(&self, tournament_id: &str, count: usize) -> Result<Value, AdminError> {
        let mut state = self.inner.lock().await;
        state.manager.add_bots(tournament_id, count)?;
        Ok(state.manager.snapshot(tournament_id)?)
    }

    pub async fn start_tournament(self: &Arc<Self>, tournament_id: &str) -> Result<(), AdminError> {
        let mut delayed = Vec::new();
        {
            let mut guard = self.inner.lock().await;
            let state = &mut *guard;
            state.manager.start(tournament_id, &mut state.rng)?;
            state.broadcast_tournament_state(tournament_id);
            state.assignment_sweep(tournament_id, &mut delayed);
        }
        self.spawn_delayed(delayed);
        Ok(())
    }

    pub async fn finish_tournament(&self, tournament_id: &str) -> Result<(), AdminError> {
        let mut state = self.inner.lock().await;
        state.manager.finish(tournament_id)?;
        state.broadcast_tournament_state(tournament_id);
        Ok(())
    }

    pub async fn snapshot(&self, tournament_id: &str) -> Result<Value, AdminError> {
        let state = self.inner.lock().await;
        Ok(state.manager.snapshot(tournament_id)?)
    }

    pub async fn restore(&self, value: Value) -> Result<String, AdminError> {
        let mut state = self.inner.lock().await;
        Ok(state.manager.restore(value)?)
    }

    // ------------------------------------------------------------------
    // Delayed work
    // ------------------------------------------------------------------

    fn spawn_delayed(self: &Arc<Self>, delayed: Vec<Delayed>) {
        for task in delayed {
            let this = Arc::clone(self);
            tokio::spawn(async move { this.run_delayed(task).await });
        }
    }

    async fn run_delayed(self: Arc<Self>, task: Delayed) {
        let wait = match &task {
            Delayed::BotMove { .. } => self.config.bot_delay_ms,
            Delayed::NextGame { .. } => self.config.inter_game_pause_ms,
        };
        tokio::time::sleep(Duration::from_millis(wait)).await;

        let mut delayed = Vec::new();
        {
            let mut state = self.inner.lock().await;
            match task {
                Delayed::BotMove {
                    tournament_id,
                    match_id,
                } => state.bot_step(
                    &tournament_id,
                    &match_id,
                    self.config.bot_level,
                    &mut delayed,
                ),
                Delayed::NextGame {
                    tournament_id,
                    match_id,
                    game_number,
                    starting_role,
                } => state.begin_next_game(
                    &tournament_id,
                    &match_id,
                    game_number,
                    starting_role,
                    &mut delayed,
                ),
            }
        }
        self.spawn_delayed(delayed);
    }
}

impl CoordinatorState {
    fn error_to(&mut self, conn_id: &str, code: ErrorCode, message: impl Into<String>) {
        self.connections
            .send_to_conn(conn_id, ServerMessage::error(code, message));
    }

    /// Resolve a connection to (player, tournament), or tell it off
    fn identify(&mut self, conn_id: &str) -> Option<(String, String)> {
        let player = self.connections.player_of(conn_id).map(str::to_string);
        let found = player.as_ref().and_then(|p| {
            self.player_tournament
                .get(p)
                .cloned()
                .map(|t| (p.clone(), t))
        });
        if found.is_none() {
            self.error_to(conn_id, ErrorCode::NotInTournament, "join a tournament first");
        }
        found
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    fn join(
        &mut self,
        conn_id: &str,
        game_id: &str,
        player_name: &str,
        class_id: Option<String>,
        existing_id: Option<String>,
    ) {
        let Ok(game) = game_id.parse::<GameId>() else {
            self.error_to(conn_id, ErrorCode::JoinFailed, "unknown game id");
            return;
        };
        let tid = self.manager.join_for_game(game);
        let player = match self
            .manager
            .add_player(&tid, player_name, class_id, existing_id.as_deref())
        {
            Ok(p) => p,
            Err(e) => {
                self.error_to(conn_id, ErrorCode::JoinFailed, e.to_string());
                return;
            }
        };
        self.connections.bind_player(conn_id, &player.id);
        self.player_tournament.insert(player.id.clone(), tid.clone());
        self.connections.send_to_conn(
            conn_id,
            ServerMessage::Welcome {
                player_id: player.id.clone(),
                player_name: player.name.clone(),
                tournament_id: tid.clone(),
                game_id: game,
            },
        );
        self.broadcast_tournament_state(&tid);

        // A rejoining player in a live match gets the board replayed
        let replay = self.manager.get(&tid).and_then(|t| {
            let m = t.match_for_player(&player.id)?;
            let role = m.role_of(&player.id)?;
            let session = self.sessions.get(&m.id)?;
            Some(ServerMessage::GameStateUpdate {
                match_id: m.id.clone(),
                game_number: session.game_number,
                state: session.state_json(),
                your_turn: !session.is_finished() && session.turn() == role,
                last_move: None,
                last_move_by: None,
            })
        });
        if let Some(frame) = replay {
            self.connections.send_to_conn(conn_id, frame);
        }
    }

    fn leave(&mut self, conn_id: &str) {
        let Some((player, tid)) = self.identify(conn_id) else {
            return;
        };
        let _ = self.manager.set_online(&tid, &player, false);
        self.connections.unbind_player(&player);
        self.broadcast_tournament_state(&tid);
        info!(player = %player, "player left");
    }

    fn ready_for_match(&mut self, conn_id: &str, match_id: &str, delayed: &mut Vec<Delayed>) {
        let Some((player, tid)) = self.identify(conn_id) else {
            return;
        };
        let phase = match self.manager.get(&tid).and_then(|t| t.match_by_id(match_id)) {
            None => {
                self.error_to(conn_id, ErrorCode::MatchNotFound, "no such match");
                return;
            }
            Some(m) if !m.has_player(&player) => {
                self.error_to(conn_id, ErrorCode::NotInMatch, "you are not in this match");
                return;
            }
            Some(m) => m.phase,
        };
        if phase != MatchPhase::Waiting {
            self.connections
                .send_to_conn(conn_id, ServerMessage::info("match already underway"));
            return;
        }
        self.ready
            .entry(match_id.to_string())
            .or_default()
            .insert(player);
        self.try_start_match(&tid, match_id, delayed);
    }

    fn submit_move(
        &mut self,
        conn_id: &str,
        match_id: &str,
        game_number: u8,
        payload: Value,
        delayed: &mut Vec<Delayed>,
    ) {
        let Some((player, tid)) = self.identify(conn_id) else {
            return;
        };
        let (role, game) = match self.manager.get(&tid) {
            None => {
                self.error_to(conn_id, ErrorCode::NotInTournament, "tournament is gone");
                return;
            }
            Some(t) if t.phase == TournamentPhase::Finished => {
                self.error_to(conn_id, ErrorCode::NotInTournament, "tournament is over");
                return;
            }
            Some(t) => match t.match_by_id(match_id) {
                None => {
                    self.error_to(conn_id, ErrorCode::MatchNotFound, "no such match");
                    return;
                }
                Some(m) => match m.role_of(&player) {
                    None => {
                        self.error_to(conn_id, ErrorCode::NotInMatch, "you are not in this match");
                        return;
                    }
                    Some(role) => (role, t.game_id),
                },
            },
        };
        match self.sessions.get(match_id) {
            Some(s) if s.game_number == game_number && !s.is_finished() => {}
            _ => {
                self.error_to(conn_id, ErrorCode::NoActiveGame, "no active game");
                return;
            }
        }
        let Ok(mv) = GameMove::from_value(game, &payload) else {
            self.error_to(conn_id, ErrorCode::InvalidMove, "malformed move payload");
            return;
        };
        self.apply_move(&tid, match_id, &player, role, &mv, Some(payload), delayed);
    }

    // ------------------------------------------------------------------
    // Match lifecycle
    // ------------------------------------------------------------------

    /// Start the match once both seats are ready (bots count as ready)
    fn try_start_match(&mut self, tid: &str, match_id: &str, delayed: &mut Vec<Delayed>) {
        let ready_set = self.ready.get(match_id);
        let startable = self.manager.get(tid).and_then(|t| {
            if t.phase != TournamentPhase::Running {
                return None;
            }
            let m = t.match_by_id(match_id)?;
            if !m.is_ready() {
                return None;
            }
            let seated = [m.p1.as_deref()?, m.p2.as_deref()?];
            let all_ready = seated.iter().all(|pid| {
                let is_bot = t.players.get(*pid).map(|p| p.is_bot).unwrap_or(false);
                is_bot || ready_set.is_some_and(|r| r.contains(*pid))
            });
            all_ready.then(|| t.game_id)
        });
        let Some(game) = startable else { return };

        if self.manager.start_match(tid, match_id).is_err() {
            return;
        }
        self.sessions
            .create_session(tid, match_id, 1, game, Role::P1);
        info!(game_match = %match_id, "match started");
        self.emit_game_start(tid, match_id);
        delayed.push(Delayed::BotMove {
            tournament_id: tid.to_string(),
            match_id: match_id.to_string(),
        });
    }

    fn emit_game_start(&mut self, tid: &str, match_id: &str) {
        let Some(session) = self.sessions.get(match_id) else {
            return;
        };
        let pairing = self
            .manager
            .get(tid)
            .and_then(|t| t.match_by_id(match_id))
            .map(|m| [(Role::P1, m.p1.clone()), (Role::P2, m.p2.clone())]);
        let Some(pairing) = pairing else { return };
        let (game_number, session_id, state_json, turn) = (
            session.game_number,
            session.id.clone(),
            session.state_json(),
            session.turn(),
        );
        for (role, pid) in pairing {
            if let Some(pid) = pid {
                self.connections.send_to_player(
                    &pid,
                    ServerMessage::GameStart {
                        match_id: match_id.to_string(),
                        game_number,
                        session_id: session_id.clone(),
                        state: state_json.clone(),
                        your_role: role,
                        your_turn: turn == role,
                    },
                );
            }
        }
    }

    /// The one move path shared by humans and bots
    fn apply_move(
        &mut self,
        tid: &str,
        match_id: &str,
        player_id: &str,
        role: Role,
        mv: &GameMove,
        raw_payload: Option<Value>,
        delayed: &mut Vec<Delayed>,
    ) {
        let outcome = {
            let Some(session) = self.sessions.get_mut(match_id) else {
                self.send_move_error(player_id, MoveError::GameFinished);
                return;
            };
            match session.submit_move(player_id, role, mv) {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.send_move_error(player_id, e);
                    return;
                }
            }
        };

        let (game_number, state_json, turn, game_over) = {
            // The session survives the move; reborrow for the snapshot
            let Some(session) = self.sessions.get(match_id) else {
                return;
            };
            (
                session.game_number,
                session.state_json(),
                session.turn(),
                outcome.game_over,
            )
        };
        let last_move = raw_payload.or_else(|| serde_json::to_value(mv).ok());
        let pairing = self
            .manager
            .get(tid)
            .and_then(|t| t.match_by_id(match_id))
            .map(|m| [(Role::P1, m.p1.clone()), (Role::P2, m.p2.clone())]);
        if let Some(pairing) = pairing {
            for (r, pid) in pairing {
                if let Some(pid) = pid {
                    self.connections.send_to_player(
                        &pid,
                        ServerMessage::GameStateUpdate {
                            match_id: match_id.to_string(),
                            game_number,
                            state: state_json.clone(),
                            your_turn: !game_over && turn == r,
                            last_move: last_move.clone(),
                            last_move_by: Some(player_id.to_string()),
                        },
                    );
                }
            }
        }

        if game_over {
            self.finish_game(tid, match_id, outcome, delayed);
        } else {
            delayed.push(Delayed::BotMove {
                tournament_id: tid.to_string(),
                match_id: match_id.to_string(),
            });
        }
    }

    fn send_move_error(&mut self, player_id: &str, err: MoveError) {
        let code = match err {
            MoveError::GameFinished => ErrorCode::NoActiveGame,
            MoveError::NotYourTurn | MoveError::InvalidMove => ErrorCode::InvalidMove,
        };
        self.connections
            .send_to_player(player_id, ServerMessage::error(code, err.to_string()));
    }

    /// A game ended: score it, then either schedule the next game or run
    /// the match-finish pipeline
    fn finish_game(
        &mut self,
        tid: &str,
        match_id: &str,
        outcome: MoveOutcome,
        delayed: &mut Vec<Delayed>,
    ) {
        let (final_state, game_number) = match self.sessions.get(match_id) {
            Some(s) => (s.state_json(), s.game_number),
            None => return,
        };

        let result = {
            let Some(t) = self.manager.get_mut(tid) else {
                return;
            };
            let Some(m) = t.match_by_id_mut(match_id) else {
                return;
            };
            let winner_id = outcome
                .winner_role
                .and_then(|r| m.player(r))
                .map(str::to_string);
            let progress = m.record_game_result(winner_id.as_deref());
            (
                winner_id,
                progress,
                m.score,
                [(Role::P1, m.p1.clone()), (Role::P2, m.p2.clone())],
            )
        };
        let (winner_id, progress, score, pairing) = result;

        for (_, pid) in &pairing {
            if let Some(pid) = pid {
                self.connections.send_to_player(
                    pid,
                    ServerMessage::GameEnd {
                        match_id: match_id.to_string(),
                        game_number,
                        winner_id: winner_id.clone(),
                        winner_role: outcome.winner_role,
                        is_draw: outcome.draw,
                        final_state: final_state.clone(),
                        match_score: score,
                    },
                );
            }
        }

        match progress {
            MatchProgress::NextGame {
                game_number,
                starting_role,
            } => {
                debug!(game_match = %match_id, game_number, "scheduling next game");
                delayed.push(Delayed::NextGame {
                    tournament_id: tid.to_string(),
                    match_id: match_id.to_string(),
                    game_number,
                    starting_role,
                });
            }
            MatchProgress::Finished { winner, .. } => {
                self.finish_match(tid, match_id, &winner, score, delayed);
            }
        }
    }

    fn finish_match(
        &mut self,
        tid: &str,
        match_id: &str,
        winner: &str,
        score: ludarena_tournament::Score,
        delayed: &mut Vec<Delayed>,
    ) {
        info!(game_match = %match_id, winner = %winner, "match finished");
        let report = match self.manager.resolve(tid) {
            Ok(r) => r,
            Err(_) => return,
        };

        // Per-recipient epilogue: did I win, am I out, where do I go next
        let notices = {
            let Some(t) = self.manager.get(tid) else {
                return;
            };
            let winner_name = t
                .players
                .get(winner)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            let pairing = t
                .match_by_id(match_id)
                .map(|m| [m.p1.clone(), m.p2.clone()])
                .unwrap_or_default();
            pairing
                .into_iter()
                .flatten()
                .map(|pid| {
                    let frame = ServerMessage::MatchEnd {
                        match_id: match_id.to_string(),
                        winner_id: winner.to_string(),
                        winner_name: winner_name.clone(),
                        final_score: score,
                        you_won: pid == winner,
                        eliminated_from_tournament: report.eliminated.contains(&pid),
                        next_match_id: t.match_for_player(&pid).map(|m| m.id.clone()),
                    };
                    (pid, frame)
                })
                .collect::<Vec<_>>()
        };
        for (pid, frame) in notices {
            self.connections.send_to_player(&pid, frame);
        }

        if let Some(champion) = &report.champion {
            let broadcast = self.manager.get(tid).map(|t| {
                let name = t
                    .players
                    .get(champion)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                (
                    t.players.keys().cloned().collect::<Vec<_>>(),
                    ServerMessage::TournamentEnd {
                        champion_id: champion.clone(),
                        champion_name: name,
                        final_standings: t.standings(),
                    },
                )
            });
            if let Some((player_ids, frame)) = broadcast {
                for pid in player_ids {
                    self.connections.send_to_player(&pid, frame.clone());
                }
            }
        } else {
            self.assignment_sweep(tid, delayed);
        }
        self.broadcast_tournament_state(tid);
    }

    /// Announce fresh pairings and auto-ready any bots in them
    fn assignment_sweep(&mut self, tid: &str, delayed: &mut Vec<Delayed>) {
        let fresh: Vec<(String, Option<String>, Option<String>)> = match self.manager.get(tid) {
            Some(t) => t
                .matches_ready()
                .into_iter()
                .filter(|m| !self.assigned_notified.contains(&m.id))
                .map(|m| (m.id.clone(), m.p1.clone(), m.p2.clone()))
                .collect(),
            None => return,
        };

        for (mid, p1, p2) in &fresh {
            self.assigned_notified.insert(mid.clone());
            let seats = [(Role::P1, p1, p2), (Role::P2, p2, p1)];
            for (role, me, opp) in seats {
                let Some(me) = me else { continue };
                let opponent_name = opp.as_ref().and_then(|o| {
                    self.manager
                        .get(tid)
                        .and_then(|t| t.players.get(o))
                        .map(|p| p.name.clone())
                });
                self.connections.send_to_player(
                    me,
                    ServerMessage::MatchAssigned {
                        match_id: mid.clone(),
                        your_role: role,
                        opponent_id: opp.clone(),
                        opponent_name,
                    },
                );
                let is_bot = self
                    .manager
                    .get(tid)
                    .and_then(|t| t.players.get(me))
                    .map(|p| p.is_bot)
                    .unwrap_or(false);
                if is_bot {
                    self.ready.entry(mid.clone()).or_default().insert(me.clone());
                }
            }
        }
        for (mid, _, _) in fresh {
            self.try_start_match(tid, &mid, delayed);
        }
    }

    // ------------------------------------------------------------------
    // Timed continuations
    // ------------------------------------------------------------------

    /// If it is a bot's turn in this match, have it move
    fn bot_step(
        &mut self,
        tid: &str,
        match_id: &str,
        level: BotLevel,
        delayed: &mut Vec<Delayed>,
    ) {
        let probe = {
            let Some(session) = self.sessions.get(match_id) else {
                return;
            };
            if session.is_finished() {
                return;
            }
            if session.moves().len() >= MAX_SESSION_MOVES {
                warn!(game_match = %match_id, "session move cap reached, bot stops");
                return;
            }
            let role = session.turn();
            let Some(t) = self.manager.get(tid) else {
                return;
            };
            if t.phase == TournamentPhase::Finished {
                return;
            }
            let Some(pid) = t
                .match_by_id(match_id)
                .and_then(|m| m.player(role))
                .map(str::to_string)
            else {
                return;
            };
            let is_bot = t.players.get(&pid).map(|p| p.is_bot).unwrap_or(false);
            if !is_bot {
                return;
            }
            let mv = self.bots.choose_move(session.state(), role, level);
            (pid, role, mv)
        };
        let (pid, role, Some(mv)) = probe else { return };
        self.apply_move(tid, match_id, &pid, role, &mv, None, delayed);
    }

    /// Inter-game pause elapsed: open the next game of the match
    fn begin_next_game(
        &mut self,
        tid: &str,
        match_id: &str,
        game_number: u8,
        starting_role: Role,
        delayed: &mut Vec<Delayed>,
    ) {
        let game = match self.manager.get(tid).and_then(|t| {
            let m = t.match_by_id(match_id)?;
            (m.phase == MatchPhase::Playing && m.current_game == game_number)
                .then_some(t.game_id)
        }) {
            Some(g) => g,
            None => return,
        };
        if self
            .sessions
            .create_session(tid, match_id, game_number, game, starting_role)
            .is_none()
        {
            warn!(game_match = %match_id, "previous session still active, not advancing");
            return;
        }
        self.emit_game_start(tid, match_id);
        delayed.push(Delayed::BotMove {
            tournament_id: tid.to_string(),
            match_id: match_id.to_string(),
        });
    }

    fn broadcast_tournament_state(&mut self, tid: &str) {
        let payload = self.manager.get(tid).map(|t| {
            (
                t.players.keys().cloned().collect::<Vec<_>>(),
                serde_json::to_value(t).unwrap_or(Value::Null),
            )
        });
        if let Some((player_ids, snap)) = payload {
            for pid in player_ids {
                self.connections.send_to_player(
                    &pid,
                    ServerMessage::TournamentStateUpdate {
                        tournament: snap.clone(),
                    },
                );
            }
        }
    }
}
