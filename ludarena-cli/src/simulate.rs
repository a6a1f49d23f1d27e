//! Simulate command - offline bot-vs-bot tournament
//!
//! Exercises the whole stack below the transport: bracket construction,
//! match control, sessions and bot play, synchronously in one process.

use anyhow::{anyhow, bail, Result};
use clap::Args;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use ludarena_bot::{BotLevel, BotPolicy};
use ludarena_core::{GameId, Role};
use ludarena_tournament::{
    MatchProgress, SessionManager, TournamentManager, TournamentPhase,
};

/// Stop conditions for degenerate play
const MAX_MOVES_PER_GAME: usize = 1000;
const MAX_GAMES_PER_MATCH: u8 = 50;

#[derive(Args)]
pub struct SimulateArgs {
    /// Game to play (cats_dogs, dominorio, quelhas, produto, atari_go, nex)
    #[arg(long, default_value = "dominorio")]
    pub game: String,

    /// Number of bots in the field
    #[arg(long, default_value = "4")]
    pub bots: usize,

    /// Bot strength: basic or advanced
    #[arg(long, default_value = "advanced")]
    pub level: String,
}

pub fn run(args: SimulateArgs, seed: Option<u64>) -> Result<()> {
    let game: GameId = args
        .game
        .parse()
        .map_err(|_| anyhow!("unknown game: {}", args.game))?;
    let level = match args.level.as_str() {
        "basic" => BotLevel::Basic,
        "advanced" => BotLevel::Advanced,
        other => bail!("unknown bot level: {other}"),
    };
    let seed = seed.unwrap_or(42);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut bots = BotPolicy::with_seed(seed);
    let mut manager = TournamentManager::new();
    let mut sessions = SessionManager::new();

    let tid = manager.join_for_game(game);
    manager.add_bots(&tid, args.bots)?;
    manager.start(&tid, &mut rng)?;
    tracing::info!(game = %game, bots = args.bots, seed, "simulation started");

    while manager.get(&tid).map(|t| t.phase) == Some(TournamentPhase::Running) {
        let ready: Vec<String> = match manager.get(&tid) {
            Some(t) => t.matches_ready().iter().map(|m| m.id.clone()).collect(),
            None => break,
        };
        if ready.is_empty() {
            bail!("tournament stalled with nothing ready to play");
        }
        for mid in ready {
            play_match(&mut manager, &mut sessions, &mut bots, &tid, &mid, game, level)?;
            manager.resolve(&tid)?;
            if manager.get(&tid).map(|t| t.phase) != Some(TournamentPhase::Running) {
                break;
            }
        }
    }

    let t = manager
        .get(&tid)
        .ok_or_else(|| anyhow!("tournament vanished"))?;
    let champion = t
        .champion_id
        .as_ref()
        .and_then(|id| t.players.get(id))
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "nobody".to_string());
    println!("champion: {champion}");
    println!("final standings:");
    for s in t.standings() {
        println!("  {:>2}. {}", s.rank, s.player_name);
    }
    Ok(())
}

/// Play one match to completion with both seats driven by the bot policy
fn play_match(
    manager: &mut TournamentManager,
    sessions: &mut SessionManager,
    bots: &mut BotPolicy,
    tid: &str,
    mid: &str,
    game: GameId,
    level: BotLevel,
) -> Result<()> {
    manager.start_match(tid, mid)?;

    loop {
        let (game_number, starting_role) = {
            let m = manager
                .get(tid)
                .and_then(|t| t.match_by_id(mid))
                .ok_or_else(|| anyhow!("match vanished mid-play"))?;
            if m.current_game > MAX_GAMES_PER_MATCH {
                bail!("match {mid} refuses to end");
            }
            (m.current_game, m.starting_role.unwrap_or(Role::P1))
        };
        sessions
            .create_session(tid, mid, game_number, game, starting_role)
            .ok_or_else(|| anyhow!("previous session still open for {mid}"))?;

        let winner_role = play_game(manager, sessions, bots, tid, mid, level)?;
        let winner_id = {
            let m = manager
                .get(tid)
                .and_then(|t| t.match_by_id(mid))
                .ok_or_else(|| anyhow!("match vanished mid-play"))?;
            winner_role.and_then(|r| m.player(r)).map(str::to_string)
        };

        let progress = manager
            .get_mut(tid)
            .and_then(|t| t.match_by_id_mut(mid))
            .ok_or_else(|| anyhow!("match vanished mid-play"))?
            .record_game_result(winner_id.as_deref());
        match progress {
            MatchProgress::NextGame { .. } => continue,
            MatchProgress::Finished { winner, .. } => {
                tracing::info!(game_match = %mid, winner = %winner, "match decided");
                return Ok(());
            }
        }
    }
}

/// Drive one session until it finishes; a capped runaway counts as a draw
fn play_game(
    manager: &TournamentManager,
    sessions: &mut SessionManager,
    bots: &mut BotPolicy,
    tid: &str,
    mid: &str,
    level: BotLevel,
) -> Result<Option<Role>> {
    loop {
        let session = sessions
            .get_mut(mid)
            .ok_or_else(|| anyhow!("session vanished mid-game"))?;
        if session.is_finished() {
            return Ok(session.outcome().winner());
        }
        if session.moves().len() >= MAX_MOVES_PER_GAME {
            return Ok(None);
        }
        let role = session.turn();
        let player_id = manager
            .get(tid)
            .and_then(|t| t.match_by_id(mid))
            .and_then(|m| m.player(role))
            .ok_or_else(|| anyhow!("no player seated for {role:?}"))?
            .to_string();
        let mv = bots
            .choose_move(session.state(), role, level)
            .ok_or_else(|| anyhow!("bot found no move in a live game"))?;
        let outcome = session.submit_move(&player_id, role, &mv)?;
        if outcome.game_over {
            return Ok(outcome.winner_role);
        }
    }
}
