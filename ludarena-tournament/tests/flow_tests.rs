//! Cross-layer tests: engines driven through sessions, matches and the
//! tournament manager

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use ludarena_bot::{BotLevel, BotPolicy};
use ludarena_core::{GameId, Role, Verdict};
use ludarena_tournament::{
    GameSession, MatchProgress, SessionManager, TournamentManager, TournamentPhase,
};

/// Both seats always play the first enumerated move until the game ends
fn play_first_move_game(session: &mut GameSession, p1: &str, p2: &str) -> Option<Role> {
    for _ in 0..1000 {
        if session.is_finished() {
            break;
        }
        let role = session.turn();
        let player = match role {
            Role::P1 => p1,
            Role::P2 => p2,
        };
        let mv = session.state().legal_moves(role).into_iter().next();
        let mv = mv.expect("live game must offer a move");
        session.submit_move(player, role, &mv).expect("legal move");
    }
    assert!(session.is_finished(), "game did not terminate");
    session.outcome().winner()
}

#[test]
fn test_dominorio_two_player_game_ends_with_blocked_loser() {
    let mut session = GameSession::new("t", "m", 1, GameId::Dominorio, Role::P1);
    let winner = play_first_move_game(&mut session, "ana", "bruno");
    // Dominório has no draws: somebody ran out of placements and the
    // other player won
    let winner = winner.expect("dominorio cannot draw");
    let loser = winner.opponent();
    // The loser is exactly the side whose enumeration is empty
    assert!(session.state().legal_moves(loser).is_empty());
    assert_eq!(session.outcome(), Verdict::win_for(winner));
}

#[test]
fn test_quelhas_misere_winner_is_the_blocked_player() {
    let mut session = GameSession::new("t", "m", 1, GameId::Quelhas, Role::P1);
    let winner = play_first_move_game(&mut session, "ana", "bruno").expect("quelhas cannot draw");
    // Misère: the winner is the one with no move left
    assert!(session.state().legal_moves(winner).is_empty());
}

#[test]
fn test_best_of_three_with_real_sessions() {
    let mut mgr = TournamentManager::new();
    let mut sessions = SessionManager::new();
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let tid = mgr.join_for_game(GameId::CatsDogs);
    let ana = mgr.add_player(&tid, "ana", None, None).unwrap().id;
    let bruno = mgr.add_player(&tid, "bruno", None, None).unwrap().id;
    mgr.start(&tid, &mut rng).unwrap();

    let mid = mgr.get(&tid).unwrap().matches_ready()[0].id.clone();
    mgr.start_match(&tid, &mid).unwrap();

    let mut games_played = 0;
    loop {
        games_played += 1;
        let (game_number, starting_role) = {
            let m = mgr.get(&tid).unwrap().match_by_id(&mid).unwrap();
            (m.current_game, m.starting_role.unwrap())
        };
        // Property: game g opens with P1 when g is odd
        let expected = if game_number % 2 == 1 { Role::P1 } else { Role::P2 };
        assert_eq!(starting_role, expected);

        sessions
            .create_session(&tid, &mid, game_number, GameId::CatsDogs, starting_role)
            .unwrap();
        let session = sessions.get_mut(&mid).unwrap();
        let winner_role = play_first_move_game(session, &ana, &bruno);
        let winner_id = {
            let m = mgr.get(&tid).unwrap().match_by_id(&mid).unwrap();
            winner_role.and_then(|r| m.player(r)).map(str::to_string)
        };
        let progress = mgr
            .get_mut(&tid)
            .unwrap()
            .match_by_id_mut(&mid)
            .unwrap()
            .record_game_result(winner_id.as_deref());
        if let MatchProgress::Finished { winner, loser } = progress {
            assert_ne!(winner, loser);
            break;
        }
        assert!(games_played < 5, "best-of-three ran away");
    }

    // Two players: winner and loser meet again in the grand final
    mgr.resolve(&tid).unwrap();
    let t = mgr.get(&tid).unwrap();
    let gf = t.grand_final.as_ref().unwrap();
    assert!(gf.is_ready());
}

#[test]
fn test_bot_driven_tournament_all_games() {
    // Every game engine survives a full bracket of basic bots
    for game in GameId::ALL {
        let mut mgr = TournamentManager::new();
        let mut sessions = SessionManager::new();
        let mut bots = BotPolicy::with_seed(17);
        let mut rng = ChaCha8Rng::seed_from_u64(17);

        let tid = mgr.join_for_game(game);
        mgr.add_bots(&tid, 3).unwrap();
        mgr.start(&tid, &mut rng).unwrap();

        let mut guard = 0;
        while mgr.get(&tid).unwrap().phase == TournamentPhase::Running {
            guard += 1;
            assert!(guard < 64, "{game}: tournament did not converge");
            let ready: Vec<String> = mgr
                .get(&tid)
                .unwrap()
                .matches_ready()
                .iter()
                .map(|m| m.id.clone())
                .collect();
            assert!(!ready.is_empty(), "{game}: nothing ready while running");
            for mid in ready {
                mgr.start_match(&tid, &mid).unwrap();
                let mut games = 0;
                loop {
                    games += 1;
                    assert!(games < 60, "{game}: match ran away");
                    let (game_number, starting_role) = {
                        let m = mgr.get(&tid).unwrap().match_by_id(&mid).unwrap();
                        (m.current_game, m.starting_role.unwrap())
                    };
                    sessions
                        .create_session(&tid, &mid, game_number, game, starting_role)
                        .unwrap();
                    let winner_role = {
                        let session = sessions.get_mut(&mid).unwrap();
                        let mut moves = 0;
                        while !session.is_finished() && moves < 1000 {
                            moves += 1;
                            let role = session.turn();
                            let Some(mv) = bots.choose_move(session.state(), role, BotLevel::Basic)
                            else {
                                break;
                            };
                            session.submit_move("bot", role, &mv).unwrap();
                        }
                        if session.is_finished() {
                            session.outcome().winner()
                        } else {
                            None
                        }
                    };
                    let winner_id = {
                        let m = mgr.get(&tid).unwrap().match_by_id(&mid).unwrap();
                        winner_role.and_then(|r| m.player(r)).map(str::to_string)
                    };
                    let progress = mgr
                        .get_mut(&tid)
                        .unwrap()
                        .match_by_id_mut(&mid)
                        .unwrap()
                        .record_game_result(winner_id.as_deref());
                    if matches!(progress, MatchProgress::Finished { .. }) {
                        break;
                    }
                }
                mgr.resolve(&tid).unwrap();
                if mgr.get(&tid).unwrap().phase != TournamentPhase::Running {
                    break;
                }
            }
        }
        assert!(
            mgr.get(&tid).unwrap().champion_id.is_some(),
            "{game}: no champion"
        );
    }
}
