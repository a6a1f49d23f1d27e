//! LUDARENA Bot - move selection for computer players
//!
//! `Basic` picks uniformly among legal moves; `Advanced` layers a per-game
//! heuristic on top of the core enumerators. The policy never mutates the
//! state it is given.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use ludarena_core::games::produto::role_color;
use ludarena_core::{BoardState, GameMove, Role};

/// How many candidate moves the Produto heuristic scores at most
const PRODUTO_SAMPLE: usize = 100;

/// Playing strength
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotLevel {
    /// Uniform random over legal moves
    Basic,
    /// Per-game heuristic
    Advanced,
}

/// A seeded move chooser (one per coordinator is enough; the RNG is the
/// only state)
pub struct BotPolicy {
    rng: ChaCha8Rng,
}

impl Default for BotPolicy {
    fn default() -> Self {
        Self::with_seed(42)
    }
}

impl BotPolicy {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Pick a move for `role`, or None when no move exists
    pub fn choose_move(
        &mut self,
        state: &BoardState,
        role: Role,
        level: BotLevel,
    ) -> Option<GameMove> {
        let moves = state.legal_moves(role);
        if moves.is_empty() {
            return None;
        }
        match level {
            BotLevel::Basic => moves.choose(&mut self.rng).cloned(),
            BotLevel::Advanced => Some(match state {
                BoardState::CatsDogs(_) => mobility_pick(state, role, &moves, 10.0, 8.0),
                BoardState::Dominorio(_) => dominorio_pick(state, role, &moves),
                BoardState::Quelhas(_) => mobility_pick(state, role, &moves, 1.0, 3.0),
                BoardState::Produto(_) => self.produto_pick(state, role, &moves),
                BoardState::AtariGo(_) => atari_go_pick(state, role, &moves),
                BoardState::Nex(_) => nex_pick(state, role, &moves),
            }),
        }
    }

    /// Score up to [`PRODUTO_SAMPLE`] sampled moves by the current product
    /// scoring: my score minus 0.9 of the opponent's
    fn produto_pick(&mut self, state: &BoardState, role: Role, moves: &[GameMove]) -> GameMove {
        let sample: Vec<&GameMove> = moves
            .choose_multiple(&mut self.rng, PRODUTO_SAMPLE.min(moves.len()))
            .collect();
        let mut best = sample[0].clone();
        let mut best_score = f64::NEG_INFINITY;
        for mv in sample {
            let Ok(next) = state.apply(mv, role) else {
                continue;
            };
            let BoardState::Produto(p) = &next else {
                continue;
            };
            let mine = p.score(role_color(role)) as f64;
            let theirs = p.score(role_color(role.opponent())) as f64;
            let score = mine - 0.9 * theirs;
            if score > best_score {
                best_score = score;
                best = mv.clone();
            }
        }
        best
    }
}

/// Mobility count for `role` after this position
fn mobility(state: &BoardState, role: Role) -> f64 {
    state.legal_moves(role).len() as f64
}

/// Greedy one-ply lookahead: maximize own mobility weighted against the
/// opponent's. Covers both the Gatos & Cães weights (10/8) and the Quelhas
/// starve-the-opponent weights (1/3).
fn mobility_pick(
    state: &BoardState,
    role: Role,
    moves: &[GameMove],
    own_weight: f64,
    opp_weight: f64,
) -> GameMove {
    let mut best = moves[0].clone();
    let mut best_score = f64::NEG_INFINITY;
    for mv in moves {
        let Ok(next) = state.apply(mv, role) else {
            continue;
        };
        let score =
            mobility(&next, role) * own_weight - mobility(&next, role.opponent()) * opp_weight;
        if score > best_score {
            best_score = score;
            best = mv.clone();
        }
    }
    best
}

const WIN_SCORE: f64 = 100_000.0;

/// Leaf evaluation for the Dominório search
fn dominorio_leaf(state: &BoardState, role: Role) -> f64 {
    mobility(state, role) * 5.0 - mobility(state, role.opponent()) * 4.0
}

/// Two-ply minimax with alpha-beta: my move, the opponent's best reply,
/// leaf mobility evaluation
fn dominorio_pick(state: &BoardState, role: Role, moves: &[GameMove]) -> GameMove {
    let opp = role.opponent();
    let mut best = moves[0].clone();
    let mut alpha = f64::NEG_INFINITY;
    for mv in moves {
        let Ok(after_mine) = state.apply(mv, role) else {
            continue;
        };
        let score = if after_mine.is_terminal() {
            if after_mine.verdict().winner() == Some(role) {
                WIN_SCORE
            } else {
                -WIN_SCORE
            }
        } else {
            let mut worst = f64::INFINITY;
            for reply in after_mine.legal_moves(opp) {
                let Ok(after_theirs) = after_mine.apply(&reply, opp) else {
                    continue;
                };
                let leaf = if after_theirs.is_terminal() {
                    if after_theirs.verdict().winner() == Some(opp) {
                        -WIN_SCORE
                    } else {
                        WIN_SCORE
                    }
                } else {
                    dominorio_leaf(&after_theirs, role)
                };
                worst = worst.min(leaf);
                if worst <= alpha {
                    break; // this branch cannot beat the current best
                }
            }
            worst
        };
        if score > alpha {
            alpha = score;
            best = mv.clone();
        }
    }
    best
}

/// Immediate captures first; otherwise pressure opposing groups toward
/// atari while staying near the center
fn atari_go_pick(state: &BoardState, role: Role, moves: &[GameMove]) -> GameMove {
    let opp = role.opponent();
    let mut best = moves[0].clone();
    let mut best_score = f64::NEG_INFINITY;
    for mv in moves {
        let GameMove::AtariGo(stone) = mv else {
            continue;
        };
        let Ok(next) = state.apply(mv, role) else {
            continue;
        };
        if next.verdict().winner() == Some(role) {
            return mv.clone(); // a capture ends the game
        }
        let (Some(row), Some(col)) = (stone.row, stone.col) else {
            continue; // a pass earns no score
        };
        let BoardState::AtariGo(after) = &next else {
            continue;
        };
        let center_dist = row.abs_diff(4) + col.abs_diff(4);
        let score = 100.0 * after.atari_groups(opp) as f64
            - 80.0 * after.atari_groups(role) as f64
            - 2.0 * center_dist as f64;
        if score > best_score {
            best_score = score;
            best = mv.clone();
        }
    }
    best
}

/// Prefer placements near the center file/rank that crosses the own goal
/// edges: black wants central columns, white central rows
fn nex_pick(state: &BoardState, role: Role, moves: &[GameMove]) -> GameMove {
    use ludarena_core::games::nex::NexColor;

    let BoardState::Nex(nex) = state else {
        return moves[0].clone();
    };
    let color = nex.role_color(role);
    let mut best = moves[0].clone();
    let mut best_bias = usize::MAX;
    for mv in moves {
        let GameMove::Nex(ludarena_core::games::nex::NexMove::Place { own_piece, .. }) = mv
        else {
            continue;
        };
        let bias = match color {
            NexColor::Black => own_piece.col.abs_diff(5),
            NexColor::White => own_piece.row.abs_diff(5),
        };
        if bias < best_bias {
            best_bias = bias;
            best = mv.clone();
        }
    }
    best
}
