//! Double-elimination bracket construction
//!
//! Builds the full match structure for a seeded player list: winners rounds,
//! losers rounds alternating drop-in and elimination, and the grand final
//! with its eagerly constructed reset. Cross-references are match ids; slot
//! filling and bye resolution happen in the tournament manager's
//! advancement pass.

use crate::match_play::{BracketSide, Match};

/// The complete match structure for one tournament
#[derive(Clone, Debug)]
pub struct Bracket {
    pub winners: Vec<Match>,
    pub losers: Vec<Match>,
    pub grand_final: Match,
    pub grand_final_reset: Match,
}

/// Build the bracket for an already-shuffled player list (≥ 2 entries).
/// `next_id` supplies match identifiers so tests can use readable ones.
pub fn build<F>(seeded_players: &[String], mut next_id: F) -> Bracket
where
    F: FnMut() -> String,
{
    let bracket_size = seeded_players.len().next_power_of_two().max(2);
    let rounds = bracket_size.trailing_zeros() as usize;

    // Winners rounds: B/2, B/4, ..., 1 matches
    let mut winners_rounds: Vec<Vec<Match>> = (1..=rounds)
        .map(|k| {
            (0..bracket_size >> k)
                .map(|_| Match::new(next_id(), k as u32, BracketSide::Winners))
                .collect()
        })
        .collect();

    // Seed round 1 left to right; slots beyond the player count stay empty
    for (i, m) in winners_rounds[0].iter_mut().enumerate() {
        if let Some(p) = seeded_players.get(2 * i) {
            m.assign(p);
        }
        if let Some(p) = seeded_players.get(2 * i + 1) {
            m.assign(p);
        }
    }

    // Winner links: round k match i feeds round k+1 match i/2
    for k in 0..rounds.saturating_sub(1) {
        let next_ids: Vec<String> = winners_rounds[k + 1].iter().map(|m| m.id.clone()).collect();
        for (i, m) in winners_rounds[k].iter_mut().enumerate() {
            m.advance_winner_to = Some(next_ids[i / 2].clone());
        }
    }

    // Losers rounds, alternating drop-in and elimination
    let mut losers_rounds: Vec<Vec<Match>> = Vec::new();
    let mut losers_round_no = 0u32;
    if rounds >= 2 {
        // LR1: pairs of winners-round-1 losers
        losers_round_no += 1;
        let lr1: Vec<Match> = (0..bracket_size / 4)
            .map(|_| Match::new(next_id(), losers_round_no, BracketSide::Losers))
            .collect();
        for (i, m) in winners_rounds[0].iter_mut().enumerate() {
            m.advance_loser_to = Some(lr1[i / 2].id.clone());
        }
        losers_rounds.push(lr1);

        // LR2: LR1 winners meet the losers dropping from winners round 2
        losers_round_no += 1;
        let lr2: Vec<Match> = (0..bracket_size / 4)
            .map(|_| Match::new(next_id(), losers_round_no, BracketSide::Losers))
            .collect();
        for (i, m) in losers_rounds[0].iter_mut().enumerate() {
            m.advance_winner_to = Some(lr2[i].id.clone());
        }
        for (i, m) in winners_rounds[1].iter_mut().enumerate() {
            m.advance_loser_to = Some(lr2[i].id.clone());
        }
        losers_rounds.push(lr2);

        // Thereafter: halve survivors, then absorb the next winners round
        for j in 3..=rounds {
            let count = bracket_size >> j;

            losers_round_no += 1;
            let elim: Vec<Match> = (0..count)
                .map(|_| Match::new(next_id(), losers_round_no, BracketSide::Losers))
                .collect();
            if let Some(prev) = losers_rounds.last_mut() {
                for (i, m) in prev.iter_mut().enumerate() {
                    m.advance_winner_to = Some(elim[i / 2].id.clone());
                }
            }
            losers_rounds.push(elim);

            losers_round_no += 1;
            let drop_in: Vec<Match> = (0..count)
                .map(|_| Match::new(next_id(), losers_round_no, BracketSide::Losers))
                .collect();
            if let Some(prev) = losers_rounds.last_mut() {
                for (i, m) in prev.iter_mut().enumerate() {
                    m.advance_winner_to = Some(drop_in[i].id.clone());
                }
            }
            for (i, m) in winners_rounds[j - 1].iter_mut().enumerate() {
                m.advance_loser_to = Some(drop_in[i].id.clone());
            }
            losers_rounds.push(drop_in);
        }
    }

    // Grand final: winners champion vs losers champion; the reset is built
    // eagerly and only populated if the losers side takes the first final
    let grand_final = Match::new(next_id(), rounds as u32 + 1, BracketSide::Winners);
    let grand_final_reset = Match::new(next_id(), rounds as u32 + 2, BracketSide::Winners);

    let gf_id = grand_final.id.clone();
    if let Some(winners_final) = winners_rounds[rounds - 1].first_mut() {
        winners_final.advance_winner_to = Some(gf_id.clone());
    }
    match losers_rounds.last_mut().and_then(|r| r.first_mut()) {
        Some(losers_final) => losers_final.advance_winner_to = Some(gf_id),
        None => {
            // Two players: the sole match's loser gets the rematch directly
            if let Some(winners_final) = winners_rounds[rounds - 1].first_mut() {
                winners_final.advance_loser_to = Some(gf_id);
            }
        }
    }

    Bracket {
        winners: winners_rounds.into_iter().flatten().collect(),
        losers: losers_rounds.into_iter().flatten().collect(),
        grand_final,
        grand_final_reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_play::MatchPhase;

    fn players(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("p{i}")).collect()
    }

    fn sequential_ids() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            format!("m{n}")
        }
    }

    #[test]
    fn test_two_players() {
        let b = build(&players(2), sequential_ids());
        assert_eq!(b.winners.len(), 1);
        assert!(b.losers.is_empty());
        let f = &b.winners[0];
        assert_eq!(f.advance_winner_to.as_deref(), Some(b.grand_final.id.as_str()));
        assert_eq!(f.advance_loser_to.as_deref(), Some(b.grand_final.id.as_str()));
    }

    #[test]
    fn test_four_players_shape() {
        let b = build(&players(4), sequential_ids());
        // Winners: 2 + 1, losers: pair round + losers final
        assert_eq!(b.winners.len(), 3);
        assert_eq!(b.losers.len(), 2);
        // Both round-1 losers land in the same losers match
        let lr1 = &b.losers[0];
        assert_eq!(b.winners[0].advance_loser_to.as_deref(), Some(lr1.id.as_str()));
        assert_eq!(b.winners[1].advance_loser_to.as_deref(), Some(lr1.id.as_str()));
        // The winners final drops its loser into the losers final
        let lr2 = &b.losers[1];
        assert_eq!(b.winners[2].advance_loser_to.as_deref(), Some(lr2.id.as_str()));
        assert_eq!(lr1.advance_winner_to.as_deref(), Some(lr2.id.as_str()));
        // Finals feed the grand final
        assert_eq!(
            b.winners[2].advance_winner_to.as_deref(),
            Some(b.grand_final.id.as_str())
        );
        assert_eq!(
            lr2.advance_winner_to.as_deref(),
            Some(b.grand_final.id.as_str())
        );
    }

    #[test]
    fn test_eight_players_shape() {
        let b = build(&players(8), sequential_ids());
        assert_eq!(b.winners.len(), 4 + 2 + 1);
        // 2 (+2 drop-in) + 1 elimination + 1 drop-in
        assert_eq!(b.losers.len(), 2 + 2 + 1 + 1);
        // Alternation: rounds 1-2 drop in, 3 eliminates, 4 drops in
        let by_round = |r: u32| b.losers.iter().filter(|m| m.round == r).count();
        assert_eq!(by_round(1), 2);
        assert_eq!(by_round(2), 2);
        assert_eq!(by_round(3), 1);
        assert_eq!(by_round(4), 1);
    }

    #[test]
    fn test_winners_match_count_is_b_minus_one() {
        for n in [2usize, 3, 4, 5, 6, 7, 8, 9, 16] {
            let b = build(&players(n), sequential_ids());
            let bracket_size = n.next_power_of_two();
            assert_eq!(b.winners.len(), bracket_size - 1, "n = {n}");
        }
    }

    #[test]
    fn test_round_one_seeding_with_byes() {
        let b = build(&players(5), sequential_ids());
        // Bracket of 8: matches hold players 0-1, 2-3, 4, and nobody
        assert_eq!(b.winners[0].slots_filled(), 2);
        assert_eq!(b.winners[1].slots_filled(), 2);
        assert_eq!(b.winners[2].slots_filled(), 1);
        assert_eq!(b.winners[3].slots_filled(), 0);
        // Construction leaves byes unresolved; the manager's advancement
        // pass finishes them
        assert!(b.winners.iter().all(|m| m.phase == MatchPhase::Waiting));
    }

    #[test]
    fn test_every_non_final_match_advances_its_winner() {
        let b = build(&players(8), sequential_ids());
        for m in b.winners.iter().chain(b.losers.iter()) {
            assert!(m.advance_winner_to.is_some(), "match {}", m.id);
        }
    }
}
