//! Tournament manager - registration, advancement, champion detection
//!
//! One active tournament per game. Registration collects players (human and
//! bot); `start` shuffles them into a double-elimination bracket; the
//! advancement pass then propagates winners and losers along the bracket's
//! id links, finishing byes as their sources run dry, until the grand final
//! (and possibly its reset) crowns a champion.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ludarena_core::GameId;

use crate::bracket;
use crate::match_play::{Match, MatchPhase};
use crate::new_id;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    pub online: bool,
    pub is_bot: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentPhase {
    Registration,
    Running,
    Finished,
}

/// A final placement for the standings broadcast
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub rank: u32,
    pub player_id: String,
    pub player_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: String,
    pub game_id: GameId,
    pub label: String,
    pub phase: TournamentPhase,
    pub players: BTreeMap<String, Player>,
    pub winners_matches: Vec<Match>,
    pub losers_matches: Vec<Match>,
    pub grand_final: Option<Match>,
    pub grand_final_reset: Option<Match>,
    pub champion_id: Option<String>,
    /// Players in the order they were knocked out
    #[serde(default)]
    pub elimination_order: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Tournament {
    fn new(game_id: GameId, label: String) -> Self {
        Self {
            id: new_id("tournament"),
            game_id,
            label,
            phase: TournamentPhase::Registration,
            players: BTreeMap::new(),
            winners_matches: Vec::new(),
            losers_matches: Vec::new(),
            grand_final: None,
            grand_final_reset: None,
            champion_id: None,
            elimination_order: Vec::new(),
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn all_matches(&self) -> impl Iterator<Item = &Match> {
        self.winners_matches
            .iter()
            .chain(self.losers_matches.iter())
            .chain(self.grand_final.iter())
            .chain(self.grand_final_reset.iter())
    }

    pub fn match_by_id(&self, id: &str) -> Option<&Match> {
        self.all_matches().find(|m| m.id == id)
    }

    pub fn match_by_id_mut(&mut self, id: &str) -> Option<&mut Match> {
        self.winners_matches
            .iter_mut()
            .chain(self.losers_matches.iter_mut())
            .chain(self.grand_final.iter_mut())
            .chain(self.grand_final_reset.iter_mut())
            .find(|m| m.id == id)
    }

    /// Matches with both slots filled that have not started yet
    pub fn matches_ready(&self) -> Vec<&Match> {
        self.all_matches().filter(|m| m.is_ready()).collect()
    }

    /// The unfinished match a player is currently slotted into, if any
    pub fn match_for_player(&self, player_id: &str) -> Option<&Match> {
        self.all_matches()
            .find(|m| m.phase != MatchPhase::Finished && m.has_player(player_id))
    }

    /// Champion first, then reverse elimination order; stragglers of a
    /// force-finished tournament trail in name order
    pub fn standings(&self) -> Vec<Standing> {
        let mut order: Vec<&str> = Vec::new();
        if let Some(champ) = &self.champion_id {
            order.push(champ);
        }
        for id in self.elimination_order.iter().rev() {
            if !order.contains(&id.as_str()) {
                order.push(id);
            }
        }
        let mut rest: Vec<&str> = self
            .players
            .keys()
            .map(String::as_str)
            .filter(|id| !order.contains(id))
            .collect();
        rest.sort_by_key(|id| self.players.get(*id).map(|p| p.name.clone()));
        order.extend(rest);

        order
            .into_iter()
            .enumerate()
            .map(|(i, id)| Standing {
                rank: i as u32 + 1,
                player_id: id.to_string(),
                player_name: self
                    .players
                    .get(id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
            })
            .collect()
    }
}

/// What an advancement pass changed
#[derive(Clone, Debug, Default)]
pub struct AdvancementReport {
    /// Matches that now have both slots filled and can start
    pub newly_ready: Vec<String>,
    /// Players knocked out of the tournament by this pass
    pub eliminated: Vec<String>,
    pub champion: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TournamentError {
    #[error("tournament not found")]
    NotFound,
    #[error("match not found")]
    MatchNotFound,
    #[error("registration is closed")]
    RegistrationClosed,
    #[error("a tournament needs at least two players")]
    NotEnoughPlayers,
    #[error("match is not ready to start")]
    MatchNotReady,
    #[error("tournament has already started")]
    AlreadyStarted,
    #[error("an active tournament for this game already exists")]
    ActiveExists,
}

/// Owns every tournament in the process. All mutation funnels through the
/// coordinator's single writer, so plain maps suffice here.
#[derive(Default)]
pub struct TournamentManager {
    tournaments: HashMap<String, Tournament>,
}

impl TournamentManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Tournament> {
        self.tournaments.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Tournament> {
        self.tournaments.get_mut(id)
    }

    pub fn list(&self) -> Vec<&Tournament> {
        let mut all: Vec<&Tournament> = self.tournaments.values().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        all
    }

    fn active_for_game(&self, game_id: GameId) -> Option<&Tournament> {
        self.tournaments
            .values()
            .find(|t| t.game_id == game_id && t.phase != TournamentPhase::Finished)
    }

    /// Tournament a joiner lands in, auto-created in registration if the
    /// game has no active one
    pub fn join_for_game(&mut self, game_id: GameId) -> String {
        if let Some(t) = self.active_for_game(game_id) {
            return t.id.clone();
        }
        let t = Tournament::new(game_id, format!("{game_id} tournament"));
        info!(tournament = %t.id, game = %game_id, "created tournament");
        let id = t.id.clone();
        self.tournaments.insert(id.clone(), t);
        id
    }

    /// Explicit creation (admin surface); refuses a second active
    /// tournament for the same game
    pub fn create(
        &mut self,
        game_id: GameId,
        label: Option<String>,
    ) -> Result<&Tournament, TournamentError> {
        if self.active_for_game(game_id).is_some() {
            return Err(TournamentError::ActiveExists);
        }
        let t = Tournament::new(
            game_id,
            label.unwrap_or_else(|| format!("{game_id} tournament")),
        );
        let id = t.id.clone();
        self.tournaments.insert(id.clone(), t);
        Ok(&self.tournaments[&id])
    }

    /// Register a player, or re-attach a returning one by id
    pub fn add_player(
        &mut self,
        tournament_id: &str,
        name: &str,
        class_id: Option<String>,
        existing_id: Option<&str>,
    ) -> Result<Player, TournamentError> {
        let t = self
            .tournaments
            .get_mut(tournament_id)
            .ok_or(TournamentError::NotFound)?;
        if let Some(id) = existing_id {
            if let Some(p) = t.players.get_mut(id) {
                p.online = true;
                debug!(tournament = %tournament_id, player = %id, "player reconnected");
                return Ok(p.clone());
            }
        }
        if t.phase != TournamentPhase::Registration {
            return Err(TournamentError::RegistrationClosed);
        }
        let player = Player {
            id: new_id("player"),
            name: name.to_string(),
            class_id,
            online: true,
            is_bot: false,
        };
        t.players.insert(player.id.clone(), player.clone());
        info!(tournament = %tournament_id, player = %player.id, name, "player registered");
        Ok(player)
    }

    /// Insert synthetic players; bots are always online
    pub fn add_bots(
        &mut self,
        tournament_id: &str,
        count: usize,
    ) -> Result<Vec<Player>, TournamentError> {
        let t = self
            .tournaments
            .get_mut(tournament_id)
            .ok_or(TournamentError::NotFound)?;
        if t.phase != TournamentPhase::Registration {
            return Err(TournamentError::RegistrationClosed);
        }
        let existing = t.players.values().filter(|p| p.is_bot).count();
        let mut added = Vec::new();
        for i in 0..count {
            let bot = Player {
                id: new_id("bot"),
                name: format!("Bot {}", existing + i + 1),
                class_id: None,
                online: true,
                is_bot: true,
            };
            t.players.insert(bot.id.clone(), bot.clone());
            added.push(bot);
        }
        info!(tournament = %tournament_id, count, "bots added");
        Ok(added)
    }

    /// Online flag toggle; never forfeits anything
    pub fn set_online(
        &mut self,
        tournament_id: &str,
        player_id: &str,
        online: bool,
    ) -> Result<(), TournamentError> {
        let t = self
            .tournaments
            .get_mut(tournament_id)
            .ok_or(TournamentError::NotFound)?;
        if let Some(p) = t.players.get_mut(player_id) {
            if !p.is_bot {
                p.online = online;
            }
        }
        Ok(())
    }

    /// Close registration, shuffle the field and build the bracket
    pub fn start<R: Rng>(
        &mut self,
        tournament_id: &str,
        rng: &mut R,
    ) -> Result<AdvancementReport, TournamentError> {
        let t = self
            .tournaments
            .get_mut(tournament_id)
            .ok_or(TournamentError::NotFound)?;
        if t.phase != TournamentPhase::Registration {
            return Err(TournamentError::AlreadyStarted);
        }
        if t.players.len() < 2 {
            return Err(TournamentError::NotEnoughPlayers);
        }
        let mut seeds: Vec<String> = t.players.keys().cloned().collect();
        seeds.shuffle(rng);
        let built = bracket::build(&seeds, || new_id("match"));
        t.winners_matches = built.winners;
        t.losers_matches = built.losers;
        t.grand_final = Some(built.grand_final);
        t.grand_final_reset = Some(built.grand_final_reset);
        t.phase = TournamentPhase::Running;
        t.started_at = Some(Utc::now());
        info!(
            tournament = %tournament_id,
            players = t.players.len(),
            matches = t.all_matches().count(),
            "tournament started"
        );
        let mut report = AdvancementReport::default();
        resolve_advancement(t, &mut report);
        Ok(report)
    }

    /// Transition a ready match to playing
    pub fn start_match(
        &mut self,
        tournament_id: &str,
        match_id: &str,
    ) -> Result<&Match, TournamentError> {
        let t = self
            .tournaments
            .get_mut(tournament_id)
            .ok_or(TournamentError::NotFound)?;
        let m = t
            .match_by_id_mut(match_id)
            .ok_or(TournamentError::MatchNotFound)?;
        if !m.start() {
            return Err(TournamentError::MatchNotReady);
        }
        debug!(tournament = %tournament_id, game_match = %match_id, "match started");
        t.match_by_id(match_id).ok_or(TournamentError::MatchNotFound)
    }

    /// Propagate results after a match finished (or any time; the pass is
    /// idempotent once nothing is left to do)
    pub fn resolve(&mut self, tournament_id: &str) -> Result<AdvancementReport, TournamentError> {
        let t = self
            .tournaments
            .get_mut(tournament_id)
            .ok_or(TournamentError::NotFound)?;
        let mut report = AdvancementReport::default();
        resolve_advancement(t, &mut report);
        Ok(report)
    }

    /// Force a tournament over; in-flight matches stay as they are
    pub fn finish(&mut self, tournament_id: &str) -> Result<(), TournamentError> {
        let t = self
            .tournaments
            .get_mut(tournament_id)
            .ok_or(TournamentError::NotFound)?;
        if t.phase != TournamentPhase::Finished {
            t.phase = TournamentPhase::Finished;
            t.finished_at = Some(Utc::now());
            info!(tournament = %tournament_id, "tournament force-finished");
        }
        Ok(())
    }

    pub fn snapshot(&self, tournament_id: &str) -> Result<serde_json::Value, TournamentError> {
        let t = self
            .tournaments
            .get(tournament_id)
            .ok_or(TournamentError::NotFound)?;
        serde_json::to_value(t).map_err(|_| TournamentError::NotFound)
    }

    /// Re-insert a snapshotted tournament (replacing any same-id one)
    pub fn restore(&mut self, value: serde_json::Value) -> Result<String, TournamentError> {
        let t: Tournament = serde_json::from_value(value).map_err(|_| TournamentError::NotFound)?;
        let id = t.id.clone();
        self.tournaments.insert(id.clone(), t);
        Ok(id)
    }
}

/// One pass of the advancement loop: push finished results along their
/// links, then finish any match that can no longer receive a second player.
/// Repeats until a fixpoint.
fn resolve_advancement(t: &mut Tournament, report: &mut AdvancementReport) {
    if t.phase != TournamentPhase::Running {
        return;
    }
    loop {
        let mut progressed = false;

        let finished: Vec<String> = t
            .all_matches()
            .filter(|m| m.phase == MatchPhase::Finished && !m.advanced)
            .map(|m| m.id.clone())
            .collect();
        for mid in finished {
            progressed = true;
            propagate_result(t, &mid, report);
            if t.phase != TournamentPhase::Running {
                return; // champion crowned
            }
        }

        // Bye resolution: a waiting, underfilled match whose sources have
        // all finished will never fill up
        let sources = source_map(t);
        let candidates: Vec<String> = t
            .winners_matches
            .iter()
            .chain(t.losers_matches.iter())
            .filter(|m| m.phase == MatchPhase::Waiting && m.slots_filled() < 2)
            .map(|m| m.id.clone())
            .collect();
        for mid in candidates {
            let exhausted = sources.get(&mid).map_or(true, |srcs| {
                srcs.iter().all(|sid| {
                    t.match_by_id(sid)
                        .map_or(true, |s| s.phase == MatchPhase::Finished)
                })
            });
            if !exhausted {
                continue;
            }
            if let Some(m) = t.match_by_id_mut(&mid) {
                let sole = m.p1.clone().or_else(|| m.p2.clone());
                match sole {
                    Some(p) => {
                        debug!(game_match = %mid, player = %p, "bye");
                        m.finish_as_bye(&p);
                    }
                    None => m.finish_empty(),
                }
                progressed = true;
            }
        }

        if !progressed {
            break;
        }
    }
}

/// target match id → matches feeding it
fn source_map(t: &Tournament) -> HashMap<String, Vec<String>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for m in t.all_matches() {
        for target in [&m.advance_winner_to, &m.advance_loser_to].into_iter().flatten() {
            map.entry(target.clone()).or_default().push(m.id.clone());
        }
    }
    map
}

fn propagate_result(t: &mut Tournament, match_id: &str, report: &mut AdvancementReport) {
    let (winner, loser, adv_w, adv_l) = match t.match_by_id_mut(match_id) {
        Some(m) => {
            m.advanced = true;
            (
                m.winner.clone(),
                m.loser.clone(),
                m.advance_winner_to.clone(),
                m.advance_loser_to.clone(),
            )
        }
        None => return,
    };

    let is_grand_final = t.grand_final.as_ref().is_some_and(|g| g.id == match_id);
    let is_reset = t.grand_final_reset.as_ref().is_some_and(|g| g.id == match_id);

    if is_grand_final {
        finish_grand_final(t, winner, loser, report);
        return;
    }
    if is_reset {
        if let Some(w) = winner {
            crown_champion(t, w, loser, report);
        }
        return;
    }

    if let (Some(w), Some(target)) = (&winner, &adv_w) {
        assign_to(t, target, w, report);
    }
    if let Some(l) = &loser {
        match &adv_l {
            Some(target) => assign_to(t, target, l, report),
            None => eliminate(t, l, report),
        }
    }
}

/// A winners-side grand-final win ends the tournament; a losers-side win
/// forces the reset with the same pairing
fn finish_grand_final(
    t: &mut Tournament,
    winner: Option<String>,
    loser: Option<String>,
    report: &mut AdvancementReport,
) {
    let winners_side = t.grand_final.as_ref().and_then(|g| g.p1.clone());
    let pair = t
        .grand_final
        .as_ref()
        .map(|g| (g.p1.clone(), g.p2.clone()));
    let Some(w) = winner else { return };

    if Some(&w) == winners_side.as_ref() {
        // Discard the reset so it can never be reported as ready
        if let Some(reset) = &mut t.grand_final_reset {
            reset.finish_empty();
            reset.advanced = true;
        }
        crown_champion(t, w, loser, report);
    } else if let Some(reset) = &mut t.grand_final_reset {
        if let Some((p1, p2)) = pair {
            if let Some(p1) = p1 {
                reset.assign(&p1);
            }
            if let Some(p2) = p2 {
                reset.assign(&p2);
            }
            if reset.is_ready() {
                report.newly_ready.push(reset.id.clone());
            }
        }
        info!(tournament = %t.id, "grand final reset forced");
    }
}

fn crown_champion(
    t: &mut Tournament,
    champion: String,
    runner_up: Option<String>,
    report: &mut AdvancementReport,
) {
    if let Some(l) = runner_up {
        eliminate(t, &l, report);
    }
    t.champion_id = Some(champion.clone());
    t.phase = TournamentPhase::Finished;
    t.finished_at = Some(Utc::now());
    report.champion = Some(champion.clone());
    info!(tournament = %t.id, champion = %champion, "champion crowned");
}

fn assign_to(t: &mut Tournament, target_id: &str, player_id: &str, report: &mut AdvancementReport) {
    if let Some(m) = t.match_by_id_mut(target_id) {
        m.assign(player_id);
        debug!(game_match = %target_id, player = %player_id, "advanced");
        if m.is_ready() {
            report.newly_ready.push(m.id.clone());
        }
    }
}

fn eliminate(t: &mut Tournament, player_id: &str, report: &mut AdvancementReport) {
    if !t.elimination_order.iter().any(|p| p == player_id) {
        t.elimination_order.push(player_id.to_string());
        report.eliminated.push(player_id.to_string());
        debug!(tournament = %t.id, player = %player_id, "eliminated");
    }
}
