use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::{
    live::TournamentBeatmap,
    sets::{self, DrawPolicy, MapScores, MatchSet},
    turns::{TurnStep, TurnTemplate},
};

/// Mods group of the tiebreaker map, which carries no ordinal in its slot name.
pub const TIEBREAKER_MODS: &str = "TB";

/// Side of the match a choice belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TeamColour {
    Red,
    Blue,
}

/// Action a team applies to a pool beatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceType {
    Ban,
    Pick,
    /// Shields a map from bans; only the protecting team may pick it afterwards.
    Protect,
}

/// One entry of the pick/ban log. Entries are never edited, only appended or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PickBanEntry {
    /// Team that made the choice.
    pub team: TeamColour,
    /// What was done to the beatmap.
    pub kind: ChoiceType,
    /// Online id of the pool beatmap.
    pub beatmap_id: i64,
}

/// Beatmap entry of a round's map pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RoundBeatmap {
    /// Online beatmap id.
    pub id: i64,
    /// Checksum of the beatmap file, used when the map is not submitted online.
    #[serde(default)]
    pub md5: String,
    /// Slot group, e.g. `NM`, `HD` or `TB`.
    pub mods: String,
    /// Derived slot name such as `HD2`; recomputed on every pool change.
    #[serde(default)]
    pub slot_name: String,
    /// Resolved beatmap details, when known.
    #[serde(default)]
    pub beatmap: Option<TournamentBeatmap>,
}

impl RoundBeatmap {
    /// Pool entry without resolved details.
    pub fn new(id: i64, mods: impl Into<String>) -> Self {
        Self {
            id,
            mods: mods.into(),
            ..Self::default()
        }
    }
}

/// A bracket round and its map pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Round {
    /// Display name of the round.
    pub name: String,
    /// Bans placed by each team before picks are applied automatically.
    pub ban_count: usize,
    /// Pool beatmaps, in insertion order.
    pub beatmaps: Vec<RoundBeatmap>,
}

impl Round {
    /// Build a round and derive its slot names.
    pub fn new(name: impl Into<String>, ban_count: usize, beatmaps: Vec<RoundBeatmap>) -> Self {
        let mut round = Self {
            name: name.into(),
            ban_count,
            beatmaps,
        };
        round.recompute_slot_names();
        round
    }

    /// Derive `mods + ordinal` slot names, counting per mods group in pool order.
    ///
    /// The first tiebreaker map is plain `TB`; any further one gets an ordinal so slot
    /// names stay unique.
    pub fn recompute_slot_names(&mut self) {
        let mut counters: HashMap<String, usize> = HashMap::new();

        for beatmap in &mut self.beatmaps {
            let ordinal = counters.entry(beatmap.mods.clone()).or_default();
            *ordinal += 1;

            beatmap.slot_name = if beatmap.mods == TIEBREAKER_MODS && *ordinal == 1 {
                beatmap.mods.clone()
            } else {
                format!("{}{}", beatmap.mods, ordinal)
            };
        }
    }

    /// Whether `beatmap_id` is part of the pool.
    pub fn contains(&self, beatmap_id: i64) -> bool {
        self.find(beatmap_id).is_some()
    }

    /// Pool entry for `beatmap_id`.
    pub fn find(&self, beatmap_id: i64) -> Option<&RoundBeatmap> {
        self.beatmaps.iter().find(|beatmap| beatmap.id == beatmap_id)
    }

    /// Slot name of `beatmap_id`, or `None` for maps no longer in the pool.
    pub fn slot_name_of(&self, beatmap_id: i64) -> Option<&str> {
        self.find(beatmap_id).map(|beatmap| beatmap.slot_name.as_str())
    }

    fn has_slot(&self, slot_name: &str) -> bool {
        self.beatmaps
            .iter()
            .any(|beatmap| beatmap.slot_name == slot_name)
    }
}

/// Rejected mutations of a match. None of them alter the match.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChoiceError {
    #[error("no round is loaded for this match")]
    NoActiveRound,
    #[error("beatmap {0} is not part of the round's pool")]
    NotInPool(i64),
    #[error("beatmap {0} already has a conflicting choice")]
    Duplicate(i64),
    #[error("beatmap {0} was protected by the other team")]
    ProtectedByOther(i64),
    #[error("protected beatmap {0} has already been picked")]
    AlreadyPicked(i64),
    #[error("turn template exhausted after {0} choices")]
    ConfigExhausted(usize),
    #[error("set {0} does not exist")]
    UnknownSet(usize),
    #[error("slot `{0}` is not part of the round's pool")]
    UnknownSlot(String),
}

/// Format-dependent rules a match is played under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchRules {
    /// Required action per pick/ban log length.
    pub template: TurnTemplate,
    /// Index of the set that becomes the tiebreaker and may hold three maps.
    pub tiebreaker_index: usize,
    /// Resolution of sets whose totals are equal.
    pub draw_policy: DrawPolicy,
}

/// The match being played: its pool, pick/ban log and everything derived from it.
///
/// Every mutation bumps [`MatchState::version`] so observers can tell snapshots apart.
#[derive(Debug, Clone)]
pub struct MatchState {
    /// Identifier of the match, fresh for every loaded match.
    pub id: Uuid,
    round: Option<Round>,
    picks_bans: Vec<PickBanEntry>,
    sets: Vec<MatchSet>,
    map_scores: MapScores,
    mode: TurnStep,
    version: u64,
    rules: MatchRules,
}

impl MatchState {
    /// Empty match played under `rules`, optionally on a round.
    pub fn new(round: Option<Round>, rules: MatchRules) -> Self {
        let mode = rules.template.first().unwrap_or_default();
        let round = round.map(|mut round| {
            round.recompute_slot_names();
            round
        });

        Self {
            id: Uuid::new_v4(),
            round,
            picks_bans: Vec::new(),
            sets: Vec::new(),
            map_scores: MapScores::new(),
            mode,
            version: 0,
            rules,
        }
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn picks_bans(&self) -> &[PickBanEntry] {
        &self.picks_bans
    }

    pub fn sets(&self) -> &[MatchSet] {
        &self.sets
    }

    pub fn map_scores(&self) -> &MapScores {
        &self.map_scores
    }

    /// Team and action the operator controls are currently set to.
    pub fn mode(&self) -> TurnStep {
        self.mode
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    /// Step the template requires next, derived from the log length alone.
    pub fn requirement(&self) -> Option<TurnStep> {
        self.rules.template.requirement(self.picks_bans.len())
    }

    /// Whether both teams have placed all of their opening bans.
    pub fn bans_complete(&self) -> bool {
        let Some(round) = &self.round else {
            return false;
        };

        let bans = self
            .picks_bans
            .iter()
            .filter(|entry| entry.kind == ChoiceType::Ban)
            .count();
        bans >= round.ban_count * 2
    }

    /// Validate and append a choice, then rebuild sets and advance the mode.
    pub fn apply_choice(
        &mut self,
        team: TeamColour,
        kind: ChoiceType,
        beatmap_id: i64,
    ) -> Result<PickBanEntry, ChoiceError> {
        let round = self.round.as_ref().ok_or(ChoiceError::NoActiveRound)?;
        if !round.contains(beatmap_id) {
            return Err(ChoiceError::NotInPool(beatmap_id));
        }

        self.check_conflicts(team, kind, beatmap_id)?;

        let entry = PickBanEntry {
            team,
            kind,
            beatmap_id,
        };
        self.picks_bans.push(entry);
        debug!(?team, ?kind, beatmap_id, "choice applied");

        self.refresh_sets();
        self.advance_mode();
        self.bump();
        Ok(entry)
    }

    /// Apply `beatmap_id` with the current mode, as long as the template still has a step.
    pub fn apply_current(&mut self, beatmap_id: i64) -> Result<PickBanEntry, ChoiceError> {
        if self.requirement().is_none() {
            return Err(ChoiceError::ConfigExhausted(self.picks_bans.len()));
        }

        let TurnStep { team, kind } = self.mode;
        self.apply_choice(team, kind, beatmap_id)
    }

    fn check_conflicts(
        &self,
        team: TeamColour,
        kind: ChoiceType,
        beatmap_id: i64,
    ) -> Result<(), ChoiceError> {
        let existing: Vec<&PickBanEntry> = self
            .picks_bans
            .iter()
            .filter(|entry| entry.beatmap_id == beatmap_id)
            .collect();

        let protect = existing
            .iter()
            .find(|entry| entry.kind == ChoiceType::Protect);

        match protect {
            Some(protect) => {
                if existing.iter().any(|entry| entry.kind == ChoiceType::Pick) {
                    return Err(ChoiceError::AlreadyPicked(beatmap_id));
                }
                if kind != ChoiceType::Pick {
                    return Err(ChoiceError::Duplicate(beatmap_id));
                }
                if protect.team != team {
                    return Err(ChoiceError::ProtectedByOther(beatmap_id));
                }
                Ok(())
            }
            None if !existing.is_empty() => Err(ChoiceError::Duplicate(beatmap_id)),
            None => Ok(()),
        }
    }

    /// Remove the most recent choice made on `beatmap_id`.
    ///
    /// Picks and bans go before a protect on the same map.
    pub fn undo(&mut self, beatmap_id: i64) -> Option<PickBanEntry> {
        let position = self
            .picks_bans
            .iter()
            .rposition(|entry| entry.beatmap_id == beatmap_id && entry.kind != ChoiceType::Protect)
            .or_else(|| {
                self.picks_bans
                    .iter()
                    .rposition(|entry| entry.beatmap_id == beatmap_id)
            })?;

        let removed = self.picks_bans.remove(position);
        debug!(team = ?removed.team, kind = ?removed.kind, beatmap_id, "choice removed");

        self.refresh_sets();
        self.advance_mode();
        self.bump();
        Some(removed)
    }

    /// Clear the log, sets and winner overrides; the mode returns to the first step.
    /// Recorded map scores are kept.
    pub fn reset(&mut self) {
        self.picks_bans.clear();
        self.sets.clear();
        self.mode = self.rules.template.first().unwrap_or_default();
        self.bump();
    }

    /// Operator override of the current mode.
    pub fn set_mode(&mut self, step: TurnStep) {
        self.mode = step;
        self.bump();
    }

    /// Move the tiebreaker set and rebuild sets around it.
    pub fn set_tiebreaker_index(&mut self, index: usize) {
        self.rules.tiebreaker_index = index;
        self.refresh_sets();
        self.bump();
    }

    /// Swap the pool of the active round, keeping the log.
    ///
    /// Log entries whose map left the pool stay in place and resolve to no slot.
    pub fn replace_pool(&mut self, beatmaps: Vec<RoundBeatmap>) -> Result<(), ChoiceError> {
        let round = self.round.as_mut().ok_or(ChoiceError::NoActiveRound)?;
        round.beatmaps = beatmaps;
        round.recompute_slot_names();

        let dangling = self
            .picks_bans
            .iter()
            .filter(|entry| !round.contains(entry.beatmap_id))
            .count();
        if dangling > 0 {
            warn!(dangling, "pool update left choices without a slot");
        }

        self.bump();
        Ok(())
    }

    /// Store the `(red, blue)` score of a pool slot.
    pub fn record_map_score(&mut self, slot_name: &str, scores: (i64, i64)) -> Result<(), ChoiceError> {
        let round = self.round.as_ref().ok_or(ChoiceError::NoActiveRound)?;
        if !round.has_slot(slot_name) {
            return Err(ChoiceError::UnknownSlot(slot_name.to_owned()));
        }

        self.map_scores.insert(slot_name.to_owned(), scores);
        self.bump();
        Ok(())
    }

    /// Store the score of whichever slot `beatmap_id` occupies. Returns that slot.
    pub fn record_score_for_beatmap(&mut self, beatmap_id: i64, scores: (i64, i64)) -> Option<String> {
        let slot = self.round.as_ref()?.slot_name_of(beatmap_id)?.to_owned();
        self.map_scores.insert(slot.clone(), scores);
        self.bump();
        Some(slot)
    }

    /// Force, or clear, the winner of the set at `index`.
    pub fn set_winner_override(
        &mut self,
        index: usize,
        winner: Option<TeamColour>,
    ) -> Result<(), ChoiceError> {
        let set = self.sets.get_mut(index).ok_or(ChoiceError::UnknownSet(index))?;
        set.winner_override = winner;
        self.bump();
        Ok(())
    }

    /// Summed scores of the set at `index`; `None` when none of its maps has a slot.
    pub fn set_scores(&self, index: usize) -> Option<(i64, i64)> {
        let set = self.sets.get(index)?;
        sets::set_scores(set, self.round.as_ref(), &self.map_scores)
    }

    /// Scores of the set containing `beatmap_id`.
    pub fn set_scores_for_map(&self, beatmap_id: i64) -> Option<(i64, i64)> {
        sets::set_scores_for_map(&self.sets, beatmap_id, self.round.as_ref(), &self.map_scores)
    }

    pub fn set_winner(&self, index: usize) -> Option<TeamColour> {
        let set = self.sets.get(index)?;
        sets::set_winner(
            set,
            self.round.as_ref(),
            &self.map_scores,
            self.rules.draw_policy,
        )
    }

    /// Sets won by `(red, blue)`.
    pub fn match_score(&self) -> (u32, u32) {
        sets::match_score(
            &self.sets,
            self.round.as_ref(),
            &self.map_scores,
            self.rules.draw_policy,
        )
    }

    pub fn cumulative_scores(&self) -> (i64, i64) {
        sets::cumulative_scores(&self.sets, self.round.as_ref(), &self.map_scores)
    }

    fn refresh_sets(&mut self) {
        self.sets = sets::rebuild_sets(&self.picks_bans, &self.sets, self.rules.tiebreaker_index);
    }

    fn advance_mode(&mut self) {
        if let Some(step) = self.requirement() {
            self.mode = step;
        }
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::turns::TurnFormat;

    use ChoiceType::{Ban, Pick, Protect};
    use TeamColour::{Blue, Red};

    fn pool() -> Vec<RoundBeatmap> {
        vec![
            RoundBeatmap::new(11, "NM"),
            RoundBeatmap::new(12, "NM"),
            RoundBeatmap::new(13, "NM"),
            RoundBeatmap::new(21, "HD"),
            RoundBeatmap::new(22, "HD"),
            RoundBeatmap::new(31, "HR"),
            RoundBeatmap::new(41, "DT"),
            RoundBeatmap::new(99, "TB"),
        ]
    }

    fn rules(format: TurnFormat, tiebreaker_index: usize) -> MatchRules {
        MatchRules {
            template: format.template(),
            tiebreaker_index,
            draw_policy: DrawPolicy::RedWins,
        }
    }

    fn state(format: TurnFormat) -> MatchState {
        MatchState::new(Some(Round::new("Finals", 1, pool())), rules(format, 4))
    }

    fn slot_names(round: &Round) -> Vec<&str> {
        round
            .beatmaps
            .iter()
            .map(|beatmap| beatmap.slot_name.as_str())
            .collect()
    }

    #[test]
    fn slot_names_count_per_mods_group() {
        let round = Round::new(
            "Groups",
            1,
            vec![
                RoundBeatmap::new(1, "NM"),
                RoundBeatmap::new(2, "HD"),
                RoundBeatmap::new(3, "NM"),
                RoundBeatmap::new(4, "TB"),
            ],
        );
        assert_eq!(slot_names(&round), vec!["NM1", "HD1", "NM2", "TB"]);
    }

    #[test]
    fn slot_names_are_idempotent() {
        let mut round = Round::new("Finals", 1, pool());
        let first: Vec<String> = slot_names(&round).into_iter().map(String::from).collect();
        round.recompute_slot_names();
        assert_eq!(slot_names(&round), first);
        assert_eq!(
            first,
            vec!["NM1", "NM2", "NM3", "HD1", "HD2", "HR1", "DT1", "TB"]
        );
    }

    #[test]
    fn requirement_depends_only_on_log_length() {
        let mut a = state(TurnFormat::Standard);
        let mut b = state(TurnFormat::Standard);

        a.apply_choice(Red, Ban, 31).unwrap();
        a.apply_choice(Blue, Ban, 41).unwrap();

        b.apply_choice(Blue, Pick, 11).unwrap();
        b.apply_choice(Red, Protect, 12).unwrap();
        b.apply_choice(Red, Ban, 13).unwrap();
        b.undo(13);

        assert_eq!(a.picks_bans().len(), b.picks_bans().len());
        assert_eq!(a.requirement(), b.requirement());
        assert_eq!(a.mode(), b.mode());
        assert_eq!(a.mode(), TurnStep::new(Blue, Pick));
    }

    #[test]
    fn map_outside_pool_is_rejected() {
        let mut state = state(TurnFormat::Standard);
        assert_eq!(
            state.apply_choice(Red, Ban, 5000),
            Err(ChoiceError::NotInPool(5000))
        );
        assert!(state.picks_bans().is_empty());
        assert_eq!(state.version(), 0);
    }

    #[test]
    fn choice_without_round_is_rejected() {
        let mut state = MatchState::new(None, rules(TurnFormat::Standard, 4));
        assert_eq!(
            state.apply_choice(Red, Ban, 11),
            Err(ChoiceError::NoActiveRound)
        );
    }

    #[test]
    fn duplicate_choices_are_rejected() {
        let mut state = state(TurnFormat::Standard);
        state.apply_choice(Red, Ban, 11).unwrap();
        assert_eq!(
            state.apply_choice(Blue, Pick, 11),
            Err(ChoiceError::Duplicate(11))
        );
        assert_eq!(
            state.apply_choice(Red, Ban, 11),
            Err(ChoiceError::Duplicate(11))
        );
        assert_eq!(state.picks_bans().len(), 1);
    }

    #[test]
    fn protected_map_is_picked_once_by_its_owner() {
        let mut state = state(TurnFormat::Extended);
        state.apply_choice(Red, Protect, 21).unwrap();

        assert_eq!(
            state.apply_choice(Blue, Ban, 21),
            Err(ChoiceError::Duplicate(21))
        );
        assert_eq!(
            state.apply_choice(Blue, Pick, 21),
            Err(ChoiceError::ProtectedByOther(21))
        );

        state.apply_choice(Red, Pick, 21).unwrap();
        assert_eq!(
            state.apply_choice(Red, Pick, 21),
            Err(ChoiceError::AlreadyPicked(21))
        );
        assert_eq!(
            state.apply_choice(Blue, Pick, 21),
            Err(ChoiceError::AlreadyPicked(21))
        );
    }

    #[test]
    fn undo_prefers_pick_over_protect() {
        let mut state = state(TurnFormat::Extended);
        state.apply_choice(Blue, Protect, 22).unwrap();
        state.apply_choice(Blue, Pick, 22).unwrap();

        let removed = state.undo(22).unwrap();
        assert_eq!(removed.kind, Pick);
        assert!(state.sets().is_empty());

        let removed = state.undo(22).unwrap();
        assert_eq!(removed.kind, Protect);
        assert_eq!(state.undo(22), None);
    }

    #[test]
    fn undo_then_reapply_restores_log_and_sets() {
        let mut state = state(TurnFormat::Standard);
        state.apply_choice(Red, Ban, 31).unwrap();
        state.apply_choice(Blue, Ban, 41).unwrap();
        state.apply_choice(Blue, Pick, 11).unwrap();
        state.apply_choice(Red, Pick, 12).unwrap();

        let log = state.picks_bans().to_vec();
        let sets = state.sets().to_vec();
        let mode = state.mode();

        let removed = state.undo(12).unwrap();
        assert_eq!(state.mode(), TurnStep::new(Red, Pick));
        state
            .apply_choice(removed.team, removed.kind, removed.beatmap_id)
            .unwrap();

        assert_eq!(state.picks_bans(), log.as_slice());
        assert_eq!(state.sets(), sets.as_slice());
        assert_eq!(state.mode(), mode);
    }

    #[test]
    fn picks_form_sets_by_slot() {
        let mut state = state(TurnFormat::Standard);
        state.apply_choice(Blue, Pick, 11).unwrap();
        state.apply_choice(Red, Pick, 12).unwrap();
        state.apply_choice(Red, Pick, 21).unwrap();

        let sets = state.sets();
        assert_eq!(sets.len(), 2);
        assert_eq!((sets[0].map1_id, sets[0].map2_id), (Some(11), Some(12)));
        assert_eq!((sets[1].map1_id, sets[1].map2_id), (Some(21), None));
    }

    #[test]
    fn exhausted_template_keeps_mode() {
        let mut state = MatchState::new(
            Some(Round::new("Short", 1, pool())),
            rules(
                TurnFormat::Custom(vec![TurnStep::new(Blue, Ban)]),
                4,
            ),
        );
        state.apply_choice(Blue, Ban, 11).unwrap();
        assert_eq!(state.requirement(), None);
        assert_eq!(state.mode(), TurnStep::new(Blue, Ban));
        assert_eq!(
            state.apply_current(12),
            Err(ChoiceError::ConfigExhausted(1))
        );

        state.apply_choice(Red, Pick, 12).unwrap();
        assert_eq!(state.mode(), TurnStep::new(Blue, Ban));
    }

    #[test]
    fn reset_returns_to_first_step() {
        let mut state = state(TurnFormat::Standard);
        state.apply_choice(Red, Ban, 31).unwrap();
        state.apply_choice(Blue, Pick, 11).unwrap();
        state.reset();

        assert!(state.picks_bans().is_empty());
        assert!(state.sets().is_empty());
        assert_eq!(state.mode(), TurnStep::new(Red, Ban));
    }

    #[test]
    fn reset_keeps_recorded_map_scores() {
        let mut state = state(TurnFormat::Standard);
        state.apply_choice(Blue, Pick, 11).unwrap();
        state.record_map_score("NM1", (900, 100)).unwrap();
        state.reset();

        assert!(state.picks_bans().is_empty());
        assert_eq!(state.map_scores().get("NM1"), Some(&(900, 100)));
    }

    #[test]
    fn scores_and_overrides_feed_winners() {
        let mut state = state(TurnFormat::Standard);
        state.apply_choice(Blue, Pick, 11).unwrap();
        state.apply_choice(Red, Pick, 12).unwrap();
        assert_eq!(state.set_scores(0), Some((0, 0)));
        assert_eq!(state.set_winner(0), None);

        state.record_map_score("NM1", (900, 100)).unwrap();
        assert_eq!(state.record_score_for_beatmap(12, (100, 300)), Some("NM2".into()));
        assert_eq!(state.set_winner(0), Some(Red));
        assert_eq!(state.match_score(), (1, 0));
        assert_eq!(state.set_scores_for_map(12), Some((1000, 400)));

        state.set_winner_override(0, Some(Blue)).unwrap();
        assert_eq!(state.match_score(), (0, 1));
        assert_eq!(
            state.set_winner_override(3, Some(Red)),
            Err(ChoiceError::UnknownSet(3))
        );
        assert_eq!(
            state.record_map_score("EZ1", (1, 1)),
            Err(ChoiceError::UnknownSlot("EZ1".into()))
        );
    }

    #[test]
    fn shrinking_pool_keeps_dangling_choices() {
        let mut state = state(TurnFormat::Standard);
        state.apply_choice(Blue, Pick, 11).unwrap();
        state.apply_choice(Red, Pick, 12).unwrap();

        state
            .replace_pool(vec![RoundBeatmap::new(12, "NM"), RoundBeatmap::new(99, "TB")])
            .unwrap();

        assert_eq!(state.picks_bans().len(), 2);
        assert_eq!(state.sets()[0].map1_id, Some(11));
        assert_eq!(state.round().unwrap().slot_name_of(11), None);
        assert_eq!(state.round().unwrap().slot_name_of(12), Some("NM1"));
    }

    #[test]
    fn bans_complete_after_both_teams_banned() {
        let mut state = state(TurnFormat::Standard);
        assert!(!state.bans_complete());
        state.apply_choice(Red, Ban, 31).unwrap();
        assert!(!state.bans_complete());
        state.apply_choice(Blue, Ban, 41).unwrap();
        assert!(state.bans_complete());
    }
}
