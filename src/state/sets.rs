//! Projection of the pick log into sets, and of per-slot scores into set and match results.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::state::match_state::{ChoiceType, PickBanEntry, Round, TeamColour};

/// Per-slot score tuples `(red, blue)`, keyed by slot name.
pub type MapScores = IndexMap<String, (i64, i64)>;

/// Two picked maps (three for the tiebreaker) whose scores are summed into one result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MatchSet {
    pub map1_id: Option<i64>,
    pub map2_id: Option<i64>,
    pub map3_id: Option<i64>,
    pub is_tiebreaker: bool,
    /// Winner forced by the operator, taking precedence over scores.
    pub winner_override: Option<TeamColour>,
}

impl MatchSet {
    pub fn new(is_tiebreaker: bool) -> Self {
        Self {
            is_tiebreaker,
            ..Self::default()
        }
    }

    /// Occupied map ids in slot order.
    pub fn map_ids(&self) -> impl Iterator<Item = i64> + '_ {
        [self.map1_id, self.map2_id, self.map3_id]
            .into_iter()
            .flatten()
            .filter(|id| *id != 0)
    }

    pub fn contains(&self, map_id: i64) -> bool {
        self.map_ids().any(|id| id == map_id)
    }

    fn same_maps(&self, other: &MatchSet) -> bool {
        self.map1_id == other.map1_id
            && self.map2_id == other.map2_id
            && self.map3_id == other.map3_id
    }
}

/// How a set with equal totals is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DrawPolicy {
    /// Equal totals count as a red win.
    #[default]
    RedWins,
    /// Equal totals leave the set without a winner.
    Undetermined,
}

impl DrawPolicy {
    fn resolve(self) -> Option<TeamColour> {
        match self {
            DrawPolicy::RedWins => Some(TeamColour::Red),
            DrawPolicy::Undetermined => None,
        }
    }
}

/// Rebuild sets from the pick entries of `entries`, in log order.
///
/// Pick `i` goes to set `min(i / 2, tiebreaker_index)`, slot `i % 2`, except pick
/// `(tiebreaker_index + 1) * 2`, which fills the third slot of the tiebreaker set.
/// Winner overrides from `previous` survive when a set still holds the same maps.
pub fn rebuild_sets(
    entries: &[PickBanEntry],
    previous: &[MatchSet],
    tiebreaker_index: usize,
) -> Vec<MatchSet> {
    let third_slot_pick = (tiebreaker_index + 1) * 2;
    let mut sets: Vec<MatchSet> = Vec::new();

    let picks = entries
        .iter()
        .filter(|entry| entry.kind == ChoiceType::Pick)
        .map(|entry| entry.beatmap_id);

    for (pick_index, beatmap_id) in picks.enumerate() {
        if pick_index > third_slot_pick {
            warn!(
                pick_index,
                beatmap_id, "pick exceeds tiebreaker capacity; not assigned to a set"
            );
            continue;
        }

        let set_index = (pick_index / 2).min(tiebreaker_index);
        if sets.len() <= set_index {
            sets.push(MatchSet::new(set_index == tiebreaker_index));
        }
        let set = &mut sets[set_index];

        if pick_index == third_slot_pick {
            set.map3_id = Some(beatmap_id);
        } else if pick_index % 2 == 0 {
            set.map1_id = Some(beatmap_id);
        } else {
            set.map2_id = Some(beatmap_id);
        }
    }

    for (set, old) in sets.iter_mut().zip(previous) {
        if set.same_maps(old) {
            set.winner_override = old.winner_override;
        }
    }

    sets
}

/// Summed `(red, blue)` scores of a set.
///
/// `None` means no map of the set resolves to a pool slot ("not played"), as opposed to
/// `Some((0, 0))`.
pub fn set_scores(set: &MatchSet, round: Option<&Round>, scores: &MapScores) -> Option<(i64, i64)> {
    let round = round?;
    let slots: Vec<&str> = set
        .map_ids()
        .filter_map(|id| round.slot_name_of(id))
        .collect();

    if slots.is_empty() {
        return None;
    }

    Some(
        slots
            .iter()
            .filter_map(|slot| scores.get(*slot))
            .fold((0_i64, 0_i64), |(red, blue), &(map_red, map_blue)| {
                (red.saturating_add(map_red), blue.saturating_add(map_blue))
            }),
    )
}

/// Scores of the set containing `map_id`.
pub fn set_scores_for_map(
    sets: &[MatchSet],
    map_id: i64,
    round: Option<&Round>,
    scores: &MapScores,
) -> Option<(i64, i64)> {
    let set = sets.iter().find(|set| set.contains(map_id))?;
    set_scores(set, round, scores)
}

/// Winner of a set, if it can be decided.
///
/// Both regular slots (and the third slot when filled) need a recorded score; otherwise
/// the set is still undetermined.
pub fn set_winner(
    set: &MatchSet,
    round: Option<&Round>,
    scores: &MapScores,
    policy: DrawPolicy,
) -> Option<TeamColour> {
    if let Some(winner) = set.winner_override {
        return Some(winner);
    }

    let round = round?;
    set.map1_id?;
    set.map2_id?;

    let (mut red, mut blue) = (0_i64, 0_i64);
    for map_id in set.map_ids() {
        let slot = round.slot_name_of(map_id)?;
        let &(map_red, map_blue) = scores.get(slot)?;
        red = red.saturating_add(map_red);
        blue = blue.saturating_add(map_blue);
    }

    match red.cmp(&blue) {
        Ordering::Greater => Some(TeamColour::Red),
        Ordering::Less => Some(TeamColour::Blue),
        Ordering::Equal => policy.resolve(),
    }
}

/// Number of sets won by `(red, blue)`.
pub fn match_score(
    sets: &[MatchSet],
    round: Option<&Round>,
    scores: &MapScores,
    policy: DrawPolicy,
) -> (u32, u32) {
    sets.iter()
        .filter_map(|set| set_winner(set, round, scores, policy))
        .fold((0_u32, 0_u32), |(red, blue), winner| match winner {
            TeamColour::Red => (red.saturating_add(1), blue),
            TeamColour::Blue => (red, blue.saturating_add(1)),
        })
}

/// Points summed across every set. Sums saturate instead of overflowing.
pub fn cumulative_scores(sets: &[MatchSet], round: Option<&Round>, scores: &MapScores) -> (i64, i64) {
    sets.iter()
        .filter_map(|set| set_scores(set, round, scores))
        .fold((0_i64, 0_i64), |(red, blue), (set_red, set_blue)| {
            (red.saturating_add(set_red), blue.saturating_add(set_blue))
        })
}
