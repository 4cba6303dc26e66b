use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::state::{
    match_state::{ChoiceType, MatchState, PickBanEntry, Round, RoundBeatmap, TeamColour},
    turns::TurnStep,
};

/// Pool entry supplied by the operator.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PoolBeatmapInput {
    #[validate(range(min = 1))]
    pub id: i64,
    #[serde(default)]
    pub md5: String,
    /// Slot group such as `NM`, `HD` or `TB`.
    #[validate(length(min = 1, max = 8), custom(function = "validate_mods_group"))]
    pub mods: String,
}

impl From<PoolBeatmapInput> for RoundBeatmap {
    fn from(value: PoolBeatmapInput) -> Self {
        Self {
            md5: value.md5,
            ..RoundBeatmap::new(value.id, value.mods)
        }
    }
}

/// Round definition loaded with a new match.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RoundInput {
    #[validate(length(min = 1))]
    pub name: String,
    /// Bans each team places before inbound beatmap changes are picked automatically.
    #[serde(default = "default_ban_count")]
    pub ban_count: usize,
    #[validate(nested)]
    pub beatmaps: Vec<PoolBeatmapInput>,
}

fn default_ban_count() -> usize {
    1
}

impl From<RoundInput> for Round {
    fn from(value: RoundInput) -> Self {
        Round::new(
            value.name,
            value.ban_count,
            value.beatmaps.into_iter().map(Into::into).collect(),
        )
    }
}

/// Payload of `PUT /match`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoadMatchRequest {
    #[validate(nested)]
    pub round: RoundInput,
    /// Overrides the configured tiebreaker set index for this match.
    #[serde(default)]
    pub tiebreaker_index: Option<usize>,
}

/// Payload of `PUT /match/pool`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ReplacePoolRequest {
    #[validate(nested)]
    pub beatmaps: Vec<PoolBeatmapInput>,
}

/// Payload of `POST /match/choices`. Team and kind default to the current mode.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ChoiceRequest {
    #[validate(range(min = 1))]
    pub beatmap_id: i64,
    #[serde(default)]
    pub team: Option<TeamColour>,
    #[serde(default)]
    pub kind: Option<ChoiceType>,
}

/// Payload of `PUT /match/mode`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ModeRequest {
    pub team: TeamColour,
    pub kind: ChoiceType,
}

/// Payload of `PUT /match/tiebreaker`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TiebreakerRequest {
    #[validate(range(max = 16))]
    pub index: usize,
}

/// Payload of `PUT /match/scores/{slot}`. Team totals are capped at one hundred million.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct MapScoreRequest {
    #[validate(range(min = 0, max = 100_000_000))]
    pub red: i64,
    #[validate(range(min = 0, max = 100_000_000))]
    pub blue: i64,
}

/// Payload of `PUT /match/sets/{index}/winner`. `null` clears the override.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetWinnerRequest {
    pub winner: Option<TeamColour>,
}

/// A set as shown to the operator, with its derived scores.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SetSummary {
    pub index: usize,
    pub map1_id: Option<i64>,
    pub map2_id: Option<i64>,
    pub map3_id: Option<i64>,
    pub is_tiebreaker: bool,
    /// `(red, blue)` totals; absent until one of the maps resolves to a slot.
    #[schema(value_type = Option<Vec<i64>>)]
    pub scores: Option<(i64, i64)>,
    pub winner: Option<TeamColour>,
    pub winner_override: Option<TeamColour>,
}

/// Full view of the match being played.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchSnapshot {
    pub id: Uuid,
    /// Bumped on every mutation.
    pub version: u64,
    pub round: Option<Round>,
    pub picks_bans: Vec<PickBanEntry>,
    pub sets: Vec<SetSummary>,
    /// `(red, blue)` scores keyed by slot name.
    #[schema(value_type = Object)]
    pub map_scores: IndexMap<String, (i64, i64)>,
    /// Mode of the operator controls.
    pub mode: TurnStep,
    /// Step the turn template requires next; absent once it is exhausted.
    pub requirement: Option<TurnStep>,
    pub tiebreaker_index: usize,
    /// Sets won by `(red, blue)`.
    #[schema(value_type = Vec<u32>)]
    pub match_score: (u32, u32),
    /// Points summed across sets.
    #[schema(value_type = Vec<i64>)]
    pub cumulative_scores: (i64, i64),
}

impl From<&MatchState> for MatchSnapshot {
    fn from(state: &MatchState) -> Self {
        let sets = state
            .sets()
            .iter()
            .enumerate()
            .map(|(index, set)| SetSummary {
                index,
                map1_id: set.map1_id,
                map2_id: set.map2_id,
                map3_id: set.map3_id,
                is_tiebreaker: set.is_tiebreaker,
                scores: state.set_scores(index),
                winner: state.set_winner(index),
                winner_override: set.winner_override,
            })
            .collect();

        Self {
            id: state.id,
            version: state.version(),
            round: state.round().cloned(),
            picks_bans: state.picks_bans().to_vec(),
            sets,
            map_scores: state.map_scores().clone(),
            mode: state.mode(),
            requirement: state.requirement(),
            tiebreaker_index: state.rules().tiebreaker_index,
            match_score: state.match_score(),
            cumulative_scores: state.cumulative_scores(),
        }
    }
}

/// Mods groups are upper-case ASCII letters, e.g. `NM` or `FM`.
fn validate_mods_group(mods: &str) -> Result<(), ValidationError> {
    if mods.chars().all(|c| c.is_ascii_uppercase()) {
        return Ok(());
    }

    let mut err = ValidationError::new("mods_group_format");
    err.message = Some(format!("Mods group must be upper-case letters (got `{mods}`)").into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mods_group_must_be_upper_case() {
        assert!(validate_mods_group("HD").is_ok());
        assert!(validate_mods_group("hd").is_err());
        assert!(validate_mods_group("H1").is_err());
    }

    #[test]
    fn load_request_validates_nested_pool() {
        let request: LoadMatchRequest = serde_json::from_str(
            r#"{"round":{"name":"Finals","beatmaps":[{"id":1,"mods":"NM"},{"id":0,"mods":"nm"}]}}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());

        let request: LoadMatchRequest = serde_json::from_str(
            r#"{"round":{"name":"Finals","beatmaps":[{"id":1,"mods":"NM"},{"id":2,"mods":"TB"}]}}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());

        let round = Round::from(request.round);
        assert_eq!(round.ban_count, 1);
        assert_eq!(round.slot_name_of(2), Some("TB"));
    }

    #[test]
    fn map_score_must_be_a_plausible_total() {
        let valid: MapScoreRequest = serde_json::from_str(r#"{"red":850000,"blue":0}"#).unwrap();
        assert!(valid.validate().is_ok());

        for body in [
            r#"{"red":-1,"blue":0}"#,
            r#"{"red":9223372036854775807,"blue":0}"#,
        ] {
            let request: MapScoreRequest = serde_json::from_str(body).unwrap();
            assert!(request.validate().is_err(), "{body} accepted");
        }
    }
}
