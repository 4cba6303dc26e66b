//! Live match data exchanged with the game client: beatmap, mods, phase and chat.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Beatmap id reported by the game client when the beatmap is not submitted online.
pub const UNKNOWN_BEATMAP_ID: i64 = -1;

/// A mod required for the current beatmap, in the game client's JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiMod {
    pub acronym: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    #[schema(value_type = Object)]
    pub settings: IndexMap<String, serde_json::Value>,
}

impl ApiMod {
    /// Mod without settings.
    pub fn new(acronym: impl Into<String>) -> Self {
        Self {
            acronym: acronym.into(),
            settings: IndexMap::new(),
        }
    }
}

/// Beatmap currently displayed by the tournament client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TournamentBeatmap {
    pub online_id: i64,
    pub md5: String,
    pub title: String,
    pub artist: String,
    pub version: String,
    /// Cover image location, empty while unknown.
    #[serde(default)]
    pub cover: String,
}

/// Beatmap description written by the game client for beatmaps that cannot be
/// looked up online.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BeatmapMetadata {
    #[serde(alias = "MD5Hash", alias = "md5Hash")]
    pub md5: String,
    #[serde(default)]
    pub online_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default, alias = "difficultyName")]
    pub version: String,
}

impl BeatmapMetadata {
    /// Convert into the displayed beatmap, with the given cover (empty when not ready).
    pub fn to_beatmap(&self, cover: &str) -> TournamentBeatmap {
        TournamentBeatmap {
            online_id: self.online_id,
            md5: self.md5.clone(),
            title: self.title.clone(),
            artist: self.artist.clone(),
            version: self.version.clone(),
            cover: cover.to_owned(),
        }
    }
}

/// One chat line relayed from the live room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    /// Unix timestamp in milliseconds.
    pub timestamp_ms: i64,
    pub username: String,
    pub user_id: i64,
    pub content: String,
}

/// Phase of the live match, as agreed with the game client.
///
/// The integer values are part of the file contract.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Lobby = 0,
    Playing = 1,
    Ranking = 2,
}

impl Phase {
    /// Integer written to the phase resource.
    pub fn ordinal(self) -> i32 {
        self as i32
    }

    /// Map a phase ordinal back to its variant.
    pub fn from_ordinal(value: i32) -> Option<Self> {
        match value {
            0 => Some(Phase::Lobby),
            1 => Some(Phase::Playing),
            2 => Some(Phase::Ranking),
            _ => None,
        }
    }

    /// Parse a variant name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "lobby" => Some(Phase::Lobby),
            "playing" => Some(Phase::Playing),
            "ranking" => Some(Phase::Ranking),
            _ => None,
        }
    }

    /// Phase to publish after the live room changed state.
    ///
    /// Leaving gameplay moves to [`Phase::Ranking`]; a room that never started playing
    /// stays in the lobby.
    pub fn after_room_update(self, room: RoomState) -> Self {
        match room {
            RoomState::WaitingForLoad | RoomState::Playing => Phase::Playing,
            _ if self == Phase::Lobby => Phase::Lobby,
            _ => Phase::Ranking,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Lobby => "lobby",
            Phase::Playing => "playing",
            Phase::Ranking => "ranking",
        };
        f.write_str(name)
    }
}

/// State of the live multiplayer room driving phase transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoomState {
    Open,
    WaitingForLoad,
    Playing,
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_ordinals_are_stable() {
        assert_eq!(Phase::Lobby.ordinal(), 0);
        assert_eq!(Phase::Playing.ordinal(), 1);
        assert_eq!(Phase::Ranking.ordinal(), 2);
        assert_eq!(Phase::from_ordinal(2), Some(Phase::Ranking));
        assert_eq!(Phase::from_ordinal(7), None);
    }

    #[test]
    fn lobby_is_sticky_until_play_starts() {
        assert_eq!(Phase::Lobby.after_room_update(RoomState::Open), Phase::Lobby);
        assert_eq!(
            Phase::Lobby.after_room_update(RoomState::WaitingForLoad),
            Phase::Playing
        );
        assert_eq!(
            Phase::Playing.after_room_update(RoomState::Open),
            Phase::Ranking
        );
        assert_eq!(
            Phase::Ranking.after_room_update(RoomState::Closed),
            Phase::Ranking
        );
    }

    #[test]
    fn metadata_accepts_client_field_names() {
        let metadata: BeatmapMetadata = serde_json::from_str(
            r#"{"MD5Hash":"abc","onlineId":-1,"title":"Song","artist":"Band","difficultyName":"Insane"}"#,
        )
        .unwrap();
        assert_eq!(metadata.md5, "abc");
        assert_eq!(metadata.version, "Insane");
        assert_eq!(metadata.to_beatmap("").cover, "");
    }
}
