//! HTTP implementation of [`BeatmapLookup`] against an osu!-style beatmap API.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    dao::lookup::{BeatmapLookup, LookupError, LookupResult},
    state::live::TournamentBeatmap,
};

/// Lookup backed by `GET {base_url}/beatmaps/{id}`.
#[derive(Clone)]
pub struct OnlineLookup {
    client: Client,
    base_url: Arc<str>,
}

impl OnlineLookup {
    /// Build the HTTP client for `base_url`.
    pub fn new(base_url: &str) -> LookupResult<Self> {
        let client = Client::builder().build().map_err(|source| {
            LookupError::unavailable("failed to build lookup client".into(), source)
        })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(base_url.trim_end_matches('/')),
        })
    }
}

impl BeatmapLookup for OnlineLookup {
    fn lookup(&self, beatmap_id: i64) -> BoxFuture<'static, LookupResult<Option<TournamentBeatmap>>> {
        let client = self.client.clone();
        let url = format!("{}/beatmaps/{}", self.base_url, beatmap_id);

        Box::pin(async move {
            let response = client.get(&url).send().await.map_err(|source| {
                LookupError::unavailable(format!("failed to send request to `{url}`"), source)
            })?;

            match response.status() {
                StatusCode::NOT_FOUND => Ok(None),
                status if status.is_success() => {
                    let payload = response.json::<ApiBeatmap>().await.map_err(|source| {
                        LookupError::unavailable(format!("failed to decode response of `{url}`"), source)
                    })?;
                    Ok(Some(payload.into()))
                }
                other => Err(LookupError::Status {
                    beatmap_id,
                    status: other.as_u16(),
                }),
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiBeatmap {
    id: i64,
    #[serde(default)]
    checksum: Option<String>,
    #[serde(default)]
    version: String,
    beatmapset: Option<ApiBeatmapSet>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiBeatmapSet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    artist: String,
    #[serde(default)]
    covers: Option<ApiCovers>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiCovers {
    #[serde(default)]
    cover: String,
}

impl From<ApiBeatmap> for TournamentBeatmap {
    fn from(value: ApiBeatmap) -> Self {
        let set = value.beatmapset.unwrap_or_default();
        Self {
            online_id: value.id,
            md5: value.checksum.unwrap_or_default(),
            title: set.title,
            artist: set.artist,
            version: value.version,
            cover: set.covers.map(|covers| covers.cover).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_payload_maps_to_beatmap() {
        let payload: ApiBeatmap = serde_json::from_str(
            r#"{
                "id": 129891,
                "checksum": "da8aae79c8f3306b5d65ec951874a7fb",
                "version": "Extra",
                "beatmapset": {
                    "title": "Scarlet Rose",
                    "artist": "xi",
                    "covers": {"cover": "https://assets.example/cover.jpg"}
                }
            }"#,
        )
        .unwrap();

        let beatmap = TournamentBeatmap::from(payload);
        assert_eq!(beatmap.online_id, 129891);
        assert_eq!(beatmap.title, "Scarlet Rose");
        assert_eq!(beatmap.cover, "https://assets.example/cover.jpg");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let lookup = OnlineLookup::new("https://osu.example/api/v2/").unwrap();
        assert_eq!(&*lookup.base_url, "https://osu.example/api/v2");
    }
}
