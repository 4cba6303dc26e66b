//! Text codecs for the records exchanged through the IPC directory.

use std::num::ParseIntError;

use thiserror::Error;

use crate::state::live::{ApiMod, ChatMessage, Phase};

/// Decoding failures for IPC records. Readers treat all of them as "no update this tick".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("line {line} is missing")]
    MissingLine { line: usize },
    #[error("line {line} is not a valid integer: `{value}`")]
    InvalidNumber {
        line: usize,
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("unknown phase `{0}`")]
    UnknownPhase(String),
}

fn required_line<'a>(lines: &mut impl Iterator<Item = &'a str>, line: usize) -> Result<&'a str, RecordError> {
    lines
        .next()
        .map(str::trim)
        .ok_or(RecordError::MissingLine { line })
}

fn parse_number(value: &str, line: usize) -> Result<i64, RecordError> {
    value
        .parse::<i64>()
        .map_err(|source| RecordError::InvalidNumber {
            line,
            value: value.to_owned(),
            source,
        })
}

/// Beatmap selection record: id on the first line, JSON mods on the second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeatmapRecord {
    pub beatmap_id: i64,
    /// Raw mods line, compared verbatim to detect changes.
    pub mods: String,
}

impl BeatmapRecord {
    /// Build a record from typed mods.
    pub fn new(beatmap_id: i64, mods: &[ApiMod]) -> Self {
        Self {
            beatmap_id,
            mods: serde_json::to_string(mods).unwrap_or_else(|_| "[]".to_owned()),
        }
    }

    /// Parse the record. Both lines are required: a record cut after the id line is a
    /// write still in progress, and its id may be truncated too.
    pub fn parse(text: &str) -> Result<Self, RecordError> {
        let mut lines = text.lines();
        let beatmap_id = parse_number(required_line(&mut lines, 1)?, 1)?;
        let mods = required_line(&mut lines, 2)?.to_owned();
        Ok(Self { beatmap_id, mods })
    }

    /// Decode the mods line.
    pub fn parsed_mods(&self) -> serde_json::Result<Vec<ApiMod>> {
        serde_json::from_str(&self.mods)
    }

    pub fn encode(&self) -> String {
        format!("{}\n{}\n", self.beatmap_id, self.mods)
    }
}

/// Parse the phase record. Both the integer form and the variant name are accepted.
pub fn parse_phase(text: &str) -> Result<Phase, RecordError> {
    let mut lines = text.lines();
    let value = required_line(&mut lines, 1)?;

    if let Ok(ordinal) = value.parse::<i32>() {
        return Phase::from_ordinal(ordinal).ok_or_else(|| RecordError::UnknownPhase(value.to_owned()));
    }

    Phase::from_name(value).ok_or_else(|| RecordError::UnknownPhase(value.to_owned()))
}

pub fn encode_phase(phase: Phase) -> String {
    format!("{}\n", phase.ordinal())
}

/// Parse the score record. Only the first two lines are considered.
pub fn parse_scores(text: &str) -> Result<(i64, i64), RecordError> {
    let mut lines = text.lines();
    let red = parse_number(required_line(&mut lines, 1)?, 1)?;
    let blue = parse_number(required_line(&mut lines, 2)?, 2)?;
    Ok((red, blue))
}

/// Encode scores one per line, padding a lone value with `0` so readers always see two lines.
pub fn encode_scores(scores: &[i64]) -> String {
    let mut values = scores.to_vec();
    if values.len() == 1 {
        values.push(0);
    }

    values.iter().map(|score| format!("{score}\n")).collect()
}

impl ChatMessage {
    /// Parse a `timestamp,username,userId,content` line. The content may contain commas.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(4, ',');
        let timestamp_ms = parts.next()?.trim().parse::<i64>().ok()?;
        let username = parts.next()?;
        let user_id = parts.next()?.trim().parse::<i64>().ok()?;
        let content = parts.next()?;

        Some(Self {
            timestamp_ms,
            username: username.to_owned(),
            user_id,
            content: content.trim_end_matches('\r').to_owned(),
        })
    }

    /// Encode as a single newline-terminated line. Embedded newlines are flattened.
    pub fn encode_line(&self) -> String {
        let username = self.username.replace([',', '\n', '\r'], " ");
        let content = self.content.replace(['\n', '\r'], " ");
        format!(
            "{},{},{},{}\n",
            self.timestamp_ms, username, self.user_id, content
        )
    }
}
