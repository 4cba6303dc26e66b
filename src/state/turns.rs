//! Turn templates driving the pick/ban sequence.
//!
//! The required action is a pure function of how many entries the pick/ban log holds:
//! entry `n` must be made by `template[n]`. Formats only differ by their template.

use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::state::match_state::{ChoiceType, TeamColour};

/// A single required action: which team acts and what it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct TurnStep {
    pub team: TeamColour,
    pub kind: ChoiceType,
}

impl TurnStep {
    pub const fn new(team: TeamColour, kind: ChoiceType) -> Self {
        Self { team, kind }
    }
}

impl Default for TurnStep {
    fn default() -> Self {
        Self::new(TeamColour::Red, ChoiceType::Ban)
    }
}

/// Match formats with a known pick/ban sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case", tag = "format", content = "steps")]
pub enum TurnFormat {
    /// Ban `AB`, pick `BAAB`, ban `ABBA`.
    #[default]
    Standard,
    /// Ban `AB`, pick `BAAB`, protect `AB`, ban `BAAB`, pick `AB`, ban `BA`.
    Extended,
    /// Explicit sequence supplied by configuration.
    Custom(Vec<TurnStep>),
}

impl TurnFormat {
    /// Expand the format into its template.
    pub fn template(&self) -> TurnTemplate {
        let steps = match self {
            TurnFormat::Standard => [
                phase(ChoiceType::Ban, "AB"),
                phase(ChoiceType::Pick, "BAAB"),
                phase(ChoiceType::Ban, "ABBA"),
            ]
            .concat(),
            TurnFormat::Extended => [
                phase(ChoiceType::Ban, "AB"),
                phase(ChoiceType::Pick, "BAAB"),
                phase(ChoiceType::Protect, "AB"),
                phase(ChoiceType::Ban, "BAAB"),
                phase(ChoiceType::Pick, "AB"),
                phase(ChoiceType::Ban, "BA"),
            ]
            .concat(),
            TurnFormat::Custom(steps) => steps.clone(),
        };

        TurnTemplate::new(steps)
    }
}

/// Expand an `A`/`B` order string into steps; `A` is red, `B` is blue.
fn phase(kind: ChoiceType, order: &str) -> Vec<TurnStep> {
    order
        .chars()
        .map(|team| {
            let team = if team == 'A' {
                TeamColour::Red
            } else {
                TeamColour::Blue
            };
            TurnStep::new(team, kind)
        })
        .collect()
}

/// Ordered list of required actions, indexed by pick/ban log length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnTemplate {
    steps: Vec<TurnStep>,
}

impl TurnTemplate {
    pub fn new(steps: Vec<TurnStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[TurnStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// First step of the sequence.
    pub fn first(&self) -> Option<TurnStep> {
        self.steps.first().copied()
    }

    /// Step required once the log holds `log_len` entries.
    ///
    /// Running past the template is a configuration problem: it is logged and `None` is
    /// returned so callers keep their current mode.
    pub fn requirement(&self, log_len: usize) -> Option<TurnStep> {
        let step = self.steps.get(log_len).copied();
        if step.is_none() {
            error!(
                log_len,
                template_len = self.steps.len(),
                "turn template exhausted; keeping current mode"
            );
        }
        step
    }
}
