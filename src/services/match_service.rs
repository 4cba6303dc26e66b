//! Operator-facing operations on the match being played.
//!
//! Every mutation runs under the match write lock, then broadcasts the resulting snapshot.

use tracing::{debug, error, info};

use crate::{
    dto::matches::{
        ChoiceRequest, LoadMatchRequest, MapScoreRequest, MatchSnapshot, ModeRequest,
        ReplacePoolRequest, SetWinnerRequest,
    },
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        live::Phase,
        match_state::{ChoiceError, MatchState, PickBanEntry, Round},
        turns::TurnStep,
    },
};

/// Current match snapshot.
pub async fn snapshot(state: &SharedState) -> MatchSnapshot {
    let current = state.current_match().read().await;
    MatchSnapshot::from(&*current)
}

/// Replace the match with a fresh one played on the given round.
pub async fn load_match(state: &SharedState, request: LoadMatchRequest) -> MatchSnapshot {
    let mut rules = state.config().match_rules();
    if let Some(index) = request.tiebreaker_index {
        rules.tiebreaker_index = index;
    }

    let round = Round::from(request.round);
    info!(round = %round.name, pool = round.beatmaps.len(), "loading match");

    let snapshot = {
        let mut current = state.current_match().write().await;
        *current = MatchState::new(Some(round), rules);
        MatchSnapshot::from(&*current)
    };

    sse_events::broadcast_match_changed(state, snapshot.clone());
    snapshot
}

/// Swap the pool of the active round, keeping the pick/ban log.
pub async fn replace_pool(
    state: &SharedState,
    request: ReplacePoolRequest,
) -> Result<MatchSnapshot, ServiceError> {
    let beatmaps = request.beatmaps.into_iter().map(Into::into).collect();
    let ((), snapshot) = mutate(state, |current| current.replace_pool(beatmaps)).await?;
    Ok(snapshot)
}

/// Apply a pick, ban or protect. Team and kind fall back to the current mode.
pub async fn apply_choice(
    state: &SharedState,
    request: ChoiceRequest,
) -> Result<MatchSnapshot, ServiceError> {
    let (entry, snapshot) = mutate(state, |current| {
        let mode = current.mode();
        current.apply_choice(
            request.team.unwrap_or(mode.team),
            request.kind.unwrap_or(mode.kind),
            request.beatmap_id,
        )
    })
    .await?;

    info!(team = ?entry.team, kind = ?entry.kind, beatmap_id = entry.beatmap_id, "choice applied");
    Ok(snapshot)
}

/// Remove the latest choice on `beatmap_id`.
pub async fn undo_choice(state: &SharedState, beatmap_id: i64) -> Result<MatchSnapshot, ServiceError> {
    let (removed, snapshot) = {
        let mut current = state.current_match().write().await;
        let removed = current
            .undo(beatmap_id)
            .ok_or_else(|| ServiceError::NotFound(format!("no choice on beatmap {beatmap_id}")))?;
        (removed, MatchSnapshot::from(&*current))
    };

    info!(team = ?removed.team, kind = ?removed.kind, beatmap_id, "choice undone");
    sse_events::broadcast_match_changed(state, snapshot.clone());
    Ok(snapshot)
}

/// Clear the pick/ban log and sets.
pub async fn reset(state: &SharedState) -> MatchSnapshot {
    let snapshot = {
        let mut current = state.current_match().write().await;
        current.reset();
        MatchSnapshot::from(&*current)
    };

    info!("match reset");
    sse_events::broadcast_match_changed(state, snapshot.clone());
    snapshot
}

/// Override the mode of the operator controls.
pub async fn set_mode(state: &SharedState, request: ModeRequest) -> Result<MatchSnapshot, ServiceError> {
    let step = TurnStep::new(request.team, request.kind);
    let ((), snapshot) = mutate(state, |current| {
        current.set_mode(step);
        Ok(())
    })
    .await?;
    Ok(snapshot)
}

/// Move the tiebreaker set.
pub async fn set_tiebreaker(state: &SharedState, index: usize) -> Result<MatchSnapshot, ServiceError> {
    let ((), snapshot) = mutate(state, |current| {
        current.set_tiebreaker_index(index);
        Ok(())
    })
    .await?;
    Ok(snapshot)
}

/// Record the score of a pool slot.
pub async fn record_map_score(
    state: &SharedState,
    slot: &str,
    request: MapScoreRequest,
) -> Result<MatchSnapshot, ServiceError> {
    let ((), snapshot) = mutate(state, |current| {
        current.record_map_score(slot, (request.red, request.blue))
    })
    .await?;
    Ok(snapshot)
}

/// Force or clear the winner of a set.
pub async fn set_set_winner(
    state: &SharedState,
    index: usize,
    request: SetWinnerRequest,
) -> Result<MatchSnapshot, ServiceError> {
    let ((), snapshot) = mutate(state, |current| {
        current.set_winner_override(index, request.winner)
    })
    .await?;
    Ok(snapshot)
}

/// React to the game client switching beatmap.
///
/// Once every opening ban is placed, a pool map shown by the client counts as the next
/// choice in the current mode.
pub async fn on_inbound_beatmap(state: &SharedState, beatmap_id: i64) -> Option<PickBanEntry> {
    if !state.config().auto_pick {
        return None;
    }

    {
        let current = state.current_match().read().await;
        let in_pool = current
            .round()
            .is_some_and(|round| round.contains(beatmap_id));
        if !in_pool || !current.bans_complete() {
            return None;
        }
    }

    let outcome = mutate(state, |current| current.apply_current(beatmap_id)).await;

    match outcome {
        Ok((entry, _)) => {
            info!(team = ?entry.team, kind = ?entry.kind, beatmap_id, "choice applied from client beatmap");
            Some(entry)
        }
        Err(err @ ServiceError::InvalidChoice(ChoiceError::ConfigExhausted(_))) => {
            error!(beatmap_id, error = %err, "turn template exhausted; pick the beatmap manually");
            None
        }
        Err(err) => {
            debug!(beatmap_id, error = %err, "client beatmap not applied as a choice");
            None
        }
    }
}

/// React to a phase reported by the game client.
///
/// Leaving gameplay for the results screen attributes the live scores to the slot of the
/// current beatmap.
pub async fn on_phase_changed(state: &SharedState, previous: Phase, phase: Phase) -> Option<String> {
    if !(previous == Phase::Playing && phase == Phase::Ranking) {
        return None;
    }

    let beatmap_id = state.inbound().current_beatmap_id();
    let scores = state.inbound().scores();

    let (slot, snapshot) = {
        let mut current = state.current_match().write().await;
        let slot = current.record_score_for_beatmap(beatmap_id, scores)?;
        (slot, MatchSnapshot::from(&*current))
    };

    info!(beatmap_id, slot = %slot, red = scores.0, blue = scores.1, "map score recorded");
    sse_events::broadcast_match_changed(state, snapshot);
    Some(slot)
}

async fn mutate<T, F>(state: &SharedState, apply: F) -> Result<(T, MatchSnapshot), ServiceError>
where
    F: FnOnce(&mut MatchState) -> Result<T, ChoiceError>,
{
    let (value, snapshot) = {
        let mut current = state.current_match().write().await;
        let value = apply(&mut *current)?;
        (value, MatchSnapshot::from(&*current))
    };

    sse_events::broadcast_match_changed(state, snapshot.clone());
    Ok((value, snapshot))
}
