use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use axum_valid::Valid;

use crate::{
    dto::matches::{
        ChoiceRequest, LoadMatchRequest, MapScoreRequest, MatchSnapshot, ModeRequest,
        ReplacePoolRequest, SetWinnerRequest, TiebreakerRequest,
    },
    error::AppError,
    services::match_service,
    state::SharedState,
};

/// Routes driving the pick/ban phase and the scoreboard.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/match", get(get_match).put(load_match))
        .route("/match/pool", put(replace_pool))
        .route("/match/choices", post(apply_choice))
        .route("/match/choices/{beatmap_id}", delete(undo_choice))
        .route("/match/reset", post(reset_match))
        .route("/match/mode", put(set_mode))
        .route("/match/tiebreaker", put(set_tiebreaker))
        .route("/match/scores/{slot}", put(record_map_score))
        .route("/match/sets/{index}/winner", put(set_set_winner))
}

/// Snapshot of the match being played.
#[utoipa::path(
    get,
    path = "/match",
    tag = "match",
    responses((status = 200, description = "Current match", body = MatchSnapshot))
)]
pub async fn get_match(State(state): State<SharedState>) -> Json<MatchSnapshot> {
    Json(match_service::snapshot(&state).await)
}

/// Start a new match on the given round pool.
#[utoipa::path(
    put,
    path = "/match",
    tag = "match",
    request_body = LoadMatchRequest,
    responses(
        (status = 200, description = "Match loaded", body = MatchSnapshot),
        (status = 400, description = "Invalid round definition")
    )
)]
pub async fn load_match(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<LoadMatchRequest>>,
) -> Json<MatchSnapshot> {
    Json(match_service::load_match(&state, payload).await)
}

/// Replace the pool of the active round. The pick/ban log is kept.
#[utoipa::path(
    put,
    path = "/match/pool",
    tag = "match",
    request_body = ReplacePoolRequest,
    responses(
        (status = 200, description = "Pool replaced", body = MatchSnapshot),
        (status = 409, description = "No active round")
    )
)]
pub async fn replace_pool(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<ReplacePoolRequest>>,
) -> Result<Json<MatchSnapshot>, AppError> {
    Ok(Json(match_service::replace_pool(&state, payload).await?))
}

/// Apply a pick, ban or protect.
#[utoipa::path(
    post,
    path = "/match/choices",
    tag = "match",
    request_body = ChoiceRequest,
    responses(
        (status = 200, description = "Choice applied", body = MatchSnapshot),
        (status = 409, description = "Choice rejected; the match is unchanged")
    )
)]
pub async fn apply_choice(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<ChoiceRequest>>,
) -> Result<Json<MatchSnapshot>, AppError> {
    Ok(Json(match_service::apply_choice(&state, payload).await?))
}

/// Undo the latest choice made on a beatmap.
#[utoipa::path(
    delete,
    path = "/match/choices/{beatmap_id}",
    tag = "match",
    params(("beatmap_id" = i64, Path, description = "Online id of the beatmap")),
    responses(
        (status = 200, description = "Choice removed", body = MatchSnapshot),
        (status = 404, description = "No choice on this beatmap")
    )
)]
pub async fn undo_choice(
    State(state): State<SharedState>,
    Path(beatmap_id): Path<i64>,
) -> Result<Json<MatchSnapshot>, AppError> {
    Ok(Json(match_service::undo_choice(&state, beatmap_id).await?))
}

/// Clear the pick/ban log and the sets built from it. Recorded map scores are kept.
#[utoipa::path(
    post,
    path = "/match/reset",
    tag = "match",
    responses((status = 200, description = "Match reset", body = MatchSnapshot))
)]
pub async fn reset_match(State(state): State<SharedState>) -> Json<MatchSnapshot> {
    Json(match_service::reset(&state).await)
}

/// Override the team and kind used for the next choice.
#[utoipa::path(
    put,
    path = "/match/mode",
    tag = "match",
    request_body = ModeRequest,
    responses((status = 200, description = "Mode updated", body = MatchSnapshot))
)]
pub async fn set_mode(
    State(state): State<SharedState>,
    Json(payload): Json<ModeRequest>,
) -> Result<Json<MatchSnapshot>, AppError> {
    Ok(Json(match_service::set_mode(&state, payload).await?))
}

/// Move the set played as tiebreaker.
#[utoipa::path(
    put,
    path = "/match/tiebreaker",
    tag = "match",
    request_body = TiebreakerRequest,
    responses((status = 200, description = "Tiebreaker moved", body = MatchSnapshot))
)]
pub async fn set_tiebreaker(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<TiebreakerRequest>>,
) -> Result<Json<MatchSnapshot>, AppError> {
    Ok(Json(match_service::set_tiebreaker(&state, payload.index).await?))
}

/// Record the score of a pool slot such as `NM1`.
#[utoipa::path(
    put,
    path = "/match/scores/{slot}",
    tag = "match",
    params(("slot" = String, Path, description = "Slot name, e.g. `HD2` or `TB`")),
    request_body = MapScoreRequest,
    responses(
        (status = 200, description = "Score recorded", body = MatchSnapshot),
        (status = 404, description = "Unknown slot")
    )
)]
pub async fn record_map_score(
    State(state): State<SharedState>,
    Path(slot): Path<String>,
    Valid(Json(payload)): Valid<Json<MapScoreRequest>>,
) -> Result<Json<MatchSnapshot>, AppError> {
    Ok(Json(
        match_service::record_map_score(&state, &slot, payload).await?,
    ))
}

/// Force the winner of a set, or clear the override with `null`.
#[utoipa::path(
    put,
    path = "/match/sets/{index}/winner",
    tag = "match",
    params(("index" = usize, Path, description = "Zero-based set index")),
    request_body = SetWinnerRequest,
    responses(
        (status = 200, description = "Winner updated", body = MatchSnapshot),
        (status = 404, description = "Unknown set")
    )
)]
pub async fn set_set_winner(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
    Json(payload): Json<SetWinnerRequest>,
) -> Result<Json<MatchSnapshot>, AppError> {
    Ok(Json(
        match_service::set_set_winner(&state, index, payload).await?,
    ))
}
