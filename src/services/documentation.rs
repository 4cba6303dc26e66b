use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for Tourney Link.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::matches::get_match,
        crate::routes::matches::load_match,
        crate::routes::matches::replace_pool,
        crate::routes::matches::apply_choice,
        crate::routes::matches::undo_choice,
        crate::routes::matches::reset_match,
        crate::routes::matches::set_mode,
        crate::routes::matches::set_tiebreaker,
        crate::routes::matches::record_map_score,
        crate::routes::matches::set_set_winner,
        crate::routes::inbound::get_inbound,
        crate::routes::inbound::set_inbound_sync,
        crate::routes::client::set_phase,
        crate::routes::client::set_room_state,
        crate::routes::client::set_beatmap,
        crate::routes::client::update_scores,
        crate::routes::client::add_chat_message,
        crate::routes::client::clear_chat,
        crate::routes::sse::event_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::matches::PoolBeatmapInput,
            crate::dto::matches::RoundInput,
            crate::dto::matches::LoadMatchRequest,
            crate::dto::matches::ReplacePoolRequest,
            crate::dto::matches::ChoiceRequest,
            crate::dto::matches::ModeRequest,
            crate::dto::matches::TiebreakerRequest,
            crate::dto::matches::MapScoreRequest,
            crate::dto::matches::SetWinnerRequest,
            crate::dto::matches::SetSummary,
            crate::dto::matches::MatchSnapshot,
            crate::dto::inbound::SyncRequest,
            crate::dto::inbound::SyncStatus,
            crate::dto::client::PhaseRequest,
            crate::dto::client::RoomStateRequest,
            crate::dto::client::PhaseResponse,
            crate::dto::client::ActiveBeatmapRequest,
            crate::dto::client::TeamScoresRequest,
            crate::dto::client::ChatMessageRequest,
            crate::dto::sse::Handshake,
            crate::dto::sse::BeatmapChangedEvent,
            crate::dto::sse::PhaseChangedEvent,
            crate::dto::sse::ScoresChangedEvent,
            crate::dto::sse::ChatChangedEvent,
            crate::dto::sse::SyncChangedEvent,
            crate::state::inbound::InboundSnapshot,
            crate::state::live::ApiMod,
            crate::state::live::TournamentBeatmap,
            crate::state::live::ChatMessage,
            crate::state::live::Phase,
            crate::state::live::RoomState,
            crate::state::match_state::TeamColour,
            crate::state::match_state::ChoiceType,
            crate::state::match_state::PickBanEntry,
            crate::state::match_state::Round,
            crate::state::match_state::RoundBeatmap,
            crate::state::turns::TurnStep,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "match", description = "Pick/ban phase and scoreboard"),
        (name = "inbound", description = "State reported by the game client"),
        (name = "client", description = "Feed of the files read by the game client"),
        (name = "sse", description = "Server-sent events stream"),
    )
)]
pub struct ApiDoc;
