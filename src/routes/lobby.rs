use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        chat::{ChatMessageRequest, ChatMessageSummary},
        lobby::{HostActionRequest, LobbySummary, PlayerSummary, StartGameResponse},
        trivia::ResultsResponse,
    },
    error::AppError,
    services::{chat_service, lobby_service},
    state::SharedState,
};

/// Lobby snapshot, roster, lifecycle, and chat routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/lobbies/{id}", get(get_lobby))
        .route("/lobbies/{id}/players", get(list_players))
        .route("/lobbies/{id}/start", post(start_game))
        .route("/lobbies/{id}/results", get(get_results))
        .route("/lobbies/{id}/chat", post(post_chat_message))
}

/// Fetch a lobby snapshot by its join code.
#[utoipa::path(
    get,
    path = "/lobbies/{id}",
    tag = "lobby",
    params(("id" = String, Path, description = "4-character join code")),
    responses(
        (status = 200, description = "Lobby snapshot", body = LobbySummary),
        (status = 404, description = "Unknown code")
    )
)]
pub async fn get_lobby(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<LobbySummary>, AppError> {
    Ok(Json(lobby_service::get_lobby_by_code(&state, &code).await?))
}

/// Fetch the lobby roster ordered by join time.
#[utoipa::path(
    get,
    path = "/lobbies/{id}/players",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Lobby id")),
    responses(
        (status = 200, description = "Players in join order", body = [PlayerSummary]),
        (status = 404, description = "Unknown lobby")
    )
)]
pub async fn list_players(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PlayerSummary>>, AppError> {
    Ok(Json(lobby_service::list_players(&state, id).await?))
}

/// Start the game (host only; idempotent on duplicate calls).
#[utoipa::path(
    post,
    path = "/lobbies/{id}/start",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Lobby id")),
    request_body = HostActionRequest,
    responses(
        (status = 200, description = "Game started", body = StartGameResponse),
        (status = 401, description = "Caller is not the host"),
        (status = 404, description = "Unknown lobby")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<HostActionRequest>,
) -> Result<Json<StartGameResponse>, AppError> {
    Ok(Json(
        lobby_service::start_game(&state, id, payload.player_id).await?,
    ))
}

/// End-of-game results: the final burn, shame list, and leaderboard.
#[utoipa::path(
    get,
    path = "/lobbies/{id}/results",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Lobby id")),
    responses(
        (status = 200, description = "Final results", body = ResultsResponse),
        (status = 404, description = "Unknown lobby")
    )
)]
pub async fn get_results(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResultsResponse>, AppError> {
    Ok(Json(lobby_service::get_results(&state, id).await?))
}

/// Post an emoji reaction to the lobby chat.
#[utoipa::path(
    post,
    path = "/lobbies/{id}/chat",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Lobby id")),
    request_body = ChatMessageRequest,
    responses(
        (status = 200, description = "Message posted", body = ChatMessageSummary),
        (status = 404, description = "Unknown lobby or player")
    )
)]
pub async fn post_chat_message(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<ChatMessageRequest>>,
) -> Result<Json<ChatMessageSummary>, AppError> {
    Ok(Json(chat_service::send_message(&state, id, payload).await?))
}
