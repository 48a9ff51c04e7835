use axum::{Json, Router, extract::State, routing::post};
use axum_valid::Valid;

use crate::{
    dto::lobby::{CreateGameRequest, GameEntryResponse, JoinGameRequest},
    error::AppError,
    services::lobby_service,
    state::SharedState,
};

/// Routes handling game entry (creation & joining).
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/create-game", post(create_game))
        .route("/join-game", post(join_game))
}

/// Create a lobby with a fresh join code and its host player.
#[utoipa::path(
    post,
    path = "/create-game",
    tag = "game",
    request_body = CreateGameRequest,
    responses(
        (status = 200, description = "Lobby created", body = GameEntryResponse),
        (status = 400, description = "Missing or invalid host name"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateGameRequest>>,
) -> Result<Json<GameEntryResponse>, AppError> {
    let entry = lobby_service::create_game(&state, payload).await?;
    Ok(Json(entry))
}

/// Join an existing lobby by its 4-character code.
#[utoipa::path(
    post,
    path = "/join-game",
    tag = "game",
    request_body = JoinGameRequest,
    responses(
        (status = 200, description = "Joined the lobby", body = GameEntryResponse),
        (status = 404, description = "Invalid game code"),
        (status = 400, description = "Invalid player name")
    )
)]
pub async fn join_game(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<JoinGameRequest>>,
) -> Result<Json<GameEntryResponse>, AppError> {
    let entry = lobby_service::join_game(&state, payload).await?;
    Ok(Json(entry))
}
