use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::trivia::{
        AnswerOutcome, AnswerRequest, FinalBurnGenerateRequest, FinalBurnSummary,
        GenerateQuestionsRequest, GenerateQuestionsResponse, QuestionSummary,
        RoastGenerateRequest, RoastSummary, SubmitFavoritesRequest, SubmitFavoritesResponse,
    },
    error::{AppError, ServiceError},
    services::{roast_service, trivia_service},
    state::SharedState,
};

/// Trivia-mode routes: favorites, questions, answers, and generation.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/trivia/generate", post(generate_questions))
        .route("/roast/generate", post(generate_roast))
        .route("/finalburn/generate", post(generate_final_burn))
        .route("/lobbies/{id}/favorites", post(submit_favorites))
        .route("/lobbies/{id}/questions", get(list_questions))
        .route("/lobbies/{id}/answers", post(answer_question))
}

/// Generate the trivia set for a lobby (falls back to the canned set when no
/// LLM is configured).
#[utoipa::path(
    post,
    path = "/trivia/generate",
    tag = "trivia",
    request_body = GenerateQuestionsRequest,
    responses(
        (status = 200, description = "Questions generated (or already present)", body = GenerateQuestionsResponse),
        (status = 404, description = "Unknown lobby"),
        (status = 409, description = "Lobby not in a generatable stage")
    )
)]
pub async fn generate_questions(
    State(state): State<SharedState>,
    Json(payload): Json<GenerateQuestionsRequest>,
) -> Result<Json<GenerateQuestionsResponse>, AppError> {
    Ok(Json(
        roast_service::generate_questions(&state, payload.lobby_id).await?,
    ))
}

/// Generate and persist a roast for a wrong answer.
#[utoipa::path(
    post,
    path = "/roast/generate",
    tag = "trivia",
    request_body = RoastGenerateRequest,
    responses(
        (status = 200, description = "Roast created", body = RoastSummary),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn generate_roast(
    State(state): State<SharedState>,
    Json(payload): Json<RoastGenerateRequest>,
) -> Result<Json<RoastSummary>, AppError> {
    // The roast row carries only player/question ids; resolve the lobby
    // through the player so the feed event lands on the right stream.
    let store = state.require_party_store().await.map_err(AppError::from)?;
    let player = store
        .find_player(payload.player_id)
        .await
        .map_err(ServiceError::from)
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("player not found".into()))?;

    Ok(Json(
        roast_service::generate_roast(&state, player.lobby_id, payload).await?,
    ))
}

/// End the game with the final burn for the lowest scorer.
#[utoipa::path(
    post,
    path = "/finalburn/generate",
    tag = "trivia",
    request_body = FinalBurnGenerateRequest,
    responses(
        (status = 200, description = "Final burn created (or already exists)", body = FinalBurnSummary),
        (status = 404, description = "Unknown lobby"),
        (status = 409, description = "Game never started")
    )
)]
pub async fn generate_final_burn(
    State(state): State<SharedState>,
    Json(payload): Json<FinalBurnGenerateRequest>,
) -> Result<Json<FinalBurnSummary>, AppError> {
    Ok(Json(
        roast_service::generate_final_burn(&state, payload.lobby_id).await?,
    ))
}

/// Submit a player's favorite movies for question generation.
#[utoipa::path(
    post,
    path = "/lobbies/{id}/favorites",
    tag = "trivia",
    params(("id" = Uuid, Path, description = "Lobby id")),
    request_body = SubmitFavoritesRequest,
    responses(
        (status = 200, description = "Favorites stored", body = SubmitFavoritesResponse),
        (status = 409, description = "Already submitted or wrong stage")
    )
)]
pub async fn submit_favorites(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<SubmitFavoritesRequest>>,
) -> Result<Json<SubmitFavoritesResponse>, AppError> {
    Ok(Json(
        trivia_service::submit_favorites(&state, id, payload).await?,
    ))
}

/// Fetch a lobby's questions in generation order.
#[utoipa::path(
    get,
    path = "/lobbies/{id}/questions",
    tag = "trivia",
    params(("id" = Uuid, Path, description = "Lobby id")),
    responses(
        (status = 200, description = "Question list", body = [QuestionSummary]),
        (status = 404, description = "Unknown lobby")
    )
)]
pub async fn list_questions(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<QuestionSummary>>, AppError> {
    Ok(Json(trivia_service::list_questions(&state, id).await?))
}

/// Record an answer and apply scoring.
#[utoipa::path(
    post,
    path = "/lobbies/{id}/answers",
    tag = "trivia",
    params(("id" = Uuid, Path, description = "Lobby id")),
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = AnswerOutcome),
        (status = 404, description = "Unknown lobby, player, or question"),
        (status = 409, description = "Already answered or wrong stage")
    )
)]
pub async fn answer_question(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerOutcome>, AppError> {
    Ok(Json(
        trivia_service::answer_question(&state, id, payload).await?,
    ))
}
