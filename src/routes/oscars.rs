use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        lobby::HostActionRequest,
        oscars::{
            CategoryWithNominees, PredictionRequest, ScoreUpdateResponse, SetWinnerRequest,
            SetWinnerResponse, UpdateScoresRequest,
        },
    },
    error::AppError,
    services::oscars_service,
    state::SharedState,
};

/// Prediction-mode routes: categories, predictions, locking, and reveals.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/lobbies/{id}/categories", get(list_categories))
        .route("/lobbies/{id}/predictions", post(submit_prediction))
        .route("/categories/{id}/lock", post(lock_category))
        .route("/categories/{id}/winner", post(set_winner))
        .route("/update-scores", post(update_scores))
}

/// Fetch a lobby's award categories with their nominees.
#[utoipa::path(
    get,
    path = "/lobbies/{id}/categories",
    tag = "oscars",
    params(("id" = Uuid, Path, description = "Lobby id")),
    responses(
        (status = 200, description = "Categories in display order", body = [CategoryWithNominees]),
        (status = 404, description = "Unknown lobby")
    )
)]
pub async fn list_categories(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CategoryWithNominees>>, AppError> {
    Ok(Json(oscars_service::list_categories(&state, id).await?))
}

/// Submit or change a player's pick for a category.
#[utoipa::path(
    post,
    path = "/lobbies/{id}/predictions",
    tag = "oscars",
    params(("id" = Uuid, Path, description = "Lobby id")),
    request_body = PredictionRequest,
    responses(
        (status = 200, description = "Prediction stored"),
        (status = 404, description = "Unknown lobby, category, or nominee"),
        (status = 409, description = "Category locked")
    )
)]
pub async fn submit_prediction(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PredictionRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    oscars_service::submit_prediction(&state, id, payload).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Lock a category for predictions (host only).
#[utoipa::path(
    post,
    path = "/categories/{id}/lock",
    tag = "oscars",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = HostActionRequest,
    responses(
        (status = 200, description = "Category locked"),
        (status = 401, description = "Caller is not the host"),
        (status = 404, description = "Unknown category")
    )
)]
pub async fn lock_category(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<HostActionRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    oscars_service::lock_category(&state, id, payload.player_id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Reveal a category's winner and grant prediction points (host only).
#[utoipa::path(
    post,
    path = "/categories/{id}/winner",
    tag = "oscars",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = SetWinnerRequest,
    responses(
        (status = 200, description = "Winner revealed", body = SetWinnerResponse),
        (status = 401, description = "Caller is not the host"),
        (status = 404, description = "Unknown category or nominee")
    )
)]
pub async fn set_winner(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetWinnerRequest>,
) -> Result<Json<SetWinnerResponse>, AppError> {
    Ok(Json(oscars_service::set_winner(&state, id, payload).await?))
}

/// Grant points for correct predictions of a category (idempotent).
#[utoipa::path(
    post,
    path = "/update-scores",
    tag = "oscars",
    request_body = UpdateScoresRequest,
    responses(
        (status = 200, description = "Scores updated", body = ScoreUpdateResponse),
        (status = 404, description = "Unknown category")
    )
)]
pub async fn update_scores(
    State(state): State<SharedState>,
    Json(payload): Json<UpdateScoresRequest>,
) -> Result<Json<ScoreUpdateResponse>, AppError> {
    Ok(Json(
        oscars_service::update_scores(&state, payload.category_id, payload.nominee_id).await?,
    ))
}
