//! Prediction-mode gameplay: award seeding, prediction upserts, category
//! locking, and the winner reveal.
//!
//! The reveal is the one multi-write host sequence in the system. It runs as
//! an ordered list of idempotent steps with its status persisted on the
//! category row (`reveal_state`), so a crash mid-sequence is resumed by
//! simply re-running the reveal instead of leaving a locked category with no
//! winner or stale scores.

use std::{sync::Arc, time::SystemTime};

use tracing::info;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{
        models::{CategoryEntity, GameMode, NomineeEntity, PredictionEntity, RevealState},
        party_store::PartyStore,
    },
    dto::oscars::{
        CategoryWithNominees, PredictionRequest, ScoreUpdateResponse, SetWinnerRequest,
        SetWinnerResponse,
    },
    error::ServiceError,
    services::{feed_events, lobby_service},
    state::SharedState,
};

/// Points granted for a correct prediction.
const PREDICTION_POINTS: i32 = 10;

/// Seed the award categories and nominees for a fresh prediction lobby.
pub(crate) async fn seed_awards(
    store: &Arc<dyn PartyStore>,
    lobby_id: Uuid,
    config: &AppConfig,
) -> Result<(), ServiceError> {
    for (order, award) in config.award_categories().iter().enumerate() {
        let category = CategoryEntity {
            id: Uuid::new_v4(),
            lobby_id,
            name: award.name.clone(),
            display_order: order as u32,
            locked: false,
            reveal_state: RevealState::Open,
            created_at: SystemTime::now(),
        };
        store.save_category(category.clone()).await?;

        for nominee in &award.nominees {
            store
                .save_nominee(NomineeEntity {
                    id: Uuid::new_v4(),
                    category_id: category.id,
                    name: nominee.name.clone(),
                    movie: nominee.movie.clone(),
                    is_winner: false,
                })
                .await?;
        }
    }

    Ok(())
}

/// Categories of a lobby bundled with their nominees, in display order.
pub async fn list_categories(
    state: &SharedState,
    lobby_id: Uuid,
) -> Result<Vec<CategoryWithNominees>, ServiceError> {
    let store = state.require_party_store().await?;
    let lobby = lobby_service::require_lobby(&store, lobby_id).await?;

    if lobby.mode != GameMode::Predictions {
        return Err(ServiceError::InvalidState(
            "categories only apply to prediction lobbies".into(),
        ));
    }

    let categories = store.list_categories(lobby_id).await?;
    let mut result = Vec::with_capacity(categories.len());
    for category in categories {
        let nominees = store.list_nominees(category.id).await?;
        result.push(CategoryWithNominees {
            category: category.into(),
            nominees: nominees.into_iter().map(Into::into).collect(),
        });
    }

    Ok(result)
}

/// Upsert a player's pick for a category: at most one live prediction per
/// player and category, rejected once the category locks.
pub async fn submit_prediction(
    state: &SharedState,
    lobby_id: Uuid,
    request: PredictionRequest,
) -> Result<(), ServiceError> {
    let store = state.require_party_store().await?;
    let lobby = lobby_service::require_lobby(&store, lobby_id).await?;

    if lobby.mode != GameMode::Predictions {
        return Err(ServiceError::InvalidState(
            "predictions only apply to prediction lobbies".into(),
        ));
    }

    let player = lobby_service::require_member(&store, lobby_id, request.player_id).await?;

    let category = store
        .find_category(request.category_id)
        .await?
        .filter(|c| c.lobby_id == lobby_id)
        .ok_or_else(|| {
            ServiceError::NotFound(format!("category `{}` not found", request.category_id))
        })?;
    if category.locked {
        return Err(ServiceError::InvalidState(
            "this category is locked for predictions".into(),
        ));
    }

    let nominee = store
        .find_nominee(request.nominee_id)
        .await?
        .filter(|n| n.category_id == category.id)
        .ok_or_else(|| {
            ServiceError::NotFound(format!("nominee `{}` not found", request.nominee_id))
        })?;

    let now = SystemTime::now();
    let prediction = match store.find_prediction(player.id, category.id).await? {
        Some(mut existing) => {
            existing.nominee_id = nominee.id;
            existing.updated_at = now;
            existing
        }
        None => PredictionEntity {
            id: Uuid::new_v4(),
            player_id: player.id,
            category_id: category.id,
            nominee_id: nominee.id,
            scored: false,
            created_at: now,
            updated_at: now,
        },
    };
    store.save_prediction(prediction).await?;

    Ok(())
}

/// Lock a category for predictions. Host-only, one-way, idempotent.
pub async fn lock_category(
    state: &SharedState,
    category_id: Uuid,
    player_id: Uuid,
) -> Result<(), ServiceError> {
    let store = state.require_party_store().await?;
    let mut category = require_category(&store, category_id).await?;
    let lobby = lobby_service::require_lobby(&store, category.lobby_id).await?;
    lobby_service::ensure_host(&store, &lobby, player_id).await?;

    if !category.locked {
        category.locked = true;
        store.save_category(category.clone()).await?;
        feed_events::category_updated(state, &category);
    }

    Ok(())
}

/// Reveal a category's winner: reset every nominee, set the one winner, lock
/// the category, and grant prediction points.
///
/// Steps run in a fixed order with `reveal_state` persisted before and
/// after; each step is idempotent, so re-invoking after a partial failure
/// completes the sequence instead of corrupting it.
pub async fn set_winner(
    state: &SharedState,
    category_id: Uuid,
    request: SetWinnerRequest,
) -> Result<SetWinnerResponse, ServiceError> {
    let store = state.require_party_store().await?;
    let mut category = require_category(&store, category_id).await?;
    let lobby = lobby_service::require_lobby(&store, category.lobby_id).await?;
    lobby_service::ensure_host(&store, &lobby, request.player_id).await?;

    let nominees = store.list_nominees(category.id).await?;
    let winner = nominees
        .iter()
        .find(|n| n.id == request.nominee_id)
        .cloned()
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "nominee `{}` not found in this category",
                request.nominee_id
            ))
        })?;

    if category.reveal_state == RevealState::Revealed && winner.is_winner {
        // The sequence already completed for this nominee; nothing to redo.
        return Ok(SetWinnerResponse {
            winner_id: winner.id,
            players_updated: 0,
        });
    }

    // Step 1: persist that a reveal is in flight.
    category.reveal_state = RevealState::Revealing;
    store.save_category(category.clone()).await?;
    feed_events::category_updated(state, &category);

    // Step 2: reset-all-then-set-one keeps the at-most-one-winner invariant
    // even when a previous reveal picked a different nominee.
    for nominee in nominees {
        let should_win = nominee.id == winner.id;
        if nominee.is_winner != should_win {
            let mut changed = nominee;
            changed.is_winner = should_win;
            store.save_nominee(changed.clone()).await?;
            feed_events::nominee_updated(state, lobby.id, &changed);
        }
    }

    // Step 3: grant points for correct, not-yet-scored predictions.
    let players_updated = grant_scores(state, &store, category.id, winner.id).await?;

    // Step 4: lock and mark the sequence complete.
    category.locked = true;
    category.reveal_state = RevealState::Revealed;
    store.save_category(category.clone()).await?;
    feed_events::category_updated(state, &category);

    info!(
        category_id = %category.id,
        winner_id = %winner.id,
        players_updated,
        "category winner revealed"
    );

    Ok(SetWinnerResponse {
        winner_id: winner.id,
        players_updated,
    })
}

/// The scoring step of the reveal, exposed as its own endpoint. Idempotent:
/// a prediction is only ever scored once.
pub async fn update_scores(
    state: &SharedState,
    category_id: Uuid,
    nominee_id: Uuid,
) -> Result<ScoreUpdateResponse, ServiceError> {
    let store = state.require_party_store().await?;
    require_category(&store, category_id).await?;

    let players_updated = grant_scores(state, &store, category_id, nominee_id).await?;
    Ok(ScoreUpdateResponse { players_updated })
}

async fn grant_scores(
    state: &SharedState,
    store: &Arc<dyn PartyStore>,
    category_id: Uuid,
    winning_nominee_id: Uuid,
) -> Result<usize, ServiceError> {
    let predictions = store.list_predictions(category_id).await?;
    let mut players_updated = 0;

    for prediction in predictions {
        if prediction.nominee_id != winning_nominee_id || prediction.scored {
            continue;
        }

        let Some(mut player) = store.find_player(prediction.player_id).await? else {
            continue;
        };
        player.score += PREDICTION_POINTS;
        store.save_player(player.clone()).await?;
        feed_events::player_updated(state, &player);

        let mut scored = prediction;
        scored.scored = true;
        scored.updated_at = SystemTime::now();
        store.save_prediction(scored).await?;

        players_updated += 1;
    }

    Ok(players_updated)
}

async fn require_category(
    store: &Arc<dyn PartyStore>,
    category_id: Uuid,
) -> Result<CategoryEntity, ServiceError> {
    store
        .find_category(category_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("category `{category_id}` not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::{common::GameModeDto, lobby::CreateGameRequest},
        services::testing::{memory_state, second_player},
    };

    async fn prediction_lobby(state: &SharedState) -> (Uuid, Uuid, Vec<CategoryWithNominees>) {
        let entry = lobby_service::create_game(
            state,
            CreateGameRequest {
                host_name: "Alice".into(),
                mode: GameModeDto::Predictions,
            },
        )
        .await
        .unwrap();
        lobby_service::start_game(state, entry.lobby_id, entry.player_id)
            .await
            .unwrap();
        let categories = list_categories(state, entry.lobby_id).await.unwrap();
        (entry.lobby_id, entry.player_id, categories)
    }

    #[tokio::test]
    async fn predictions_upsert_to_one_live_row() {
        let state = memory_state().await;
        let (lobby_id, host, categories) = prediction_lobby(&state).await;
        let category = &categories[0];

        submit_prediction(
            &state,
            lobby_id,
            PredictionRequest {
                player_id: host,
                category_id: category.category.id,
                nominee_id: category.nominees[0].id,
            },
        )
        .await
        .unwrap();

        // Changing the pick replaces the row instead of adding one.
        submit_prediction(
            &state,
            lobby_id,
            PredictionRequest {
                player_id: host,
                category_id: category.category.id,
                nominee_id: category.nominees[1].id,
            },
        )
        .await
        .unwrap();

        let store = state.require_party_store().await.unwrap();
        let predictions = store.list_predictions(category.category.id).await.unwrap();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].nominee_id, category.nominees[1].id);
    }

    #[tokio::test]
    async fn locked_categories_reject_predictions() {
        let state = memory_state().await;
        let (lobby_id, host, categories) = prediction_lobby(&state).await;
        let category = &categories[0];

        lock_category(&state, category.category.id, host).await.unwrap();

        let err = submit_prediction(
            &state,
            lobby_id,
            PredictionRequest {
                player_id: host,
                category_id: category.category.id,
                nominee_id: category.nominees[0].id,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn winner_reveal_leaves_one_winner_and_grants_points() {
        let state = memory_state().await;
        let (lobby_id, host, categories) = prediction_lobby(&state).await;
        let category = &categories[0];
        let winner_id = category.nominees[0].id;

        submit_prediction(
            &state,
            lobby_id,
            PredictionRequest {
                player_id: host,
                category_id: category.category.id,
                nominee_id: winner_id,
            },
        )
        .await
        .unwrap();

        let outcome = set_winner(
            &state,
            category.category.id,
            SetWinnerRequest {
                player_id: host,
                nominee_id: winner_id,
            },
        )
        .await
        .unwrap();
        assert_eq!(outcome.players_updated, 1);

        let store = state.require_party_store().await.unwrap();
        let nominees = store.list_nominees(category.category.id).await.unwrap();
        assert_eq!(nominees.iter().filter(|n| n.is_winner).count(), 1);
        assert!(nominees.iter().any(|n| n.id == winner_id && n.is_winner));

        let stored = store
            .find_category(category.category.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.locked);
        assert_eq!(stored.reveal_state, RevealState::Revealed);

        let player = store.find_player(host).await.unwrap().unwrap();
        assert_eq!(player.score, PREDICTION_POINTS);
    }

    #[tokio::test]
    async fn rerunning_the_reveal_does_not_double_grant() {
        let state = memory_state().await;
        let (lobby_id, host, categories) = prediction_lobby(&state).await;
        let category = &categories[0];
        let winner_id = category.nominees[0].id;

        submit_prediction(
            &state,
            lobby_id,
            PredictionRequest {
                player_id: host,
                category_id: category.category.id,
                nominee_id: winner_id,
            },
        )
        .await
        .unwrap();

        set_winner(
            &state,
            category.category.id,
            SetWinnerRequest {
                player_id: host,
                nominee_id: winner_id,
            },
        )
        .await
        .unwrap();
        let rerun = set_winner(
            &state,
            category.category.id,
            SetWinnerRequest {
                player_id: host,
                nominee_id: winner_id,
            },
        )
        .await
        .unwrap();
        assert_eq!(rerun.players_updated, 0);

        let store = state.require_party_store().await.unwrap();
        let player = store.find_player(host).await.unwrap().unwrap();
        assert_eq!(player.score, PREDICTION_POINTS);
    }

    #[tokio::test]
    async fn interrupted_reveal_resumes_by_rerunning() {
        let state = memory_state().await;
        let (_lobby_id, host, categories) = prediction_lobby(&state).await;
        let category = &categories[0];
        let winner_id = category.nominees[0].id;

        // Simulate a crash between step 1 and the rest: the reveal marker is
        // persisted but no winner was set.
        let store = state.require_party_store().await.unwrap();
        let mut stored = store
            .find_category(category.category.id)
            .await
            .unwrap()
            .unwrap();
        stored.reveal_state = RevealState::Revealing;
        store.save_category(stored).await.unwrap();

        let outcome = set_winner(
            &state,
            category.category.id,
            SetWinnerRequest {
                player_id: host,
                nominee_id: winner_id,
            },
        )
        .await
        .unwrap();
        assert_eq!(outcome.winner_id, winner_id);

        let nominees = store.list_nominees(category.category.id).await.unwrap();
        assert_eq!(nominees.iter().filter(|n| n.is_winner).count(), 1);
        let stored = store
            .find_category(category.category.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.reveal_state, RevealState::Revealed);
    }

    #[tokio::test]
    async fn standalone_score_update_is_idempotent() {
        let state = memory_state().await;
        let (lobby_id, host, categories) = prediction_lobby(&state).await;
        let category = &categories[0];
        let winner_id = category.nominees[0].id;

        submit_prediction(
            &state,
            lobby_id,
            PredictionRequest {
                player_id: host,
                category_id: category.category.id,
                nominee_id: winner_id,
            },
        )
        .await
        .unwrap();

        let first = update_scores(&state, category.category.id, winner_id)
            .await
            .unwrap();
        let second = update_scores(&state, category.category.id, winner_id)
            .await
            .unwrap();

        assert_eq!(first.players_updated, 1);
        assert_eq!(second.players_updated, 0);
    }

    #[tokio::test]
    async fn reveal_is_host_only() {
        let state = memory_state().await;
        let (lobby_id, _host, categories) = prediction_lobby(&state).await;
        let guest = second_player(&state, lobby_id, "Bob").await;
        let category = &categories[0];

        let err = set_winner(
            &state,
            category.category.id,
            SetWinnerRequest {
                player_id: guest,
                nominee_id: category.nominees[0].id,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }
}
