//! Trivia gameplay: favorites collection with the all-submitted check,
//! answer scoring with streak and time bonuses, and the host-driven game
//! end.

use std::time::SystemTime;

use tracing::{error, info};
use uuid::Uuid;

use crate::{
    dao::models::{AnswerEntity, FavoriteMovieEntity, GameMode, GameStage},
    dto::trivia::{
        AnswerOutcome, AnswerRequest, FinalBurnSummary, QuestionSummary, RoastGenerateRequest,
        SubmitFavoritesRequest, SubmitFavoritesResponse,
    },
    error::ServiceError,
    services::{feed_events, lobby_service, roast_service},
    state::SharedState,
};

/// Streak bonus per consecutive correct answer beyond the first.
const STREAK_STEP: u32 = 5;
/// Ceiling for the streak bonus.
const STREAK_CAP: u32 = 25;
/// Ceiling for the time bonus.
const TIME_BONUS_CAP: u32 = 30;

/// Store a player's favorite movies and run the all-submitted check.
///
/// The check counts distinct submitters against the roster as it exists
/// right now, so a player who joined after others submitted still blocks
/// generation until they submit too. When the submitting player is the host
/// and the roster is complete, question generation fires immediately.
pub async fn submit_favorites(
    state: &SharedState,
    lobby_id: Uuid,
    request: SubmitFavoritesRequest,
) -> Result<SubmitFavoritesResponse, ServiceError> {
    let store = state.require_party_store().await?;
    let lobby = lobby_service::require_lobby(&store, lobby_id).await?;

    if lobby.mode != GameMode::Trivia {
        return Err(ServiceError::InvalidState(
            "favorites only apply to trivia lobbies".into(),
        ));
    }
    if lobby.stage != GameStage::Collecting {
        return Err(ServiceError::InvalidState(format!(
            "favorites can only be submitted while collecting (stage is {:?})",
            lobby.stage
        )));
    }

    let player = lobby_service::require_member(&store, lobby_id, request.player_id).await?;

    let already = store.list_favorites_by_player(player.id).await?;
    if !already.is_empty() {
        return Err(ServiceError::InvalidState(
            "favorites were already submitted".into(),
        ));
    }

    let mut submitted = 0;
    for title in &request.titles {
        let title = title.trim();
        if title.is_empty() {
            continue;
        }
        let favorite = FavoriteMovieEntity {
            id: Uuid::new_v4(),
            player_id: player.id,
            movie_title: title.to_string(),
            created_at: SystemTime::now(),
        };
        store.save_favorite_movie(favorite.clone()).await?;
        feed_events::favorite_inserted(state, lobby_id, &favorite);
        submitted += 1;
    }

    // Recompute against the current roster, not a cached count.
    let roster = store.list_players(lobby_id).await?;
    let favorites = store
        .list_favorites_for_players(roster.iter().map(|p| p.id).collect())
        .await?;
    let submitters: std::collections::HashSet<Uuid> =
        favorites.iter().map(|f| f.player_id).collect();
    let all_submitted = roster.iter().all(|p| submitters.contains(&p.id));

    let mut questions_generated = false;
    if all_submitted && player.is_host {
        roast_service::generate_questions(state, lobby_id).await?;
        questions_generated = true;
    }

    info!(
        lobby_id = %lobby_id,
        player_id = %player.id,
        submitted,
        all_submitted,
        "favorites submitted"
    );

    Ok(SubmitFavoritesResponse {
        submitted,
        all_submitted,
        questions_generated,
    })
}

/// Questions of a lobby in generation order.
pub async fn list_questions(
    state: &SharedState,
    lobby_id: Uuid,
) -> Result<Vec<QuestionSummary>, ServiceError> {
    let store = state.require_party_store().await?;
    lobby_service::require_lobby(&store, lobby_id).await?;
    let questions = store.list_questions(lobby_id).await?;
    Ok(questions.into_iter().map(Into::into).collect())
}

/// Record an answer, update the player's score and streak, and fire a roast
/// for a miss.
///
/// The answer row and the player update are two separate writes; a failure
/// between them leaves a recorded answer with a stale score, which a reload
/// resolves. The roast request is dispatched without blocking the caller;
/// the roast arrives later over the change feed.
pub async fn answer_question(
    state: &SharedState,
    lobby_id: Uuid,
    request: AnswerRequest,
) -> Result<AnswerOutcome, ServiceError> {
    let store = state.require_party_store().await?;
    let lobby = lobby_service::require_lobby(&store, lobby_id).await?;

    if lobby.stage != GameStage::Playing {
        return Err(ServiceError::InvalidState(format!(
            "answers are only accepted while playing (stage is {:?})",
            lobby.stage
        )));
    }

    let mut player = lobby_service::require_member(&store, lobby_id, request.player_id).await?;

    let question = store
        .find_question(request.question_id)
        .await?
        .filter(|q| q.lobby_id == lobby_id)
        .ok_or_else(|| {
            ServiceError::NotFound(format!("question `{}` not found", request.question_id))
        })?;

    if store
        .find_answer(player.id, question.id)
        .await?
        .is_some()
    {
        return Err(ServiceError::InvalidState(
            "this question was already answered".into(),
        ));
    }

    let is_correct = request.answer == question.correct_answer;
    let new_streak = if is_correct { player.streak + 1 } else { 0 };
    let score_delta = if is_correct {
        question.points
            + time_bonus(request.answer_time_ms, lobby.config.answer_seconds)
            + streak_bonus(new_streak)
    } else {
        0
    };

    let answer = AnswerEntity {
        id: Uuid::new_v4(),
        player_id: player.id,
        question_id: question.id,
        answer: request.answer.clone(),
        is_correct,
        answer_time_ms: request.answer_time_ms,
        created_at: SystemTime::now(),
    };
    store.save_answer(answer).await?;

    player.streak = new_streak;
    if is_correct {
        player.score += score_delta as i32;
        player.correct_answers += 1;
    } else {
        player.incorrect_answers += 1;
    }
    store.save_player(player.clone()).await?;
    feed_events::player_updated(state, &player);

    if !is_correct {
        // Fire-and-forget: the roast lands on the feed when ready, and a
        // failed roast never fails the answer.
        let roast_request = RoastGenerateRequest {
            player_id: player.id,
            question_id: question.id,
            player_name: player.name.clone(),
            question: question.question.clone(),
            wrong_answer: request.answer,
            correct_answer: question.correct_answer.clone(),
        };
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(err) = roast_service::generate_roast(&state, lobby_id, roast_request).await
            {
                error!(error = %err, "background roast generation failed");
            }
        });
    }

    Ok(AnswerOutcome {
        is_correct,
        score_delta,
        streak: new_streak,
        correct_answer: question.correct_answer,
    })
}

/// End the game: host-only wrapper around the final-burn dispatch.
pub async fn end_game(
    state: &SharedState,
    lobby_id: Uuid,
    player_id: Uuid,
) -> Result<FinalBurnSummary, ServiceError> {
    let store = state.require_party_store().await?;
    let lobby = lobby_service::require_lobby(&store, lobby_id).await?;
    lobby_service::ensure_host(&store, &lobby, player_id).await?;

    roast_service::generate_final_burn(state, lobby_id).await
}

/// Bonus for answering with time to spare: scales linearly with the unused
/// share of the answer window, capped at [`TIME_BONUS_CAP`].
fn time_bonus(answer_time_ms: u64, answer_seconds: u32) -> u32 {
    let window_ms = u64::from(answer_seconds) * 1_000;
    if window_ms == 0 || answer_time_ms >= window_ms {
        return 0;
    }

    let remaining = window_ms - answer_time_ms;
    ((remaining * u64::from(TIME_BONUS_CAP)) / window_ms) as u32
}

/// Bonus for a running streak: `streak * 5` capped at 25, only once the
/// streak is longer than one.
fn streak_bonus(streak: u32) -> u32 {
    if streak > 1 {
        (streak * STREAK_STEP).min(STREAK_CAP)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::{common::GameModeDto, lobby::CreateGameRequest},
        services::testing::{memory_state, second_player},
    };

    async fn playing_lobby(state: &SharedState) -> (Uuid, Uuid, Vec<QuestionSummary>) {
        let entry = lobby_service::create_game(
            state,
            CreateGameRequest {
                host_name: "Alice".into(),
                mode: GameModeDto::Trivia,
            },
        )
        .await
        .unwrap();
        lobby_service::start_game(state, entry.lobby_id, entry.player_id)
            .await
            .unwrap();

        submit_favorites(
            state,
            entry.lobby_id,
            SubmitFavoritesRequest {
                player_id: entry.player_id,
                titles: vec!["Heat".into(), "Alien".into()],
            },
        )
        .await
        .unwrap();

        let questions = list_questions(state, entry.lobby_id).await.unwrap();
        (entry.lobby_id, entry.player_id, questions)
    }

    #[tokio::test]
    async fn host_submission_completes_the_roster_and_generates() {
        let state = memory_state().await;
        let (lobby_id, _host, questions) = playing_lobby(&state).await;
        assert!(!questions.is_empty());
    }

    #[tokio::test]
    async fn all_submitted_check_counts_the_current_roster() {
        let state = memory_state().await;
        let entry = lobby_service::create_game(
            &state,
            CreateGameRequest {
                host_name: "Alice".into(),
                mode: GameModeDto::Trivia,
            },
        )
        .await
        .unwrap();
        lobby_service::start_game(&state, entry.lobby_id, entry.player_id)
            .await
            .unwrap();
        let guest = second_player(&state, entry.lobby_id, "Bob").await;

        // The host submits first: the guest has not, so nothing generates.
        let host_outcome = submit_favorites(
            &state,
            entry.lobby_id,
            SubmitFavoritesRequest {
                player_id: entry.player_id,
                titles: vec!["Heat".into()],
            },
        )
        .await
        .unwrap();
        assert!(!host_outcome.all_submitted);
        assert!(!host_outcome.questions_generated);

        // The guest completes the roster, but only the host triggers
        // generation.
        let guest_outcome = submit_favorites(
            &state,
            entry.lobby_id,
            SubmitFavoritesRequest {
                player_id: guest,
                titles: vec!["Alien".into()],
            },
        )
        .await
        .unwrap();
        assert!(guest_outcome.all_submitted);
        assert!(!guest_outcome.questions_generated);
    }

    #[tokio::test]
    async fn resubmitting_favorites_is_rejected() {
        let state = memory_state().await;
        let (lobby_id, host, _questions) = playing_lobby(&state).await;

        let err = submit_favorites(
            &state,
            lobby_id,
            SubmitFavoritesRequest {
                player_id: host,
                titles: vec!["Heat".into()],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn correct_answer_applies_base_time_and_streak_bonuses() {
        let state = memory_state().await;
        let (lobby_id, host, questions) = playing_lobby(&state).await;

        // Answer the first two correctly to build a streak of 2.
        for question in questions.iter().take(2) {
            answer_question(
                &state,
                lobby_id,
                AnswerRequest {
                    player_id: host,
                    question_id: question.id,
                    answer: question.correct_answer.clone(),
                    answer_time_ms: 20_000, // no time bonus
                },
            )
            .await
            .unwrap();
        }

        // Third correct answer: streak 3, streak bonus min(3*5, 25) = 15.
        let question = &questions[2];
        let outcome = answer_question(
            &state,
            lobby_id,
            AnswerRequest {
                player_id: host,
                question_id: question.id,
                answer: question.correct_answer.clone(),
                answer_time_ms: 20_000,
            },
        )
        .await
        .unwrap();

        assert!(outcome.is_correct);
        assert_eq!(outcome.streak, 3);
        assert_eq!(outcome.score_delta, question.points + 15);
    }

    #[tokio::test]
    async fn wrong_answer_resets_streak_without_score_change() {
        let state = memory_state().await;
        let (lobby_id, host, questions) = playing_lobby(&state).await;
        let question = &questions[0];

        let wrong = question
            .options
            .iter()
            .find(|o| **o != question.correct_answer)
            .unwrap()
            .clone();

        let outcome = answer_question(
            &state,
            lobby_id,
            AnswerRequest {
                player_id: host,
                question_id: question.id,
                answer: wrong,
                answer_time_ms: 5_000,
            },
        )
        .await
        .unwrap();

        assert!(!outcome.is_correct);
        assert_eq!(outcome.score_delta, 0);
        assert_eq!(outcome.streak, 0);

        let store = state.require_party_store().await.unwrap();
        let player = store.find_player(host).await.unwrap().unwrap();
        assert_eq!(player.score, 0);
        assert_eq!(player.incorrect_answers, 1);
        assert_eq!(player.streak, 0);
    }

    #[tokio::test]
    async fn answering_the_same_question_twice_is_rejected() {
        let state = memory_state().await;
        let (lobby_id, host, questions) = playing_lobby(&state).await;
        let question = &questions[0];

        answer_question(
            &state,
            lobby_id,
            AnswerRequest {
                player_id: host,
                question_id: question.id,
                answer: question.correct_answer.clone(),
                answer_time_ms: 5_000,
            },
        )
        .await
        .unwrap();

        let err = answer_question(
            &state,
            lobby_id,
            AnswerRequest {
                player_id: host,
                question_id: question.id,
                answer: question.correct_answer.clone(),
                answer_time_ms: 5_000,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn ending_the_game_is_host_only() {
        let state = memory_state().await;
        let (lobby_id, _host, _questions) = playing_lobby(&state).await;
        let guest = second_player(&state, lobby_id, "Bob").await;

        let err = end_game(&state, lobby_id, guest).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn time_bonus_scales_with_remaining_window() {
        assert_eq!(time_bonus(0, 20), TIME_BONUS_CAP);
        assert_eq!(time_bonus(10_000, 20), TIME_BONUS_CAP / 2);
        assert_eq!(time_bonus(20_000, 20), 0);
        assert_eq!(time_bonus(25_000, 20), 0);
        assert_eq!(time_bonus(5_000, 0), 0);
    }

    #[test]
    fn streak_bonus_needs_a_streak_and_caps_at_25() {
        assert_eq!(streak_bonus(0), 0);
        assert_eq!(streak_bonus(1), 0);
        assert_eq!(streak_bonus(2), 10);
        assert_eq!(streak_bonus(3), 15);
        assert_eq!(streak_bonus(5), 25);
        assert_eq!(streak_bonus(9), 25);
    }
}
