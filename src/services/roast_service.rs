//! Content generation: trivia questions, per-answer roasts, and the final
//! burn. Every path tries the configured LLM first and falls back to
//! deterministic templates, so generation never fails the user-visible flow;
//! only persistence errors surface.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, SystemTime},
};

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::{AppConfig, FallbackQuestion},
    dao::{
        models::{
            AnswerEntity, Difficulty, FavoriteMovieEntity, FinalBurnEntity, GameMode, GameStage,
            PlayerEntity, QuestionEntity, RoastEntity, ShameMovieEntity,
        },
        party_store::PartyStore,
    },
    dto::trivia::{FinalBurnSummary, GenerateQuestionsResponse, RoastGenerateRequest, RoastSummary},
    error::ServiceError,
    llm::{
        CompletionRequest, LlmProvider,
        templates::{BurnContext, RoastContext, fallback_final_burn, fallback_roast},
    },
    services::{feed_events, lobby_service},
    state::{
        SharedState,
        stage::{self, StageEvent},
    },
};

const ROAST_SYSTEM: &str = "You are a hilarious but slightly mean movie trivia host. \
    Your job is to roast players when they get a question wrong. Make your roasts funny, \
    movie-related, and tailored to the specific player and question. Keep responses under \
    120 characters.";

const BURN_SYSTEM: &str = "You are a sarcastic movie trivia host presenting a final roast \
    at the end of the game. Create a funny, mildly brutal roast of the player who performed \
    worst. Be cleverly mean but good-natured. Limit your response to 400 characters.";

const QUESTION_SYSTEM: &str = "You write multiple-choice movie trivia questions with exactly \
    four diverse, plausible options and one clearly correct answer.";

/// Maximum favorites per player that get a dedicated question.
const QUESTIONS_PER_PLAYER: usize = 2;

/// Generate and persist the trivia set for a lobby, flipping its stage to
/// playing. Re-running against a lobby that already has questions returns
/// the existing set, so a duplicated trigger cannot double-generate.
pub async fn generate_questions(
    state: &SharedState,
    lobby_id: Uuid,
) -> Result<GenerateQuestionsResponse, ServiceError> {
    let store = state.require_party_store().await?;
    let mut lobby = lobby_service::require_lobby(&store, lobby_id).await?;

    if lobby.mode != GameMode::Trivia {
        return Err(ServiceError::InvalidState(
            "question generation only applies to trivia lobbies".into(),
        ));
    }
    if lobby.stage == GameStage::Open {
        return Err(ServiceError::InvalidState(
            "the game has not started yet".into(),
        ));
    }
    if lobby.stage == GameStage::Ended {
        return Err(ServiceError::InvalidState("the game already ended".into()));
    }

    let existing = store.list_questions(lobby_id).await?;
    if !existing.is_empty() {
        return Ok(GenerateQuestionsResponse {
            generated: 0,
            questions: existing.into_iter().map(Into::into).collect(),
        });
    }

    let players = store.list_players(lobby_id).await?;
    let favorites = store
        .list_favorites_for_players(players.iter().map(|p| p.id).collect())
        .await?;

    let target = lobby.config.question_count as usize;
    let mut questions = match state.llm() {
        Some(provider) => {
            llm_question_set(&provider, state.config(), &players, &favorites, target).await
        }
        None => {
            info!(lobby_id = %lobby_id, "no LLM configured; using fallback question set");
            Vec::new()
        }
    };

    if questions.is_empty() {
        questions = state
            .config()
            .fallback_questions()
            .iter()
            .map(|fallback| entity_from_fallback(lobby_id, fallback))
            .collect();
    }
    questions.truncate(target.max(1));

    // Stagger the stamps so the list order survives storage round trips.
    let base = SystemTime::now();
    for (index, question) in questions.iter_mut().enumerate() {
        question.lobby_id = lobby_id;
        question.created_at = base + Duration::from_millis(index as u64);
    }

    store.save_questions(questions.clone()).await?;
    for question in &questions {
        feed_events::question_inserted(state, question);
    }

    if lobby.stage == GameStage::Collecting {
        lobby.stage = stage::next(lobby.stage, StageEvent::ContentReady)?;
        store.save_lobby(lobby.clone()).await?;
        feed_events::lobby_updated(state, &lobby);
    }

    info!(lobby_id = %lobby_id, count = questions.len(), "trivia questions generated");

    Ok(GenerateQuestionsResponse {
        generated: questions.len(),
        questions: questions.into_iter().map(Into::into).collect(),
    })
}

/// Generate and persist a roast for one wrong answer. The roast text always
/// exists; only the persistence write can fail.
pub async fn generate_roast(
    state: &SharedState,
    lobby_id: Uuid,
    request: RoastGenerateRequest,
) -> Result<RoastSummary, ServiceError> {
    let store = state.require_party_store().await?;
    lobby_service::require_lobby(&store, lobby_id).await?;
    let mut player = lobby_service::require_member(&store, lobby_id, request.player_id).await?;

    let history = store.list_answers_by_player(request.player_id).await?;
    let mistake_count = history.iter().take(10).filter(|a| !a.is_correct).count() as u32;
    let favorites = store.list_favorites_by_player(request.player_id).await?;
    let favorite_titles: Vec<&str> = favorites.iter().map(|f| f.movie_title.as_str()).collect();

    let context = RoastContext {
        player_name: &request.player_name,
        wrong_answer: &request.wrong_answer,
        correct_answer: &request.correct_answer,
        // The miss being roasted is already in the history.
        mistake_count: mistake_count.saturating_sub(1),
        favorite_movie: favorite_titles.first().copied(),
    };

    let content = match state.llm() {
        Some(provider) => {
            let prompt = format!(
                "The player {} just got a movie trivia question wrong.\n\
                 Question: \"{}\"\n\
                 Their wrong answer: \"{}\"\n\
                 The correct answer: \"{}\"\n\
                 This is wrong answer number {} for them.\n\
                 {}\n\
                 Generate a short, witty roast (max 120 characters).",
                request.player_name,
                request.question,
                request.wrong_answer,
                request.correct_answer,
                mistake_count.max(1),
                if favorite_titles.is_empty() {
                    String::new()
                } else {
                    format!("Their favorite movies include: {}.", favorite_titles.join(", "))
                },
            );

            match provider
                .complete(CompletionRequest {
                    system: ROAST_SYSTEM.to_string(),
                    prompt,
                    max_tokens: 120,
                    temperature: 0.8,
                    timeout: Duration::from_secs(30),
                })
                .await
            {
                Ok(text) => trim_quotes(&text),
                Err(err) => {
                    warn!(error = %err, "roast generation failed; using fallback template");
                    fallback_roast(&context)
                }
            }
        }
        None => fallback_roast(&context),
    };

    let roast = RoastEntity {
        id: Uuid::new_v4(),
        player_id: request.player_id,
        question_id: request.question_id,
        content,
        created_at: SystemTime::now(),
    };
    store.save_roast(roast.clone()).await?;
    feed_events::roast_inserted(state, lobby_id, &roast);

    if !player.has_been_roasted {
        player.has_been_roasted = true;
        store.save_player(player.clone()).await?;
        feed_events::player_updated(state, &player);
    }

    Ok(roast.into())
}

/// Generate the final burn, record the shame list, and mark the lobby ended.
/// Re-running after the lobby ended returns the existing burn.
pub async fn generate_final_burn(
    state: &SharedState,
    lobby_id: Uuid,
) -> Result<FinalBurnSummary, ServiceError> {
    let store = state.require_party_store().await?;
    let mut lobby = lobby_service::require_lobby(&store, lobby_id).await?;

    if let Some(existing) = store.find_final_burn(lobby_id).await? {
        return Ok(existing.into());
    }
    if lobby.started_at.is_none() {
        return Err(ServiceError::InvalidState(
            "cannot end a game that never started".into(),
        ));
    }

    let players = store.list_players(lobby_id).await?;
    if players.is_empty() {
        return Err(ServiceError::InvalidState(
            "cannot roast an empty lobby".into(),
        ));
    }

    let worst = players
        .iter()
        .min_by_key(|p| (p.score, p.created_at))
        .expect("players is non-empty");
    let best = players
        .iter()
        .max_by_key(|p| (p.score, std::cmp::Reverse(p.created_at)))
        .expect("players is non-empty");

    let player_ids: Vec<Uuid> = players.iter().map(|p| p.id).collect();
    let answers = store.list_answers_for_players(player_ids.clone()).await?;
    let favorites = store.list_favorites_for_players(player_ids).await?;

    let worst_favorites: Vec<&str> = favorites
        .iter()
        .filter(|f| f.player_id == worst.id)
        .map(|f| f.movie_title.as_str())
        .collect();
    let wrong_answers = answers
        .iter()
        .filter(|a| a.player_id == worst.id && !a.is_correct)
        .count() as u32;

    let context = BurnContext {
        worst_name: &worst.name,
        worst_score: worst.score,
        wrong_answers,
        player_count: players.len(),
        favorite_movie: worst_favorites.first().copied(),
        best_name: &best.name,
        best_score: best.score,
    };

    let content = match state.llm() {
        Some(provider) => {
            let prompt = format!(
                "Create a final roast for the worst player of our movie trivia game.\n\
                 - {} came in last with {} points and {} wrong answers\n\
                 {}\
                 - The best player ({}) scored {} points out of {} players total.\n\
                 Write a funny, movie-themed roast (max 400 characters).",
                worst.name,
                worst.score,
                wrong_answers,
                if worst_favorites.is_empty() {
                    String::new()
                } else {
                    format!(
                        "- Their favorite movies include: {}\n",
                        worst_favorites.join(", ")
                    )
                },
                best.name,
                best.score,
                players.len(),
            );

            match provider
                .complete(CompletionRequest {
                    system: BURN_SYSTEM.to_string(),
                    prompt,
                    max_tokens: 400,
                    temperature: 0.8,
                    timeout: Duration::from_secs(30),
                })
                .await
            {
                Ok(text) => text,
                Err(err) => {
                    warn!(error = %err, "final burn generation failed; using fallback template");
                    fallback_final_burn(&context)
                }
            }
        }
        None => fallback_final_burn(&context),
    };

    record_shame_movies(state, &store, lobby_id, &players, &answers).await?;

    let burn = FinalBurnEntity {
        id: Uuid::new_v4(),
        lobby_id,
        player_id: worst.id,
        content,
        created_at: SystemTime::now(),
    };
    store.save_final_burn(burn.clone()).await?;
    feed_events::final_burn_inserted(state, &burn);

    lobby.stage = stage::next(lobby.stage, StageEvent::End)?;
    lobby.ended_at = Some(SystemTime::now());
    store.save_lobby(lobby.clone()).await?;
    feed_events::lobby_updated(state, &lobby);

    info!(lobby_id = %lobby_id, roasted = %burn.player_id, "final burn delivered");

    Ok(burn.into())
}

/// Insert shame entries for the most-fumbled movie questions.
async fn record_shame_movies(
    state: &SharedState,
    store: &Arc<dyn PartyStore>,
    lobby_id: Uuid,
    players: &[PlayerEntity],
    answers: &[AnswerEntity],
) -> Result<(), ServiceError> {
    let questions = store.list_questions(lobby_id).await?;
    let by_id: HashMap<Uuid, &QuestionEntity> = questions.iter().map(|q| (q.id, q)).collect();

    let mut wrong_counts: HashMap<Uuid, usize> = HashMap::new();
    for answer in answers.iter().filter(|a| !a.is_correct) {
        *wrong_counts.entry(answer.player_id).or_default() += 1;
    }

    let mut shameful: Vec<&AnswerEntity> = answers
        .iter()
        .filter(|a| {
            !a.is_correct
                && by_id
                    .get(&a.question_id)
                    .is_some_and(|q| q.movie_title.is_some())
        })
        .collect();
    shameful.sort_by_key(|a| std::cmp::Reverse(wrong_counts.get(&a.player_id).copied()));
    shameful.truncate(3);

    for answer in shameful {
        let Some(question) = by_id.get(&answer.question_id) else {
            continue;
        };
        let Some(movie_title) = question.movie_title.clone() else {
            continue;
        };
        if !players.iter().any(|p| p.id == answer.player_id) {
            continue;
        }

        let shame = ShameMovieEntity {
            id: Uuid::new_v4(),
            lobby_id,
            player_id: answer.player_id,
            movie_title,
            reason: format!("Failed to answer \"{}\" correctly", question.question),
            created_at: SystemTime::now(),
        };
        store.save_shame_movie(shame).await?;
    }

    Ok(())
}

/// Shape the LLM must return for a single question.
#[derive(Debug, Deserialize)]
struct GeneratedQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: String,
    #[serde(default)]
    explanation: Option<String>,
}

/// Ask the LLM for one question per selected favorite plus general filler.
/// Individual failures are skipped; an empty result falls back to the
/// configured set at the call site.
async fn llm_question_set(
    provider: &Arc<dyn LlmProvider>,
    config: &AppConfig,
    players: &[PlayerEntity],
    favorites: &[FavoriteMovieEntity],
    target: usize,
) -> Vec<QuestionEntity> {
    let difficulties = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
    let mut items: Vec<Option<String>> = Vec::new();

    for player in players {
        let picks = favorites
            .iter()
            .filter(|f| f.player_id == player.id)
            .take(QUESTIONS_PER_PLAYER);
        for favorite in picks {
            items.push(Some(favorite.movie_title.clone()));
        }
    }
    while items.len() < target {
        items.push(None);
    }
    items.truncate(target.max(1));

    let mut questions = Vec::new();
    for (index, movie_title) in items.into_iter().enumerate() {
        let difficulty = difficulties[index % difficulties.len()];
        let subject = match &movie_title {
            Some(title) => format!("specifically about the movie \"{title}\""),
            None => "about general movie knowledge".to_string(),
        };
        let prompt = format!(
            "Generate a {difficulty:?}-difficulty multiple-choice movie trivia question {subject}. \
             Respond with JSON only, in this format:\n\
             {{\"question\": \"...\", \"options\": [\"A\", \"B\", \"C\", \"D\"], \
             \"correct_answer\": \"...\", \"explanation\": \"...\"}}\n\
             The correct_answer must exactly match one of the four options.",
        );

        let completion = provider
            .complete(CompletionRequest {
                system: QUESTION_SYSTEM.to_string(),
                prompt,
                max_tokens: 500,
                temperature: 0.7,
                timeout: Duration::from_secs(30),
            })
            .await;

        match completion {
            Ok(text) => match parse_generated_question(&text) {
                Some(generated) => questions.push(QuestionEntity {
                    id: Uuid::new_v4(),
                    lobby_id: Uuid::nil(), // stamped by the caller
                    question: generated.question,
                    options: generated.options,
                    correct_answer: generated.correct_answer,
                    explanation: generated.explanation,
                    movie_title,
                    difficulty,
                    points: difficulty.base_points(),
                    created_at: SystemTime::now(),
                }),
                None => warn!("discarding malformed generated question"),
            },
            Err(err) => warn!(error = %err, "question generation call failed; skipping"),
        }
    }

    // Never hand back a partial set smaller than the fallback would be.
    if questions.len() < config.fallback_questions().len().min(target) {
        questions.clear();
    }
    questions
}

/// Parse a generated question out of an LLM completion, tolerating prose
/// around the JSON object. Returns `None` when the payload is unusable.
fn parse_generated_question(text: &str) -> Option<GeneratedQuestion> {
    let candidate = match serde_json::from_str::<GeneratedQuestion>(text) {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            let start = text.find('{')?;
            let end = text.rfind('}')?;
            serde_json::from_str::<GeneratedQuestion>(&text[start..=end]).ok()
        }
    }?;

    if candidate.options.len() != 4 {
        return None;
    }
    if !candidate.options.contains(&candidate.correct_answer) {
        return None;
    }
    Some(candidate)
}

fn entity_from_fallback(lobby_id: Uuid, fallback: &FallbackQuestion) -> QuestionEntity {
    QuestionEntity {
        id: Uuid::new_v4(),
        lobby_id,
        question: fallback.question.clone(),
        options: fallback.options.clone(),
        correct_answer: fallback.correct_answer.clone(),
        explanation: fallback.explanation.clone(),
        movie_title: None,
        difficulty: fallback.difficulty,
        points: fallback.difficulty.base_points(),
        created_at: SystemTime::now(),
    }
}

fn trim_quotes(text: &str) -> String {
    text.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::{common::GameModeDto, lobby::CreateGameRequest},
        services::{lobby_service, testing::memory_state},
    };

    async fn started_trivia_lobby(state: &SharedState) -> (Uuid, Uuid) {
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
        (entry.lobby_id, entry.player_id)
    }

    #[tokio::test]
    async fn no_llm_key_yields_the_fallback_question_set() {
        let state = memory_state().await;
        let (lobby_id, _host) = started_trivia_lobby(&state).await;

        let response = generate_questions(&state, lobby_id).await.unwrap();
        assert!(response.generated > 0);
        for question in &response.questions {
            assert_eq!(question.options.len(), 4);
            assert!(question.options.contains(&question.correct_answer));
        }

        let store = state.require_party_store().await.unwrap();
        let lobby = store.find_lobby(lobby_id).await.unwrap().unwrap();
        assert_eq!(lobby.stage, GameStage::Playing);
    }

    #[tokio::test]
    async fn regeneration_returns_the_existing_set() {
        let state = memory_state().await;
        let (lobby_id, _host) = started_trivia_lobby(&state).await;

        let first = generate_questions(&state, lobby_id).await.unwrap();
        let second = generate_questions(&state, lobby_id).await.unwrap();

        assert_eq!(second.generated, 0);
        assert_eq!(first.questions.len(), second.questions.len());
    }

    #[tokio::test]
    async fn generation_requires_a_started_lobby() {
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

        let err = generate_questions(&state, entry.lobby_id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn roast_without_llm_uses_the_template_and_is_persisted() {
        let state = memory_state().await;
        let (lobby_id, host_id) = started_trivia_lobby(&state).await;

        let roast = generate_roast(
            &state,
            lobby_id,
            RoastGenerateRequest {
                player_id: host_id,
                question_id: Uuid::new_v4(),
                player_name: "Alice".into(),
                question: "Who directed Pulp Fiction?".into(),
                wrong_answer: "Steven Spielberg".into(),
                correct_answer: "Quentin Tarantino".into(),
            },
        )
        .await
        .unwrap();

        assert!(!roast.content.is_empty());

        let store = state.require_party_store().await.unwrap();
        let player = store.find_player(host_id).await.unwrap().unwrap();
        assert!(player.has_been_roasted);
    }

    #[tokio::test]
    async fn final_burn_targets_the_lowest_scorer_and_ends_the_lobby() {
        let state = memory_state().await;
        let (lobby_id, host_id) = started_trivia_lobby(&state).await;

        let store = state.require_party_store().await.unwrap();
        let mut host = store.find_player(host_id).await.unwrap().unwrap();
        host.score = 500;
        store.save_player(host).await.unwrap();
        let loser = crate::services::testing::second_player(&state, lobby_id, "Bob").await;

        let burn = generate_final_burn(&state, lobby_id).await.unwrap();
        assert_eq!(burn.player_id, loser);
        assert!(burn.content.contains("Bob"));

        let lobby = store.find_lobby(lobby_id).await.unwrap().unwrap();
        assert!(lobby.ended_at.is_some());
        assert_eq!(lobby.stage, GameStage::Ended);

        // Ending twice hands back the same burn.
        let again = generate_final_burn(&state, lobby_id).await.unwrap();
        assert_eq!(again.id, burn.id);
    }

    #[test]
    fn generated_question_parsing_enforces_the_contract() {
        let valid = r#"{"question": "Q?", "options": ["A", "B", "C", "D"], "correct_answer": "B", "explanation": "because"}"#;
        assert!(parse_generated_question(valid).is_some());

        let wrapped = format!("Here you go:\n{valid}\nEnjoy!");
        assert!(parse_generated_question(&wrapped).is_some());

        let three_options = r#"{"question": "Q?", "options": ["A", "B", "C"], "correct_answer": "B"}"#;
        assert!(parse_generated_question(three_options).is_none());

        let stray_answer =
            r#"{"question": "Q?", "options": ["A", "B", "C", "D"], "correct_answer": "E"}"#;
        assert!(parse_generated_question(stray_answer).is_none());

        assert!(parse_generated_question("not json at all").is_none());
    }
}
