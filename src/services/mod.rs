/// Emoji chat persistence and fan-out.
pub mod chat_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Typed change-feed broadcast helpers.
pub mod feed_events;
/// Health check service.
pub mod health_service;
/// Join-code generation and allocation.
pub mod join_codes;
/// Lobby lifecycle: create, join, start, snapshots.
pub mod lobby_service;
/// Prediction-mode gameplay and the winner-reveal sequence.
pub mod oscars_service;
/// LLM-backed content generation with deterministic fallbacks.
pub mod roast_service;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervision and degraded-mode handling.
pub mod storage_supervisor;
/// Trivia gameplay: favorites, answers, scoring.
pub mod trivia_service;

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for service tests: an [`AppState`] backed by the
    //! in-memory store and no LLM provider.

    use std::sync::Arc;

    use uuid::Uuid;

    use crate::{
        config::AppConfig,
        dao::party_store::memory::MemoryPartyStore,
        dto::lobby::JoinGameRequest,
        services::lobby_service,
        state::{AppState, SharedState},
    };

    /// Application state with a fresh in-memory store installed.
    pub async fn memory_state() -> SharedState {
        let state = AppState::new(AppConfig::default(), None);
        state
            .install_party_store(Arc::new(MemoryPartyStore::new()))
            .await;
        state
    }

    /// Join a second player into an existing lobby through the real join
    /// flow, returning their id.
    pub async fn second_player(state: &SharedState, lobby_id: Uuid, name: &str) -> Uuid {
        let store = state.require_party_store().await.unwrap();
        let lobby = store.find_lobby(lobby_id).await.unwrap().unwrap();

        lobby_service::join_game(
            state,
            JoinGameRequest {
                game_code: lobby.code,
                player_name: name.into(),
            },
        )
        .await
        .unwrap()
        .player_id
    }
}
