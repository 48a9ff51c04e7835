//! Lobby lifecycle: creation with a unique join code, joining by code,
//! the host-only start transition, and snapshot reads.

use std::{sync::Arc, time::SystemTime};

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        models::{GameMode, GameStage, LobbyEntity, PlayerEntity},
        party_store::PartyStore,
    },
    dto::{
        format_system_time,
        lobby::{
            CreateGameRequest, GameEntryResponse, JoinGameRequest, LobbySummary, PlayerSummary,
            StartGameResponse,
        },
        trivia::ResultsResponse,
    },
    error::ServiceError,
    services::{feed_events, join_codes, oscars_service},
    state::{
        SharedState,
        stage::{self, StageEvent},
    },
};

/// Create a lobby and its host player, returning the identity the client
/// stores for the session.
///
/// The host player id doubles as the lobby's `host_id`. If the player write
/// fails the lobby row is deleted again; this is the one compensated
/// multi-write sequence in the system.
pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameEntryResponse, ServiceError> {
    let host_name = request.host_name.trim().to_string();
    if host_name.is_empty() {
        return Err(ServiceError::InvalidInput(
            "host name must not be empty".into(),
        ));
    }

    let store = state.require_party_store().await?;
    let code = join_codes::allocate(&store).await?;
    let host_id = Uuid::new_v4();

    let lobby = LobbyEntity {
        id: Uuid::new_v4(),
        code: code.clone(),
        host_id,
        mode: request.mode.into(),
        stage: GameStage::Open,
        config: state.config().lobby_defaults(),
        created_at: SystemTime::now(),
        started_at: None,
        ended_at: None,
    };
    store.save_lobby(lobby.clone()).await?;

    let host = PlayerEntity {
        id: host_id,
        lobby_id: lobby.id,
        name: host_name,
        is_host: true,
        score: 0,
        streak: 0,
        correct_answers: 0,
        incorrect_answers: 0,
        has_been_roasted: false,
        created_at: SystemTime::now(),
    };

    if let Err(err) = store.save_player(host.clone()).await {
        // Compensate so the allocated code does not point at a hostless
        // lobby forever.
        if let Err(cleanup_err) = store.delete_lobby(lobby.id).await {
            warn!(
                lobby_id = %lobby.id,
                error = %cleanup_err,
                "failed to delete lobby after host creation failure"
            );
        }
        return Err(err.into());
    }

    if lobby.mode == GameMode::Predictions {
        oscars_service::seed_awards(&store, lobby.id, state.config()).await?;
    }

    feed_events::player_inserted(state, &host);
    info!(lobby_id = %lobby.id, code = %code, "lobby created");

    Ok(GameEntryResponse {
        lobby_id: lobby.id,
        player_id: host.id,
        lobby_code: code,
    })
}

/// Join an existing lobby by code, creating a non-host player.
pub async fn join_game(
    state: &SharedState,
    request: JoinGameRequest,
) -> Result<GameEntryResponse, ServiceError> {
    let player_name = request.player_name.trim().to_string();
    if player_name.is_empty() {
        return Err(ServiceError::InvalidInput(
            "player name must not be empty".into(),
        ));
    }

    let store = state.require_party_store().await?;
    let code = join_codes::normalize(&request.game_code);

    let lobby = store
        .find_lobby_by_code(code.clone())
        .await?
        .ok_or_else(|| ServiceError::NotFound("invalid game code".into()))?;

    if lobby.ended_at.is_some() {
        return Err(ServiceError::InvalidState(
            "this game has already ended".into(),
        ));
    }

    let player = PlayerEntity {
        id: Uuid::new_v4(),
        lobby_id: lobby.id,
        name: player_name,
        is_host: false,
        score: 0,
        streak: 0,
        correct_answers: 0,
        incorrect_answers: 0,
        has_been_roasted: false,
        created_at: SystemTime::now(),
    };
    store.save_player(player.clone()).await?;

    feed_events::player_inserted(state, &player);
    info!(lobby_id = %lobby.id, player_id = %player.id, "player joined");

    Ok(GameEntryResponse {
        lobby_id: lobby.id,
        player_id: player.id,
        lobby_code: code,
    })
}

/// Fetch a lobby snapshot by join code.
pub async fn get_lobby_by_code(
    state: &SharedState,
    code: &str,
) -> Result<LobbySummary, ServiceError> {
    let store = state.require_party_store().await?;
    let lobby = store
        .find_lobby_by_code(join_codes::normalize(code))
        .await?
        .ok_or_else(|| ServiceError::NotFound("invalid game code".into()))?;
    Ok(lobby.into())
}

/// Fetch the roster of a lobby ordered by join time.
pub async fn list_players(
    state: &SharedState,
    lobby_id: Uuid,
) -> Result<Vec<PlayerSummary>, ServiceError> {
    let store = state.require_party_store().await?;
    require_lobby(&store, lobby_id).await?;
    let players = store.list_players(lobby_id).await?;
    Ok(players.into_iter().map(Into::into).collect())
}

/// Start the game. Host-only; a second start is an idempotent no-op so a
/// duplicate host tab cannot fail the flow.
pub async fn start_game(
    state: &SharedState,
    lobby_id: Uuid,
    player_id: Uuid,
) -> Result<StartGameResponse, ServiceError> {
    let store = state.require_party_store().await?;
    let mut lobby = require_lobby(&store, lobby_id).await?;
    ensure_host(&store, &lobby, player_id).await?;

    if let Some(started_at) = lobby.started_at {
        return Ok(StartGameResponse {
            started_at: format_system_time(started_at),
            stage: lobby.stage.into(),
        });
    }

    lobby.stage = stage::next(lobby.stage, StageEvent::Start)?;
    lobby.started_at = Some(SystemTime::now());
    store.save_lobby(lobby.clone()).await?;

    feed_events::lobby_updated(state, &lobby);
    info!(lobby_id = %lobby.id, "game started");

    Ok(StartGameResponse {
        started_at: lobby
            .started_at
            .map(format_system_time)
            .unwrap_or_default(),
        stage: lobby.stage.into(),
    })
}

/// End-of-game results: final burn, shame list, leaderboard.
pub async fn get_results(
    state: &SharedState,
    lobby_id: Uuid,
) -> Result<ResultsResponse, ServiceError> {
    let store = state.require_party_store().await?;
    require_lobby(&store, lobby_id).await?;

    let final_burn = store.find_final_burn(lobby_id).await?.map(Into::into);
    let shame_movies = store
        .list_shame_movies(lobby_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let mut players = store.list_players(lobby_id).await?;
    players.sort_by_key(|p| std::cmp::Reverse(p.score));

    Ok(ResultsResponse {
        final_burn,
        shame_movies,
        leaderboard: players.into_iter().map(Into::into).collect(),
    })
}

/// Resolve a lobby or fail with not-found.
pub(crate) async fn require_lobby(
    store: &Arc<dyn PartyStore>,
    lobby_id: Uuid,
) -> Result<LobbyEntity, ServiceError> {
    store
        .find_lobby(lobby_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("lobby `{lobby_id}` not found")))
}

/// Resolve a player and check they belong to the lobby.
pub(crate) async fn require_member(
    store: &Arc<dyn PartyStore>,
    lobby_id: Uuid,
    player_id: Uuid,
) -> Result<PlayerEntity, ServiceError> {
    let player = store
        .find_player(player_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("player `{player_id}` not found")))?;

    if player.lobby_id != lobby_id {
        return Err(ServiceError::InvalidInput(
            "player does not belong to this lobby".into(),
        ));
    }

    Ok(player)
}

/// Resolve the acting player and check they host the given lobby.
pub(crate) async fn ensure_host(
    store: &Arc<dyn PartyStore>,
    lobby: &LobbyEntity,
    player_id: Uuid,
) -> Result<PlayerEntity, ServiceError> {
    let player = require_member(store, lobby.id, player_id).await?;
    if !player.is_host {
        return Err(ServiceError::Unauthorized(
            "only the host can perform this action".into(),
        ));
    }
    Ok(player)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::common::GameModeDto,
        services::testing::{memory_state, second_player},
    };

    fn create_request(name: &str, mode: GameModeDto) -> CreateGameRequest {
        CreateGameRequest {
            host_name: name.into(),
            mode,
        }
    }

    #[tokio::test]
    async fn created_lobby_round_trips_by_code() {
        let state = memory_state().await;
        let entry = create_game(&state, create_request("Alice", GameModeDto::Trivia))
            .await
            .unwrap();

        assert_eq!(entry.lobby_code.len(), join_codes::CODE_LENGTH);

        let summary = get_lobby_by_code(&state, &entry.lobby_code).await.unwrap();
        assert_eq!(summary.host_id, entry.player_id);
        assert!(summary.started_at.is_none());
    }

    #[tokio::test]
    async fn join_flow_produces_one_host_and_one_guest() {
        let state = memory_state().await;
        let host = create_game(&state, create_request("Alice", GameModeDto::Trivia))
            .await
            .unwrap();

        let guest = join_game(
            &state,
            JoinGameRequest {
                game_code: host.lobby_code.to_lowercase(),
                player_name: "Bob".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(guest.lobby_id, host.lobby_id);

        let roster = list_players(&state, host.lobby_id).await.unwrap();
        assert_eq!(roster.len(), 2);
        let hosts: Vec<_> = roster.iter().filter(|p| p.is_host).collect();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].name, "Alice");
    }

    #[tokio::test]
    async fn join_with_unknown_code_is_not_found() {
        let state = memory_state().await;
        let err = join_game(
            &state,
            JoinGameRequest {
                game_code: "WXYZ".into(),
                player_name: "Bob".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn start_game_is_host_only_and_idempotent() {
        let state = memory_state().await;
        let entry = create_game(&state, create_request("Alice", GameModeDto::Trivia))
            .await
            .unwrap();
        let guest = second_player(&state, entry.lobby_id, "Bob").await;

        let err = start_game(&state, entry.lobby_id, guest)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        let first = start_game(&state, entry.lobby_id, entry.player_id)
            .await
            .unwrap();
        // Duplicate host tab: the second start succeeds and reports the
        // original timestamp instead of failing.
        let second = start_game(&state, entry.lobby_id, entry.player_id)
            .await
            .unwrap();
        assert_eq!(first.started_at, second.started_at);
    }

    #[tokio::test]
    async fn prediction_lobbies_are_seeded_with_awards() {
        let state = memory_state().await;
        let entry = create_game(&state, create_request("Alice", GameModeDto::Predictions))
            .await
            .unwrap();

        let store = state.require_party_store().await.unwrap();
        let categories = store.list_categories(entry.lobby_id).await.unwrap();
        assert!(!categories.is_empty());

        let nominees = store.list_nominees(categories[0].id).await.unwrap();
        assert!(nominees.len() >= 2);
        assert!(nominees.iter().all(|n| !n.is_winner));
    }
}
