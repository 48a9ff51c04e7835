//! Typed helpers publishing change events onto a lobby's feed. Every
//! committed write flows through one of these so subscribers always observe
//! the same tagged payloads.

use uuid::Uuid;

use crate::{
    dao::models::{
        CategoryEntity, ChatMessageEntity, FavoriteMovieEntity, FinalBurnEntity, LobbyEntity,
        NomineeEntity, PlayerEntity, QuestionEntity, RoastEntity,
    },
    state::{
        SharedState,
        feed::{ChangeEvent, RowChange},
    },
};

/// Fan out a lobby row update (start, stage flip, end).
pub fn lobby_updated(state: &SharedState, lobby: &LobbyEntity) {
    publish(state, lobby.id, ChangeEvent::Lobby(RowChange::Updated(lobby.clone())));
}

/// Fan out a freshly joined player.
pub fn player_inserted(state: &SharedState, player: &PlayerEntity) {
    publish(
        state,
        player.lobby_id,
        ChangeEvent::Player(RowChange::Inserted(player.clone())),
    );
}

/// Fan out a player row change (score, streak, counters).
pub fn player_updated(state: &SharedState, player: &PlayerEntity) {
    publish(
        state,
        player.lobby_id,
        ChangeEvent::Player(RowChange::Updated(player.clone())),
    );
}

/// Fan out a category change (lock, reveal progress).
pub fn category_updated(state: &SharedState, category: &CategoryEntity) {
    publish(
        state,
        category.lobby_id,
        ChangeEvent::Category(RowChange::Updated(category.clone())),
    );
}

/// Fan out a nominee winner-flag change.
pub fn nominee_updated(state: &SharedState, lobby_id: Uuid, nominee: &NomineeEntity) {
    publish(
        state,
        lobby_id,
        ChangeEvent::Nominee(RowChange::Updated(nominee.clone())),
    );
}

/// Fan out a generated question.
pub fn question_inserted(state: &SharedState, question: &QuestionEntity) {
    publish(
        state,
        question.lobby_id,
        ChangeEvent::Question(RowChange::Inserted(question.clone())),
    );
}

/// Fan out a roast. The roast row carries no lobby id, so the caller names
/// the stream.
pub fn roast_inserted(state: &SharedState, lobby_id: Uuid, roast: &RoastEntity) {
    publish(
        state,
        lobby_id,
        ChangeEvent::Roast(RowChange::Inserted(roast.clone())),
    );
}

/// Fan out the final burn.
pub fn final_burn_inserted(state: &SharedState, burn: &FinalBurnEntity) {
    publish(
        state,
        burn.lobby_id,
        ChangeEvent::FinalBurn(RowChange::Inserted(burn.clone())),
    );
}

/// Fan out a submitted favorite movie. Like roasts, favorites carry only a
/// player id.
pub fn favorite_inserted(state: &SharedState, lobby_id: Uuid, favorite: &FavoriteMovieEntity) {
    publish(
        state,
        lobby_id,
        ChangeEvent::FavoriteMovie(RowChange::Inserted(favorite.clone())),
    );
}

/// Fan out an emoji chat message.
pub fn chat_inserted(state: &SharedState, message: &ChatMessageEntity) {
    publish(
        state,
        message.lobby_id,
        ChangeEvent::ChatMessage(RowChange::Inserted(message.clone())),
    );
}

fn publish(state: &SharedState, lobby_id: Uuid, event: ChangeEvent) {
    state.feed().publish(lobby_id, event);
}
