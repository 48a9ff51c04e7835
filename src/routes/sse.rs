use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::Sse,
    routing::get,
};
use futures::Stream;
use tracing::info;
use uuid::Uuid;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/lobbies/{id}",
    tag = "sse",
    params(("id" = Uuid, Path, description = "Lobby whose change feed to stream")),
    responses((status = 200, description = "Typed change-event stream for one lobby", content_type = "text/event-stream", body = String))
)]
/// Stream a lobby's row-level change events to a connected client.
pub async fn lobby_stream(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_lobby(&state, id);
    info!(lobby_id = %id, "new lobby SSE connection");
    sse_service::to_sse_stream(state, id, receiver)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/lobbies/{id}", get(lobby_stream))
}
