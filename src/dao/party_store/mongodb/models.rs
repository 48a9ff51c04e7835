use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{GameMode, GameStage, LobbyConfigEntity, LobbyEntity};

/// Lobby row as stored in MongoDB; timestamps converted to native bson dates
/// so TTL/inspection tooling can read them. The remaining collections store
/// their entities directly through serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoLobbyDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    code: String,
    host_id: Uuid,
    mode: GameMode,
    stage: GameStage,
    config: LobbyConfigEntity,
    created_at: DateTime,
    started_at: Option<DateTime>,
    ended_at: Option<DateTime>,
}

impl From<LobbyEntity> for MongoLobbyDocument {
    fn from(value: LobbyEntity) -> Self {
        Self {
            id: value.id,
            code: value.code,
            host_id: value.host_id,
            mode: value.mode,
            stage: value.stage,
            config: value.config,
            created_at: DateTime::from_system_time(value.created_at),
            started_at: value.started_at.map(DateTime::from_system_time),
            ended_at: value.ended_at.map(DateTime::from_system_time),
        }
    }
}

impl From<MongoLobbyDocument> for LobbyEntity {
    fn from(value: MongoLobbyDocument) -> Self {
        Self {
            id: value.id,
            code: value.code,
            host_id: value.host_id,
            mode: value.mode,
            stage: value.stage,
            config: value.config,
            created_at: value.created_at.to_system_time(),
            started_at: value.started_at.map(|at| at.to_system_time()),
            ended_at: value.ended_at.map(|at| at.to_system_time()),
        }
    }
}

/// Encode a UUID the way the driver stores `_id` binaries.
pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

/// Filter document selecting a row by its UUID primary key.
pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}
