use mongodb::options::ClientOptions;

use super::error::{MongoDaoError, MongoResult};

/// Parsed MongoDB connection settings.
#[derive(Clone)]
pub struct MongoConfig {
    /// Driver options parsed from the connection URI.
    pub options: ClientOptions,
    /// Database the collections live in.
    pub database_name: String,
}

impl MongoConfig {
    /// Build a config from a connection URI and an optional database name.
    pub async fn from_uri(uri: &str, db_name: Option<&str>) -> MongoResult<Self> {
        let database_name = db_name.unwrap_or("movie_night").to_owned();
        let options =
            ClientOptions::parse(uri)
                .await
                .map_err(|source| MongoDaoError::InvalidUri {
                    uri: uri.to_owned(),
                    source,
                })?;

        Ok(Self {
            options,
            database_name,
        })
    }
}
