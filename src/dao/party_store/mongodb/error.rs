//! Error types shared by the MongoDB storage implementation.

use mongodb::error::Error as MongoError;
use thiserror::Error;

/// Convenient result alias returning [`MongoDaoError`] failures.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// The offending URI.
        uri: String,
        /// Driver-level cause.
        #[source]
        source: MongoError,
    },
    /// Building the driver client failed.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver-level cause.
        #[source]
        source: MongoError,
    },
    /// The initial connectivity ping never succeeded.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Driver-level cause.
        #[source]
        source: MongoError,
    },
    /// A health-check ping failed on an established connection.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver-level cause.
        #[source]
        source: MongoError,
    },
    /// Creating a required index failed.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection the index belongs to.
        collection: &'static str,
        /// Index key description.
        index: &'static str,
        /// Driver-level cause.
        #[source]
        source: MongoError,
    },
    /// A write (insert/replace/delete) against a collection failed.
    #[error("failed to write to collection `{collection}`")]
    Write {
        /// Target collection.
        collection: &'static str,
        /// Driver-level cause.
        #[source]
        source: MongoError,
    },
    /// A read (find/list) against a collection failed.
    #[error("failed to read from collection `{collection}`")]
    Read {
        /// Target collection.
        collection: &'static str,
        /// Driver-level cause.
        #[source]
        source: MongoError,
    },
}
