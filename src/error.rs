//! Error types for cube_manager

use std::path::PathBuf;

/// Unified error type for cube operations
///
/// Expected conditions (unknown card, duplicate add, bad snapshot) each have
/// their own variant so the front end can tell the user exactly what went wrong.
#[derive(Debug, thiserror::Error)]
pub enum CubeError {
    /// Card id does not exist in the catalog
    #[error("Card not found: {0}")]
    NotFound(String),
    /// Card is already in the cube
    #[error("Card is already in the cube: {0}")]
    AlreadyMember(String),
    /// Card is not in the cube
    #[error("Card is not in the cube: {0}")]
    NotMember(String),
    /// The database could not be opened or initialised (fatal at startup)
    #[error("Storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Backup document is missing required fields or is not valid JSON
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),
    /// Tournament color identity is not 1-3 distinct inks
    #[error("Invalid color identity: {0}")]
    InvalidColorIdentity(String),
    /// Tournament reported without any deck cards
    #[error("Tournament deck list is empty")]
    EmptyDeck,
    /// Tournament id does not exist
    #[error("Tournament not found: {0}")]
    TournamentNotFound(i64),
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse or write JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for cube operations
pub type Result<T> = std::result::Result<T, CubeError>;
