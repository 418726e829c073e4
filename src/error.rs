//! Typed error kinds for the engine's load and command boundaries.

use std::path::PathBuf;

/// Errors raised at the scene/dissolve load boundary or the command boundary.
///
/// `ValidationError` and `ConfigError` never mutate state: the caller's prior
/// selection, library, and dissolve state are left exactly as they were.
/// `TransientIOError` only ever originates from a `Sink`; it never touches
/// `SceneManager` state either. `FatalInitError` is reserved for startup
/// failures a caller should treat as non-recoverable.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("malformed scene document at {path:?}: {reason}")]
    ConfigError { path: Option<PathBuf>, reason: String },

    #[error("invalid {field}: {reason}")]
    ValidationError { field: &'static str, reason: String },

    #[error("sink emit failed: {reason}")]
    TransientIOError { reason: String },

    #[error("fatal initialization failure: {reason}")]
    FatalInitError { reason: String },
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::ConfigError { path: None, reason: err.to_string() }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::ConfigError { path: None, reason: err.to_string() }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
