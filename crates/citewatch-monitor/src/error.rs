use thiserror::Error;
use uuid::Uuid;

use citewatch_core::PlatformId;

/// Error taxonomy of the monitoring core.
///
/// `InvalidRequest`, `SessionNotReady` and `SessionNotFound` surface
/// synchronously to the caller. The per-platform kinds are contained:
/// recorded against their platform inside a running session, they only
/// escalate to a failed session when every requested platform fails.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("rate limit exceeded for platform '{platform}'")]
    RateLimitExceeded { platform: PlatformId },

    #[error("platform '{platform}' unavailable: {message}")]
    PlatformUnavailable {
        platform: PlatformId,
        message: String,
    },

    #[error("citation extraction failed for platform '{platform}': {message}")]
    ExtractionError {
        platform: PlatformId,
        message: String,
    },

    #[error("session {0} is not ready; results are available once it reaches a terminal status")]
    SessionNotReady(Uuid),

    #[error("session {0} not found")]
    SessionNotFound(Uuid),
}
