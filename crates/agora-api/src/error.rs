use axum::http::StatusCode;
use tracing::{debug, warn};

use agora_types::EngineError;

/// Status code for an engine failure.
pub fn status_for(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
        EngineError::AlreadyExists { .. } | EngineError::DuplicateUsername(_) => {
            StatusCode::CONFLICT
        }
        EngineError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        EngineError::Closed { .. } => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Unhandled { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `map_err` adapter for handlers: logs, then maps to a status code.
pub(crate) fn reject(err: EngineError) -> StatusCode {
    let status = status_for(&err);
    if status.is_server_error() {
        warn!("request failed: {}", err);
    } else {
        debug!("request rejected: {}", err);
    }
    status
}

pub(crate) fn require_text(value: &str) -> Result<(), StatusCode> {
    if value.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(())
}
