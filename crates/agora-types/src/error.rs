use std::time::Duration;

use thiserror::Error;

/// Everything a mailbox request can resolve to besides success.
///
/// Domain rejections (`NotFound`, `AlreadyExists`, `DuplicateUsername`) are
/// definite: the operation did not apply. `Timeout` is ambiguous: the handler
/// may still have run, or may yet run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: String },

    #[error("username already taken: {0}")]
    DuplicateUsername(String),

    #[error("{domain} did not reply within {after:?}")]
    Timeout { domain: &'static str, after: Duration },

    #[error("{domain} mailbox is closed")]
    Closed { domain: &'static str },

    #[error("{domain} answered with an unexpected reply")]
    Unhandled { domain: &'static str },
}

impl EngineError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    pub fn already_exists(kind: &'static str, id: impl Into<String>) -> Self {
        Self::AlreadyExists { kind, id: id.into() }
    }

    /// True when the outcome of the request is unknown to the caller.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_subject() {
        let err = EngineError::not_found("community", "golang");
        assert_eq!(err.to_string(), "community not found: golang");

        let err = EngineError::DuplicateUsername("alice".into());
        assert_eq!(err.to_string(), "username already taken: alice");
    }

    #[test]
    fn only_timeouts_are_ambiguous() {
        let timeout = EngineError::Timeout {
            domain: "identity",
            after: Duration::from_millis(10),
        };
        assert!(timeout.is_ambiguous());
        assert!(!EngineError::Closed { domain: "identity" }.is_ambiguous());
        assert!(!EngineError::already_exists("community", "rust").is_ambiguous());
    }
}
