//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Coarse failure class, used by the HTTP boundary to pick a status code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthorized,
    Forbidden,
    DataNotFound,
    BadRequest,
    Internal,
}

/// Domain-level error.
///
/// Callers branch on the variant (or on [`DomainError::kind`]); there are no
/// sentinel values to compare against.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Missing, invalid or expired credentials, or an unresolvable identity.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but not allowed to do this.
    #[error("forbidden")]
    Forbidden,

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    DataNotFound(&'static str),

    #[error("event is not running")]
    EventNotRunning,

    #[error("team already has a project for this event")]
    TeamAlreadyHasProject,

    #[error("project status should be draft")]
    ProjectStatusShouldBeDraft,

    #[error("project status should be submitted")]
    ProjectStatusShouldBeSubmitted,

    /// A status value that the requested transition does not accept.
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// Malformed input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The request collides with existing state (duplicate membership, pending proposal, ...).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persistence or collaborator failure not otherwise classified.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn invalid_status(msg: impl Into<String>) -> Self {
        Self::InvalidStatus(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn not_found(entity: &'static str) -> Self {
        Self::DataNotFound(entity)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Unauthorized(_) => ErrorKind::Unauthorized,
            DomainError::Forbidden => ErrorKind::Forbidden,
            DomainError::DataNotFound(_) => ErrorKind::DataNotFound,
            DomainError::EventNotRunning
            | DomainError::TeamAlreadyHasProject
            | DomainError::ProjectStatusShouldBeDraft
            | DomainError::ProjectStatusShouldBeSubmitted
            | DomainError::InvalidStatus(_)
            | DomainError::Validation(_)
            | DomainError::Conflict(_) => ErrorKind::BadRequest,
            DomainError::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_preconditions_are_bad_requests() {
        for err in [
            DomainError::EventNotRunning,
            DomainError::TeamAlreadyHasProject,
            DomainError::ProjectStatusShouldBeDraft,
            DomainError::ProjectStatusShouldBeSubmitted,
            DomainError::invalid_status("assessed"),
        ] {
            assert_eq!(err.kind(), ErrorKind::BadRequest, "{err}");
        }
    }

    #[test]
    fn access_errors_keep_their_kind() {
        assert_eq!(DomainError::unauthorized("expired").kind(), ErrorKind::Unauthorized);
        assert_eq!(DomainError::Forbidden.kind(), ErrorKind::Forbidden);
        assert_eq!(DomainError::not_found("project").kind(), ErrorKind::DataNotFound);
        assert_eq!(DomainError::internal("db down").kind(), ErrorKind::Internal);
    }

    #[test]
    fn not_found_message_names_the_entity() {
        assert_eq!(DomainError::not_found("criterion").to_string(), "criterion not found");
    }
}
