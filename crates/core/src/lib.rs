//! `hackathon-core` — shared domain building blocks.
//!
//! Identifiers, the closed domain error model and pagination math. No IO.

pub mod error;
pub mod id;
pub mod pagination;

pub use error::{DomainError, DomainResult, ErrorKind};
pub use id::{
    AssessmentId, CriterionId, EventId, InvitationId, JoinRequestId, ParticipantId, ProjectId,
    RegionId, TeamId, TechnologyId, UserId,
};
pub use pagination::{Page, Pagination, SortDirection, total_page};
