//! Application services: the only place workflow rules are enforced.
//!
//! Each service loads current state from its stores, asks the domain crate for
//! a decision, and persists the outcome. Nothing is cached between calls.

use hackathon_core::{DomainError, DomainResult};
use hackathon_infra::Stores;

pub mod assessments;
pub mod events;
pub mod projects;
pub mod reference;
pub mod teams;

pub use assessments::AssessmentService;
pub use events::EventService;
pub use projects::ProjectService;
pub use reference::ReferenceService;
pub use teams::TeamService;

/// Every service, built once at startup and shared by all handlers.
pub struct AppServices {
    pub events: EventService,
    pub teams: TeamService,
    pub projects: ProjectService,
    pub assessments: AssessmentService,
    pub reference: ReferenceService,
    pub default_page_limit: u32,
}

impl AppServices {
    pub fn new(stores: Stores, default_page_limit: u32) -> Self {
        Self {
            events: EventService::new(stores.clone()),
            teams: TeamService::new(stores.clone()),
            projects: ProjectService::new(stores.clone()),
            assessments: AssessmentService::new(stores.clone()),
            reference: ReferenceService::new(stores),
            default_page_limit,
        }
    }
}

pub(crate) fn found<T>(value: Option<T>, entity: &'static str) -> DomainResult<T> {
    value.ok_or(DomainError::not_found(entity))
}
