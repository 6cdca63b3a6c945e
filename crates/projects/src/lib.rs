//! `hackathon-projects` — project lifecycle and judging.
//!
//! ```text
//! draft ──► submitted ──► assessed
//!   │           │
//!   └───────────┴──► inactive
//! ```
//!
//! Decisions are pure functions over current state; persistence happens in the
//! caller, which must apply multi-row outcomes atomically.

pub mod assessment;
pub mod filter;
pub mod project;
pub mod workflow;

pub use assessment::{
    AssessmentInput, CreateCriterion, Criterion, JudgeAssessments, NewAssessment, ProjectAssessment,
    decide_assessment, group_by_judge,
};
pub use filter::{ProjectFilter, ProjectQuery, ProjectSort};
pub use project::{
    CreateProject, NewProject, Project, ProjectChanges, ProjectStatus, Technology, UpdateProject,
};
pub use workflow::{
    can_view_detail, decide_create, decide_deactivate, decide_update, ensure_deactivatable,
};
