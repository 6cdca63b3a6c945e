use axum::{
    Router,
    routing::{get, patch, post},
};

use hackathon_auth::Role;

use crate::middleware::restrict;

pub mod events;
pub mod projects;
pub mod reference;
pub mod system;
pub mod teams;

pub const ADMINS: &[Role] = &[Role::Superadmin, Role::Admin];
pub const PARTICIPANTS: &[Role] = &[Role::Participant];
pub const JUDGES: &[Role] = &[Role::Judge];
pub const ASSESSMENT_READERS: &[Role] = &[Role::Superadmin, Role::Admin, Role::Judge];

/// Routes reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/", get(system::home))
        .route("/health", get(system::health))
        .route("/regions", get(reference::list_regions))
        .route("/events/latest", get(events::latest_event))
}

/// Routes behind the authentication gate. Role guards sit on individual methods.
pub fn router() -> Router {
    Router::new()
        .route("/me", get(system::me))
        .route("/technologies", get(reference::list_technologies))
        .route(
            "/criteria",
            get(reference::list_criteria).merge(restrict(post(reference::create_criterion), ADMINS)),
        )
        .route(
            "/events",
            get(events::list_events).merge(restrict(post(events::create_event), ADMINS)),
        )
        .route("/events/:id", get(events::get_event))
        .route("/events/:id/status", restrict(patch(events::change_status), ADMINS))
        .route("/events/:id/judges", restrict(post(events::assign_judge), ADMINS))
        .route("/events/:id/mentors", restrict(post(events::assign_mentor), ADMINS))
        .route(
            "/teams",
            get(teams::list_teams).merge(restrict(post(teams::create_team), PARTICIPANTS)),
        )
        .route("/teams/:id", get(teams::get_team))
        .route("/teams/:id/invitations", restrict(post(teams::invite), PARTICIPANTS))
        .route("/teams/:id/requests", restrict(post(teams::request_join), PARTICIPANTS))
        .route(
            "/invitations/:id/respond",
            restrict(post(teams::respond_invitation), PARTICIPANTS),
        )
        .route(
            "/requests/:id/respond",
            restrict(post(teams::respond_request), PARTICIPANTS),
        )
        .route(
            "/projects",
            get(projects::list_projects).merge(restrict(post(projects::create_project), PARTICIPANTS)),
        )
        .route(
            "/projects/:id",
            get(projects::get_project).merge(restrict(patch(projects::update_project), PARTICIPANTS)),
        )
        .route("/projects/:id/status", restrict(patch(projects::change_status), ADMINS))
        .route(
            "/projects/:id/assessments",
            restrict(get(projects::list_assessments), ASSESSMENT_READERS)
                .merge(restrict(post(projects::submit_assessments), JUDGES)),
        )
}
