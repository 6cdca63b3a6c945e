//! `hackathon-teams` — team formation: teams, rosters, invitations and join requests.
//!
//! Everything here is a pure decision over values handed in by the caller. The
//! caller persists the outcome; acceptance of a proposal must be written as one
//! unit (proposal status + roster row).

pub mod proposal;
pub mod team;

pub use proposal::{
    NewProposal, ProposalDecision, ProposalStatus, TeamInvitation, TeamRequest,
    decide_invite, decide_request_join, decide_respond_invitation, decide_respond_request,
};
pub use team::{CreateTeam, NewTeam, Team, TeamMember, decide_create_team};
