//! `hackathon-auth` — authentication and role authorization, decoupled from HTTP and storage.
//!
//! Identities are resolved through the [`UserLookup`] collaborator on every
//! validation; nothing here caches identities or tokens.

pub mod authorize;
pub mod claims;
pub mod identity;
pub mod roles;
pub mod token;

pub use authorize::authorize_roles;
pub use claims::{SessionClaims, TokenAlgorithm};
pub use identity::{Identity, ParticipantProfile};
pub use roles::Role;
pub use token::{AuthError, AuthenticatedSession, TokenIssuer, TokenValidator, UserLookup};
