//! Infrastructure layer: persistence collaborators and their backends.
//!
//! [`InMemoryStore`] backs tests and dev mode; [`PgStore`] backs production.
//! Both implement every trait in [`store`].

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use store::{
    AssessmentStore, EventStore, ProjectStore, ReferenceStore, Stores, TeamStore, UserStore,
};
