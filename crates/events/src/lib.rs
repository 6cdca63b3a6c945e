//! `hackathon-events` — the hackathon event entity and its status lifecycle.
//!
//! Most project operations are gated on an event being `running`; this crate
//! owns that check and the admin-driven transitions between statuses.

pub mod event;
pub mod region;
pub mod staff;

pub use event::{CreateEvent, Event, EventStatus, EventStatusTransition, latest};
pub use region::Region;
pub use staff::{StaffAssignment, StaffKind};
