//! Strongly-typed identifiers used across the domain.
//!
//! All persisted entities use database-assigned `i64` keys; the newtypes keep a
//! `TeamId` from ever being passed where a `ProjectId` is expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(i64);

        impl $t {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| DomainError::validation(format!("{}: {}", $name, e)))?;
                if value <= 0 {
                    return Err(DomainError::validation(format!("{}: must be positive", $name)));
                }
                Ok(Self(value))
            }
        }
    };
}

numeric_id!(
    /// Identifier of a user account (any role).
    UserId,
    "UserId"
);
numeric_id!(
    /// Identifier of a participant profile linked to a user account.
    ParticipantId,
    "ParticipantId"
);
numeric_id!(TeamId, "TeamId");
numeric_id!(
    /// Identifier of a hackathon event (not an event-sourcing event).
    EventId,
    "EventId"
);
numeric_id!(ProjectId, "ProjectId");
numeric_id!(CriterionId, "CriterionId");
numeric_id!(AssessmentId, "AssessmentId");
numeric_id!(InvitationId, "InvitationId");
numeric_id!(JoinRequestId, "JoinRequestId");
numeric_id!(RegionId, "RegionId");
numeric_id!(TechnologyId, "TechnologyId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_ids() {
        let id: ProjectId = "10".parse().unwrap();
        assert_eq!(id, ProjectId::new(10));
        assert_eq!(id.to_string(), "10");
    }

    #[test]
    fn rejects_garbage_and_non_positive_ids() {
        assert!("abc".parse::<TeamId>().is_err());
        assert!("0".parse::<TeamId>().is_err());
        assert!("-3".parse::<TeamId>().is_err());
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&EventId::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
