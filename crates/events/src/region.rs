use serde::{Deserialize, Serialize};

use hackathon_core::RegionId;

/// Read-only lookup row; events may be tied to a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
}
