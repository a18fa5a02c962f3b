// 🌍 Close Approach Entity
//
// One flyby of an NEO past Earth. The designation is a foreign key into the
// catalog; the resolved link is filled in by the catalog linker.

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::NeoId;
use crate::temporal::{cd_to_datetime, datetime_to_str};

/// Designation used when the source row has none
pub const UNKNOWN_DESIGNATION: &str = "Unknown";

// ============================================================================
// CLOSE APPROACH ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseApproach {
    designation: String,

    /// Approach time (UTC)
    pub time: Option<NaiveDateTime>,

    /// Nominal approach distance in astronomical units
    pub distance: f64,

    /// Relative approach velocity in km/s
    pub velocity: f64,

    /// Resolved NEO, `None` when the designation matched nothing
    #[serde(skip)]
    pub(crate) neo: Option<NeoId>,
}

impl CloseApproach {
    pub fn new(
        designation: impl Into<String>,
        time: Option<NaiveDateTime>,
        distance: f64,
        velocity: f64,
    ) -> Self {
        let designation = designation.into();
        let designation = if designation.trim().is_empty() {
            UNKNOWN_DESIGNATION.to_string()
        } else {
            designation
        };

        CloseApproach {
            designation,
            time,
            distance,
            velocity,
            neo: None,
        }
    }

    /// Build from a compact source timestamp ("2020-Jan-01 00:00")
    ///
    /// An empty timestamp is allowed and leaves the time unset.
    pub fn from_calendar_date(
        designation: impl Into<String>,
        calendar_date: &str,
        distance: f64,
        velocity: f64,
    ) -> Result<Self> {
        let time = if calendar_date.trim().is_empty() {
            None
        } else {
            Some(cd_to_datetime(calendar_date)?)
        };
        Ok(CloseApproach::new(designation, time, distance, velocity))
    }

    /// Designation of the NEO this approach refers to
    pub fn designation(&self) -> &str {
        &self.designation
    }

    /// True once the linker matched this approach to an NEO
    pub fn is_linked(&self) -> bool {
        self.neo.is_some()
    }

    pub(crate) fn neo_id(&self) -> Option<NeoId> {
        self.neo
    }

    /// Formatted approach time, or "Unknown time"
    pub fn time_str(&self) -> String {
        match &self.time {
            Some(t) => datetime_to_str(t),
            None => "Unknown time".to_string(),
        }
    }
}

impl fmt::Display for CloseApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "On {}, '{}' approaches Earth at a distance of {:.2} au and a velocity of {:.2} km/s.",
            self.time_str(),
            self.designation,
            self.distance,
            self.velocity
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
