// ☄️ Near-Earth Object Entity
//
// Designation is IDENTITY (primary key, never changes).
// Name, diameter and hazard flag are VALUES read from the source data.
// The approach list is filled in by the catalog linker, never by callers.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ApproachId;

// ============================================================================
// NEO ENTITY
// ============================================================================

/// A near-Earth object (NEO)
///
/// `diameter` is `None` when the source lacks a usable value (missing,
/// unparsable or non-positive). `name` is `None` when the object has no IAU
/// name, which is a different state from an empty string in the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearEarthObject {
    designation: String,

    pub name: Option<String>,

    /// Diameter in kilometers
    pub diameter: Option<f64>,

    pub hazardous: bool,

    /// Linked close approaches (catalog storage order)
    #[serde(skip)]
    pub(crate) approaches: Vec<ApproachId>,
}

impl NearEarthObject {
    /// Create a new NEO with no linked approaches
    pub fn new(
        designation: impl Into<String>,
        name: Option<String>,
        diameter: Option<f64>,
        hazardous: bool,
    ) -> Self {
        NearEarthObject {
            designation: designation.into(),
            name: name.filter(|n| !n.is_empty()),
            diameter: diameter.filter(|d| d.is_finite() && *d > 0.0),
            hazardous,
            approaches: Vec::new(),
        }
    }

    /// Build from raw source fields
    ///
    /// Diameter text that is empty, unparsable or non-positive becomes unknown.
    /// Only an exact "Y" marks the object as potentially hazardous.
    pub fn from_raw(designation: &str, name: &str, diameter: &str, pha: &str) -> Self {
        let diameter = diameter.trim().parse::<f64>().ok();
        NearEarthObject::new(
            designation.trim(),
            Some(name.trim().to_string()),
            diameter,
            pha.trim() == "Y",
        )
    }

    /// Primary designation (catalog primary key)
    pub fn designation(&self) -> &str {
        &self.designation
    }

    /// Diameter in kilometers, NaN when unknown
    pub fn diameter_km(&self) -> f64 {
        self.diameter.unwrap_or(f64::NAN)
    }

    /// "433 (Eros)" or just "433" when unnamed
    pub fn fullname(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", self.designation, name),
            None => self.designation.clone(),
        }
    }

    /// Number of linked close approaches
    pub fn approach_count(&self) -> usize {
        self.approaches.len()
    }

    pub(crate) fn approach_ids(&self) -> &[ApproachId] {
        &self.approaches
    }
}

impl fmt::Display for NearEarthObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hazard = if self.hazardous { "is" } else { "is not" };
        match self.diameter {
            Some(d) => write!(
                f,
                "NEO {} has a diameter of {:.3} km and {} potentially hazardous.",
                self.fullname(),
                d,
                hazard
            ),
            None => write!(
                f,
                "NEO {} has an unknown diameter and {} potentially hazardous.",
                self.fullname(),
                hazard
            ),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neo_creation() {
        let neo = NearEarthObject::new("433", Some("Eros".to_string()), Some(16.84), false);

        assert_eq!(neo.designation(), "433");
        assert_eq!(neo.name.as_deref(), Some("Eros"));
        assert_eq!(neo.diameter, Some(16.84));
        assert!(!neo.hazardous);
        assert_eq!(neo.approach_count(), 0);
    }

    #[test]
    fn test_from_raw_coerces_fields() {
        let neo = NearEarthObject::from_raw("2020 AB", "", "", "N");
        assert_eq!(neo.name, None);
        assert_eq!(neo.diameter, None);
        assert!(neo.diameter_km().is_nan());
        assert!(!neo.hazardous);

        let neo = NearEarthObject::from_raw("1036", "Ganymed", "37.675", "Y");
        assert_eq!(neo.name.as_deref(), Some("Ganymed"));
        assert_eq!(neo.diameter, Some(37.675));
        assert!(neo.hazardous);
    }

    #[test]
    fn test_non_positive_diameter_is_unknown() {
        assert_eq!(NearEarthObject::from_raw("1", "", "0", "").diameter, None);
        assert_eq!(NearEarthObject::from_raw("1", "", "-2.5", "").diameter, None);
        assert_eq!(NearEarthObject::from_raw("1", "", "n/a", "").diameter, None);
    }

    #[test]
    fn test_fullname_and_display() {
        let eros = NearEarthObject::new("433", Some("Eros".to_string()), Some(16.84), false);
        assert_eq!(eros.fullname(), "433 (Eros)");
        assert_eq!(
            eros.to_string(),
            "NEO 433 (Eros) has a diameter of 16.840 km and is not potentially hazardous."
        );

        let unnamed = NearEarthObject::new("2020 AB", None, None, true);
        assert_eq!(unnamed.fullname(), "2020 AB");
        assert_eq!(
            unnamed.to_string(),
            "NEO 2020 AB has an unknown diameter and is potentially hazardous."
        );
    }
}
