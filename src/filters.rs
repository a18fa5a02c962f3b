// 🔎 Attribute Filters - Criteria as Data
// Typed comparators over close-approach attributes, composed by the query engine
//
// Each filter is (comparator, reference value, attribute accessor). The set of
// kinds is closed: every variant has its accessor in `matches`, so there is no
// filter kind that can be built but not evaluated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::ApproachRecord;
use crate::error::FilterError;
use crate::temporal::parse_date;

// ============================================================================
// COMPARATOR
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    /// attribute == value
    Eq,
    /// attribute >= value
    Ge,
    /// attribute <= value
    Le,
}

impl Comparator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::Ge => ">=",
            Comparator::Le => "<=",
        }
    }

    /// Apply the comparison; NaN never compares true
    pub fn compare<T: PartialOrd>(&self, attribute: &T, value: &T) -> bool {
        match self {
            Comparator::Eq => attribute == value,
            Comparator::Ge => attribute >= value,
            Comparator::Le => attribute <= value,
        }
    }
}

// ============================================================================
// FILTER KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterKind {
    Date,
    Distance,
    Velocity,
    Diameter,
    Hazardous,
}

impl FilterKind {
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Date => "date",
            FilterKind::Distance => "distance",
            FilterKind::Velocity => "velocity",
            FilterKind::Diameter => "diameter",
            FilterKind::Hazardous => "hazardous",
        }
    }

    /// True when the accessor goes through the linked NEO
    pub fn needs_neo(&self) -> bool {
        matches!(self, FilterKind::Diameter | FilterKind::Hazardous)
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(FilterKind::Date),
            "distance" => Ok(FilterKind::Distance),
            "velocity" => Ok(FilterKind::Velocity),
            "diameter" => Ok(FilterKind::Diameter),
            "hazardous" => Ok(FilterKind::Hazardous),
            other => Err(FilterError::UnsupportedCriterion(other.to_string())),
        }
    }
}

// ============================================================================
// ATTRIBUTE FILTER
// ============================================================================

/// A single criterion on a close approach (or its linked NEO)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttributeFilter {
    /// Calendar date of the approach time
    Date(Comparator, NaiveDate),
    /// Approach distance (au)
    Distance(Comparator, f64),
    /// Relative velocity (km/s)
    Velocity(Comparator, f64),
    /// Diameter of the linked NEO (km)
    Diameter(Comparator, f64),
    /// Hazard flag of the linked NEO
    Hazardous(Comparator, bool),
}

impl AttributeFilter {
    pub fn kind(&self) -> FilterKind {
        match self {
            AttributeFilter::Date(..) => FilterKind::Date,
            AttributeFilter::Distance(..) => FilterKind::Distance,
            AttributeFilter::Velocity(..) => FilterKind::Velocity,
            AttributeFilter::Diameter(..) => FilterKind::Diameter,
            AttributeFilter::Hazardous(..) => FilterKind::Hazardous,
        }
    }

    pub fn comparator(&self) -> Comparator {
        match *self {
            AttributeFilter::Date(op, _)
            | AttributeFilter::Distance(op, _)
            | AttributeFilter::Velocity(op, _)
            | AttributeFilter::Diameter(op, _)
            | AttributeFilter::Hazardous(op, _) => op,
        }
    }

    /// Evaluate against one record
    ///
    /// A missing attribute never matches: no approach time for date filters,
    /// no linked NEO for diameter/hazardous filters, unknown diameter.
    pub fn matches(&self, record: &ApproachRecord<'_>) -> bool {
        let approach = record.approach;
        match *self {
            AttributeFilter::Date(op, date) => approach
                .time
                .map_or(false, |time| op.compare(&time.date(), &date)),
            AttributeFilter::Distance(op, value) => op.compare(&approach.distance, &value),
            AttributeFilter::Velocity(op, value) => op.compare(&approach.velocity, &value),
            AttributeFilter::Diameter(op, value) => record
                .neo
                .and_then(|neo| neo.diameter)
                .map_or(false, |diameter| op.compare(&diameter, &value)),
            AttributeFilter::Hazardous(op, flag) => record
                .neo
                .map_or(false, |neo| op.compare(&neo.hazardous, &flag)),
        }
    }
}

impl fmt::Display for AttributeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind().name();
        let op = self.comparator().symbol();
        match self {
            AttributeFilter::Date(_, date) => write!(f, "{} {} {}", kind, op, date),
            AttributeFilter::Distance(_, v)
            | AttributeFilter::Velocity(_, v)
            | AttributeFilter::Diameter(_, v) => write!(f, "{} {} {}", kind, op, v),
            AttributeFilter::Hazardous(_, flag) => write!(f, "{} {} {}", kind, op, flag),
        }
    }
}

/// Parse a textual criterion such as `distance<=0.1` or `date = 2020-01-01`
impl FromStr for AttributeFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, op, value) = split_criterion(s)?;
        let kind: FilterKind = kind.parse()?;

        let invalid = || FilterError::InvalidValue {
            kind: kind.name().to_string(),
            value: value.to_string(),
        };

        let filter = match kind {
            FilterKind::Date => AttributeFilter::Date(op, parse_date(value).map_err(|_| invalid())?),
            FilterKind::Distance => AttributeFilter::Distance(op, parse_real(value).ok_or_else(invalid)?),
            FilterKind::Velocity => AttributeFilter::Velocity(op, parse_real(value).ok_or_else(invalid)?),
            FilterKind::Diameter => AttributeFilter::Diameter(op, parse_real(value).ok_or_else(invalid)?),
            FilterKind::Hazardous => AttributeFilter::Hazardous(op, parse_flag(value).ok_or_else(invalid)?),
        };

        Ok(filter)
    }
}

fn split_criterion(s: &str) -> Result<(&str, Comparator, &str), FilterError> {
    // Two-character operators first so ">=" is not read as "="
    let operators = [
        (">=", Comparator::Ge),
        ("<=", Comparator::Le),
        ("==", Comparator::Eq),
        ("=", Comparator::Eq),
    ];

    for (token, op) in operators {
        if let Some(pos) = s.find(token) {
            return Ok((s[..pos].trim(), op, s[pos + token.len()..].trim()));
        }
    }

    Err(FilterError::InvalidOperator(s.to_string()))
}

fn parse_real(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| !v.is_nan())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "y" => Some(true),
        "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

// ============================================================================
// FILTER FACTORY
// ============================================================================

/// User-supplied criteria; `None` means "not specified"
///
/// `hazardous: Some(false)` is a real criterion (only non-hazardous NEOs).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub distance_min: Option<f64>,
    pub distance_max: Option<f64>,
    pub velocity_min: Option<f64>,
    pub velocity_max: Option<f64>,
    pub diameter_min: Option<f64>,
    pub diameter_max: Option<f64>,
    pub hazardous: Option<bool>,
}

impl FilterConfig {
    pub fn is_empty(&self) -> bool {
        *self == FilterConfig::default()
    }
}

/// Build the filter list for every option that is set, in option order
pub fn create_filters(config: &FilterConfig) -> Vec<AttributeFilter> {
    let mut filters = Vec::new();

    if let Some(date) = config.date {
        filters.push(AttributeFilter::Date(Comparator::Eq, date));
    }
    if let Some(date) = config.start_date {
        filters.push(AttributeFilter::Date(Comparator::Ge, date));
    }
    if let Some(date) = config.end_date {
        filters.push(AttributeFilter::Date(Comparator::Le, date));
    }
    if let Some(v) = config.distance_min {
        filters.push(AttributeFilter::Distance(Comparator::Ge, v));
    }
    if let Some(v) = config.distance_max {
        filters.push(AttributeFilter::Distance(Comparator::Le, v));
    }
    if let Some(v) = config.velocity_min {
        filters.push(AttributeFilter::Velocity(Comparator::Ge, v));
    }
    if let Some(v) = config.velocity_max {
        filters.push(AttributeFilter::Velocity(Comparator::Le, v));
    }
    if let Some(v) = config.diameter_min {
        filters.push(AttributeFilter::Diameter(Comparator::Ge, v));
    }
    if let Some(v) = config.diameter_max {
        filters.push(AttributeFilter::Diameter(Comparator::Le, v));
    }
    if let Some(flag) = config.hazardous {
        filters.push(AttributeFilter::Hazardous(Comparator::Eq, flag));
    }

    filters
}

// ============================================================================
// TESTS
// ============================================================================
